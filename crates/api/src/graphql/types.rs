use async_graphql::SimpleObject;
use storefront_shared::Channel;

/// A storefront channel as exposed over GraphQL
#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "Channel")]
pub struct ChannelType {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub hostname: Option<String>,
}

impl From<Channel> for ChannelType {
    fn from(channel: Channel) -> Self {
        Self {
            id: channel.id,
            code: channel.code,
            name: channel.name,
            hostname: channel.hostname,
        }
    }
}
