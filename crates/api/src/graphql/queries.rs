//! Channel queries

use async_graphql::{Context, Object, Result};
use storefront_shared::CurrentChannel;

use super::ChannelType;
use crate::routing::ChannelResolver;

/// Raw channel inputs of the HTTP request behind a GraphQL execution
#[derive(Debug, Clone, Default)]
pub struct RequestChannelInfo {
    pub explicit_code: Option<String>,
    pub host: String,
}

#[derive(Default)]
pub struct ChannelQuery;

#[Object]
impl ChannelQuery {
    /// Look up a channel by its code
    async fn channel_by_code(&self, ctx: &Context<'_>, code: String) -> Result<Option<ChannelType>> {
        let resolver = ctx.data::<ChannelResolver>()?;
        Ok(resolver.channel_by_code(&code).await?.map(ChannelType::from))
    }

    /// Look up a channel whose stored hostname is exactly `hostname`,
    /// optionally behind an http(s) scheme
    async fn channel_by_hostname(
        &self,
        ctx: &Context<'_>,
        hostname: String,
    ) -> Result<Option<ChannelType>> {
        let resolver = ctx.data::<ChannelResolver>()?;
        Ok(resolver
            .channel_by_hostname(&hostname)
            .await?
            .map(ChannelType::from))
    }

    /// Channel of the current request
    async fn current_channel(&self, ctx: &Context<'_>) -> Result<Option<ChannelType>> {
        if let Some(CurrentChannel(channel)) = ctx.data_opt::<CurrentChannel>() {
            return Ok(Some(channel.clone().into()));
        }

        // Channel middleware not in the pipeline, resolve here instead
        let Some(info) = ctx.data_opt::<RequestChannelInfo>() else {
            return Ok(None);
        };
        let resolver = ctx.data::<ChannelResolver>()?;
        Ok(resolver
            .resolve(info.explicit_code.as_deref(), &info.host)
            .await?
            .map(ChannelType::from))
    }
}
