//! GraphQL schema exposing the channel queries

mod queries;
mod types;

pub use queries::{ChannelQuery, RequestChannelInfo};
pub use types::ChannelType;

use async_graphql::{EmptyMutation, EmptySubscription, Schema};

use crate::routing::ChannelResolver;

pub type StorefrontSchema = Schema<ChannelQuery, EmptyMutation, EmptySubscription>;

/// Build the schema with the resolver available to every query
pub fn build_schema(resolver: ChannelResolver) -> StorefrontSchema {
    Schema::build(ChannelQuery, EmptyMutation, EmptySubscription)
        .data(resolver)
        .finish()
}
