//! Shared application state

use std::sync::Arc;

use storefront_shared::ChannelDirectory;

use crate::{
    cache::ResponseStore,
    config::Config,
    graphql::{build_schema, StorefrontSchema},
    routing::ChannelResolver,
};

/// State shared by every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub resolver: ChannelResolver,
    pub response_store: Arc<dyn ResponseStore>,
    pub schema: StorefrontSchema,
}

impl AppState {
    pub fn new(
        config: Config,
        directory: Arc<dyn ChannelDirectory>,
        response_store: Arc<dyn ResponseStore>,
    ) -> Self {
        let resolver = ChannelResolver::with_detection(directory, &config.channel_detection);
        let schema = build_schema(resolver.clone());

        Self {
            config: Arc::new(config),
            resolver,
            response_store,
            schema,
        }
    }

    #[cfg(test)]
    pub(crate) fn for_tests(channels: Vec<storefront_shared::Channel>) -> Self {
        Self::new(
            Config::new("postgres://localhost/test"),
            Arc::new(storefront_shared::InMemoryChannelDirectory::new(channels)),
            Arc::new(crate::cache::InMemoryResponseStore::new()),
        )
    }
}
