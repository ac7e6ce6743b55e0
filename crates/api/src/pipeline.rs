//! Boot-time composition of the GraphQL middleware pipeline
//!
//! The server starts from a stock, ordered list of middleware identifiers and
//! query namespaces. The channel extension splices its own entries into those
//! lists once at startup:
//! - channel resolution right after authentication (or first)
//! - the response cache right after rate limiting (or right after channel
//!   resolution, or last)
//!
//! Composition is a pure function over the lists and is idempotent.

use crate::config::Config;

/// Authentication middleware; channel resolution runs right after it
pub const AUTHENTICATION_MIDDLEWARE: &str = "storefront::middleware::AttemptAuthentication";
/// Any entry containing this marker anchors the response cache
pub const RATE_LIMIT_MARKER: &str = "RateLimitMiddleware";

pub const CHANNEL_MIDDLEWARE: &str = "storefront_channel::middleware::ChannelMiddleware";
pub const CACHE_MIDDLEWARE: &str = "storefront_channel::middleware::GraphQLCacheMiddleware";

/// Pre-extension builds of the same middleware, removed on composition
pub const LEGACY_MIDDLEWARE: &[&str] = &[
    "storefront::middleware::ChannelMiddleware",
    "storefront::middleware::GraphQLCacheMiddleware",
];

pub const CORE_QUERY_NAMESPACE: &str = "storefront::queries";
pub const CHANNEL_QUERY_NAMESPACE: &str = "storefront_channel::queries";

/// Stock middleware list of the storefront server (empty: the server's
/// own global layers are not part of the composable pipeline)
pub fn default_middleware() -> Vec<String> {
    Vec::new()
}

/// Stock query namespaces of the storefront server
pub fn default_query_namespaces() -> Vec<String> {
    vec![CORE_QUERY_NAMESPACE.to_string()]
}

/// Final middleware order and query namespaces after composition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    pub middleware: Vec<String>,
    pub query_namespaces: Vec<String>,
}

impl Pipeline {
    /// Whether the channel queries are exposed
    pub fn has_channel_queries(&self) -> bool {
        self.query_namespaces
            .iter()
            .any(|namespace| namespace == CHANNEL_QUERY_NAMESPACE)
    }
}

/// Compose the configured stock pipeline with the channel extension.
/// A disabled extension leaves both lists untouched.
pub fn compose(config: &Config) -> Pipeline {
    if !config.extension_enabled {
        tracing::info!("Channel extension disabled, using stock GraphQL pipeline");
        return Pipeline {
            middleware: config.middleware.clone(),
            query_namespaces: config.query_namespaces.clone(),
        };
    }

    Pipeline {
        middleware: compose_middleware(&config.middleware),
        query_namespaces: compose_query_namespaces(&config.query_namespaces),
    }
}

/// Splice the channel and cache middleware into an ordered middleware list
pub fn compose_middleware(middleware: &[String]) -> Vec<String> {
    let mut composed: Vec<String> = middleware
        .iter()
        .filter(|entry| !LEGACY_MIDDLEWARE.contains(&entry.as_str()))
        .cloned()
        .collect();

    if !contains(&composed, CHANNEL_MIDDLEWARE) {
        match position(&composed, |entry| entry == AUTHENTICATION_MIDDLEWARE) {
            Some(auth_pos) => composed.insert(auth_pos + 1, CHANNEL_MIDDLEWARE.to_string()),
            None => composed.insert(0, CHANNEL_MIDDLEWARE.to_string()),
        }
    }

    if !contains(&composed, CACHE_MIDDLEWARE) {
        let anchor = position(&composed, |entry| entry.contains(RATE_LIMIT_MARKER))
            .or_else(|| position(&composed, |entry| entry == CHANNEL_MIDDLEWARE));

        match anchor {
            Some(pos) => composed.insert(pos + 1, CACHE_MIDDLEWARE.to_string()),
            None => composed.push(CACHE_MIDDLEWARE.to_string()),
        }
    }

    composed
}

/// Register the channel query namespace
pub fn compose_query_namespaces(namespaces: &[String]) -> Vec<String> {
    let mut composed = namespaces.to_vec();
    if !contains(&composed, CHANNEL_QUERY_NAMESPACE) {
        composed.push(CHANNEL_QUERY_NAMESPACE.to_string());
    }
    composed
}

fn contains(list: &[String], entry: &str) -> bool {
    list.iter().any(|e| e == entry)
}

fn position(list: &[String], predicate: impl Fn(&str) -> bool) -> Option<usize> {
    list.iter().position(|entry| predicate(entry.as_str()))
}
