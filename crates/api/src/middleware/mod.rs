//! HTTP middleware for the GraphQL endpoint
//!
//! Channel resolution and the response cache are composable pipeline
//! entries (see [`crate::pipeline`]); response headers apply globally.

mod channel;
mod headers;
mod response_cache;

pub use channel::channel_middleware;
pub use headers::response_headers_middleware;
pub use response_cache::{response_cache_middleware, CACHE_STATUS_HEADER};

use crate::pipeline::{CACHE_MIDDLEWARE, CHANNEL_MIDDLEWARE};

/// Pipeline entries this server provides an implementation for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiddlewareKind {
    Channel,
    ResponseCache,
}

impl MiddlewareKind {
    /// Look up the implementation behind a pipeline identifier
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        match identifier {
            CHANNEL_MIDDLEWARE => Some(MiddlewareKind::Channel),
            CACHE_MIDDLEWARE => Some(MiddlewareKind::ResponseCache),
            _ => None,
        }
    }
}
