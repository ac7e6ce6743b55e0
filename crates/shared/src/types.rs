//! Common types used across the storefront

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// =============================================================================
// Channel
// =============================================================================

/// A storefront channel (tenant context).
///
/// `hostname` is stored exactly as an operator typed it: a bare host
/// (`example.com`), a host with a path (`example.com/store`) or a full URL
/// (`https://example.com/store`). Nothing validates it on write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Channel {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub hostname: Option<String>,
}

impl Channel {
    pub fn new(id: i64, code: impl Into<String>, hostname: Option<&str>) -> Self {
        let code = code.into();
        Self {
            id,
            name: code.clone(),
            code,
            hostname: hostname.map(str::to_string),
        }
    }

    /// Stored hostname, with a missing value treated as empty
    pub fn hostname_or_empty(&self) -> &str {
        self.hostname.as_deref().unwrap_or_default()
    }
}

/// Channel resolved for the current request.
///
/// Inserted into the request extensions by the channel middleware and read
/// by GraphQL resolvers and the response cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentChannel(pub Channel);

impl CurrentChannel {
    /// Logical name of the per-request attribute holding the channel
    pub const CONTEXT_KEY: &'static str = "graphql_channel";

    pub fn code(&self) -> &str {
        &self.0.code
    }
}
