//! Storefront API Library
//!
//! Channel resolution, pipeline composition and the channel-aware GraphQL
//! endpoint of the storefront server.

pub mod cache;
pub mod config;
pub mod error;
pub mod graphql;
pub mod middleware;
pub mod pipeline;
pub mod routes;
pub mod routing;
pub mod state;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use pipeline::Pipeline;
pub use routing::{ChannelResolver, HostCanonicalizer, ResolutionType, ResolvedChannel};
pub use state::AppState;
