//! Channel routing for the GraphQL endpoint
//!
//! This module resolves incoming requests to storefront channels:
//! - Explicit header: `x-channel: eu`
//! - Request host: `eu.example.com`, `www.eu.example.com:8080`
//!
//! Stored channel hostnames may be bare hosts, hosts with a path or full
//! URLs, so both sides go through [`HostCanonicalizer`] before comparing.

mod host;
mod request;
mod resolver;

pub use host::{canonicalize, extract_host_from_stored, HostCanonicalizer};
pub use request::{header_value, request_host, ChannelRequest};
pub use resolver::{ChannelResolver, ResolutionType, ResolvedChannel};
