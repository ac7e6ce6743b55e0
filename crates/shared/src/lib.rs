//! Storefront Shared Types and Utilities
//!
//! This crate contains the channel model, the channel directory abstraction
//! and its storage backends, shared by the storefront GraphQL server.

pub mod db;
pub mod directory;
pub mod error;
pub mod types;

pub use db::*;
pub use directory::{ChannelDirectory, InMemoryChannelDirectory};
pub use error::*;
pub use types::*;
