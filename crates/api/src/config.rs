//! Application configuration

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::{cache, pipeline};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub bind_address: String,
    pub graphql_path: String,

    // Database
    pub database_url: String,
    pub database_max_connections: u32,

    // Redis (response cache backend, in-memory when unset)
    pub redis_url: Option<String>,

    // Channel extension
    pub extension_enabled: bool,
    pub cache: CacheConfig,
    pub channel_detection: ChannelDetectionConfig,

    // Stock GraphQL pipeline, before the channel extension is composed in
    pub middleware: Vec<String>,
    pub query_namespaces: Vec<String>,
}

/// Response cache settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub enabled: bool,
    pub ttl: Duration,
    /// Memory budget of the in-memory store (unused with Redis)
    pub max_memory_bytes: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: Duration::from_secs(60 * 60 * 24),
            max_memory_bytes: cache::DEFAULT_MAX_BYTES,
        }
    }
}

/// Channel detection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelDetectionConfig {
    /// Strategies tried in order until one yields a channel
    pub priority: Vec<DetectionStrategy>,
    /// Header name for explicit channel selection
    pub header_name: String,
    /// Enable hostname-based detection
    pub auto_detect_hostname: bool,
    /// Strip a leading `www.` from hosts during comparison
    pub strip_www: bool,
}

impl Default for ChannelDetectionConfig {
    fn default() -> Self {
        Self {
            priority: vec![DetectionStrategy::Header, DetectionStrategy::Hostname],
            header_name: "x-channel".to_string(),
            auto_detect_hostname: true,
            strip_www: true,
        }
    }
}

/// A way of detecting the channel of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionStrategy {
    Header,
    Hostname,
}

impl FromStr for DetectionStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "header" => Ok(DetectionStrategy::Header),
            "hostname" => Ok(DetectionStrategy::Hostname),
            _ => Err(ConfigError::Invalid {
                name: "CHANNEL_DETECTION_PRIORITY",
                value: s.to_string(),
            }),
        }
    }
}

impl Config {
    /// Configuration with every optional setting at its default
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            graphql_path: "/graphql".to_string(),
            database_url: database_url.into(),
            database_max_connections: 5,
            redis_url: None,
            extension_enabled: true,
            cache: CacheConfig::default(),
            channel_detection: ChannelDetectionConfig::default(),
            middleware: pipeline::default_middleware(),
            query_namespaces: pipeline::default_query_namespaces(),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let detection_defaults = ChannelDetectionConfig::default();
        let cache_defaults = CacheConfig::default();

        Ok(Self {
            // Server
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            graphql_path: {
                let path = env::var("GRAPHQL_PATH").unwrap_or_else(|_| "/graphql".to_string());
                if !path.starts_with('/') {
                    return Err(ConfigError::Invalid {
                        name: "GRAPHQL_PATH",
                        value: path,
                    });
                }
                path
            },

            // Database
            database_url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),

            // Redis
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),

            // Channel extension
            extension_enabled: parse_bool("GRAPHQL_CHANNEL_EXTENSION_ENABLED", true),
            cache: CacheConfig {
                enabled: parse_bool("GRAPHQL_CHANNEL_CACHE_ENABLED", cache_defaults.enabled),
                ttl: env::var("GRAPHQL_CHANNEL_CACHE_TTL")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .map(Duration::from_secs)
                    .unwrap_or(cache_defaults.ttl),
                max_memory_bytes: env::var("GRAPHQL_CHANNEL_CACHE_MAX_BYTES")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(cache_defaults.max_memory_bytes),
            },
            channel_detection: ChannelDetectionConfig {
                priority: match env::var("CHANNEL_DETECTION_PRIORITY") {
                    Ok(value) => split_list(&value)
                        .iter()
                        .map(|s| s.parse())
                        .collect::<Result<Vec<_>, _>>()?,
                    Err(_) => detection_defaults.priority,
                },
                header_name: env::var("CHANNEL_HEADER_NAME")
                    .ok()
                    .map(|v| v.trim().to_lowercase())
                    .filter(|v| !v.is_empty())
                    .unwrap_or(detection_defaults.header_name),
                auto_detect_hostname: parse_bool(
                    "CHANNEL_AUTO_DETECT_HOSTNAME",
                    detection_defaults.auto_detect_hostname,
                ),
                strip_www: parse_bool("CHANNEL_STRIP_WWW", detection_defaults.strip_www),
            },

            // Pipeline
            middleware: env::var("GRAPHQL_MIDDLEWARE")
                .map(|v| split_list(&v))
                .unwrap_or_else(|_| pipeline::default_middleware()),
            query_namespaces: env::var("GRAPHQL_QUERY_NAMESPACES")
                .map(|v| split_list(&v))
                .unwrap_or_else(|_| pipeline::default_query_namespaces()),
        })
    }
}

fn parse_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}
