//! Request-to-Channel Resolution
//!
//! Resolves the active storefront channel for a request. Supports:
//! - Explicit header: `x-channel: eu` -> channel lookup by code
//! - Hostname: `eu.example.com:8080` -> scan of all channels, comparing
//!   canonical hosts
//!
//! A header naming an unknown channel falls through to hostname matching.

use std::sync::Arc;

use storefront_shared::{Channel, ChannelDirectory, DirectoryResult};

use super::{ChannelRequest, HostCanonicalizer};
use crate::config::{ChannelDetectionConfig, DetectionStrategy};

/// Result of resolving a request to a channel
#[derive(Debug, Clone)]
pub struct ResolvedChannel {
    pub channel: Channel,
    pub resolution_type: ResolutionType,
}

/// How the channel was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionType {
    /// Matched the explicit channel header by code
    Header,
    /// Matched the request host against a stored hostname
    Hostname,
}

/// Channel resolver over a channel directory
#[derive(Clone)]
pub struct ChannelResolver {
    directory: Arc<dyn ChannelDirectory>,
    canonicalizer: HostCanonicalizer,
    header_name: String,
    priority: Vec<DetectionStrategy>,
    auto_detect_hostname: bool,
}

impl ChannelResolver {
    /// Create a resolver with the default detection settings
    pub fn new(directory: Arc<dyn ChannelDirectory>) -> Self {
        Self::with_detection(directory, &ChannelDetectionConfig::default())
    }

    /// Create a resolver with custom detection settings
    pub fn with_detection(
        directory: Arc<dyn ChannelDirectory>,
        detection: &ChannelDetectionConfig,
    ) -> Self {
        Self {
            directory,
            canonicalizer: HostCanonicalizer::new(detection.strip_www),
            header_name: detection.header_name.clone(),
            priority: detection.priority.clone(),
            auto_detect_hostname: detection.auto_detect_hostname,
        }
    }

    /// Name of the header carrying an explicit channel code
    pub fn header_name(&self) -> &str {
        &self.header_name
    }

    pub fn directory(&self) -> &Arc<dyn ChannelDirectory> {
        &self.directory
    }

    /// Resolve the channel for an explicit code and a request host
    ///
    /// Returns:
    /// - Ok(Some(channel)) if the header or the host matched a channel
    /// - Ok(None) if nothing matched (a normal outcome)
    /// - Err if the directory could not be queried
    pub async fn resolve(
        &self,
        explicit_code: Option<&str>,
        request_host: &str,
    ) -> DirectoryResult<Option<Channel>> {
        Ok(self
            .resolve_with_type(explicit_code, request_host)
            .await?
            .map(|resolved| resolved.channel))
    }

    /// Like [`resolve`](Self::resolve), also reporting which tier matched
    pub async fn resolve_with_type(
        &self,
        explicit_code: Option<&str>,
        request_host: &str,
    ) -> DirectoryResult<Option<ResolvedChannel>> {
        for strategy in &self.priority {
            let resolved = match strategy {
                DetectionStrategy::Header => self.resolve_by_header(explicit_code).await?,
                DetectionStrategy::Hostname if self.auto_detect_hostname => {
                    self.resolve_by_request_host(request_host).await?
                }
                DetectionStrategy::Hostname => None,
            };

            if resolved.is_some() {
                return Ok(resolved);
            }
        }

        Ok(None)
    }

    /// Resolve a request and attach the channel to it when one matches
    pub async fn resolve_request<R: ChannelRequest>(
        &self,
        request: &mut R,
    ) -> DirectoryResult<Option<ResolvedChannel>> {
        let explicit_code = request.header(&self.header_name);
        let host = request.host();

        let resolved = self
            .resolve_with_type(explicit_code.as_deref(), &host)
            .await?;

        if let Some(resolved) = &resolved {
            request.set_context_value(resolved.channel.clone());
        }

        Ok(resolved)
    }

    /// Plain lookup by channel code
    pub async fn channel_by_code(&self, code: &str) -> DirectoryResult<Option<Channel>> {
        self.directory.find_by_code(code).await
    }

    /// Exact hostname lookup.
    ///
    /// Stricter than request resolution: the input is only trimmed and
    /// lowercased, and the stored value must equal it, optionally behind an
    /// `http://` or `https://` scheme. Ports, paths and `www.` never match.
    pub async fn channel_by_hostname(&self, hostname: &str) -> DirectoryResult<Option<Channel>> {
        let hostname = hostname.trim().to_lowercase();
        if hostname.is_empty() {
            return Ok(None);
        }

        self.directory.find_by_hostname(&hostname).await
    }

    async fn resolve_by_header(
        &self,
        explicit_code: Option<&str>,
    ) -> DirectoryResult<Option<ResolvedChannel>> {
        let Some(code) = explicit_code.map(str::trim).filter(|code| !code.is_empty()) else {
            return Ok(None);
        };

        let channel = self.directory.find_by_code(code).await?;
        if channel.is_none() {
            tracing::debug!(code = %code, "No channel for explicit header, trying next strategy");
        }

        Ok(channel.map(|channel| ResolvedChannel {
            channel,
            resolution_type: ResolutionType::Header,
        }))
    }

    async fn resolve_by_request_host(
        &self,
        request_host: &str,
    ) -> DirectoryResult<Option<ResolvedChannel>> {
        let host = self.canonicalizer.canonicalize(request_host);
        if host.is_empty() {
            return Ok(None);
        }

        // Stored hostnames are free-form, so every channel is fetched and
        // compared after canonicalization. First match in directory order wins.
        let channels = self.directory.list_all().await?;

        let channel = channels.into_iter().find(|channel| {
            self.canonicalizer
                .canonical_stored_host(channel.hostname_or_empty())
                .is_some_and(|stored| stored == host)
        });

        Ok(channel.map(|channel| ResolvedChannel {
            channel,
            resolution_type: ResolutionType::Hostname,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{body::Body, http::Request};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use storefront_shared::{CurrentChannel, DirectoryError, InMemoryChannelDirectory};

    fn channels() -> Vec<Channel> {
        vec![
            Channel::new(1, "default", Some("Shop.Example.com")),
            Channel::new(2, "eu", Some("https://eu.example.com/store")),
        ]
    }

    fn resolver() -> ChannelResolver {
        ChannelResolver::new(Arc::new(InMemoryChannelDirectory::new(channels())))
    }

    #[tokio::test]
    async fn test_resolves_by_hostname_with_port() {
        let channel = resolver().resolve(None, "eu.example.com:8080").await.unwrap();
        assert_eq!(channel.map(|c| c.code), Some("eu".to_string()));
    }

    #[tokio::test]
    async fn test_explicit_header_wins_over_host() {
        let resolved = resolver()
            .resolve_with_type(Some("default"), "eu.example.com")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(resolved.channel.code, "default");
        assert_eq!(resolved.resolution_type, ResolutionType::Header);
    }

    #[tokio::test]
    async fn test_unknown_header_falls_through_to_hostname() {
        let resolved = resolver()
            .resolve_with_type(Some("missing"), "www.eu.example.com")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(resolved.channel.code, "eu");
        assert_eq!(resolved.resolution_type, ResolutionType::Hostname);
    }

    #[tokio::test]
    async fn test_empty_header_is_ignored() {
        let channel = resolver().resolve(Some("  "), "shop.example.com").await.unwrap();
        assert_eq!(channel.map(|c| c.code), Some("default".to_string()));
    }

    #[tokio::test]
    async fn test_no_match_is_none() {
        let resolver = resolver();
        assert!(resolver.resolve(None, "unknown.example.org").await.unwrap().is_none());
        assert!(resolver.resolve(None, "").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_hostless_request_never_matches_degenerate_stored_hosts() {
        // Both canonicalize to "", which must not count as a match
        let resolver = ChannelResolver::new(Arc::new(InMemoryChannelDirectory::new(vec![
            Channel::new(1, "port-only", Some(":8080")),
            Channel::new(2, "bare-www", Some("www.")),
        ])));

        assert!(resolver.resolve(None, "").await.unwrap().is_none());
        assert!(resolver.resolve(None, ":443").await.unwrap().is_none());
        assert!(resolver.resolve(None, "www.").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_first_match_wins() {
        let directory = InMemoryChannelDirectory::new(vec![
            Channel::new(1, "first", Some("shop.example.com/a")),
            Channel::new(2, "second", Some("https://www.shop.example.com")),
        ]);
        let resolver = ChannelResolver::new(Arc::new(directory));

        let channel = resolver.resolve(None, "shop.example.com").await.unwrap();
        assert_eq!(channel.map(|c| c.code), Some("first".to_string()));
    }

    #[tokio::test]
    async fn test_stored_host_with_port_and_path_matches() {
        let directory = InMemoryChannelDirectory::new(vec![Channel::new(
            9,
            "legacy",
            Some("WWW.Example.com:8080/shop"),
        )]);
        let resolver = ChannelResolver::new(Arc::new(directory));

        let channel = resolver.resolve(None, "example.com").await.unwrap();
        assert_eq!(channel.map(|c| c.code), Some("legacy".to_string()));
    }

    #[tokio::test]
    async fn test_channels_without_hostname_never_match_host() {
        let directory = InMemoryChannelDirectory::new(vec![Channel::new(1, "bare", None)]);
        let resolver = ChannelResolver::new(Arc::new(directory));

        assert!(resolver.resolve(None, "example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_hostname_detection_can_be_disabled() {
        let detection = ChannelDetectionConfig {
            auto_detect_hostname: false,
            ..Default::default()
        };
        let resolver = ChannelResolver::with_detection(
            Arc::new(InMemoryChannelDirectory::new(channels())),
            &detection,
        );

        assert!(resolver.resolve(None, "eu.example.com").await.unwrap().is_none());
        let by_header = resolver.resolve(Some("eu"), "").await.unwrap();
        assert_eq!(by_header.map(|c| c.code), Some("eu".to_string()));
    }

    #[tokio::test]
    async fn test_hostname_priority_before_header() {
        let detection = ChannelDetectionConfig {
            priority: vec![DetectionStrategy::Hostname, DetectionStrategy::Header],
            ..Default::default()
        };
        let resolver = ChannelResolver::with_detection(
            Arc::new(InMemoryChannelDirectory::new(channels())),
            &detection,
        );

        let channel = resolver.resolve(Some("default"), "eu.example.com").await.unwrap();
        assert_eq!(channel.map(|c| c.code), Some("eu".to_string()));
    }

    #[tokio::test]
    async fn test_strip_www_disabled() {
        let detection = ChannelDetectionConfig {
            strip_www: false,
            ..Default::default()
        };
        let resolver = ChannelResolver::with_detection(
            Arc::new(InMemoryChannelDirectory::new(channels())),
            &detection,
        );

        assert!(resolver.resolve(None, "www.shop.example.com").await.unwrap().is_none());
        assert!(resolver.resolve(None, "shop.example.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_channel_by_hostname_is_narrow() {
        for stored in ["eu.example.com", "https://eu.example.com", "http://eu.example.com"] {
            let directory = InMemoryChannelDirectory::new(vec![Channel::new(2, "eu", Some(stored))]);
            let resolver = ChannelResolver::new(Arc::new(directory));

            let channel = resolver.channel_by_hostname("EU.example.com").await.unwrap();
            assert_eq!(channel.map(|c| c.code), Some("eu".to_string()), "stored {stored:?}");
        }

        let directory =
            InMemoryChannelDirectory::new(vec![Channel::new(2, "eu", Some("eu.example.com/store"))]);
        let resolver = ChannelResolver::new(Arc::new(directory));

        assert!(resolver.channel_by_hostname("EU.example.com").await.unwrap().is_none());
        // The request tier accepts the same stored value
        assert!(resolver.resolve(None, "EU.example.com").await.unwrap().is_some());
        assert!(resolver.channel_by_hostname("   ").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_channel_by_code() {
        let resolver = resolver();
        let channel = resolver.channel_by_code("eu").await.unwrap();
        assert_eq!(channel.map(|c| c.id), Some(2));
        assert!(resolver.channel_by_code("EU").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resolve_request_attaches_channel() {
        let mut request = Request::builder()
            .uri("/graphql")
            .header("Host", "eu.example.com:8080")
            .body(Body::empty())
            .unwrap();

        let resolved = resolver().resolve_request(&mut request).await.unwrap();
        assert!(resolved.is_some());

        let current = request.extensions().get::<CurrentChannel>().unwrap();
        assert_eq!(current.code(), "eu");
    }

    #[tokio::test]
    async fn test_resolve_request_without_match_attaches_nothing() {
        let mut request = Request::builder()
            .uri("/graphql")
            .header("Host", "nowhere.example.org")
            .body(Body::empty())
            .unwrap();

        let resolved = resolver().resolve_request(&mut request).await.unwrap();
        assert!(resolved.is_none());
        assert!(request.extensions().get::<CurrentChannel>().is_none());
    }

    struct FailingDirectory {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ChannelDirectory for FailingDirectory {
        async fn find_by_code(&self, _code: &str) -> DirectoryResult<Option<Channel>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(DirectoryError::Unavailable("connection refused".to_string()))
        }

        async fn list_all(&self) -> DirectoryResult<Vec<Channel>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(DirectoryError::Unavailable("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_directory_errors_propagate_without_retry() {
        let directory = Arc::new(FailingDirectory {
            calls: AtomicUsize::new(0),
        });
        let resolver = ChannelResolver::new(directory.clone());

        let result = resolver.resolve(None, "eu.example.com").await;
        assert!(matches!(result, Err(DirectoryError::Unavailable(_))));
        assert_eq!(directory.calls.load(Ordering::SeqCst), 1);
    }
}
