//! Channel directory abstraction
//!
//! The directory is the read-only source of channel records. Resolution only
//! ever needs a lookup by code and a full listing; hostname lookup has a
//! default implementation on top of the listing so backends only override
//! it when they can push the comparison down to storage.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{Channel, DirectoryResult};

#[async_trait]
pub trait ChannelDirectory: Send + Sync {
    /// Find a channel by its unique code
    async fn find_by_code(&self, code: &str) -> DirectoryResult<Option<Channel>>;

    /// List every channel in storage order
    async fn list_all(&self) -> DirectoryResult<Vec<Channel>>;

    /// Find the first channel whose stored hostname is exactly `hostname`,
    /// or `hostname` behind an `http://` / `https://` scheme.
    ///
    /// `hostname` must already be trimmed and lowercased. The stored value is
    /// lowercased before comparing but otherwise untouched, so ports, paths
    /// and `www.` prefixes never match loosely here.
    async fn find_by_hostname(&self, hostname: &str) -> DirectoryResult<Option<Channel>> {
        Ok(self
            .list_all()
            .await?
            .into_iter()
            .find(|channel| matches_hostname_exactly(channel.hostname.as_deref(), hostname)))
    }

    /// Check that the directory is reachable
    async fn ping(&self) -> DirectoryResult<()> {
        Ok(())
    }
}

/// Narrow hostname comparison used by explicit hostname lookups
pub fn matches_hostname_exactly(stored: Option<&str>, hostname: &str) -> bool {
    let Some(stored) = stored else {
        return false;
    };
    let stored = stored.to_lowercase();

    stored == hostname
        || stored.strip_prefix("https://") == Some(hostname)
        || stored.strip_prefix("http://") == Some(hostname)
}

/// In-memory directory (for development and tests without a database)
#[derive(Default)]
pub struct InMemoryChannelDirectory {
    channels: RwLock<Vec<Channel>>,
}

impl InMemoryChannelDirectory {
    pub fn new(channels: Vec<Channel>) -> Self {
        Self {
            channels: RwLock::new(channels),
        }
    }

    /// Append a channel, keeping insertion order
    pub async fn insert(&self, channel: Channel) {
        self.channels.write().await.push(channel);
    }
}

#[async_trait]
impl ChannelDirectory for InMemoryChannelDirectory {
    async fn find_by_code(&self, code: &str) -> DirectoryResult<Option<Channel>> {
        let channels = self.channels.read().await;
        Ok(channels.iter().find(|c| c.code == code).cloned())
    }

    async fn list_all(&self) -> DirectoryResult<Vec<Channel>> {
        Ok(self.channels.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> InMemoryChannelDirectory {
        InMemoryChannelDirectory::new(vec![
            Channel::new(1, "default", Some("Shop.Example.com")),
            Channel::new(2, "eu", Some("https://eu.example.com")),
            Channel::new(3, "us", Some("us.example.com/store")),
            Channel::new(4, "bare", None),
        ])
    }

    #[test]
    fn test_matches_hostname_exactly() {
        assert!(matches_hostname_exactly(Some("eu.example.com"), "eu.example.com"));
        assert!(matches_hostname_exactly(Some("HTTPS://EU.example.com"), "eu.example.com"));
        assert!(matches_hostname_exactly(Some("http://eu.example.com"), "eu.example.com"));

        assert!(!matches_hostname_exactly(Some("eu.example.com/store"), "eu.example.com"));
        assert!(!matches_hostname_exactly(Some("eu.example.com:8080"), "eu.example.com"));
        assert!(!matches_hostname_exactly(Some("www.eu.example.com"), "eu.example.com"));
        assert!(!matches_hostname_exactly(None, "eu.example.com"));
    }

    #[tokio::test]
    async fn test_find_by_code() {
        let dir = directory();
        let found = dir.find_by_code("eu").await.unwrap();
        assert_eq!(found.map(|c| c.id), Some(2));
        assert!(dir.find_by_code("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_all_keeps_insertion_order() {
        let dir = directory();
        dir.insert(Channel::new(5, "late", Some("late.example.com"))).await;

        let codes: Vec<String> = dir
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.code)
            .collect();
        assert_eq!(codes, vec!["default", "eu", "us", "bare", "late"]);
    }

    #[tokio::test]
    async fn test_default_find_by_hostname() {
        let dir = directory();

        let default = dir.find_by_hostname("shop.example.com").await.unwrap();
        assert_eq!(default.map(|c| c.code), Some("default".to_string()));

        let eu = dir.find_by_hostname("eu.example.com").await.unwrap();
        assert_eq!(eu.map(|c| c.code), Some("eu".to_string()));

        // Path-bearing values never match the narrow rule
        assert!(dir.find_by_hostname("us.example.com").await.unwrap().is_none());
    }
}
