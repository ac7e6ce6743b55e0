//! Host canonicalization
//!
//! Request hosts and stored channel hostnames come in many shapes
//! (`Shop.Example.com:8080`, `https://www.shop.example.com/`,
//! `shop.example.com/catalog`). Both sides are reduced to a bare, lowercase
//! host before comparing.

use url::Url;

/// Normalizes host-like strings into a form suitable for equality checks
#[derive(Debug, Clone, Copy)]
pub struct HostCanonicalizer {
    strip_www: bool,
}

impl Default for HostCanonicalizer {
    fn default() -> Self {
        Self::new(true)
    }
}

impl HostCanonicalizer {
    pub fn new(strip_www: bool) -> Self {
        Self { strip_www }
    }

    /// Reduce `raw` to its canonical host. Never fails.
    ///
    /// The normalization pass is repeated until the value stops changing, so
    /// degenerate inputs such as `www.www.example.com` or `example.com /`
    /// still canonicalize idempotently. Only the first pass can grow the
    /// string (URL host parsing); later passes only remove characters.
    pub fn canonicalize(&self, raw: &str) -> String {
        let mut current = self.canonicalize_once(raw);
        loop {
            let next = self.canonicalize_once(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    fn canonicalize_once(&self, raw: &str) -> String {
        let host = raw.trim().to_lowercase();

        let host = if host.starts_with("http://") || host.starts_with("https://") {
            parse_url_host(&host).unwrap_or(host)
        } else {
            host
        };

        let host = host.split(':').next().unwrap_or_default();

        let host = if self.strip_www {
            host.strip_prefix("www.").unwrap_or(host)
        } else {
            host
        };

        host.trim_end_matches('/').to_string()
    }

    /// Pull the host part out of a stored channel hostname.
    ///
    /// Full URLs are parsed; anything else is treated as a host optionally
    /// followed by a path (`example.com/some/path`). Returns `None` when no
    /// host remains. The result still needs [`canonicalize`](Self::canonicalize)
    /// before comparing.
    pub fn extract_host_from_stored(&self, raw: &str) -> Option<String> {
        let stored = raw.trim();

        if has_http_scheme(stored) {
            return parse_url_host(stored);
        }

        let host = stored.split('/').next().unwrap_or_default();
        (!host.is_empty()).then(|| host.to_string())
    }

    /// Canonical form of a stored channel hostname, if it has a host at all
    pub fn canonical_stored_host(&self, raw: &str) -> Option<String> {
        self.extract_host_from_stored(raw)
            .map(|host| self.canonicalize(&host))
    }
}

/// Canonicalize with the default options (`www.` stripped)
pub fn canonicalize(raw: &str) -> String {
    HostCanonicalizer::default().canonicalize(raw)
}

/// Extract the host from a stored hostname with the default options
pub fn extract_host_from_stored(raw: &str) -> Option<String> {
    HostCanonicalizer::default().extract_host_from_stored(raw)
}

fn has_http_scheme(value: &str) -> bool {
    let bytes = value.as_bytes();
    ["http://", "https://"].iter().any(|scheme| {
        bytes
            .get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme.as_bytes()))
    })
}

fn parse_url_host(value: &str) -> Option<String> {
    Url::parse(value)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .filter(|host| !host.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_full_url() {
        assert_eq!(
            canonicalize("HTTPS://WWW.Shop.Example.com:443/"),
            "shop.example.com"
        );
        assert_eq!(canonicalize("http://shop.example.com/catalog"), "shop.example.com");
    }

    #[test]
    fn test_canonicalize_plain_host() {
        assert_eq!(canonicalize("shop.example.com"), "shop.example.com");
        assert_eq!(canonicalize("  Shop.Example.COM  "), "shop.example.com");
        assert_eq!(canonicalize("eu.example.com:8080"), "eu.example.com");
        assert_eq!(canonicalize("www.example.com"), "example.com");
        assert_eq!(canonicalize("example.com/"), "example.com");
    }

    #[test]
    fn test_canonicalize_never_fails() {
        assert_eq!(canonicalize(""), "");
        assert_eq!(canonicalize("   "), "");
        // No host in the URL: the string is kept and the port split applies
        assert_eq!(canonicalize("https://"), "https");
        assert_eq!(canonicalize(":8080"), "");
    }

    #[test]
    fn test_canonicalize_is_idempotent() {
        let inputs = [
            "",
            "HTTPS://WWW.Shop.Example.com:443/",
            "shop.example.com",
            "www.www.example.com",
            "example.com /",
            "www./",
            "https://",
            "http://http://example.com",
            "WWW.Example.com:8080",
            "[::1]:8080",
            "Exämple.COM",
        ];

        for input in inputs {
            let once = canonicalize(input);
            assert_eq!(canonicalize(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_canonicalize_keeps_www_when_disabled() {
        let canonicalizer = HostCanonicalizer::new(false);
        assert_eq!(
            canonicalizer.canonicalize("https://WWW.example.com:443"),
            "www.example.com"
        );
    }

    #[test]
    fn test_extract_host_from_stored() {
        assert_eq!(
            extract_host_from_stored("shop.example.com/catalog").as_deref(),
            Some("shop.example.com")
        );
        assert_eq!(
            extract_host_from_stored("https://shop.example.com/catalog").as_deref(),
            Some("shop.example.com")
        );
        assert_eq!(
            extract_host_from_stored("HTTP://Shop.Example.com").as_deref(),
            Some("shop.example.com")
        );
        assert_eq!(
            extract_host_from_stored("  eu.example.com  ").as_deref(),
            Some("eu.example.com")
        );
    }

    #[test]
    fn test_extract_host_from_stored_empty() {
        assert_eq!(extract_host_from_stored(""), None);
        assert_eq!(extract_host_from_stored("   "), None);
        assert_eq!(extract_host_from_stored("/store"), None);
        assert_eq!(extract_host_from_stored("https://"), None);
    }

    #[test]
    fn test_stored_host_with_port_and_path() {
        let canonicalizer = HostCanonicalizer::default();

        assert_eq!(
            canonicalizer.extract_host_from_stored("WWW.Example.com:8080/shop").as_deref(),
            Some("WWW.Example.com:8080")
        );
        assert_eq!(
            canonicalizer.canonical_stored_host("WWW.Example.com:8080/shop").as_deref(),
            Some("example.com")
        );
        assert_eq!(
            canonicalizer.canonical_stored_host("shop.example.com/catalog").as_deref(),
            Some("shop.example.com")
        );
    }
}
