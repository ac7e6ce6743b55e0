//! Narrow view of an inbound request used during channel resolution

use axum::http::{header::HOST, HeaderMap, Request, Uri};
use storefront_shared::{Channel, CurrentChannel};

/// What channel resolution needs from a request, and nothing more
pub trait ChannelRequest {
    /// Value of the header `name`, if present and valid UTF-8
    fn header(&self, name: &str) -> Option<String>;

    /// Target host as sent by the client, possibly with a port.
    /// Empty when the request carries no host at all.
    fn host(&self) -> String;

    /// Attach the resolved channel for downstream stages
    fn set_context_value(&mut self, channel: Channel);
}

impl<B> ChannelRequest for Request<B> {
    fn header(&self, name: &str) -> Option<String> {
        header_value(self.headers(), name)
    }

    fn host(&self) -> String {
        request_host(self.headers(), self.uri())
    }

    fn set_context_value(&mut self, channel: Channel) {
        self.extensions_mut().insert(CurrentChannel(channel));
    }
}

/// Value of the header `name`, if present and valid UTF-8
pub fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// `Host` header, else the URI authority (HTTP/2 requests carry no `Host`)
pub fn request_host(headers: &HeaderMap, uri: &Uri) -> String {
    headers
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .or_else(|| uri.authority().map(|authority| authority.as_str()))
        .unwrap_or_default()
        .to_string()
}
