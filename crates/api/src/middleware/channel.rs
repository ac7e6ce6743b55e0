//! Channel resolution middleware
//!
//! Resolves the storefront channel once per request and stores it in the
//! request extensions as [`CurrentChannel`].
//! Requests that match no channel continue unscoped.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use storefront_shared::CurrentChannel;

use crate::{error::ApiResult, routing::ChannelRequest, state::AppState};

pub async fn channel_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> ApiResult<Response> {
    // Already resolved by a response cache composed ahead of this stage
    if request.extensions().get::<CurrentChannel>().is_some() {
        return Ok(next.run(request).await);
    }

    match state.resolver.resolve_request(&mut request).await? {
        Some(resolved) => tracing::debug!(
            channel = %resolved.channel.code,
            resolution = ?resolved.resolution_type,
            "Resolved request channel"
        ),
        None => tracing::debug!(host = %request.host(), "No channel matched request"),
    }

    Ok(next.run(request).await)
}
