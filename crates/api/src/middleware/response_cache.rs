//! Channel-aware GraphQL response cache middleware
//!
//! Cached responses are keyed by the request channel code and a digest of
//! the request body. When the cache is composed ahead of the channel
//! middleware it resolves the channel itself, so keys never depend on
//! pipeline position.

use async_graphql::parser::{parse_query, types::OperationType};
use axum::{
    body::{to_bytes, Body, Bytes},
    extract::State,
    http::{header, HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use storefront_shared::CurrentChannel;

use crate::{
    cache::cache_key,
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Response header reporting whether the cache served the response
pub const CACHE_STATUS_HEADER: &str = "x-graphql-cache";

/// Largest request body considered for caching
const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;
/// Largest response body buffered for caching
const MAX_RESPONSE_BODY_BYTES: usize = 8 * 1024 * 1024;

#[derive(Deserialize)]
struct GraphQLBody {
    query: Option<String>,
}

#[derive(Deserialize)]
struct GraphQLResult {
    #[serde(default)]
    errors: Option<serde_json::Value>,
}

pub async fn response_cache_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> ApiResult<Response> {
    if !state.config.cache.enabled
        || request.method() != Method::POST
        || request.headers().contains_key(header::AUTHORIZATION)
    {
        return Ok(next.run(request).await);
    }

    let channel_code = match request.extensions().get::<CurrentChannel>() {
        Some(channel) => Some(channel.code().to_string()),
        // Composed ahead of channel resolution, key on the channel anyway
        None => state
            .resolver
            .resolve_request(&mut request)
            .await?
            .map(|resolved| resolved.channel.code),
    };

    let (parts, body) = request.into_parts();
    let body = to_bytes(body, MAX_REQUEST_BODY_BYTES)
        .await
        .map_err(|_| ApiError::PayloadTooLarge)?;

    if !is_cacheable_operation(&body) {
        return Ok(next.run(Request::from_parts(parts, Body::from(body))).await);
    }

    let key = cache_key(channel_code.as_deref(), &body);

    match state.response_store.get(&key).await {
        Ok(Some(cached)) => {
            tracing::debug!(key = %key, "GraphQL response cache hit");
            return Ok(cached_response(cached));
        }
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "GraphQL response cache lookup failed"),
    }

    let response = next.run(Request::from_parts(parts, Body::from(body))).await;
    if response.status() != StatusCode::OK {
        return Ok(response);
    }

    let (mut parts, body) = response.into_parts();
    let body = to_bytes(body, MAX_RESPONSE_BODY_BYTES).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to buffer GraphQL response");
        ApiError::Internal
    })?;

    // Field errors come back with a 200; only clean results are cached
    if is_clean_result(&body) {
        if let Err(e) = state
            .response_store
            .put(&key, body.to_vec(), state.config.cache.ttl)
            .await
        {
            tracing::warn!(error = %e, "Failed to store GraphQL response");
        }
    }

    parts
        .headers
        .insert(CACHE_STATUS_HEADER, HeaderValue::from_static("MISS"));
    Ok(Response::from_parts(parts, Body::from(body)))
}

/// Only documents made of query operations are cached. Mutations,
/// subscriptions, batches and unparseable bodies are passed through.
fn is_cacheable_operation(body: &Bytes) -> bool {
    let Ok(GraphQLBody { query: Some(query) }) = serde_json::from_slice::<GraphQLBody>(body) else {
        return false;
    };
    let Ok(document) = parse_query(&query) else {
        return false;
    };

    document
        .operations
        .iter()
        .all(|(_, operation)| operation.node.ty == OperationType::Query)
}

fn is_clean_result(body: &Bytes) -> bool {
    serde_json::from_slice::<GraphQLResult>(body)
        .map(|result| result.errors.is_none())
        .unwrap_or(false)
}

fn cached_response(body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/json")),
            (
                header::HeaderName::from_static(CACHE_STATUS_HEADER),
                HeaderValue::from_static("HIT"),
            ),
        ],
        body,
    )
        .into_response()
}
