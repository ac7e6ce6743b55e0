//! Response headers applied to every route
//!
//! GraphQL responses differ per channel, so shared caches in front of the
//! server are told to vary on the channel header and the host.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, Response},
    middleware::Next,
};

use crate::state::AppState;

pub async fn response_headers_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response<Body> {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    let vary = format!("{}, host", state.resolver.header_name());
    match HeaderValue::from_str(&vary) {
        Ok(value) => {
            headers.append(header::VARY, value);
        }
        Err(_) => tracing::warn!(header = %vary, "Invalid channel header name for Vary"),
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use axum::{routing::get, Router};
    use tower::ServiceExt;

    async fn test_handler() -> &'static str {
        "ok"
    }

    #[tokio::test]
    async fn test_response_headers_are_added() {
        let state = AppState::for_tests(Vec::new());
        let app = Router::new()
            .route("/", get(test_handler))
            .layer(axum::middleware::from_fn_with_state(
                state.clone(),
                response_headers_middleware,
            ))
            .with_state(state);

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.headers().get("X-Frame-Options").unwrap(), "DENY");
        assert_eq!(
            response.headers().get("X-Content-Type-Options").unwrap(),
            "nosniff"
        );
        assert_eq!(response.headers().get("Vary").unwrap(), "x-channel, host");
    }
}
