//! API routes

pub mod graphql;
pub mod health;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{
    middleware::{
        channel_middleware, response_cache_middleware, response_headers_middleware,
        MiddlewareKind,
    },
    pipeline::Pipeline,
    state::AppState,
};

/// Create all routes
pub fn create_router(state: AppState, pipeline: &Pipeline) -> Router {
    // Health check routes (at root level for infrastructure monitoring)
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    let mut router = Router::new().merge(health_routes);

    // GraphQL endpoint - only when the channel queries are registered
    if pipeline.has_channel_queries() {
        router = router.merge(graphql_routes(&state, pipeline));
    }

    router
        .layer(middleware::from_fn_with_state(
            state.clone(),
            response_headers_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GraphQL route wrapped in the composed middleware, first entry outermost
fn graphql_routes(state: &AppState, pipeline: &Pipeline) -> Router<AppState> {
    let mut routes = Router::new().route(
        &state.config.graphql_path,
        post(graphql::graphql_handler),
    );

    for entry in pipeline.middleware.iter().rev() {
        routes = match MiddlewareKind::from_identifier(entry) {
            Some(MiddlewareKind::Channel) => routes.layer(middleware::from_fn_with_state(
                state.clone(),
                channel_middleware,
            )),
            Some(MiddlewareKind::ResponseCache) => routes.layer(
                middleware::from_fn_with_state(state.clone(), response_cache_middleware),
            ),
            None => {
                tracing::warn!(middleware = %entry, "No implementation for pipeline entry, skipping");
                routes
            }
        };
    }

    routes
}
