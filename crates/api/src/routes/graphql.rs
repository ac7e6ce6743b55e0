//! GraphQL endpoint

use axum::{
    extract::State,
    http::{HeaderMap, Uri},
    Extension, Json,
};
use storefront_shared::CurrentChannel;

use crate::{
    graphql::RequestChannelInfo,
    routing::{header_value, request_host},
    state::AppState,
};

/// Execute a GraphQL request against the storefront schema.
///
/// The channel resolved by the channel middleware, when present, is handed
/// to the queries along with the raw header and host.
pub async fn graphql_handler(
    State(state): State<AppState>,
    current_channel: Option<Extension<CurrentChannel>>,
    uri: Uri,
    headers: HeaderMap,
    Json(request): Json<async_graphql::Request>,
) -> Json<async_graphql::Response> {
    let info = RequestChannelInfo {
        explicit_code: header_value(&headers, state.resolver.header_name()),
        host: request_host(&headers, &uri),
    };

    let mut request = request.data(info);
    if let Some(Extension(channel)) = current_channel {
        request = request.data(channel);
    }

    Json(state.schema.execute(request).await)
}
