use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
};
use std::sync::Arc;
use tracing::instrument;

use crate::gate::GateState;

/// Subrequest probe used by the reverse proxy.
///
/// `200` when the request carries a live session cookie, `401` otherwise.
/// Never mutates state.
#[instrument(skip_all)]
pub async fn check(headers: HeaderMap, Extension(state): Extension<Arc<GateState>>) -> StatusCode {
    // Missing or malformed cookies are simply "not authenticated".
    let Some(token) = state.cookie().extract(&headers) else {
        return StatusCode::UNAUTHORIZED;
    };

    if state.tokens().is_valid(token.as_str()).await {
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    }
}
