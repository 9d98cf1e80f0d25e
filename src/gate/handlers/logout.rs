use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, error, instrument};

use super::{client_address, found};
use crate::gate::GateState;

// axum handler for GET {location}/logout
#[instrument(skip_all)]
pub async fn logout(headers: HeaderMap, Extension(state): Extension<Arc<GateState>>) -> Response {
    if let Some(token) = state.cookie().extract(&headers) {
        state.tokens().invalidate(token.as_str()).await;
        debug!(client = %client_address(&headers), "Session invalidated");
    }

    // Always overwrite the cookie, even if no session was presented.
    match state.cookie().clear() {
        Ok(cookie) => found("/", Some(cookie)),
        Err(err) => {
            error!("Failed to build logout cookie: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
