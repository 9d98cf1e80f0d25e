//! Login form and OTP submission.
//!
//! Flow Overview:
//! 1) Claim the global rate-limit slot; a busy slot answers `429` before the
//!    body is even read.
//! 2) Pull the OTP code out of a urlencoded or multipart body. Anything
//!    unreadable counts as "no code".
//! 3) A valid code mints a session token and sets the cookie; anything else
//!    bounces back to the login page without detail.

use axum::{
    extract::{Extension, FromRequest, Multipart, Request},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use super::{client_address, found};
use crate::{
    gate::GateState,
    rate_limit::RateLimitDecision,
    totp::{SubmittedCode, CODE_FIELD},
};

pub const THROTTLED_MESSAGE: &str = "Slow down. Hold your horses";

#[derive(Deserialize, Debug)]
struct LoginForm {
    token: Option<String>,
}

// axum handler for GET {location}/login
pub async fn login_form(Extension(state): Extension<Arc<GateState>>) -> Html<String> {
    Html(state.login_page().to_string())
}

// axum handler for POST {location}/login
#[instrument(skip_all)]
pub async fn login(
    Extension(state): Extension<Arc<GateState>>,
    headers: HeaderMap,
    request: Request,
) -> Response {
    let client = client_address(&headers);
    debug!(client = %client, "Auth attempt");

    if state.rate_limiter().try_acquire() == RateLimitDecision::Limited {
        warn!(client = %client, "Excessive login attempts");
        return (StatusCode::TOO_MANY_REQUESTS, THROTTLED_MESSAGE).into_response();
    }

    let verified = submitted_code(request)
        .await
        .is_some_and(|code| state.verifier().verify(&code));

    if !verified {
        warn!(client = %client, "Failed auth");
        return found(&state.config().login_path(), None);
    }

    let token = match state.tokens().generate().await {
        Ok(token) => token,
        Err(err) => {
            error!("Failed to issue session token: {err:#}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match state.cookie().issue(&token) {
        Ok(cookie) => {
            info!(client = %client, "Successful auth");
            found("/", Some(cookie))
        }
        Err(err) => {
            state.tokens().invalidate(token.as_str()).await;
            error!("Failed to build session cookie: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Extract the OTP code from the form body, if there is a readable one.
async fn submitted_code(request: Request) -> Option<SubmittedCode> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_ascii_lowercase)?;

    if content_type.starts_with("multipart/form-data") {
        let mut multipart = Multipart::from_request(request, &()).await.ok()?;
        while let Ok(Some(field)) = multipart.next_field().await {
            if field.name() == Some(CODE_FIELD) {
                return field.text().await.ok().map(|text| SubmittedCode::new(&text));
            }
        }
        None
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(form) = Form::<LoginForm>::from_request(request, &()).await.ok()?;
        form.token.map(|text| SubmittedCode::new(&text))
    } else {
        None
    }
}
