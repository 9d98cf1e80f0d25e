pub mod check;
pub use self::check::check;

pub mod login;
pub use self::login::{login, login_form};

pub mod logout;
pub use self::logout::logout;

// common functions for the handlers
use axum::{
    http::{header::LOCATION, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::error;

const UNKNOWN_CLIENT: &str = "unknown";

// axum handler for every unmatched path or method
pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Client address as reported by the fronting proxy.
pub(crate) fn client_address(headers: &HeaderMap) -> String {
    let real_ip = headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if let Some(ip) = real_ip {
        return ip.to_string();
    }
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map_or_else(|| UNKNOWN_CLIENT.to_string(), str::to_string)
}

/// Plain `302 Found`; axum's `Redirect` only offers 303/307/308.
pub(crate) fn found(location: &str, set_cookie: Option<HeaderValue>) -> Response {
    let Ok(location) = HeaderValue::from_str(location) else {
        error!("Invalid redirect location: {location}");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };
    let mut headers = HeaderMap::new();
    headers.insert(LOCATION, location);
    if let Some(cookie) = set_cookie {
        headers.insert(axum::http::header::SET_COOKIE, cookie);
    }
    (StatusCode::FOUND, headers).into_response()
}
