//! HTTP surface of the gateway.
//!
//! Three endpoints live under the configured location:
//! - `GET check`: `200` with a live session cookie, `401` otherwise.
//! - `GET login` / `POST login`: the OTP form and its submission.
//! - `GET logout`: drop the session and overwrite the cookie.
//!
//! Everything else, including other methods on those paths, is a bare `404`.

pub mod config;
pub mod form;
pub mod handlers;
pub mod state;

pub use config::GateConfig;
pub use state::GateState;

use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    routing::get,
    Extension, Router,
};
use std::{sync::Arc, time::Duration};
use tokio::{net::TcpListener, task::JoinHandle, time::sleep};
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{debug, error, info, info_span, Span};
use ulid::Ulid;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the gateway router around `state`.
#[must_use]
pub fn router(state: Arc<GateState>) -> Router {
    let check_path = state.config().check_path();
    let login_path = state.config().login_path();
    let logout_path = state.config().logout_path();

    Router::new()
        .route(
            &check_path,
            get(handlers::check).fallback(handlers::not_found),
        )
        .route(
            &login_path,
            get(handlers::login_form)
                .post(handlers::login)
                .fallback(handlers::not_found),
        )
        .route(
            &logout_path,
            get(handlers::logout).fallback(handlers::not_found),
        )
        .fallback(handlers::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static(REQUEST_ID_HEADER),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    REQUEST_ID_HEADER,
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(state)),
        )
}

/// Start the server. `log_target` names where logs go, for the startup line.
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, state: Arc<GateState>, log_target: &str) -> Result<()> {
    let sweeper = state
        .config()
        .sweep_interval()
        .map(|every| spawn_sweeper(state.clone(), every));

    let location = state.config().location().to_string();
    let app = router(state);

    let listener = TcpListener::bind(format!("::0:{port}"))
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;

    info!(location = %location, log_target, "Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = sweeper {
        handle.abort();
    }

    info!("Gracefully shutdown");

    Ok(())
}

/// Periodically drop sessions that can no longer validate.
pub fn spawn_sweeper(state: Arc<GateState>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            sleep(every).await;

            let removed = state.tokens().sweep_expired().await;
            if removed > 0 {
                debug!(removed, "Swept expired sessions");
            }
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!("Failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{rate_limit::NoopRateLimiter, totp::OtpVerifier};
    use axum::http::StatusCode;
    use secrecy::SecretString;
    use tower::ServiceExt;

    fn state(config: GateConfig) -> Arc<GateState> {
        let verifier = OtpVerifier::new(&SecretString::from("JBSWY3DPEHPK3PXP"), 1).unwrap();
        Arc::new(GateState::new(config, verifier, Arc::new(NoopRateLimiter)))
    }

    #[tokio::test]
    async fn unknown_paths_are_404() {
        let app = router(state(GateConfig::default()));
        let response = app
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn wrong_method_on_known_path_is_404() {
        let app = router(state(GateConfig::default()));
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/auth/check")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn responses_carry_a_request_id() {
        let app = router(state(GateConfig::default()));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/auth/check")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.headers().get(REQUEST_ID_HEADER).is_some());
    }

    #[tokio::test]
    async fn incoming_request_id_is_propagated() {
        let app = router(state(GateConfig::default()));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/auth/login")
                    .header(REQUEST_ID_HEADER, "req-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.headers().get(REQUEST_ID_HEADER).unwrap(),
            "req-123"
        );
    }

    #[tokio::test]
    async fn root_location_mounts_at_top_level() {
        let app = router(state(GateConfig::new("/")));
        let response = app
            .oneshot(Request::builder().uri("/check").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_drops_expired_sessions() {
        let state = state(GateConfig::default().with_token_lifetime(Duration::from_secs(10)));
        state.tokens().generate().await.unwrap();

        let handle = spawn_sweeper(state.clone(), Duration::from_secs(1));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(state.tokens().len().await, 1);

        let fresh = state.tokens().generate().await.unwrap();
        tokio::time::sleep(Duration::from_secs(7)).await;

        assert_eq!(state.tokens().len().await, 1);
        assert!(state.tokens().is_valid(fresh.as_str()).await);
        handle.abort();
    }
}
