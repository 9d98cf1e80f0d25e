use crate::{
    gate::{self, GateConfig, GateState},
    rate_limit::GlobalRateLimiter,
    totp::{load_secret, OtpVerifier},
};
use anyhow::{Context, Result};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};
use tracing::{debug, info};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub secret_file: PathBuf,
    pub totp_window: u8,
    pub token_lifetime: Duration,
    pub location: String,
    pub cookie_name: String,
    pub secure_cookie: bool,
    pub title: String,
    pub style: String,
    pub sweep_interval: Duration,
    pub log_file: Option<PathBuf>,
}

/// Where log lines end up, as shown in the startup event.
fn log_target(log_file: Option<&Path>) -> String {
    log_file.map_or_else(|| "stdout".to_string(), |path| path.display().to_string())
}

/// Execute the server action.
/// # Errors
/// Returns an error if the secret cannot be loaded, the configuration is
/// invalid, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let secret = load_secret(&args.secret_file)
        .with_context(|| format!("Failed to load TOTP secret from {}", args.secret_file.display()))?;

    debug!(path = %args.secret_file.display(), "TOTP secret loaded");

    let config = GateConfig::new(&args.location)
        .with_cookie_name(args.cookie_name)
        .with_secure_cookie(args.secure_cookie)
        .with_token_lifetime(args.token_lifetime)
        .with_totp_window(args.totp_window)
        .with_title(args.title)
        .with_style(args.style)
        .with_sweep_interval(args.sweep_interval);

    config.validate()?;

    let verifier = OtpVerifier::new(&secret, config.totp_window())?;

    info!(
        window = config.totp_window(),
        lifetime_secs = config.token_lifetime().as_secs(),
        secure_cookie = config.secure_cookie(),
        "Gateway configured"
    );

    let state = GateState::new(config, verifier, Arc::new(GlobalRateLimiter::default()));

    let log_target = log_target(args.log_file.as_deref());

    gate::new(args.port, Arc::new(state), &log_target).await
}
