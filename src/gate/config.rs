//! Gateway configuration, fixed at startup.

use anyhow::{bail, Result};
use std::time::Duration;

use crate::{
    session::{cookie, store::DEFAULT_TOKEN_LIFETIME},
    totp::verifier::DEFAULT_WINDOW,
};

pub const DEFAULT_LOCATION: &str = "/auth";
pub const DEFAULT_TITLE: &str = "Website TOTP Auth";

#[derive(Clone, Debug)]
pub struct GateConfig {
    location: String,
    cookie_name: String,
    secure_cookie: bool,
    token_lifetime: Duration,
    totp_window: u8,
    title: String,
    style: String,
    sweep_interval: Option<Duration>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self::new(DEFAULT_LOCATION)
    }
}

impl GateConfig {
    /// Start from defaults, mounting the endpoints under `location`.
    #[must_use]
    pub fn new(location: &str) -> Self {
        Self {
            location: normalize_location(location),
            cookie_name: cookie::DEFAULT_COOKIE_NAME.to_string(),
            secure_cookie: true,
            token_lifetime: DEFAULT_TOKEN_LIFETIME,
            totp_window: DEFAULT_WINDOW,
            title: DEFAULT_TITLE.to_string(),
            style: String::new(),
            sweep_interval: None,
        }
    }

    #[must_use]
    pub fn with_cookie_name(mut self, name: String) -> Self {
        self.cookie_name = name;
        self
    }

    #[must_use]
    pub fn with_secure_cookie(mut self, secure: bool) -> Self {
        self.secure_cookie = secure;
        self
    }

    #[must_use]
    pub fn with_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.token_lifetime = lifetime;
        self
    }

    #[must_use]
    pub fn with_totp_window(mut self, window: u8) -> Self {
        self.totp_window = window;
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: String) -> Self {
        self.title = title;
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: String) -> Self {
        self.style = style;
        self
    }

    /// A zero interval disables the sweeper.
    #[must_use]
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = (!interval.is_zero()).then_some(interval);
        self
    }

    /// Reject settings the router or cookie codec cannot honor.
    ///
    /// # Errors
    /// Returns an error describing the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        if self
            .location
            .chars()
            .any(|c| matches!(c, ':' | '*' | '{' | '}' | '?' | '#') || c.is_whitespace())
        {
            bail!("invalid location: {}", self.location);
        }
        if !cookie::valid_cookie_name(&self.cookie_name) {
            bail!("invalid cookie name: {:?}", self.cookie_name);
        }
        if self.token_lifetime.is_zero() {
            bail!("token lifetime must be greater than zero");
        }
        Ok(())
    }

    /// Base path, normalized: leading `/`, no trailing `/`, empty for the root.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    #[must_use]
    pub fn check_path(&self) -> String {
        format!("{}/check", self.location)
    }

    #[must_use]
    pub fn login_path(&self) -> String {
        format!("{}/login", self.location)
    }

    #[must_use]
    pub fn logout_path(&self) -> String {
        format!("{}/logout", self.location)
    }

    #[must_use]
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    #[must_use]
    pub fn secure_cookie(&self) -> bool {
        self.secure_cookie
    }

    #[must_use]
    pub fn token_lifetime(&self) -> Duration {
        self.token_lifetime
    }

    #[must_use]
    pub fn totp_window(&self) -> u8 {
        self.totp_window
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn style(&self) -> &str {
        &self.style
    }

    #[must_use]
    pub fn sweep_interval(&self) -> Option<Duration> {
        self.sweep_interval
    }
}

fn normalize_location(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
