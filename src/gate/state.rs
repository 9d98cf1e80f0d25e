//! Shared state handed to every request handler.

use std::sync::Arc;

use super::{config::GateConfig, form::render_login_page};
use crate::{
    rate_limit::RateLimiter,
    session::{SessionCookie, TokenStore},
    totp::OtpVerifier,
};

pub struct GateState {
    config: GateConfig,
    tokens: TokenStore,
    verifier: OtpVerifier,
    rate_limiter: Arc<dyn RateLimiter>,
    cookie: SessionCookie,
    login_page: String,
}

impl GateState {
    pub fn new(
        config: GateConfig,
        verifier: OtpVerifier,
        rate_limiter: Arc<dyn RateLimiter>,
    ) -> Self {
        let tokens = TokenStore::new(config.token_lifetime());
        let cookie = SessionCookie::new(config.cookie_name().to_string(), config.secure_cookie());
        let login_page = render_login_page(config.title(), config.style(), &config.login_path());
        Self {
            config,
            tokens,
            verifier,
            rate_limiter,
            cookie,
            login_page,
        }
    }

    #[must_use]
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    #[must_use]
    pub fn verifier(&self) -> &OtpVerifier {
        &self.verifier
    }

    pub(crate) fn rate_limiter(&self) -> &dyn RateLimiter {
        self.rate_limiter.as_ref()
    }

    #[must_use]
    pub fn cookie(&self) -> &SessionCookie {
        &self.cookie
    }

    #[must_use]
    pub fn login_page(&self) -> &str {
        &self.login_page
    }
}
