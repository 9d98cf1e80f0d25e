//! Time-based one-time password verification against the shared secret.

pub mod secret;
pub mod verifier;

pub use secret::{load_secret, SecretError};
pub use verifier::OtpVerifier;

use std::fmt;

/// Name of the login form field that carries the OTP code.
///
/// Independent of the session cookie name, even though both default to
/// "token"-like names on the wire.
pub const CODE_FIELD: &str = "token";

/// OTP code as posted by the login form. Never a session token.
#[derive(Clone, PartialEq, Eq)]
pub struct SubmittedCode(String);

impl SubmittedCode {
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SubmittedCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SubmittedCode").field(&"***").finish()
    }
}
