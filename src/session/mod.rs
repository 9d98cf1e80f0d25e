//! Session tokens and their lifecycle.
//!
//! A session token is the only proof of a prior successful OTP login. Tokens
//! live in process memory ([`TokenStore`]) and travel to the client as a
//! cookie ([`SessionCookie`]). Nothing survives a restart.

pub mod cookie;
pub mod store;

pub use cookie::SessionCookie;
pub use store::TokenStore;

use anyhow::{Context, Result};
use rand::{rngs::OsRng, RngCore};
use std::{borrow::Borrow, fmt};

/// Number of random bytes behind a session token.
pub const TOKEN_BYTES: usize = 32;

/// Length of the hex rendering of a session token.
pub const TOKEN_HEX_LEN: usize = TOKEN_BYTES * 2;

/// Opaque server-issued session identifier, 64 lowercase hex characters.
///
/// Not to be confused with [`crate::totp::SubmittedCode`], the OTP code posted
/// by the login form.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    /// Draw a fresh token from the operating system CSPRNG.
    ///
    /// # Errors
    /// Returns an error if the OS random source is unavailable.
    pub fn generate() -> Result<Self> {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .context("failed to generate session token")?;
        Ok(Self(hex::encode(bytes)))
    }

    /// Accept a client-supplied value only if it has the shape of a token.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let well_formed = value.len() == TOKEN_HEX_LEN
            && value
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        well_formed.then(|| Self(value.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for SessionToken {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Keep raw tokens out of debug logs.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionToken").field(&"***").finish()
    }
}
