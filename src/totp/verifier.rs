use anyhow::{anyhow, Result};
use secrecy::SecretString;
use std::time::{SystemTime, UNIX_EPOCH};
use totp_rs::{Algorithm, TOTP};

use super::{secret, SubmittedCode};

pub const DIGITS: usize = 6;
pub const STEP_SECONDS: u64 = 30;
pub const DEFAULT_WINDOW: u8 = 1;

/// RFC 6238 verifier (HMAC-SHA1, 30 second steps, 6 digits) bound to the
/// shared secret.
///
/// `window` is the number of adjacent steps accepted on each side of the
/// current one; `0` means the current step only.
pub struct OtpVerifier {
    totp: TOTP,
    window: u8,
}

impl std::fmt::Debug for OtpVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OtpVerifier")
            .field("secret", &"***")
            .field("window", &self.window)
            .finish()
    }
}

impl OtpVerifier {
    /// # Errors
    /// Returns an error if the secret is not valid base32.
    pub fn new(secret: &SecretString, window: u8) -> Result<Self> {
        let key = secret::decode(secret)?;
        // Seeds shorter than 128 bits are still common in the wild; accept them.
        let totp = TOTP::new_unchecked(Algorithm::SHA1, DIGITS, window, STEP_SECONDS, key);
        Ok(Self { totp, window })
    }

    #[must_use]
    pub fn window(&self) -> u8 {
        self.window
    }

    /// Check a code against the current wall clock.
    #[must_use]
    pub fn verify(&self, code: &SubmittedCode) -> bool {
        match unix_now() {
            Ok(now) => self.verify_at(code, now),
            Err(_) => false,
        }
    }

    /// Check a code as if the clock read `unix_seconds`.
    #[must_use]
    pub fn verify_at(&self, code: &SubmittedCode, unix_seconds: u64) -> bool {
        let code = code.as_str();
        if code.len() != DIGITS || !code.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        // Windows reaching before the epoch are clamped to step zero.
        let floor = u64::from(self.window) * STEP_SECONDS;
        self.totp.check(code, unix_seconds.max(floor))
    }

    /// The code for the step containing `unix_seconds`.
    #[must_use]
    pub fn code_at(&self, unix_seconds: u64) -> String {
        self.totp.generate(unix_seconds)
    }
}

fn unix_now() -> Result<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .map_err(|e| anyhow!("system clock before unix epoch: {e}"))
}
