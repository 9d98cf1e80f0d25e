//! # totpgate (TOTP authentication gateway)
//!
//! `totpgate` answers reverse-proxy subrequests (`auth_request` in nginx) with
//! "authenticated" or "not authenticated". Callers prove themselves once with
//! a time-based one-time password and receive a session cookie; the protected
//! application never sees credentials.
//!
//! ## Sessions
//!
//! Session tokens are 256 random bits kept in memory with their issuance
//! instant. They expire after a configured lifetime, on logout, or when the
//! process restarts. There is one shared OTP secret and no user model: a
//! caller either holds a valid session or does not.
//!
//! ## Abuse resistance
//!
//! Login submissions are throttled process-wide to one accepted attempt per
//! second, regardless of the caller.

pub mod cli;
pub mod gate;
pub mod rate_limit;
pub mod session;
pub mod totp;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
