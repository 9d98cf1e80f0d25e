//! Wire representation of session tokens.

use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};

use super::SessionToken;

pub const DEFAULT_COOKIE_NAME: &str = "totp_token";

/// Value written on logout so the client drops whatever token it held.
pub const LOGOUT_PLACEHOLDER: &str = "***";

#[derive(Clone, Debug)]
pub struct SessionCookie {
    name: String,
    secure: bool,
}

impl Default for SessionCookie {
    fn default() -> Self {
        Self::new(DEFAULT_COOKIE_NAME.to_string(), true)
    }
}

impl SessionCookie {
    #[must_use]
    pub fn new(name: String, secure: bool) -> Self {
        Self { name, secure }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn secure(&self) -> bool {
        self.secure
    }

    /// `Set-Cookie` value carrying a freshly issued token.
    ///
    /// No `Expires`/`Max-Age`: lifetime is enforced server-side only.
    ///
    /// # Errors
    /// Returns an error if the configured name yields an invalid header value.
    pub fn issue(&self, token: &SessionToken) -> Result<HeaderValue, InvalidHeaderValue> {
        self.build(token.as_str())
    }

    /// `Set-Cookie` value that overwrites the session cookie with a placeholder.
    ///
    /// # Errors
    /// Returns an error if the configured name yields an invalid header value.
    pub fn clear(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        self.build(LOGOUT_PLACEHOLDER)
    }

    fn build(&self, value: &str) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut cookie = format!("{}={value}; Path=/", self.name);
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
    }

    /// Find the session token among the request cookies.
    ///
    /// When the name repeats, the last occurrence wins, even if malformed.
    /// Missing, unreadable or malformed cookies all resolve to `None`.
    #[must_use]
    pub fn extract(&self, headers: &HeaderMap) -> Option<SessionToken> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|header| header.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| {
                let (key, val) = pair.split_once('=')?;
                (key.trim() == self.name).then(|| unquote(val.trim()))
            })
            .last()
            .and_then(SessionToken::parse)
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Whether `name` can be used as a cookie name (RFC 6265 token).
#[must_use]
pub fn valid_cookie_name(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_graphic()
                && !matches!(
                    b,
                    b'(' | b')'
                        | b'<'
                        | b'>'
                        | b'@'
                        | b','
                        | b';'
                        | b':'
                        | b'\\'
                        | b'"'
                        | b'/'
                        | b'['
                        | b']'
                        | b'?'
                        | b'='
                        | b'{'
                        | b'}'
                )
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn token() -> SessionToken {
        SessionToken::parse(&"ab".repeat(32)).unwrap()
    }

    fn headers(cookies: &[&str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for cookie in cookies {
            headers.append(COOKIE, HeaderValue::from_str(cookie).unwrap());
        }
        headers
    }

    #[test]
    fn issue_sets_path_and_secure_flag() {
        let codec = SessionCookie::new("totp_token".to_string(), true);
        let value = codec.issue(&token()).unwrap();
        assert_eq!(
            value.to_str().unwrap(),
            format!("totp_token={}; Path=/; Secure", "ab".repeat(32))
        );
    }

    #[test]
    fn issue_without_secure_flag() {
        let codec = SessionCookie::new("sid".to_string(), false);
        let value = codec.issue(&token()).unwrap();
        let rendered = value.to_str().unwrap();
        assert!(rendered.starts_with("sid="));
        assert!(!rendered.contains("Secure"));
        assert!(!rendered.contains("Max-Age"));
        assert!(!rendered.contains("Expires"));
    }

    #[test]
    fn clear_writes_placeholder() {
        let codec = SessionCookie::default();
        let value = codec.clear().unwrap();
        assert_eq!(value.to_str().unwrap(), "totp_token=***; Path=/; Secure");
    }

    #[test]
    fn extract_finds_named_cookie_among_others() {
        let codec = SessionCookie::default();
        let raw = format!("theme=dark; totp_token={}; lang=en", "ab".repeat(32));
        let extracted = codec.extract(&headers(&[&raw]));
        assert_eq!(extracted, Some(token()));
    }

    #[test]
    fn extract_reads_every_cookie_header() {
        let codec = SessionCookie::default();
        let raw = format!("totp_token={}", "ab".repeat(32));
        let extracted = codec.extract(&headers(&["theme=dark", &raw]));
        assert_eq!(extracted, Some(token()));
    }

    #[test]
    fn extract_accepts_quoted_values() {
        let codec = SessionCookie::default();
        let raw = format!("totp_token=\"{}\"", "ab".repeat(32));
        assert_eq!(codec.extract(&headers(&[&raw])), Some(token()));
    }

    #[test]
    fn extract_ignores_absent_and_malformed() {
        let codec = SessionCookie::default();
        assert!(codec.extract(&HeaderMap::new()).is_none());
        assert!(codec.extract(&headers(&["other=1"])).is_none());
        assert!(codec.extract(&headers(&["totp_token=***"])).is_none());
        assert!(codec.extract(&headers(&["totp_token"])).is_none());
        assert!(codec.extract(&headers(&[";;=;"])).is_none());
    }

    #[test]
    fn extract_prefers_last_repeated_cookie() {
        let codec = SessionCookie::default();
        let first = format!("totp_token={}", "cd".repeat(32));
        let last = format!("totp_token={}", "ab".repeat(32));

        let raw = format!("{first}; {last}");
        assert_eq!(codec.extract(&headers(&[&raw])), Some(token()));
        assert_eq!(codec.extract(&headers(&[&first, &last])), Some(token()));

        // A malformed trailing value shadows an earlier good one.
        let shadowed = format!("{last}; totp_token=***");
        assert!(codec.extract(&headers(&[&shadowed])).is_none());
    }

    #[test]
    fn extract_does_not_match_name_prefixes() {
        let codec = SessionCookie::new("token".to_string(), true);
        let raw = format!("totp_token={}", "ab".repeat(32));
        assert!(codec.extract(&headers(&[&raw])).is_none());
    }

    #[test]
    fn cookie_name_validation() {
        assert!(valid_cookie_name("totp_token"));
        assert!(valid_cookie_name("__Host-session"));
        assert!(!valid_cookie_name(""));
        assert!(!valid_cookie_name("has space"));
        assert!(!valid_cookie_name("semi;colon"));
        assert!(!valid_cookie_name("eq=uals"));
    }
}
