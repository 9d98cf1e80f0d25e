//! In-memory session registry.
//!
//! Flow Overview:
//! 1) A successful OTP login calls [`TokenStore::generate`], which records the
//!    issuance instant under a fresh token.
//! 2) `check` requests call [`TokenStore::is_valid`], a pure lookup: expired
//!    entries stay in the map and simply report `false`.
//! 3) Logout calls [`TokenStore::invalidate`]; the optional sweeper calls
//!    [`TokenStore::sweep_expired`] to reclaim memory.
//!
//! Every operation takes the same lock, so concurrent requests never observe a
//! half-applied change.

use anyhow::Result;
use std::{collections::HashMap, time::Duration};
use tokio::{sync::Mutex, time::Instant};

use super::SessionToken;

/// Default session lifetime (24 hours).
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug)]
pub struct TokenStore {
    lifetime: Duration,
    tokens: Mutex<HashMap<SessionToken, Instant>>,
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_LIFETIME)
    }
}

impl TokenStore {
    #[must_use]
    pub fn new(lifetime: Duration) -> Self {
        Self {
            lifetime,
            tokens: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issue a new session token valid from now.
    ///
    /// # Errors
    /// Returns an error if the OS random source fails.
    pub async fn generate(&self) -> Result<SessionToken> {
        self.generate_at(Instant::now()).await
    }

    /// Issue a new session token as if issued at `issued_at`.
    ///
    /// # Errors
    /// Returns an error if the OS random source fails.
    pub async fn generate_at(&self, issued_at: Instant) -> Result<SessionToken> {
        let mut tokens = self.tokens.lock().await;
        loop {
            let token = SessionToken::generate()?;
            if !tokens.contains_key(&token) {
                tokens.insert(token.clone(), issued_at);
                return Ok(token);
            }
        }
    }

    pub async fn is_valid(&self, token: &str) -> bool {
        self.is_valid_at(token, Instant::now()).await
    }

    /// Validity as seen at `now`. Unknown tokens are never valid.
    pub async fn is_valid_at(&self, token: &str, now: Instant) -> bool {
        let tokens = self.tokens.lock().await;
        tokens
            .get(token)
            .is_some_and(|issued_at| now.saturating_duration_since(*issued_at) < self.lifetime)
    }

    /// Forget a token. Unknown tokens are ignored.
    pub async fn invalidate(&self, token: &str) {
        self.tokens.lock().await.remove(token);
    }

    /// Drop every entry that can no longer validate and return how many went.
    pub async fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(Instant::now()).await
    }

    pub async fn sweep_expired_at(&self, now: Instant) -> usize {
        let mut tokens = self.tokens.lock().await;
        let before = tokens.len();
        tokens.retain(|_, issued_at| now.saturating_duration_since(*issued_at) < self.lifetime);
        before - tokens.len()
    }

    pub async fn len(&self) -> usize {
        self.tokens.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tokens.lock().await.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const LIFETIME: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn unknown_tokens_are_invalid() {
        let store = TokenStore::new(LIFETIME);
        assert!(!store.is_valid(&"0".repeat(64)).await);
        assert!(!store.is_valid("").await);
        assert!(!store.is_valid("not a token").await);
    }

    #[tokio::test]
    async fn generated_token_is_immediately_valid() {
        let store = TokenStore::new(LIFETIME);
        let token = store.generate().await.unwrap();
        assert!(store.is_valid(token.as_str()).await);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn invalidate_is_idempotent() {
        let store = TokenStore::new(LIFETIME);
        let token = store.generate().await.unwrap();

        store.invalidate(token.as_str()).await;
        assert!(!store.is_valid(token.as_str()).await);

        store.invalidate(token.as_str()).await;
        assert!(!store.is_valid(token.as_str()).await);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn invalidate_leaves_other_tokens_alone() {
        let store = TokenStore::new(LIFETIME);
        let kept = store.generate().await.unwrap();
        let dropped = store.generate().await.unwrap();

        store.invalidate(dropped.as_str()).await;

        assert!(store.is_valid(kept.as_str()).await);
        assert!(!store.is_valid(dropped.as_str()).await);
    }

    #[tokio::test]
    async fn token_expires_at_lifetime_and_stays_expired() {
        let store = TokenStore::new(LIFETIME);
        let issued = Instant::now();
        let token = store.generate_at(issued).await.unwrap();

        let just_before = issued + LIFETIME - Duration::from_millis(1);
        assert!(store.is_valid_at(token.as_str(), just_before).await);

        assert!(!store.is_valid_at(token.as_str(), issued + LIFETIME).await);
        assert!(
            !store
                .is_valid_at(token.as_str(), issued + LIFETIME * 10)
                .await
        );
    }

    #[tokio::test]
    async fn validity_check_does_not_evict() {
        let store = TokenStore::new(LIFETIME);
        let issued = Instant::now();
        let token = store.generate_at(issued).await.unwrap();

        assert!(!store.is_valid_at(token.as_str(), issued + LIFETIME).await);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn sweep_removes_only_expired_entries() {
        let store = TokenStore::new(LIFETIME);
        let now = Instant::now();
        let stale = store.generate_at(now).await.unwrap();
        let fresh = store
            .generate_at(now + Duration::from_secs(30))
            .await
            .unwrap();

        let later = now + LIFETIME + Duration::from_secs(1);
        assert_eq!(store.sweep_expired_at(later).await, 1);
        assert_eq!(store.len().await, 1);
        assert!(!store.is_valid_at(stale.as_str(), later).await);
        assert!(store.is_valid_at(fresh.as_str(), later).await);
    }

    #[tokio::test]
    async fn concurrent_generation_yields_distinct_tokens() {
        let store = Arc::new(TokenStore::new(LIFETIME));
        let mut handles = Vec::new();
        for _ in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move { store.generate().await }));
        }

        let mut seen = std::collections::HashSet::new();
        for handle in handles {
            let token = handle.await.unwrap().unwrap();
            assert!(seen.insert(token));
        }
        assert_eq!(store.len().await, 32);
    }
}
