use chrono::{DateTime, Duration, Utc};
use std::fmt;

/// Vendor bearer token with its absolute expiry
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    lifetime: Duration,
}

impl AccessToken {
    pub fn new(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_at,
            lifetime: expires_at - Utc::now(),
        }
    }

    /// Token issued now and valid for `expires_in` seconds
    pub fn issued_now(token: impl Into<String>, expires_in: i64) -> Self {
        let lifetime = Duration::seconds(expires_in);
        Self {
            token: token.into(),
            expires_at: Utc::now() + lifetime,
            lifetime,
        }
    }

    /// Refresh margin for this token: the requested margin, but never more
    /// than half the lifetime it was issued with.
    pub fn effective_margin(&self, margin: Duration) -> Duration {
        let half_life = (self.lifetime / 2).max(Duration::zero());
        margin.min(half_life)
    }

    /// True while more than the effective margin of lifetime remains at `now`
    pub fn is_usable_at(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        self.expires_at - self.effective_margin(margin) > now
    }

    pub fn is_usable(&self, margin: Duration) -> bool {
        self.is_usable_at(Utc::now(), margin)
    }

    pub fn secret(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usable_respects_margin() {
        let token = AccessToken::issued_now("abc", 3600);
        let now = Utc::now();
        assert!(token.is_usable_at(now, Duration::seconds(60)));
        assert!(!token.is_usable_at(token.expires_at - Duration::seconds(30), Duration::seconds(60)));
        assert!(!token.is_usable_at(token.expires_at + Duration::seconds(1), Duration::zero()));
    }

    #[test]
    fn test_margin_clamped_for_short_lived_token() {
        let token = AccessToken::issued_now("short", 30);
        assert_eq!(token.effective_margin(Duration::seconds(60)), Duration::seconds(15));
        assert_eq!(token.effective_margin(Duration::seconds(5)), Duration::seconds(5));
        assert!(token.is_usable(Duration::seconds(60)));
        assert!(!token.is_usable_at(token.expires_at - Duration::seconds(10), Duration::seconds(60)));
    }

    #[test]
    fn test_expired_token_never_usable() {
        let token = AccessToken::new("old", Utc::now() - Duration::seconds(10));
        assert_eq!(token.effective_margin(Duration::seconds(60)), Duration::zero());
        assert!(!token.is_usable(Duration::seconds(60)));
        assert!(!token.is_usable(Duration::zero()));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let token = AccessToken::issued_now("super-secret", 3600);
        let printed = format!("{:?}", token);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("redacted"));
    }
}
