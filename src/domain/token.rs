use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::value::UnixTimestamp;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Bearer token issued by the SMSPortal `Authentication` endpoint.
///
/// Lifecycle: created from a successful authentication call, held in memory
/// for the client's lifetime, optionally persisted to a [`TokenStore`] with a
/// TTL, and considered stale once [`ApiToken::expires_at`] is no longer
/// strictly in the future.
///
/// `expires_at` is computed as issue time plus `expires_in_minutes * 60`
/// seconds. The reference client added raw minutes to the epoch value, which
/// made every token look expired within minutes; this crate uses seconds.
///
/// [`TokenStore`]: crate::client::TokenStore
pub struct ApiToken {
    /// The opaque bearer token value.
    pub token: String,
    /// Token schema as reported by the vendor (typically `JWT`).
    pub schema: Option<String>,
    /// Vendor-supplied validity window in minutes.
    pub expires_in_minutes: u64,
    /// Absolute expiry time in epoch seconds.
    pub expires_at: UnixTimestamp,
}

impl ApiToken {
    /// Build a token issued at `issued_at`, deriving `expires_at` from the
    /// vendor's `expiresInMinutes`.
    pub fn issued(
        token: impl Into<String>,
        schema: Option<String>,
        expires_in_minutes: u64,
        issued_at: UnixTimestamp,
    ) -> Self {
        Self {
            token: token.into(),
            schema,
            expires_in_minutes,
            expires_at: issued_at.plus_secs(expires_in_minutes.saturating_mul(60)),
        }
    }

    /// Whether this token may still be attached to a request at `now`.
    ///
    /// A token is usable only while `expires_at` is strictly in the future;
    /// a token expiring exactly at `now` is stale.
    pub fn is_valid_at(&self, now: UnixTimestamp) -> bool {
        self.expires_at > now
    }

    /// The vendor-derived TTL used when writing this token to a store.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.expires_in_minutes.saturating_mul(60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_derives_expiry_in_seconds() {
        let token = ApiToken::issued(
            "my_api_token",
            Some("JWT".to_owned()),
            1440,
            UnixTimestamp::new(1_000_000),
        );
        assert_eq!(token.expires_at, UnixTimestamp::new(1_000_000 + 1440 * 60));
        assert_eq!(token.ttl(), Duration::from_secs(1440 * 60));
    }

    #[test]
    fn validity_boundary_is_strict() {
        let token = ApiToken::issued("t", None, 1, UnixTimestamp::new(100));
        assert!(token.is_valid_at(UnixTimestamp::new(159)));
        assert!(!token.is_valid_at(UnixTimestamp::new(160)));
        assert!(!token.is_valid_at(UnixTimestamp::new(161)));
    }

    #[test]
    fn serde_round_trip_preserves_fields() {
        let token = ApiToken::issued("t", Some("JWT".to_owned()), 60, UnixTimestamp::new(0));
        let json = serde_json::to_string(&token).unwrap();
        let back: ApiToken = serde_json::from_str(&json).unwrap();
        assert_eq!(back, token);
    }
}
