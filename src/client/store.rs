//! Token store abstraction: optional external cache for the bearer token.

use std::collections::HashMap;
use std::error::Error as StdError;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::client::BoxFuture;
use crate::domain::{ApiToken, UnixTimestamp};

/// External key-value storage for issued tokens.
///
/// The client treats the store as opaque get/set-with-TTL storage under a
/// fixed key. Store failures never fail a request; they only force a fresh
/// authentication call.
pub trait TokenStore: Send + Sync {
    /// Look up a token under `key`. An expired entry must read as a miss.
    fn get<'a>(
        &'a self,
        key: &'a str,
    ) -> BoxFuture<'a, Result<Option<ApiToken>, Box<dyn StdError + Send + Sync>>>;

    /// Write a token under `key`, evicting it after `ttl`.
    fn put<'a>(
        &'a self,
        key: &'a str,
        token: &'a ApiToken,
        ttl: Duration,
    ) -> BoxFuture<'a, Result<(), Box<dyn StdError + Send + Sync>>>;
}

#[derive(Debug, Clone, Default)]
/// In-process [`TokenStore`] backed by a `HashMap`.
///
/// Useful when several clients in one process should share a token without
/// an external cache. Entries are evicted lazily on read.
pub struct MemoryTokenStore {
    entries: Arc<Mutex<HashMap<String, StoredToken>>>,
}

#[derive(Debug, Clone)]
struct StoredToken {
    token: ApiToken,
    evict_at: UnixTimestamp,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, StoredToken>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenStore for MemoryTokenStore {
    fn get<'a>(
        &'a self,
        key: &'a str,
    ) -> BoxFuture<'a, Result<Option<ApiToken>, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let now = UnixTimestamp::now();
            let mut entries = self.lock();
            match entries.get(key) {
                Some(entry) if entry.evict_at > now => Ok(Some(entry.token.clone())),
                Some(_) => {
                    entries.remove(key);
                    Ok(None)
                }
                None => Ok(None),
            }
        })
    }

    fn put<'a>(
        &'a self,
        key: &'a str,
        token: &'a ApiToken,
        ttl: Duration,
    ) -> BoxFuture<'a, Result<(), Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let evict_at = UnixTimestamp::now().plus_secs(ttl.as_secs());
            self.lock().insert(
                key.to_owned(),
                StoredToken {
                    token: token.clone(),
                    evict_at,
                },
            );
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(value: &str) -> ApiToken {
        ApiToken::issued(value, Some("JWT".to_owned()), 1440, UnixTimestamp::now())
    }

    #[tokio::test]
    async fn get_returns_what_was_put() {
        let store = MemoryTokenStore::new();
        assert!(store.get("k").await.unwrap().is_none());

        let issued = token("t1");
        store
            .put("k", &issued, Duration::from_secs(3600))
            .await
            .unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(issued));
    }

    #[tokio::test]
    async fn zero_ttl_entry_reads_as_miss() {
        let store = MemoryTokenStore::new();
        store
            .put("k", &token("t1"), Duration::from_secs(0))
            .await
            .unwrap();
        assert!(store.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clones_share_the_same_entries() {
        let store = MemoryTokenStore::new();
        let cloned = store.clone();
        cloned
            .put("k", &token("t1"), Duration::from_secs(3600))
            .await
            .unwrap();
        assert!(store.get("k").await.unwrap().is_some());
    }
}
