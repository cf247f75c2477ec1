//! In-memory challenge store
//!
//! Ephemeral map of wallet address to the pending login challenge. At most
//! one live challenge exists per wallet; reissuing overwrites. Entries die
//! on consumption, on an expired read, or through the periodic sweep.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

/// A pending challenge for a single wallet
#[derive(Debug, Clone)]
pub struct ChallengeEntry {
    pub challenge: String,
    pub issued_at: DateTime<Utc>,
}

/// Shared challenge store guarded by an async RwLock.
///
/// Concurrent issuance for the same wallet is last-write-wins, which is the
/// intended behavior: only the most recent challenge is valid.
pub struct ChallengeStore {
    ttl: Duration,
    entries: RwLock<HashMap<String, ChallengeEntry>>,
}

impl ChallengeStore {
    pub fn new(ttl_seconds: i64) -> Self {
        Self {
            ttl: Duration::seconds(ttl_seconds),
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Store a challenge for a wallet, replacing any existing one.
    pub async fn put(&self, wallet_address: &str, challenge: String) {
        self.put_at(wallet_address, challenge, Utc::now()).await;
    }

    /// Store a challenge with an explicit issuance timestamp.
    pub async fn put_at(
        &self,
        wallet_address: &str,
        challenge: String,
        issued_at: DateTime<Utc>,
    ) {
        let mut entries = self.entries.write().await;
        entries.insert(
            wallet_address.to_string(),
            ChallengeEntry {
                challenge,
                issued_at,
            },
        );
    }

    pub async fn get(&self, wallet_address: &str) -> Option<ChallengeEntry> {
        let entries = self.entries.read().await;
        entries.get(wallet_address).cloned()
    }

    /// Remove and return the challenge for a wallet (single-use consumption).
    pub async fn remove(&self, wallet_address: &str) -> Option<ChallengeEntry> {
        let mut entries = self.entries.write().await;
        entries.remove(wallet_address)
    }

    pub fn is_expired(&self, entry: &ChallengeEntry) -> bool {
        Utc::now() - entry.issued_at > self.ttl
    }

    /// Drop all expired entries, returning how many were evicted.
    pub async fn evict_expired(&self) -> usize {
        let cutoff = Utc::now() - self.ttl;
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.issued_at >= cutoff);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WALLET: &str = "GAAZI4TCR3TY5OJHCTJC2A4QSY6CJWJH5IAJTGKIN2ER7LBNVKOCCWN7";

    #[tokio::test]
    async fn test_put_and_get() {
        let store = ChallengeStore::new(300);
        store.put(WALLET, "abc123".to_string()).await;

        let entry = store.get(WALLET).await.unwrap();
        assert_eq!(entry.challenge, "abc123");
        assert!(!store.is_expired(&entry));
    }

    #[tokio::test]
    async fn test_reissue_overwrites() {
        let store = ChallengeStore::new(300);
        store.put(WALLET, "first".to_string()).await;
        store.put(WALLET, "second".to_string()).await;

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get(WALLET).await.unwrap().challenge, "second");
    }

    #[tokio::test]
    async fn test_remove_is_single_use() {
        let store = ChallengeStore::new(300);
        store.put(WALLET, "abc".to_string()).await;

        assert!(store.remove(WALLET).await.is_some());
        assert!(store.remove(WALLET).await.is_none());
        assert!(store.get(WALLET).await.is_none());
    }

    #[tokio::test]
    async fn test_expiry_detection() {
        let store = ChallengeStore::new(300);
        let stale = Utc::now() - Duration::seconds(301);
        store.put_at(WALLET, "old".to_string(), stale).await;

        let entry = store.get(WALLET).await.unwrap();
        assert!(store.is_expired(&entry));
    }

    #[tokio::test]
    async fn test_evict_expired() {
        let store = ChallengeStore::new(300);
        let stale = Utc::now() - Duration::seconds(600);
        store.put_at(WALLET, "old".to_string(), stale).await;
        store
            .put("GBBB000000000000000000000000000000000000000000000000000A", "fresh".to_string())
            .await;

        assert_eq!(store.evict_expired().await, 1);
        assert_eq!(store.len().await, 1);
        assert!(store.get(WALLET).await.is_none());
    }
}
