// src/core/locks.rs
//! Per-key async mutexes for check-then-act write sequences

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Hands out one async mutex per key. Entries nobody holds or waits on are
/// pruned on the next `lock` call.
pub struct KeyedLocks<K> {
    slots: Mutex<HashMap<K, Arc<AsyncMutex<()>>>>,
}

impl<K> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until `key` is free and hold it until the guard drops
    pub async fn lock(&self, key: K) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            Arc::clone(slots.entry(key).or_default())
        };
        slot.lock_owned().await
    }

    /// Number of keys currently tracked
    pub fn tracked(&self) -> usize {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// The two lock spaces used by the write paths
#[derive(Default)]
pub struct WriteLocks {
    /// Advertisement owners, for the activation cap
    pub owners: KeyedLocks<i64>,
    /// Normalized candidate emails, for application merges
    pub emails: KeyedLocks<String>,
}

impl WriteLocks {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_key_is_exclusive() {
        let locks = Arc::new(KeyedLocks::<i64>::new());
        let guard = locks.lock(7).await;

        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.lock(7).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_block() {
        let locks = KeyedLocks::<String>::new();
        let _a = locks.lock("a@example.com".to_string()).await;
        let b = tokio::time::timeout(
            Duration::from_millis(100),
            locks.lock("b@example.com".to_string()),
        )
        .await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn test_released_keys_are_pruned() {
        let locks = KeyedLocks::<i64>::new();
        drop(locks.lock(1).await);
        drop(locks.lock(2).await);
        let _held = locks.lock(3).await;
        assert_eq!(locks.tracked(), 1);
    }
}
