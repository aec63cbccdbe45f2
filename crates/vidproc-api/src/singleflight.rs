//! Per-object-name run serialization.
//!
//! Redelivered triggers for the same raw object would otherwise race on the
//! same scratch paths; holding a keyed lock from fetch through cleanup keeps
//! at most one run per name in flight.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockMap = Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>;

/// A set of named async locks, created on demand and dropped when idle.
#[derive(Debug, Clone, Default)]
pub struct KeyedLocks {
    locks: LockMap,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for `key`, waiting if another holder is in flight.
    pub async fn acquire(&self, key: &str) -> KeyGuard {
        let lock = {
            let mut map = self.locks.lock().expect("keyed lock map poisoned");
            Arc::clone(map.entry(key.to_string()).or_default())
        };

        let guard = lock.lock_owned().await;

        KeyGuard {
            key: key.to_string(),
            locks: Arc::clone(&self.locks),
            guard: Some(guard),
        }
    }
}

/// Held lock for one key; releasing it prunes the map entry when no other
/// run is waiting on the same key.
#[derive(Debug)]
pub struct KeyGuard {
    key: String,
    locks: LockMap,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyGuard {
    fn drop(&mut self) {
        // Release the lock before inspecting the map so waiters are counted.
        self.guard.take();

        let mut map = self.locks.lock().expect("keyed lock map poisoned");
        if let Some(lock) = map.get(&self.key) {
            // Only the map itself still references the mutex.
            if Arc::strong_count(lock) == 1 {
                map.remove(&self.key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_sequential_acquire_of_same_key() {
        let locks = KeyedLocks::new();
        drop(locks.acquire("clip.mp4").await);
        drop(locks.acquire("clip.mp4").await);
    }

    #[tokio::test]
    async fn test_same_key_serializes() {
        let locks = KeyedLocks::new();
        let guard = locks.acquire("clip.mp4").await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire("clip.mp4").await;
            })
        };

        // The second run must not get the lock while the first holds it.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!contender.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .expect("contender should finish once the lock is released")
            .unwrap();
    }

    #[tokio::test]
    async fn test_different_keys_do_not_block() {
        let locks = KeyedLocks::new();
        let _a = locks.acquire("a.mp4").await;

        tokio::time::timeout(Duration::from_millis(100), locks.acquire("b.mp4"))
            .await
            .expect("independent key should be immediately available");
    }

    #[tokio::test]
    async fn test_idle_entries_are_pruned() {
        let locks = KeyedLocks::new();
        drop(locks.acquire("clip.mp4").await);
        assert!(locks.locks.lock().unwrap().is_empty());
    }
}
