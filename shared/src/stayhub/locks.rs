// ============================================================================
// KeyedLocks - per-key async serialization
// ============================================================================
//
// Operations on the same key (a listing, a conversation) run one at a time;
// operations on different keys never wait on each other. Idle entries are
// pruned on the next lock call so the map only holds keys with live guards.
//
// ============================================================================

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

pub struct KeyedLocks<K> {
    slots: Mutex<HashMap<K, Arc<AsyncMutex<()>>>>,
}

impl<K> KeyedLocks<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Wait for exclusive access to `key`. Access ends when the guard drops.
    pub async fn lock(&self, key: &K) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            // Only the map holds a reference: nobody owns or waits for it
            slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            slots
                .entry(key.clone())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        slot.lock_owned().await
    }

    /// Number of keys currently tracked
    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K> Default for KeyedLocks<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
