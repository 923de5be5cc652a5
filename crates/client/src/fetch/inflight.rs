//! Per-key request coalescing.
//!
//! Callers fetching the same key take turns on a per-key async lock. The
//! first holder performs the network call; the rest re-check the cache once
//! they get the lock. Entries are removed when the last holder releases.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Debug, Default)]
pub(crate) struct InFlight {
    keys: Mutex<HashMap<String, Slot>>,
}

#[derive(Debug)]
struct Slot {
    lock: Arc<AsyncMutex<()>>,
    users: usize,
}

/// Held while a caller owns `key`. The lock is released before the caller
/// is deregistered.
pub(crate) struct InFlightGuard<'a> {
    _held: OwnedMutexGuard<()>,
    _user: User<'a>,
}

/// Counts one caller against a key, whether it holds the lock or is still
/// waiting. The last one out removes the entry.
struct User<'a> {
    owner: &'a InFlight,
    key: String,
}

impl InFlight {
    pub(crate) async fn acquire(&self, key: &str) -> InFlightGuard<'_> {
        let (user, lock) = {
            let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
            let slot = keys
                .entry(key.to_string())
                .or_insert_with(|| Slot { lock: Arc::new(AsyncMutex::new(())), users: 0 });
            slot.users += 1;
            (User { owner: self, key: key.to_string() }, Arc::clone(&slot.lock))
        };
        let held = lock.lock_owned().await;
        InFlightGuard { _held: held, _user: user }
    }

    #[cfg(test)]
    pub(crate) fn tracked(&self) -> usize {
        self.keys.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Drop for User<'_> {
    fn drop(&mut self) {
        let mut keys = self.owner.keys.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = keys.get_mut(&self.key) {
            slot.users -= 1;
            if slot.users == 0 {
                keys.remove(&self.key);
            }
        }
    }
}
