//! In-process single-flight lock service.
//!
//! One slot per active key in a concurrent map; waiters park on the slot's
//! condvar with a bounded wait. Slots are reference-counted and removed
//! when the last holder or waiter leaves, so the table only holds keys
//! with in-flight work. Cluster deployments substitute a distributed
//! `ILockService`; the engine is identical either way.

use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use dashmap::DashMap;

use textsearch_core::traits::{ILockGuard, ILockService};
use textsearch_core::{TextSearchError, TextSearchResult};

struct KeySlot {
    busy: Mutex<bool>,
    unlocked: Condvar,
}

struct SlotEntry {
    slot: Arc<KeySlot>,
    /// Holder plus waiters currently interested in this key.
    refs: usize,
}

/// Keyed mutex table for single-instance deployments.
pub struct LocalLockService {
    slots: Arc<DashMap<String, SlotEntry>>,
}

impl LocalLockService {
    pub fn new() -> Self {
        Self {
            slots: Arc::new(DashMap::new()),
        }
    }

    /// Number of keys with a holder or waiters right now.
    pub fn active_keys(&self) -> usize {
        self.slots.len()
    }
}

impl Default for LocalLockService {
    fn default() -> Self {
        Self::new()
    }
}

fn release_ref(slots: &DashMap<String, SlotEntry>, key: &str) {
    if let dashmap::mapref::entry::Entry::Occupied(mut entry) = slots.entry(key.to_string()) {
        entry.get_mut().refs -= 1;
        if entry.get().refs == 0 {
            entry.remove();
        }
    }
}

impl ILockService for LocalLockService {
    fn acquire(&self, key: &str, timeout: Duration) -> TextSearchResult<Box<dyn ILockGuard>> {
        let slot = {
            let mut entry = self
                .slots
                .entry(key.to_string())
                .or_insert_with(|| SlotEntry {
                    slot: Arc::new(KeySlot {
                        busy: Mutex::new(false),
                        unlocked: Condvar::new(),
                    }),
                    refs: 0,
                });
            entry.refs += 1;
            Arc::clone(&entry.slot)
        };

        let started = Instant::now();
        let busy = slot
            .busy
            .lock()
            .map_err(|e| TextSearchError::PersistenceFailure {
                message: format!("lock slot poisoned: {e}"),
            })?;

        let (mut busy, _wait) = slot
            .unlocked
            .wait_timeout_while(busy, timeout, |held| *held)
            .map_err(|e| TextSearchError::PersistenceFailure {
                message: format!("lock slot poisoned: {e}"),
            })?;

        if *busy {
            drop(busy);
            release_ref(&self.slots, key);
            // Report the measured wait, not the configured timeout; the
            // two differ under spurious wakeups.
            return Err(TextSearchError::LockTimeout {
                key: key.to_string(),
                waited_ms: started.elapsed().as_millis() as u64,
            });
        }

        *busy = true;
        drop(busy);

        Ok(Box::new(LocalLockGuard {
            key: key.to_string(),
            slot,
            slots: Arc::clone(&self.slots),
        }))
    }
}

struct LocalLockGuard {
    key: String,
    slot: Arc<KeySlot>,
    slots: Arc<DashMap<String, SlotEntry>>,
}

impl ILockGuard for LocalLockGuard {}

impl Drop for LocalLockGuard {
    fn drop(&mut self) {
        if let Ok(mut busy) = self.slot.busy.lock() {
            *busy = false;
        }
        self.slot.unlocked.notify_one();
        release_ref(&self.slots, &self.key);
    }
}
