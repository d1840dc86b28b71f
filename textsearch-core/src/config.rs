//! Engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for the dedup engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Bounded wait for the single-flight lock, in milliseconds.
    /// Expiry surfaces as `TextSearchError::LockTimeout`.
    pub lock_wait_ms: u64,
    /// Capacity of the storage-metadata cache (entries).
    pub metadata_cache_entries: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lock_wait_ms: 30_000,
            metadata_cache_entries: 1_024,
        }
    }
}

impl EngineConfig {
    pub fn lock_wait(&self) -> Duration {
        Duration::from_millis(self.lock_wait_ms)
    }
}
