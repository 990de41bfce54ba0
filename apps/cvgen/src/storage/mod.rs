//! Expiring key/value storage.
//!
//! Every entry is written as `{"value": .., "expiresAt": ..}`. Nothing sweeps
//! the backend in the background: an entry read after its expiry instant is
//! deleted on the spot and reported as absent.

pub mod backend;
pub mod clock;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};
pub use clock::{Clock, SystemClock};

/// Key holding the last job description the user typed.
pub const JOB_DESCRIPTION_KEY: &str = "jobDescription";
/// Key holding the user's model API key.
pub const API_KEY_KEY: &str = "apiKey";
/// Key holding the résumé draft being edited.
pub const CV_DATA_KEY: &str = "cvData";

/// Time-to-live applied to every well-known key, counted from the last write.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored entry could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid storage key '{0}'")]
    InvalidKey(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// What actually lands in the backend for each key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredEntry<T> {
    pub value: T,
    pub expires_at: DateTime<Utc>,
}

impl<T> StoredEntry<T> {
    /// An entry is logically gone once `now` is strictly past its expiry.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Typed, TTL-aware view over a `StorageBackend`.
#[derive(Clone)]
pub struct ExpiringStore<B> {
    backend: B,
    clock: Arc<dyn Clock>,
}

impl<B: StorageBackend> ExpiringStore<B> {
    pub fn new(backend: B) -> Self {
        Self::with_clock(backend, Arc::new(SystemClock))
    }

    pub fn with_clock(backend: B, clock: Arc<dyn Clock>) -> Self {
        Self { backend, clock }
    }

    /// Stores `value` under `key`, expiring `ttl` from now. Overwrites unconditionally.
    pub fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> Result<(), StorageError> {
        let now = self.clock.now();
        let expires_at = TimeDelta::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let entry = StoredEntry { value, expires_at };
        let serialized = serde_json::to_string(&entry)?;
        self.backend.set_item(key, &serialized)
    }

    /// Returns the live value under `key`, or `None` if absent or expired.
    ///
    /// An expired entry is removed from the backend before returning.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.backend.get_item(key)? else {
            return Ok(None);
        };

        let entry: StoredEntry<T> = serde_json::from_str(&raw)?;
        if entry.is_expired_at(self.clock.now()) {
            debug!("Entry '{key}' expired at {}; evicting", entry.expires_at);
            self.backend.remove_item(key)?;
            return Ok(None);
        }

        Ok(Some(entry.value))
    }
}
