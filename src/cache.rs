//! File-based answer cache.
//!
//! Repeated questions against the same collection are common in interactive
//! use, and each one costs an embedding call plus a completion. Answers are
//! cached on disk keyed by a hash of collection and question, with a TTL so
//! stale answers age out. Entries found expired on read are deleted.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use tracing::{debug, warn};

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    created_at: DateTime<Utc>,
    ttl_seconds: u64,
    value: serde_json::Value,
}

impl CacheEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(self.created_at);
        age.num_seconds() < 0 || age.num_seconds() as u64 >= self.ttl_seconds
    }
}

/// Disk cache with per-entry TTL.
pub struct AnswerCache {
    dir: PathBuf,
    ttl_seconds: u64,
}

impl AnswerCache {
    pub fn new(dir: PathBuf, ttl_seconds: u64) -> Self {
        Self { dir, ttl_seconds }
    }

    /// Stable cache key for a question within a collection.
    pub fn key(collection: &str, question: &str) -> String {
        let mut hasher = DefaultHasher::new();
        collection.hash(&mut hasher);
        question.trim().to_lowercase().hash(&mut hasher);
        format!("{:016x}", hasher.finish())
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Look up a cached value. Expired or unreadable entries are removed and
    /// treated as misses.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.entry_path(key);
        if !path.exists() {
            return None;
        }

        let entry: CacheEntry = match std::fs::read_to_string(&path)
            .map_err(crate::error::VitenError::from)
            .and_then(|content| Ok(serde_json::from_str(&content)?))
        {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Dropping unreadable cache entry {}: {}", path.display(), e);
                let _ = std::fs::remove_file(&path);
                return None;
            }
        };

        if entry.is_expired(Utc::now()) {
            debug!("Cache entry {} expired", key);
            let _ = std::fs::remove_file(&path);
            return None;
        }

        serde_json::from_value(entry.value).ok()
    }

    /// Store a value under `key` with the cache's TTL.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;

        let entry = CacheEntry {
            created_at: Utc::now(),
            ttl_seconds: self.ttl_seconds,
            value: serde_json::to_value(value)?,
        };
        std::fs::write(self.entry_path(key), serde_json::to_string(&entry)?)?;
        Ok(())
    }

    /// Remove all entries. Returns how many were deleted.
    pub fn clear(&self) -> Result<usize> {
        if !self.dir.exists() {
            return Ok(0);
        }

        let mut removed = 0;
        for item in std::fs::read_dir(&self.dir)? {
            let path = item?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                std::fs::remove_file(&path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}
