//! Fix suggestion cache
//!
//! Memoizes reasoning-service fixes for recurring errors. The cache is an explicit
//! object shared through `Arc`; it lives for the whole process and is emptied only
//! by an operator reset.

use crate::models::fix::{ErrorCategory, FixSuggestion};
use crate::services::classifier::category_for_status;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, info, warn};

/// Only this many characters of the normalized message take part in the key
const SIGNATURE_MESSAGE_LEN: usize = 100;

/// Normalized cache key for an error
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixSignature {
    /// Status bucket, the category the status code falls into
    pub bucket: ErrorCategory,
    /// Lowercased message with whitespace collapsed
    pub message: String,
}

impl FixSignature {
    pub fn new(status_code: u16, message: &str) -> Self {
        Self {
            bucket: category_for_status(status_code),
            message: normalize_message(message),
        }
    }
}

/// Lowercase, collapse runs of whitespace, trim, cap length
pub fn normalize_message(message: &str) -> String {
    message
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .chars()
        .take(SIGNATURE_MESSAGE_LEN)
        .collect()
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: usize,
}

/// Process-wide fix cache
#[derive(Debug, Default)]
pub struct FixCache {
    entries: RwLock<HashMap<FixSignature, FixSuggestion>>,
}

impl FixCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached fix for a signature
    pub fn get(&self, signature: &FixSignature) -> Option<FixSuggestion> {
        match self.entries.read() {
            Ok(entries) => {
                let result = entries.get(signature).cloned();
                if result.is_some() {
                    debug!("📖 Fix cache hit for {} error", signature.bucket);
                }
                result
            }
            Err(_) => {
                warn!("Fix cache lock poisoned, treating as miss");
                None
            }
        }
    }

    /// Store a fix unless one is already cached; returns the stored value
    ///
    /// The first answer for a signature wins until the cache is cleared.
    pub fn insert(&self, signature: FixSignature, fix: FixSuggestion) -> FixSuggestion {
        match self.entries.write() {
            Ok(mut entries) => {
                debug!("📝 Caching fix for {} error", signature.bucket);
                entries.entry(signature).or_insert(fix).clone()
            }
            Err(_) => {
                warn!("Fix cache lock poisoned, fix not cached");
                fix
            }
        }
    }

    /// Remove all entries, returning how many were dropped
    pub fn clear(&self) -> usize {
        match self.entries.write() {
            Ok(mut entries) => {
                let removed = entries.len();
                entries.clear();
                info!("🗑️ Fix cache cleared ({} entries)", removed);
                removed
            }
            Err(_) => {
                warn!("Fix cache lock poisoned, clear skipped");
                0
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            total_entries: self.len(),
        }
    }
}
