// 🧠 BIN Cache - remote answers memoized for the life of the process
//
// Entries never expire; `clear` is the only way to drop them. A racing
// duplicate insert for the same BIN just overwrites with an equal value.

use crate::bin_table::BinEntry;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Cached remote answers
    pub size: usize,

    /// Entries in the static table
    pub table_size: usize,
}

#[derive(Debug, Clone, Default)]
pub struct BinCache {
    entries: Arc<RwLock<HashMap<String, BinEntry>>>,
}

impl BinCache {
    pub fn new() -> Self {
        BinCache::default()
    }

    pub fn get(&self, bin: &str) -> Option<BinEntry> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(bin).cloned()
    }

    pub fn insert(&self, bin: &str, entry: BinEntry) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(bin.to_string(), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}
