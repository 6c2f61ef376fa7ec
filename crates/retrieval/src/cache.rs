//! Bounded query cache with insertion-order eviction.

use crate::types::SearchResult;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Key for a cached search: trimmed question and requested `top_k`.
pub type CacheKey = (String, usize);

/// Search result cache.
///
/// When full, the entry inserted first is evicted. Reads never change the
/// eviction order, so this is FIFO rather than LRU.
#[derive(Debug)]
pub struct QueryCache {
    entries: HashMap<CacheKey, Arc<SearchResult>>,
    order: VecDeque<CacheKey>,
    capacity: usize,
}

impl QueryCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn key(question: &str, top_k: usize) -> CacheKey {
        (question.trim().to_string(), top_k)
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<SearchResult>> {
        self.entries.get(key).cloned()
    }

    pub fn insert(&mut self, key: CacheKey, value: Arc<SearchResult>) {
        if self.entries.contains_key(&key) {
            // Replacing keeps the original insertion slot
            self.entries.insert(key, value);
            return;
        }

        while self.entries.len() >= self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }

        self.order.push_back(key.clone());
        self.entries.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
