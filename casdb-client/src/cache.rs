//! Time-bounded response cache keyed by SQL text.
//!
//! The cache is advisory: a miss never changes observable semantics. A hit
//! returns the first page of a prior execute with a null handle, so the
//! caller cannot fetch further pages.

use crate::handle::QueryResult;
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Entry {
    stored_at: Instant,
    result: QueryResult,
}

/// Per-session cache mapping exact SQL text to the first-page result.
#[derive(Debug)]
pub struct QueryCache {
    ttl: Duration,
    entries: HashMap<String, Entry>,
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// Looks up a fresh entry, evicting it lazily when expired.
    pub fn lookup(&mut self, sql: &str) -> Option<QueryResult> {
        self.lookup_at(sql, Instant::now())
    }

    /// Stores the first page of a successful execute. An existing fresh
    /// entry is never replaced.
    pub fn insert(&mut self, sql: &str, result: &QueryResult) {
        self.insert_at(sql, result, Instant::now());
    }

    pub(crate) fn lookup_at(&mut self, sql: &str, now: Instant) -> Option<QueryResult> {
        match self.entries.get(sql) {
            Some(entry) if now.duration_since(entry.stored_at) < self.ttl => {
                Some(entry.result.clone())
            }
            Some(_) => {
                self.entries.remove(sql);
                None
            }
            None => None,
        }
    }

    pub(crate) fn insert_at(&mut self, sql: &str, result: &QueryResult, now: Instant) {
        if let Some(existing) = self.entries.get(sql) {
            if now.duration_since(existing.stored_at) < self.ttl {
                return;
            }
        }
        // Stored with a null handle: a hit must not look fetchable.
        let result = QueryResult {
            handle: None,
            ..result.clone()
        };
        self.entries.insert(
            sql.to_string(),
            Entry {
                stored_at: now,
                result,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
