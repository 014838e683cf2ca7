//! Tracks pool ids that were already announced during this process lifetime

use std::collections::HashSet;

use super::PoolRecord;

/// In-memory set of processed pool ids.
///
/// Grows monotonically and is never persisted, so a restart re-announces every
/// listed pool. A TTL or on-disk store can replace it without touching callers.
#[derive(Debug, Default, Clone)]
pub struct SeenSet {
    ids: HashSet<String>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps only records whose id has not been seen, preserving listing order.
    /// Repeated ids inside the same listing collapse to their first occurrence.
    pub fn filter_unseen(&self, records: Vec<PoolRecord>) -> Vec<PoolRecord> {
        let mut in_listing = HashSet::new();
        records
            .into_iter()
            .filter(|record| !self.ids.contains(&record.id) && in_listing.insert(record.id.clone()))
            .collect()
    }

    /// Returns true when the id was not tracked before
    pub fn mark_seen(&mut self, id: &str) -> bool {
        self.ids.insert(id.to_string())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
