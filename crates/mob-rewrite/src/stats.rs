//! Mobilization statistics
//!
//! The filter counts into a per-document [`CounterTally`] and merges it into
//! the shared [`Statistics`] registry once, when the document is finished.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

/// Named-counter registry shared between documents
pub trait Statistics: Send + Sync {
    /// Add `delta` to the counter called `name`
    fn add(&self, name: &str, delta: i64);

    /// Current value of a counter (0 if unknown)
    fn get(&self, name: &str) -> i64;

    fn increment(&self, name: &str) {
        self.add(name, 1);
    }
}

/// Counters maintained by the mobilize filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MobilizeCounter {
    PagesMobilized,
    KeeperBlocks,
    HeaderBlocks,
    NavigationalBlocks,
    ContentBlocks,
    MarginalBlocks,
    DeletedElements,
}

impl MobilizeCounter {
    pub const ALL: [MobilizeCounter; 7] = [
        Self::PagesMobilized,
        Self::KeeperBlocks,
        Self::HeaderBlocks,
        Self::NavigationalBlocks,
        Self::ContentBlocks,
        Self::MarginalBlocks,
        Self::DeletedElements,
    ];

    /// Registry name of the counter
    pub fn name(self) -> &'static str {
        match self {
            Self::PagesMobilized => "mobilization_pages_rewritten",
            Self::KeeperBlocks => "mobilization_keeper_blocks_moved",
            Self::HeaderBlocks => "mobilization_header_blocks_moved",
            Self::NavigationalBlocks => "mobilization_navigational_blocks_moved",
            Self::ContentBlocks => "mobilization_content_blocks_moved",
            Self::MarginalBlocks => "mobilization_marginal_blocks_moved",
            Self::DeletedElements => "mobilization_elements_deleted",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Per-document counts, merged into a registry when the document ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterTally {
    counts: [u32; 7],
}

impl CounterTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, counter: MobilizeCounter) {
        self.counts[counter.index()] += 1;
    }

    pub fn get(&self, counter: MobilizeCounter) -> u32 {
        self.counts[counter.index()]
    }

    /// Non-zero counters, in [`MobilizeCounter::ALL`] order
    pub fn iter(&self) -> impl Iterator<Item = (MobilizeCounter, u32)> + '_ {
        MobilizeCounter::ALL
            .into_iter()
            .map(|c| (c, self.get(c)))
            .filter(|&(_, n)| n > 0)
    }

    /// Add every non-zero count to the registry
    pub fn merge_into(&self, stats: &dyn Statistics) {
        for (counter, n) in self.iter() {
            stats.add(counter.name(), i64::from(n));
        }
    }
}

/// In-process registry backed by atomics; safe to share across threads
#[derive(Debug, Default)]
pub struct InMemoryStatistics {
    counters: HashMap<String, AtomicI64>,
}

impl InMemoryStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a counter. Registration happens before documents are
    /// processed; adds to unregistered names are dropped.
    pub fn register(&mut self, name: &str) {
        self.counters
            .entry(name.to_string())
            .or_insert_with(|| AtomicI64::new(0));
    }

    /// Registered counter names with their values, sorted by name
    pub fn snapshot(&self) -> Vec<(String, i64)> {
        let mut out: Vec<_> = self
            .counters
            .iter()
            .map(|(name, value)| (name.clone(), value.load(Ordering::Relaxed)))
            .collect();
        out.sort();
        out
    }

    /// Zero every counter
    pub fn clear(&self) {
        for value in self.counters.values() {
            value.store(0, Ordering::Relaxed);
        }
    }
}

impl Statistics for InMemoryStatistics {
    fn add(&self, name: &str, delta: i64) {
        match self.counters.get(name) {
            Some(value) => {
                value.fetch_add(delta, Ordering::Relaxed);
            }
            None => tracing::warn!("add to unregistered statistic {}", name),
        }
    }

    fn get(&self, name: &str) -> i64 {
        self.counters
            .get(name)
            .map_or(0, |value| value.load(Ordering::Relaxed))
    }
}
