//! Hit/miss/eviction accounting and end-of-run reporting.
//!
//! Each cache level owns one [`CacheStats`]; the hierarchy coordinator
//! updates the counters as it resolves an access across levels. Counters
//! are purely additive and are exposed read-only through [`Summary`]
//! snapshots for reporting.

use std::fmt;

use crate::cache::AccessResult;

/// Per-cache access counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Accesses satisfied by a resident line.
    pub hits: u64,
    /// Accesses that required a fill (with or without an eviction).
    pub misses: u64,
    /// Fills that displaced a valid line.
    pub evictions: u64,
}

impl CacheStats {
    /// Folds one access result into the counters.
    ///
    /// `Hit` counts a hit; `Miss` and `Evict` count a miss; `Evict`
    /// additionally counts an eviction. There is no decrement path.
    pub fn record(&mut self, result: &AccessResult) {
        match result {
            AccessResult::Hit => self.hits += 1,
            AccessResult::Miss { .. } => self.misses += 1,
            AccessResult::Evict { .. } => {
                self.misses += 1;
                self.evictions += 1;
            }
        }
    }

    /// Total recorded accesses (`hits + misses`).
    pub fn accesses(&self) -> u64 {
        self.hits + self.misses
    }
}

/// Read-only end-of-run snapshot of one cache level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Cache level name ("L1", "L2").
    pub name: String,
    /// Counter values at snapshot time.
    pub stats: CacheStats,
}

impl fmt::Display for Summary {
    /// One summary line per cache, in the trace tool's report format:
    /// `L1 hits:42 misses:7 evictions:3`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} hits:{} misses:{} evictions:{}",
            self.name, self.stats.hits, self.stats.misses, self.stats.evictions
        )
    }
}
