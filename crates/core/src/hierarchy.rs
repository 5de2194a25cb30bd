//! Two-level exclusive cache coordination.
//!
//! Owns the L1 and L2 levels side by side and resolves every trace record
//! against both, moving blocks between levels so that a block is resident
//! in at most one level at any time (an *exclusive* hierarchy, as opposed
//! to an inclusive one where L2 is a superset of L1).
//!
//! The movement rules, per access:
//! - **L1 hit**: nothing else happens; exclusivity says the block cannot
//!   also be in L2.
//! - **L1 miss, L2 hit**: the block moves up, removed from L2 and filled
//!   into L1.
//! - **L1 miss, L2 miss**: the block fills into L1 directly, bypassing
//!   L2.
//! - **L1 eviction**: the displaced L1 block moves down into L2; a block
//!   L2 displaces to make room is discarded (there is no L3).

use tracing::debug;

use crate::cache::{AccessResult, Cache};
use crate::common::{BlockAddr, ConfigError};
use crate::config::SimConfig;
use crate::stats::Summary;
use crate::trace::{TraceOp, TraceRecord};

/// Per-access outcome across both levels, exposed for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HierarchyResult {
    /// How L1 resolved the access.
    pub l1: AccessResult,
    /// How L2 was involved, when it was consulted at all.
    ///
    /// `Hit`: the accessed block was found in L2 and moved up into L1.
    /// After a plain L1 miss, `Miss` reports that L2 did not hold the
    /// block either (it was filled from memory straight into L1). After
    /// an L1 eviction, `Miss`/`Evict` describe the demotion of the L1
    /// victim into L2.
    pub l2: Option<AccessResult>,
}

/// Two-level exclusive cache hierarchy.
pub struct TwoLevel {
    l1: Cache,
    l2: Cache,
}

impl TwoLevel {
    /// Builds both levels from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if either level's geometry or
    /// associativity is rejected.
    pub fn new(config: &SimConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            l1: Cache::new(
                "L1",
                config.l1_set_bits,
                config.l1_ways,
                config.block_bits,
                config.policy,
            )?,
            l2: Cache::new(
                "L2",
                config.l2_set_bits,
                config.l2_ways,
                config.block_bits,
                config.policy,
            )?,
        })
    }

    /// Read-only view of the L1 level.
    pub fn l1(&self) -> &Cache {
        &self.l1
    }

    /// Read-only view of the L2 level.
    pub fn l2(&self) -> &Cache {
        &self.l2
    }

    /// Resolves one trace record against the hierarchy.
    ///
    /// A `Modify` record models a load immediately followed by a store to
    /// the same address: the store leg is a guaranteed L1 hit on top of
    /// whatever the load leg produced.
    pub fn access(&mut self, record: &TraceRecord) -> HierarchyResult {
        let result = self.access_address(record.addr);
        if record.op == TraceOp::Modify {
            self.l1.stats.hits += 1;
        }
        #[cfg(debug_assertions)]
        self.check_exclusive();
        result
    }

    /// Resolves one address through L1 and, when needed, L2.
    fn access_address(&mut self, addr: u64) -> HierarchyResult {
        let r1 = self.l1.access(addr);
        self.l1.stats.record(&r1);

        let r2 = match r1 {
            // Exclusivity: a block resident in L1 is absent from L2, so
            // the access terminates here.
            AccessResult::Hit => None,
            AccessResult::Miss { inserted } => Some(self.fill_from(inserted)),
            AccessResult::Evict { inserted, victim } => Some(self.demote(inserted, victim)),
        };

        HierarchyResult { l1: r1, l2: r2 }
    }

    /// L1 missed without displacing anything: the block came either out
    /// of L2 (move-up, counted as an L2 hit) or from memory (counted as
    /// an L2 miss). L2 contents change only in the move-up case.
    fn fill_from(&mut self, block: BlockAddr) -> AccessResult {
        if self.l2.flush(block) {
            debug!(%block, "block moved up from L2");
            self.l2.stats.hits += 1;
            AccessResult::Hit
        } else {
            self.l2.stats.misses += 1;
            AccessResult::Miss { inserted: block }
        }
    }

    /// L1 displaced `victim` to make room for `inserted`: the victim
    /// moves down into L2.
    ///
    /// If `inserted` itself was resident in L2 (the access was an L2
    /// hit), its removal from L2 is counted as an L2 hit plus an L2
    /// eviction, and the victim is still installed in L2 (uncounted, as
    /// part of the same movement). A block L2 displaces in either path is
    /// discarded: there is no level below to receive it.
    fn demote(&mut self, inserted: BlockAddr, victim: BlockAddr) -> AccessResult {
        if self.l2.flush(inserted) {
            debug!(block = %inserted, "block moved up from L2 (with L1 eviction)");
            self.l2.stats.hits += 1;
            self.l2.stats.evictions += 1;
            let _ = self.l2.access(victim.val());
            AccessResult::Hit
        } else {
            let r2 = self.l2.access(victim.val());
            match r2 {
                // Reachable only if exclusivity was already broken: an
                // L1 victim is never L2-resident otherwise. Accounted as
                // a hit plus the removal-from-L2 it implies.
                AccessResult::Hit => {
                    self.l2.stats.hits += 1;
                    self.l2.stats.evictions += 1;
                }
                AccessResult::Miss { .. } => self.l2.stats.misses += 1,
                AccessResult::Evict { victim: discarded, .. } => {
                    self.l2.stats.misses += 1;
                    self.l2.stats.evictions += 1;
                    debug!(block = %discarded, "block dropped below the hierarchy");
                }
            }
            r2
        }
    }

    /// Asserts the exclusive property: no block is valid-resident in both
    /// levels at once.
    ///
    /// A violation is a coordinator bug, not a recoverable condition, so
    /// it panics. Runs after every access in debug builds; tests call it
    /// directly.
    ///
    /// # Panics
    ///
    /// Panics when a block is resident in both L1 and L2.
    pub fn check_exclusive(&self) {
        for block in self.l1.resident_blocks() {
            assert!(
                !self.l2.resident(block),
                "exclusive property violated: L1 block {block} also resident in L2",
            );
        }
    }

    /// Counter snapshots for both levels, for end-of-run reporting.
    pub fn summaries(&self) -> [Summary; 2] {
        [self.l1.summary(), self.l2.summary()]
    }
}

impl std::fmt::Debug for TwoLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwoLevel")
            .field("l1", &self.l1)
            .field("l2", &self.l2)
            .finish()
    }
}
