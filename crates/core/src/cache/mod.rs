//! Set-associative cache level.
//!
//! This module implements one configurable cache level: a fixed array of
//! sets, each a fixed array of lines, with probe/allocate/evict/flush
//! operations and pluggable victim selection. It models residency only:
//! no data, no timing, no dirty state.

/// Cache replacement policy implementations (LRU, LFU).
pub mod policies;

use std::fmt;

use tracing::trace;

use self::policies::{LfuPolicy, LruPolicy, ReplacementPolicy};
use crate::common::{BlockAddr, ConfigError, Geometry};
use crate::config::PolicyKind;
use crate::stats::{CacheStats, Summary};

/// One cache line: validity, tag, and the block it holds.
///
/// `tag` and `block` are don't-care while `valid` is false; eviction and
/// flush clear only the valid bit.
#[derive(Clone, Copy, Debug, Default)]
struct CacheLine {
    valid: bool,
    tag: u64,
    block: BlockAddr,
}

/// One associative set: a fixed number of ways.
#[derive(Clone, Debug, Default)]
struct CacheSet {
    lines: Vec<CacheLine>,
}

/// Result of one access against a single cache level.
///
/// Transient: consumed immediately by the caller for statistics and for
/// the cross-level handshake, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessResult {
    /// The block was resident.
    Hit,
    /// The block was filled into a free way.
    Miss {
        /// Block address installed by the fill.
        inserted: BlockAddr,
    },
    /// The block was filled by displacing a valid line.
    Evict {
        /// Block address installed by the fill.
        inserted: BlockAddr,
        /// Block address the displaced line held.
        victim: BlockAddr,
    },
}

impl fmt::Display for AccessResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hit => write!(f, "hit"),
            Self::Miss { inserted } => write!(f, "miss insert {inserted}"),
            Self::Evict { inserted, victim } => {
                write!(f, "evict victim {victim} insert {inserted}")
            }
        }
    }
}

/// A single set-associative cache level.
///
/// Owns its sets, lines, replacement state, and access counters. All
/// mutation goes through the operations below; the hierarchy coordinator
/// composes them into the two-level protocol.
pub struct Cache {
    name: String,
    geometry: Geometry,
    ways: usize,
    sets: Vec<CacheSet>,
    policy: Box<dyn ReplacementPolicy + Send + Sync>,
    pub(crate) stats: CacheStats,
}

impl Cache {
    /// Builds a cache level with all lines invalid.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `block_bits + set_bits` exceeds the
    /// 64-bit address width or `ways` is zero.
    pub fn new(
        name: &str,
        set_bits: u32,
        ways: usize,
        block_bits: u32,
        policy: PolicyKind,
    ) -> Result<Self, ConfigError> {
        if block_bits.checked_add(set_bits).is_none_or(|total| total > u64::BITS) {
            return Err(ConfigError::WidthExceeded {
                level: name.to_string(),
                block_bits,
                set_bits,
            });
        }
        if ways == 0 {
            return Err(ConfigError::NoWays {
                level: name.to_string(),
            });
        }

        let geometry = Geometry::new(block_bits, set_bits);
        let num_sets = geometry.num_sets();

        let policy: Box<dyn ReplacementPolicy + Send + Sync> = match policy {
            PolicyKind::Lru => Box::new(LruPolicy::new(num_sets, ways)),
            PolicyKind::Lfu => Box::new(LfuPolicy::new(num_sets, ways)),
        };

        Ok(Self {
            name: name.to_string(),
            geometry,
            ways,
            sets: vec![
                CacheSet {
                    lines: vec![CacheLine::default(); ways],
                };
                num_sets
            ],
            policy,
            stats: CacheStats::default(),
        })
    }

    /// Cache level name ("L1", "L2").
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Address-decomposition geometry of this level.
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Ways per set.
    pub fn ways(&self) -> usize {
        self.ways
    }

    /// Read-only view of the access counters.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Counter snapshot for end-of-run reporting.
    pub fn summary(&self) -> Summary {
        Summary {
            name: self.name.clone(),
            stats: self.stats,
        }
    }

    /// Finds the way holding `addr`'s block, without touching it.
    fn find(&self, addr: u64) -> Option<usize> {
        let tag = self.geometry.tag(addr);
        let set = &self.sets[self.geometry.set_index(addr)];
        set.lines
            .iter()
            .position(|line| line.valid && line.tag == tag)
    }

    /// Checks whether `addr`'s block is resident, counting the lookup as
    /// a use of the line (recency/frequency touch on hit).
    pub fn probe(&mut self, addr: u64) -> bool {
        match self.find(addr) {
            Some(way) => {
                self.policy.touch(self.geometry.set_index(addr), way);
                true
            }
            None => false,
        }
    }

    /// Checks whether `block` is resident without updating any usage
    /// state. Used by invariant checks and reporting, which must not
    /// perturb replacement decisions.
    pub fn resident(&self, block: BlockAddr) -> bool {
        self.find(block.val()).is_some()
    }

    /// True iff every way in `addr`'s set holds a valid line.
    pub fn is_set_full(&self, addr: u64) -> bool {
        let set = &self.sets[self.geometry.set_index(addr)];
        set.lines.iter().all(|line| line.valid)
    }

    /// Fills the first free way of `addr`'s set with `addr`'s block.
    ///
    /// The caller must have ensured a free way exists (by prior eviction
    /// if necessary); a full set is a contract violation, asserted in
    /// debug builds and left unchecked in release builds.
    pub fn allocate(&mut self, addr: u64) {
        let set_index = self.geometry.set_index(addr);
        let tag = self.geometry.tag(addr);
        let block = self.geometry.block_addr(addr);

        let set = &mut self.sets[set_index];
        for (way, line) in set.lines.iter_mut().enumerate() {
            if !line.valid {
                *line = CacheLine {
                    valid: true,
                    tag,
                    block,
                };
                self.policy.install(set_index, way);
                return;
            }
        }
        debug_assert!(false, "{}: allocate into a full set {set_index}", self.name);
    }

    /// Selects the way to displace from `addr`'s (full) set.
    pub fn select_victim(&self, addr: u64) -> usize {
        self.policy.victim(self.geometry.set_index(addr))
    }

    /// Invalidates the given way of `addr`'s set. Tag and block address
    /// are left in place as don't-care values.
    pub fn evict(&mut self, addr: u64, way: usize) {
        let set_index = self.geometry.set_index(addr);
        self.sets[set_index].lines[way].valid = false;
    }

    /// Removes `block` if it is resident and reports whether a line was
    /// invalidated. An absent block is a no-op, not an error: the
    /// hierarchy flushes blocks that may legitimately live elsewhere.
    pub fn flush(&mut self, block: BlockAddr) -> bool {
        match self.find(block.val()) {
            Some(way) => {
                let set_index = self.geometry.set_index(block.val());
                self.sets[set_index].lines[way].valid = false;
                trace!(cache = %self.name, %block, "flush");
                true
            }
            None => false,
        }
    }

    /// Resolves one access against this level: hit, fill into a free way,
    /// or victim eviction followed by a fill.
    ///
    /// Does not update the access counters; the hierarchy coordinator
    /// owns accounting, because not every probe of a level counts as an
    /// access of that level.
    pub fn access(&mut self, addr: u64) -> AccessResult {
        if self.probe(addr) {
            trace!(cache = %self.name, block = %self.geometry.block_addr(addr), "hit");
            return AccessResult::Hit;
        }

        let inserted = self.geometry.block_addr(addr);
        if !self.is_set_full(addr) {
            self.allocate(addr);
            trace!(cache = %self.name, %inserted, "miss");
            return AccessResult::Miss { inserted };
        }

        let way = self.select_victim(addr);
        let set_index = self.geometry.set_index(addr);
        let victim = self.sets[set_index].lines[way].block;
        self.evict(addr, way);
        self.allocate(addr);
        trace!(cache = %self.name, %inserted, %victim, "evict");
        AccessResult::Evict { inserted, victim }
    }

    /// Iterates over the block addresses of all valid lines.
    pub fn resident_blocks(&self) -> impl Iterator<Item = BlockAddr> + '_ {
        self.sets
            .iter()
            .flat_map(|set| set.lines.iter())
            .filter(|line| line.valid)
            .map(|line| line.block)
    }
}

impl fmt::Debug for Cache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("name", &self.name)
            .field("geometry", &self.geometry)
            .field("ways", &self.ways)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
