//! Single-Level Cache Operation Tests.
//!
//! Verifies probe, allocate, eviction, flush, and the composite access
//! operation of one set-associative level, driven directly with no second
//! level involved. Addresses below use 16-byte blocks (block bits = 4),
//! so 0x00, 0x10, 0x20 are consecutive blocks.

use cachetrace_core::cache::{AccessResult, Cache};
use cachetrace_core::common::BlockAddr;
use cachetrace_core::config::PolicyKind;

// ──────────────────────────────────────────────────────────
// Helper: build a small test cache
// ──────────────────────────────────────────────────────────

/// One set, two ways, 16-byte blocks, LRU. The smallest cache that can
/// exercise every operation.
fn two_way() -> Cache {
    Cache::new("L1", 0, 2, 4, PolicyKind::Lru).expect("valid test geometry")
}

// ══════════════════════════════════════════════════════════
// 1. Cold Cache
// ══════════════════════════════════════════════════════════

/// A fresh cache contains nothing: probe is false for any address and
/// the first access is a miss.
#[test]
fn fresh_cache_misses_everywhere() {
    let mut cache = two_way();

    assert!(!cache.probe(0x00));
    assert!(!cache.probe(0xdead_beef));
    assert!(!cache.resident(BlockAddr(0x00)));

    assert_eq!(
        cache.access(0x00),
        AccessResult::Miss {
            inserted: BlockAddr(0x00)
        }
    );
}

// ══════════════════════════════════════════════════════════
// 2. Re-access Hits
// ══════════════════════════════════════════════════════════

/// Immediately after any install path, accessing the same address hits.
#[test]
fn reaccess_after_install_hits() {
    let mut cache = two_way();

    cache.access(0x00);
    assert_eq!(cache.access(0x00), AccessResult::Hit);

    // Same block, different offset: still the same line.
    assert_eq!(cache.access(0x0c), AccessResult::Hit);
}

/// Re-access hits even when the install displaced a victim.
#[test]
fn reaccess_after_eviction_install_hits() {
    let mut cache = two_way();

    cache.access(0x00);
    cache.access(0x10);
    let result = cache.access(0x20);
    assert!(matches!(result, AccessResult::Evict { .. }));
    assert_eq!(cache.access(0x20), AccessResult::Hit);
}

// ══════════════════════════════════════════════════════════
// 3. Fill and Evict
// ══════════════════════════════════════════════════════════

/// Fill both ways, then access a third block: the least-recently touched
/// line (the first one filled) is the victim.
#[test]
fn third_block_evicts_least_recent() {
    let mut cache = two_way();

    assert_eq!(
        cache.access(0x00),
        AccessResult::Miss {
            inserted: BlockAddr(0x00)
        }
    );
    assert_eq!(
        cache.access(0x10),
        AccessResult::Miss {
            inserted: BlockAddr(0x10)
        }
    );
    assert_eq!(
        cache.access(0x20),
        AccessResult::Evict {
            inserted: BlockAddr(0x20),
            victim: BlockAddr(0x00),
        }
    );

    assert!(!cache.resident(BlockAddr(0x00)));
    assert!(cache.resident(BlockAddr(0x10)));
    assert!(cache.resident(BlockAddr(0x20)));
}

/// A probe counts as a touch: re-probing the older line protects it, so
/// the other way becomes the victim.
#[test]
fn probe_updates_recency() {
    let mut cache = two_way();

    cache.access(0x00);
    cache.access(0x10);
    assert!(cache.probe(0x00));

    assert_eq!(
        cache.access(0x20),
        AccessResult::Evict {
            inserted: BlockAddr(0x20),
            victim: BlockAddr(0x10),
        }
    );
}

/// `is_set_full` flips once every way holds a valid line and flips back
/// after a flush frees one.
#[test]
fn set_occupancy_tracks_fills_and_flushes() {
    let mut cache = two_way();

    assert!(!cache.is_set_full(0x00));
    cache.access(0x00);
    assert!(!cache.is_set_full(0x00));
    cache.access(0x10);
    assert!(cache.is_set_full(0x00));

    assert!(cache.flush(BlockAddr(0x00)));
    assert!(!cache.is_set_full(0x00));
}

// ══════════════════════════════════════════════════════════
// 4. Flush
// ══════════════════════════════════════════════════════════

/// Flushing an absent block is a no-op and reports nothing removed.
#[test]
fn flush_of_absent_block_is_noop() {
    let mut cache = two_way();
    cache.access(0x00);

    assert!(!cache.flush(BlockAddr(0x50)));
    assert!(cache.resident(BlockAddr(0x00)));
}

/// Flushing a resident block invalidates exactly that line.
#[test]
fn flush_removes_only_the_named_block() {
    let mut cache = two_way();
    cache.access(0x00);
    cache.access(0x10);

    assert!(cache.flush(BlockAddr(0x00)));
    assert!(!cache.resident(BlockAddr(0x00)));
    assert!(cache.resident(BlockAddr(0x10)));
}

// ══════════════════════════════════════════════════════════
// 5. Explicit Victim Selection
// ══════════════════════════════════════════════════════════

/// `select_victim` + `evict` + `allocate` compose to the same outcome as
/// the composite access path.
#[test]
fn manual_evict_allocate_matches_access() {
    let mut cache = two_way();
    cache.access(0x00);
    cache.access(0x10);

    let way = cache.select_victim(0x20);
    cache.evict(0x20, way);
    cache.allocate(0x20);

    assert!(!cache.resident(BlockAddr(0x00)));
    assert!(cache.resident(BlockAddr(0x10)));
    assert!(cache.resident(BlockAddr(0x20)));
}

/// `resident` never perturbs replacement state: querying a line does not
/// protect it from eviction.
#[test]
fn resident_is_side_effect_free() {
    let mut cache = two_way();
    cache.access(0x00);
    cache.access(0x10);

    // Query 0x00 repeatedly through the quiet path.
    for _ in 0..8 {
        assert!(cache.resident(BlockAddr(0x00)));
    }

    // 0x00 is still the least recently *touched* line.
    assert_eq!(
        cache.access(0x20),
        AccessResult::Evict {
            inserted: BlockAddr(0x20),
            victim: BlockAddr(0x00),
        }
    );
}

// ══════════════════════════════════════════════════════════
// 6. Set Mapping
// ══════════════════════════════════════════════════════════

/// Blocks in different sets never conflict: a direct-mapped cache with
/// two sets holds two blocks that differ only in the set-index bit.
#[test]
fn different_sets_do_not_conflict() {
    // set_bits = 1, ways = 1, block_bits = 4: address bit 4 selects the set.
    let mut cache = Cache::new("L1", 1, 1, 4, PolicyKind::Lru).expect("valid test geometry");

    cache.access(0x00); // set 0
    cache.access(0x10); // set 1

    assert!(cache.resident(BlockAddr(0x00)));
    assert!(cache.resident(BlockAddr(0x10)));

    // 0x20 maps back to set 0 and displaces 0x00, not 0x10.
    assert_eq!(
        cache.access(0x20),
        AccessResult::Evict {
            inserted: BlockAddr(0x20),
            victim: BlockAddr(0x00),
        }
    );
    assert!(cache.resident(BlockAddr(0x10)));
}
