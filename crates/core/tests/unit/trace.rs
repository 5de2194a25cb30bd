//! Trace Reading Tests.
//!
//! End-to-end decoding of trace files from disk, and a full replay of a
//! small file-backed trace through the hierarchy.

use std::fs::File;
use std::io::{self, BufReader, Write};

use tempfile::NamedTempFile;

use cachetrace_core::config::SimConfig;
use cachetrace_core::hierarchy::TwoLevel;
use cachetrace_core::trace::{TraceOp, TraceReader, TraceRecord};

/// Writes a trace to a temporary file and decodes it back.
#[test]
fn reads_records_from_disk() {
    let mut file = NamedTempFile::new().expect("temp file");
    write!(
        file,
        "I  0400d7d4,8\n L 7ff000398,8\n S 7ff000390,4\n M 4f6b868,8\n"
    )
    .expect("write trace");

    let reader = File::open(file.path()).expect("reopen trace");
    let records: Vec<TraceRecord> = TraceReader::new(BufReader::new(reader))
        .collect::<io::Result<_>>()
        .expect("decode trace");

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].op, TraceOp::Load);
    assert_eq!(records[0].addr, 0x7ff000398);
    assert_eq!(records[2].op, TraceOp::Modify);
}

/// Replays a file-backed trace end to end and checks the final counter
/// snapshot: the report a run of the tool would print.
#[test]
fn replays_trace_file_through_hierarchy() {
    let mut file = NamedTempFile::new().expect("temp file");
    // 1-set/1-way L1 over a 1-set/2-way L2, 16-byte blocks:
    //   L a0: L1 miss, L2 miss
    //   L b0: L1 evict (a0 demoted), L2 miss
    //   M a0: L1 evict (b0 demoted), L2 hit+evict on a0; +1 L1 hit (modify)
    //   S a0: L1 hit
    write!(file, " L a0,1\n L b0,1\n M a0,1\n S a0,1\n").expect("write trace");

    let config = SimConfig {
        l1_set_bits: 0,
        l1_ways: 1,
        block_bits: 4,
        l2_set_bits: 0,
        l2_ways: 2,
        ..SimConfig::default()
    };
    let mut hierarchy = TwoLevel::new(&config).expect("valid config");

    let reader = File::open(file.path()).expect("reopen trace");
    for record in TraceReader::new(BufReader::new(reader)) {
        let record = record.expect("decode record");
        hierarchy.access(&record);
    }

    let [l1, l2] = hierarchy.summaries();
    assert_eq!(l1.to_string(), "L1 hits:2 misses:3 evictions:2");
    assert_eq!(l2.to_string(), "L2 hits:1 misses:2 evictions:1");
    hierarchy.check_exclusive();
}
