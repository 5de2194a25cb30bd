//! Memory-access trace records and the trace reader.
//!
//! Traces are text files of valgrind-style records, one access per line:
//!
//! ```text
//!  L 7ff000398,8
//!  S 7ff000390,4
//!  M 4f6b868,8
//! I  04f6b868,8
//! ```
//!
//! `L`oad, `S`tore, and `M`odify records drive the simulation; anything
//! else (instruction-fetch `I` lines, comments, damaged lines) is skipped
//! by the reader rather than treated as an error.

use std::io::{self, BufRead};
use std::str::FromStr;

use thiserror::Error;
use tracing::warn;

/// Trace operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceOp {
    /// Data load.
    Load,
    /// Data store.
    Store,
    /// Load immediately followed by a store to the same address; the
    /// store leg always hits in L1.
    Modify,
}

impl TraceOp {
    /// Single-character spelling used in trace files.
    pub fn as_char(self) -> char {
        match self {
            Self::Load => 'L',
            Self::Store => 'S',
            Self::Modify => 'M',
        }
    }
}

/// One decoded trace record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceRecord {
    /// Operation kind.
    pub op: TraceOp,
    /// Raw (un-aligned) access address, hexadecimal in the trace file.
    pub addr: u64,
    /// Access size in bytes. Carried for display; the block granularity
    /// of the caches makes it irrelevant to hit/miss behavior.
    pub size: u32,
}

/// A trace line that does not decode to a record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TraceParseError {
    /// Blank line.
    #[error("empty trace line")]
    Empty,

    /// Operation character outside {L, S, M}.
    #[error("unrecognized operation `{0}`")]
    UnknownOp(char),

    /// Missing or undecodable `address,size` payload.
    #[error("malformed access field `{0}`")]
    BadAccess(String),
}

impl FromStr for TraceRecord {
    type Err = TraceParseError;

    /// Decodes ` <op> <hex-address>,<size>`. Leading whitespace is
    /// tolerated, matching the original trace format.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim_start();
        let mut chars = s.chars();
        let op = match chars.next() {
            None => return Err(TraceParseError::Empty),
            Some('L') => TraceOp::Load,
            Some('S') => TraceOp::Store,
            Some('M') => TraceOp::Modify,
            Some(other) => return Err(TraceParseError::UnknownOp(other)),
        };

        let rest = chars.as_str().trim();
        let (addr, size) = rest
            .split_once(',')
            .ok_or_else(|| TraceParseError::BadAccess(rest.to_string()))?;
        let addr = u64::from_str_radix(addr.trim().trim_start_matches("0x"), 16)
            .map_err(|_| TraceParseError::BadAccess(rest.to_string()))?;
        let size = size
            .trim()
            .parse::<u32>()
            .map_err(|_| TraceParseError::BadAccess(rest.to_string()))?;

        Ok(Self { op, addr, size })
    }
}

/// Streaming trace reader.
///
/// Yields decoded records in file order, skipping undecodable and
/// non-data lines; only I/O failures are surfaced to the caller.
#[derive(Debug)]
pub struct TraceReader<R> {
    lines: io::Lines<R>,
    line_no: u64,
}

impl<R: BufRead> TraceReader<R> {
    /// Wraps a buffered reader positioned at the start of a trace.
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = io::Result<TraceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e)),
            };
            self.line_no += 1;

            match line.parse::<TraceRecord>() {
                Ok(record) => return Some(Ok(record)),
                // Instruction-fetch lines and blank lines are expected
                // noise; anything else gets a warning before the skip.
                Err(TraceParseError::Empty | TraceParseError::UnknownOp(_)) => {}
                Err(e) => warn!(line = self.line_no, error = %e, "skipping trace line"),
            }
        }
    }
}
