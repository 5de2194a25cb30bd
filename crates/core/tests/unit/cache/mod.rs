//! Unit tests for the set-associative cache level.

/// Hit/miss/eviction behavior of a single cache level.
pub mod cache_ops;
