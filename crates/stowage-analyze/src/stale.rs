//! Ranking of files by staleness.
//!
//! Files are ordered by last access time, oldest first. Equal access times
//! fall back to the path compared as raw bytes, so the ranking is the same
//! on every run over the same records.

use std::cmp::Ordering;
use std::path::PathBuf;

use itertools::Itertools;

use stowage_core::FileRecord;

/// Total order used for ranking: access time ascending, then path.
pub fn stale_order(a: &FileRecord, b: &FileRecord) -> Ordering {
    a.last_accessed
        .cmp(&b.last_accessed)
        .then_with(|| a.path.as_os_str().cmp(b.path.as_os_str()))
}

/// The `n` least recently accessed records, oldest first.
///
/// Runs a bounded selection, so only `n` records are held at a time no
/// matter how large the input is.
pub fn rank_stale_records(records: &[FileRecord], n: usize) -> Vec<&FileRecord> {
    records.iter().k_smallest_by(n, |a, b| stale_order(a, b)).collect()
}

/// Paths of the `n` least recently accessed files, oldest first.
///
/// Returns every path when there are fewer than `n` records.
pub fn rank_stale(records: &[FileRecord], n: usize) -> Vec<PathBuf> {
    rank_stale_records(records, n)
        .into_iter()
        .map(|record| record.path.clone())
        .collect()
}
