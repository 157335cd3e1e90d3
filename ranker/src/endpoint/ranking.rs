//! Ranking comparator for endpoint records

use std::cmp::Ordering;

use super::EndpointRecord;

/// Compare two records of the same protocol. `Ordering::Greater` means `a`
/// is the better endpoint.
///
/// Rules, first match wins:
/// 1. a failed record (`height == -1`) is worse than any other record
/// 2. higher height is better
/// 3. on equal height, unknown latency (`-1`) is worse than a known one
/// 4. on equal height with known latencies, lower latency is better
/// 5. otherwise the records tie
pub fn compare_health(a: &EndpointRecord, b: &EndpointRecord) -> Ordering {
    match (a.is_failed(), b.is_failed()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        (false, false) => {}
    }

    if a.height != b.height {
        return a.height.cmp(&b.height);
    }

    match (a.has_known_latency(), b.has_known_latency()) {
        (false, false) => return Ordering::Equal,
        (false, true) => return Ordering::Less,
        (true, false) => return Ordering::Greater,
        (true, true) => {}
    }

    b.latency.total_cmp(&a.latency)
}

/// Stable descending sort, best endpoint first
pub fn sort_best_first(records: &mut [EndpointRecord]) {
    records.sort_by(|a, b| compare_health(b, a));
}
