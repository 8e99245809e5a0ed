//! Entry Reconciler
//!
//! A DHT key may hold several entries at once (concurrent writers, stale
//! replicas). The authoritative one is the greatest under `entry_order`:
//! timestamp first, then writer id, then payload. The last two only break
//! timestamp ties, so the choice never depends on the order `get` returned.

use super::types::DhtEntry;

use std::cmp::Ordering;

/// Total order on entries; greater means more recent.
pub fn entry_order(a: &DhtEntry, b: &DhtEntry) -> Ordering {
    a.timestamp
        .cmp(&b.timestamp)
        .then_with(|| a.writer.cmp(&b.writer))
        .then_with(|| a.payload.cmp(&b.payload))
}

/// The winning entry, or `None` when the key holds nothing.
pub fn select_latest(entries: &[DhtEntry]) -> Option<&DhtEntry> {
    entries.iter().max_by(|a, b| entry_order(a, b))
}

/// Payload of the winning entry.
///
/// Both a missing key and a tombstone come back as the empty string, which
/// decodes to "no keys".
pub fn latest_payload(entries: &[DhtEntry]) -> &str {
    select_latest(entries)
        .map(|entry| entry.payload.as_str())
        .unwrap_or("")
}

/// All entries oldest-first, for ledgers that replay history.
pub fn chronological(mut entries: Vec<DhtEntry>) -> Vec<DhtEntry> {
    entries.sort_by(entry_order);
    entries
}
