use crate::dht::now_us;

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Operation counters for one storage instance.
#[derive(Debug, Default)]
pub struct StorageStats {
    pub(crate) get_atoms: AtomicUsize,
    pub(crate) got_nodes: AtomicUsize,
    pub(crate) got_links: AtomicUsize,
    pub(crate) get_insets: AtomicUsize,
    pub(crate) get_inlinks: AtomicUsize,
    pub(crate) node_inserts: AtomicUsize,
    pub(crate) link_inserts: AtomicUsize,
    pub(crate) atom_removes: AtomicUsize,
    pub(crate) atom_deletes: AtomicUsize,
    pub(crate) load_count: AtomicUsize,
    pub(crate) store_count: AtomicUsize,
    pub(crate) value_updates: AtomicUsize,
    pub(crate) value_deletes: AtomicUsize,
    pub(crate) value_fetches: AtomicUsize,
    since_us: AtomicU64,
}

/// Point-in-time copy of [`StorageStats`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub get_atoms: usize,
    pub got_nodes: usize,
    pub got_links: usize,
    pub get_insets: usize,
    pub get_inlinks: usize,
    pub node_inserts: usize,
    pub link_inserts: usize,
    pub atom_removes: usize,
    pub atom_deletes: usize,
    pub load_count: usize,
    pub store_count: usize,
    pub value_updates: usize,
    pub value_deletes: usize,
    pub value_fetches: usize,
    /// Microseconds covered by the counters.
    pub elapsed_us: u64,
}

pub(crate) fn bump(counter: &AtomicUsize) {
    counter.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn bump_by(counter: &AtomicUsize, amount: usize) {
    counter.fetch_add(amount, Ordering::Relaxed);
}

impl StorageStats {
    pub fn new() -> Self {
        let stats = Self::default();
        stats.since_us.store(now_us(), Ordering::Relaxed);
        stats
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let read = |counter: &AtomicUsize| counter.load(Ordering::Relaxed);
        StatsSnapshot {
            get_atoms: read(&self.get_atoms),
            got_nodes: read(&self.got_nodes),
            got_links: read(&self.got_links),
            get_insets: read(&self.get_insets),
            get_inlinks: read(&self.get_inlinks),
            node_inserts: read(&self.node_inserts),
            link_inserts: read(&self.link_inserts),
            atom_removes: read(&self.atom_removes),
            atom_deletes: read(&self.atom_deletes),
            load_count: read(&self.load_count),
            store_count: read(&self.store_count),
            value_updates: read(&self.value_updates),
            value_deletes: read(&self.value_deletes),
            value_fetches: read(&self.value_fetches),
            elapsed_us: now_us().saturating_sub(self.since_us.load(Ordering::Relaxed)),
        }
    }

    pub fn clear(&self) {
        for counter in [
            &self.get_atoms,
            &self.got_nodes,
            &self.got_links,
            &self.get_insets,
            &self.get_inlinks,
            &self.node_inserts,
            &self.link_inserts,
            &self.atom_removes,
            &self.atom_deletes,
            &self.load_count,
            &self.store_count,
            &self.value_updates,
            &self.value_deletes,
            &self.value_fetches,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
        self.since_us.store(now_us(), Ordering::Relaxed);
    }
}

impl StatsSnapshot {
    /// Human-readable report.
    pub fn render(&self) -> String {
        let secs = self.elapsed_us as f64 / 1_000_000.0;
        let rate = |count: usize| {
            if secs > 0.0 {
                count as f64 / secs
            } else {
                0.0
            }
        };

        let mut out = String::new();
        out.push_str(&format!("dht-stats: elapsed {:.3} seconds\n", secs));
        out.push_str(&format!(
            "dht-stats: atom fetches={} (nodes={} links={}) {:.1}/sec\n",
            self.get_atoms,
            self.got_nodes,
            self.got_links,
            rate(self.get_atoms)
        ));
        out.push_str(&format!(
            "dht-stats: incoming queries={} links returned={}\n",
            self.get_insets, self.get_inlinks
        ));
        out.push_str(&format!(
            "dht-stats: node inserts={} link inserts={} stores={} {:.1}/sec\n",
            self.node_inserts,
            self.link_inserts,
            self.store_count,
            rate(self.store_count)
        ));
        out.push_str(&format!(
            "dht-stats: removes={} deletes={} loads={}\n",
            self.atom_removes, self.atom_deletes, self.load_count
        ));
        out.push_str(&format!(
            "dht-stats: value updates={} deletes={} fetches={}",
            self.value_updates, self.value_deletes, self.value_fetches
        ));
        out
    }
}
