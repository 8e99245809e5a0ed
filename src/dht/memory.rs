use super::transport::DhtTransport;
use super::types::DhtEntry;
use crate::error::Result;
use crate::identity::Identifier;

use async_trait::async_trait;
use dashmap::DashMap;

/// In-process DHT node.
///
/// Append-only: a put never removes an earlier entry, so readers see every
/// concurrent write and must reconcile, exactly as with a networked DHT.
#[derive(Default)]
pub struct MemoryDht {
    entries: DashMap<Identifier, Vec<DhtEntry>>,
}

impl MemoryDht {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store_local(&self, key: Identifier, entry: DhtEntry) {
        let mut slot = self.entries.entry(key).or_default();
        if !slot.contains(&entry) {
            slot.push(entry);
        }
    }

    pub fn get_local(&self, key: &Identifier) -> Vec<DhtEntry> {
        self.entries
            .get(key)
            .map(|slot| slot.value().clone())
            .unwrap_or_default()
    }

    pub fn key_count(&self) -> usize {
        self.entries.len()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.iter().map(|slot| slot.value().len()).sum()
    }
}

#[async_trait]
impl DhtTransport for MemoryDht {
    async fn put(&self, key: &Identifier, entry: DhtEntry) -> Result<()> {
        self.store_local(*key, entry);
        Ok(())
    }

    async fn get(&self, key: &Identifier) -> Result<Vec<DhtEntry>> {
        Ok(self.get_local(key))
    }

    async fn connected(&self) -> bool {
        true
    }

    async fn barrier(&self) -> Result<()> {
        Ok(())
    }
}
