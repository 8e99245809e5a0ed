use super::types::DhtEntry;
use crate::error::Result;
use crate::identity::Identifier;

use async_trait::async_trait;

/// The put/get service the backing store writes through.
///
/// Implementations own routing, replication and retry. The store only relies
/// on these four operations.
#[async_trait]
pub trait DhtTransport: Send + Sync {
    /// Adds an entry under `key`. Existing entries are kept.
    async fn put(&self, key: &Identifier, entry: DhtEntry) -> Result<()>;

    /// Every entry currently held under `key`, in no particular order.
    async fn get(&self, key: &Identifier) -> Result<Vec<DhtEntry>>;

    /// Whether the transport can currently reach the network.
    async fn connected(&self) -> bool;

    /// Returns once every previously issued put is acknowledged.
    async fn barrier(&self) -> Result<()>;
}
