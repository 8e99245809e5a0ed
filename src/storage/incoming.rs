use super::ledger::Ledger;
use crate::error::Result;
use crate::identity::{Identifier, incoming_key_of};

/// "Who references X": one ledger per target atom, listing the GUIDs of the
/// links whose outgoing set contains it.
#[derive(Clone)]
pub struct IncomingIndex {
    ledger: Ledger,
    collection: String,
}

impl IncomingIndex {
    pub fn new(ledger: Ledger, collection: impl Into<String>) -> Self {
        Self {
            ledger,
            collection: collection.into(),
        }
    }

    pub async fn record_reference(&self, source: &Identifier, target: &Identifier) -> Result<()> {
        tracing::debug!("incoming {} += {}", target, source);
        self.ledger
            .add(&incoming_key_of(&self.collection, target), source)
            .await
    }

    pub async fn forget_reference(&self, source: &Identifier, target: &Identifier) -> Result<()> {
        tracing::debug!("incoming {} -= {}", target, source);
        self.ledger
            .remove(&incoming_key_of(&self.collection, target), source)
            .await
    }

    /// GUIDs of the atoms currently referencing `target`.
    pub async fn sources(&self, target: &Identifier) -> Result<Vec<Identifier>> {
        self.ledger
            .members(&incoming_key_of(&self.collection, target))
            .await
    }
}
