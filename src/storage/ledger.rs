//! Append-only set ledgers.
//!
//! A ledger key collects `+<hex>` and `-<hex>` entries. Replaying them in
//! reconciler order gives the current set: the latest operation on a member
//! decides whether it is in.

use crate::dht::{DhtEntry, DhtTransport, EntryWriter, chronological};
use crate::error::{Result, StorageError};
use crate::identity::Identifier;

use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerOp {
    Add(Identifier),
    Remove(Identifier),
}

impl LedgerOp {
    pub fn encode(&self) -> String {
        match self {
            Self::Add(member) => format!("+{}", member),
            Self::Remove(member) => format!("-{}", member),
        }
    }

    pub fn parse(payload: &str) -> Result<Self> {
        if let Some(hex) = payload.strip_prefix('+') {
            Ok(Self::Add(Identifier::from_hex(hex)?))
        } else if let Some(hex) = payload.strip_prefix('-') {
            Ok(Self::Remove(Identifier::from_hex(hex)?))
        } else {
            Err(StorageError::syntax("Malformed ledger entry", payload))
        }
    }
}

/// Current members after replaying `entries`, ordered by identifier.
///
/// Empty payloads carry no operation and are skipped.
pub fn replay(entries: Vec<DhtEntry>) -> Result<Vec<Identifier>> {
    let mut state: BTreeMap<Identifier, bool> = BTreeMap::new();
    for entry in chronological(entries) {
        if entry.is_tombstone() {
            continue;
        }
        match LedgerOp::parse(&entry.payload)? {
            LedgerOp::Add(member) => state.insert(member, true),
            LedgerOp::Remove(member) => state.insert(member, false),
        };
    }

    Ok(state
        .into_iter()
        .filter_map(|(member, present)| present.then_some(member))
        .collect())
}

#[derive(Clone)]
pub struct Ledger {
    transport: Arc<dyn DhtTransport>,
    writer: Arc<EntryWriter>,
}

impl Ledger {
    pub fn new(transport: Arc<dyn DhtTransport>, writer: Arc<EntryWriter>) -> Self {
        Self { transport, writer }
    }

    pub async fn add(&self, key: &Identifier, member: &Identifier) -> Result<()> {
        self.append(key, LedgerOp::Add(*member)).await
    }

    pub async fn remove(&self, key: &Identifier, member: &Identifier) -> Result<()> {
        self.append(key, LedgerOp::Remove(*member)).await
    }

    pub async fn members(&self, key: &Identifier) -> Result<Vec<Identifier>> {
        replay(self.transport.get(key).await?)
    }

    async fn append(&self, key: &Identifier, op: LedgerOp) -> Result<()> {
        self.transport
            .put(key, self.writer.entry(op.encode()))
            .await
    }
}
