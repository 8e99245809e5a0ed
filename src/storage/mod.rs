//! DHT Backing Store
//!
//! Persists atoms and their value sets into a DHT and rebuilds them on demand.
//!
//! ## Core Concepts
//! - **Orchestration**: `DhtAtomStorage` encodes through the codec, derives
//!   keys through the `IdentifierDeriver`, and writes through a
//!   `DhtTransport`. Reads reconcile before decoding.
//! - **Ledgers**: set-valued records (the atoms of a collection, the
//!   referrers of an atom) are append-only `+`/`-` logs replayed in
//!   reconciler order.
//! - **Recursion**: storing an atom first publishes every atom it depends on,
//!   using a work-list so that cyclic key graphs terminate.

pub mod atom_storage;
pub mod incoming;
pub mod ledger;
pub mod stats;

pub use atom_storage::DhtAtomStorage;
pub use incoming::IncomingIndex;
pub use ledger::{Ledger, LedgerOp, replay};
pub use stats::{StatsSnapshot, StorageStats};
