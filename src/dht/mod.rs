//! DHT Transport Layer
//!
//! The put/get service the backing store writes through, and the rule for
//! choosing among the entries one key may hold.
//!
//! ## Core Concepts
//! - **Entries**: a key maps to many `DhtEntry` records (payload, timestamp,
//!   writer). Writing never removes anything; deletion is a newer tombstone.
//! - **Reconciliation**: `reconcile::select_latest` picks the authoritative
//!   entry by a total order, so every reader agrees.
//! - **Transports**: `MemoryDht` holds entries in process; `HttpDht` talks to
//!   `MemoryDht` peers served by `handlers::router`.

pub mod handlers;
pub mod http;
pub mod memory;
pub mod protocol;
pub mod reconcile;
pub mod transport;
pub mod types;

pub use http::HttpDht;
pub use memory::MemoryDht;
pub use reconcile::{chronological, entry_order, latest_payload, select_latest};
pub use transport::DhtTransport;
pub use types::{Clock, DhtEntry, EntryWriter, WriterId, now_us};

#[cfg(test)]
mod tests;
