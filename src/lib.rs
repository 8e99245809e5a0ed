//! DHT-backed persistence for atom values.
//!
//! This library crate stores the mutable key → value sets attached to
//! immutable graph atoms in a distributed hash table, and rebuilds them on
//! demand. The demo node binary (`main.rs`) serves an in-process DHT over HTTP.
//!
//! ## Architecture Modules
//! - **`atom`**: the graph-side collaborator: atoms, values, an interning table.
//! - **`identity`**: content-addressed identifiers (GUIDs, membership hashes)
//!   and their per-process caches.
//! - **`codec`**: the s-expression value codec, a lexer plus recursive-descent
//!   parser.
//! - **`dht`**: the transport trait, in-process and HTTP transports, and the
//!   timestamp reconciler.
//! - **`storage`**: the store/fetch orchestrator (`DhtAtomStorage`), set
//!   ledgers, the incoming-set index and operation statistics.
//! - **`config`**: storage URIs and knobs.

pub mod atom;
pub mod codec;
pub mod config;
pub mod dht;
pub mod error;
pub mod identity;
pub mod storage;

pub use config::StorageConfig;
pub use error::{Result, StorageError};
pub use storage::DhtAtomStorage;
