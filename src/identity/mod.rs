//! Identifier Derivation
//!
//! Deterministic content hashes used as DHT keys.
//!
//! - **GUID**: one per atom, from its canonical short text.
//! - **Membership hash**: one per (atom, collection); the key holding the
//!   atom's association list.
//! - **Space / incoming keys**: ledgers of the atoms in a collection and of
//!   the atoms referencing a given atom.
//!
//! Derivation is a pure function of its input, so identifiers survive process
//! restarts. `IdentifierDeriver` adds per-process memoization on top.

pub mod deriver;
pub mod types;

pub use deriver::{IdentifierDeriver, guid_of, incoming_key_of, membership_of, space_key_of};
pub use types::Identifier;
