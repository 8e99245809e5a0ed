//! Atom Model
//!
//! The minimal graph-side collaborator the backing store needs: immutable
//! nodes and links with a canonical short text, a mutable key → value set on
//! each atom, and a local interning table that doubles as the resolver used
//! while decoding association lists.
//!
//! ## Core Concepts
//! - **Identity**: two atoms are the same atom iff their short text is equal.
//! - **Values**: keys are atoms themselves; a value is one of the closed
//!   `Value` variants.
//! - **Interning**: `AtomTable` hands back one shared `Handle` per structure.

pub mod table;
pub mod types;
pub mod value;

pub use table::{AtomResolver, AtomTable};
pub use types::{Atom, AtomKind, Handle};
pub use value::Value;
