//! Value Codec
//!
//! Text encoding of values and association lists, and the recursive-descent
//! decoder that reads them back.
//!
//! ## Wire format
//! - `(FloatValue d1 d2 ...)`, full round-trip precision
//! - `(LinkValue (child1)(child2)...)`
//! - `(stv strength confidence)`, also read as `(SimpleTruthValue ...)`
//! - `(CountTruthValue strength confidence count)`
//! - `(StringValue "s1" "s2" ...)`
//! - association list: `((KEY . VALUE)(KEY2 . VALUE2)...)`; `""` is a tombstone
//!
//! ## Pipeline
//! `lexer` produces spanned tokens, `parser` builds an `SExpr` tree, and
//! `decode` maps the tree onto `Value`s and atoms. `encode` is the inverse.
//!
//! Quotes inside strings are not escaped on either side; a string holding a
//! `"` does not survive a round trip.

pub mod decode;
pub mod encode;
pub mod lexer;
pub mod parser;

pub use decode::{
    atom_from_expr, decode_alist, decode_alist_onto, decode_atom, decode_value, decode_value_at,
    value_from_expr,
};
pub use encode::{encode_alist, encode_atom_values, encode_value, format_double, nesting_depth};
pub use parser::{MAX_DEPTH, SExpr, SExprKind, parse_complete, parse_expr};
