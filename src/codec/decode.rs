use super::parser::{SExpr, parse_complete, parse_expr};
use crate::atom::{Atom, AtomResolver, Handle, Value};
use crate::error::{Result, StorageError};

/// Decodes a single value spanning the whole of `text`.
pub fn decode_value(text: &str) -> Result<Value> {
    let expr = parse_complete(text)?;
    value_from_expr(&expr, text)
}

/// Decodes one value starting at byte `cursor`.
///
/// Returns the value and the cursor advanced past its closing parenthesis.
pub fn decode_value_at(text: &str, cursor: usize) -> Result<(Value, usize)> {
    let (expr, end) = parse_expr(text, cursor)?;
    Ok((value_from_expr(&expr, text)?, end))
}

/// Converts a parsed expression into a `Value`.
///
/// Tags are tried in a fixed order; the first match wins.
pub fn value_from_expr(expr: &SExpr, text: &str) -> Result<Value> {
    let items = expr
        .as_list()
        .ok_or_else(|| StorageError::syntax("Expected a parenthesized value", expr.source(text)))?;
    let args = items.get(1..).unwrap_or_default();

    match expr.head() {
        Some("LinkValue") => {
            let mut children = Vec::with_capacity(args.len());
            for child in args {
                if child.as_list().is_none() {
                    return Err(StorageError::syntax("Malformed LinkValue", expr.source(text)));
                }
                children.push(value_from_expr(child, text)?);
            }
            Ok(Value::Link(children))
        }
        Some("FloatValue") => Ok(Value::Float(numbers("FloatValue", expr, args, text)?)),
        Some("SimpleTruthValue") | Some("stv") => {
            let fields = fixed_numbers("SimpleTruthValue", expr, args, 2, text)?;
            Ok(Value::stv(fields[0], fields[1]))
        }
        Some("CountTruthValue") => {
            let fields = fixed_numbers("CountTruthValue", expr, args, 3, text)?;
            Ok(Value::ctv(fields[0], fields[1], fields[2]))
        }
        Some("StringValue") => {
            let mut strings = Vec::with_capacity(args.len());
            for arg in args {
                let item = arg.as_quoted().ok_or_else(|| {
                    StorageError::syntax("Malformed StringValue", expr.source(text))
                })?;
                strings.push(item.to_string());
            }
            Ok(Value::String(strings))
        }
        _ => Err(StorageError::syntax("Unknown Value", expr.source(text))),
    }
}

fn numbers(tag: &str, expr: &SExpr, args: &[SExpr], text: &str) -> Result<Vec<f64>> {
    args.iter()
        .map(|arg| {
            arg.as_symbol()
                .and_then(|word| word.parse::<f64>().ok())
                .ok_or_else(|| StorageError::syntax(format!("Malformed {}", tag), expr.source(text)))
        })
        .collect()
}

fn fixed_numbers(
    tag: &str,
    expr: &SExpr,
    args: &[SExpr],
    arity: usize,
    text: &str,
) -> Result<Vec<f64>> {
    if args.len() != arity {
        return Err(StorageError::syntax(
            format!("Malformed {}: expected {} fields, got {}", tag, arity, args.len()),
            expr.source(text),
        ));
    }
    numbers(tag, expr, args, text)
}

// ==================== Atoms ====================

/// Decodes an atom such as `(ListLink (ConceptNode "a"))` and resolves it.
pub fn decode_atom(text: &str, resolver: &dyn AtomResolver) -> Result<Handle> {
    let expr = parse_complete(text)?;
    Ok(resolver.resolve(atom_from_expr(&expr, text)?))
}

/// Builds an (unresolved) atom from a parsed expression.
pub fn atom_from_expr(expr: &SExpr, text: &str) -> Result<Handle> {
    let items = expr
        .as_list()
        .ok_or_else(|| StorageError::syntax("Expected a parenthesized atom", expr.source(text)))?;
    let atom_type = expr
        .head()
        .ok_or_else(|| StorageError::syntax("Missing atom type", expr.source(text)))?;
    let args = &items[1..];

    if atom_type.ends_with("Node") {
        match args {
            [name] => {
                let name = name
                    .as_quoted()
                    .ok_or_else(|| StorageError::syntax("Malformed node name", expr.source(text)))?;
                Ok(Atom::node(atom_type, name))
            }
            _ => Err(StorageError::syntax("Malformed node", expr.source(text))),
        }
    } else if atom_type.ends_with("Link") {
        let outgoing = args
            .iter()
            .map(|child| atom_from_expr(child, text))
            .collect::<Result<Vec<_>>>()?;
        Ok(Atom::link(atom_type, outgoing))
    } else {
        Err(StorageError::syntax("Unknown atom type", expr.source(text)))
    }
}

// ==================== Association lists ====================

/// Decodes `((KEY . VALUE)...)` into resolved key handles and values.
///
/// An empty payload is a tombstone and decodes to no pairs. Keys reach the
/// resolver only once the whole payload has decoded.
pub fn decode_alist(text: &str, resolver: &dyn AtomResolver) -> Result<Vec<(Handle, Value)>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let expr = parse_complete(text)?;
    let pairs = expr
        .as_list()
        .ok_or_else(|| StorageError::syntax("Expected an association list", expr.source(text)))?;

    let mut decoded = Vec::with_capacity(pairs.len());
    for pair in pairs {
        match pair.as_list() {
            Some([key, dot, value]) if dot.as_symbol() == Some(".") => {
                let key = atom_from_expr(key, text)?;
                let value = value_from_expr(value, text)?;
                decoded.push((key, value));
            }
            _ => {
                return Err(StorageError::syntax(
                    "Malformed association list pair",
                    pair.source(text),
                ));
            }
        }
    }
    Ok(decoded
        .into_iter()
        .map(|(key, value)| (resolver.resolve(key), value))
        .collect())
}

/// Decodes `text` and makes it the complete key set of `atom`.
///
/// Nothing is attached unless the whole payload decodes. Returns the number
/// of keys now on the atom.
pub fn decode_alist_onto(
    atom: &Handle,
    text: &str,
    resolver: &dyn AtomResolver,
) -> Result<usize> {
    let pairs = decode_alist(text, resolver)?;
    let count = pairs.len();
    atom.replace_values(pairs);
    Ok(count)
}
