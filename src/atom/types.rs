use super::value::Value;

use dashmap::DashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Shared pointer to an immutable atom.
pub type Handle = Arc<Atom>;

/// Structural part of an atom.
#[derive(Debug, Clone)]
pub enum AtomKind {
    Node { name: String },
    Link { outgoing: Vec<Handle> },
}

/// An immutable graph node or link carrying a mutable key → value set.
///
/// Identity (equality, hashing) is the canonical short text, computed once at
/// construction. The attached values never take part in identity.
pub struct Atom {
    atom_type: String,
    kind: AtomKind,
    text: String,
    values: DashMap<Handle, Value>,
}

impl Atom {
    /// Creates a node such as `(ConceptNode "cat")`.
    pub fn node(atom_type: impl Into<String>, name: impl Into<String>) -> Handle {
        let atom_type = atom_type.into();
        let name = name.into();
        let text = format!("({} \"{}\")", atom_type, name);

        Arc::new(Self {
            atom_type,
            kind: AtomKind::Node { name },
            text,
            values: DashMap::new(),
        })
    }

    /// Creates a link such as `(ListLink (ConceptNode "a") (ConceptNode "b"))`.
    pub fn link(atom_type: impl Into<String>, outgoing: Vec<Handle>) -> Handle {
        let atom_type = atom_type.into();
        let mut text = format!("({}", atom_type);
        for child in outgoing.iter() {
            text.push(' ');
            text.push_str(&child.text);
        }
        text.push(')');

        Arc::new(Self {
            atom_type,
            kind: AtomKind::Link { outgoing },
            text,
            values: DashMap::new(),
        })
    }

    pub fn atom_type(&self) -> &str {
        &self.atom_type
    }

    pub fn kind(&self) -> &AtomKind {
        &self.kind
    }

    pub fn is_node(&self) -> bool {
        matches!(self.kind, AtomKind::Node { .. })
    }

    pub fn is_link(&self) -> bool {
        matches!(self.kind, AtomKind::Link { .. })
    }

    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            AtomKind::Node { name } => Some(name),
            AtomKind::Link { .. } => None,
        }
    }

    /// Outgoing set; empty for nodes.
    pub fn outgoing(&self) -> &[Handle] {
        match &self.kind {
            AtomKind::Node { .. } => &[],
            AtomKind::Link { outgoing } => outgoing,
        }
    }

    /// Canonical textual form, stable across processes.
    pub fn to_short_string(&self) -> &str {
        &self.text
    }

    // ==================== Values ====================

    pub fn set_value(&self, key: &Handle, value: Value) {
        self.values.insert(key.clone(), value);
    }

    pub fn get_value(&self, key: &Handle) -> Option<Value> {
        self.values.get(key).map(|entry| entry.value().clone())
    }

    pub fn remove_value(&self, key: &Handle) -> Option<Value> {
        self.values.remove(key).map(|(_, value)| value)
    }

    pub fn key_count(&self) -> usize {
        self.values.len()
    }

    /// Keys ordered by their short text.
    pub fn keys(&self) -> Vec<Handle> {
        let mut keys: Vec<Handle> = self.values.iter().map(|entry| entry.key().clone()).collect();
        keys.sort_by(|a, b| a.text.cmp(&b.text));
        keys
    }

    /// Snapshot of the association list, ordered by key text.
    pub fn values(&self) -> Vec<(Handle, Value)> {
        let mut pairs: Vec<(Handle, Value)> = self
            .values
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        pairs.sort_by(|a, b| a.0.text.cmp(&b.0.text));
        pairs
    }

    /// Replaces the whole key set.
    ///
    /// Not atomic with respect to concurrent readers of this atom.
    pub fn replace_values(&self, pairs: Vec<(Handle, Value)>) {
        self.values.clear();
        for (key, value) in pairs {
            self.values.insert(key, value);
        }
    }

    pub fn clear_values(&self) {
        self.values.clear();
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for Atom {}

impl Hash for Atom {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Atom{}", self.text)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
