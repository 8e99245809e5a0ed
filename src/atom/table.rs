use super::types::{Atom, Handle};

use dashmap::DashMap;
use std::sync::Arc;

/// Turns a freshly decoded atom into the handle callers should use.
///
/// The codec hands every decoded key atom through a resolver, so that values
/// attach to the interned instance rather than a throwaway copy.
pub trait AtomResolver: Send + Sync {
    fn resolve(&self, atom: Handle) -> Handle;
}

/// Local interning table for atoms, keyed by canonical short text.
#[derive(Default)]
pub struct AtomTable {
    atoms: DashMap<String, Handle>,
}

impl AtomTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns an atom (and, for links, its outgoing set).
    ///
    /// Returns the already-present instance when one exists.
    pub fn add(&self, atom: Handle) -> Handle {
        if let Some(existing) = self.atoms.get(atom.to_short_string()) {
            return existing.value().clone();
        }

        let atom = if atom.is_link() {
            let outgoing: Vec<Handle> = atom
                .outgoing()
                .iter()
                .map(|child| self.add(child.clone()))
                .collect();
            let rebuilt = outgoing
                .iter()
                .zip(atom.outgoing())
                .any(|(interned, original)| !Arc::ptr_eq(interned, original));
            if rebuilt {
                let fresh = Atom::link(atom.atom_type(), outgoing);
                for (key, value) in atom.values() {
                    fresh.set_value(&key, value);
                }
                fresh
            } else {
                atom
            }
        } else {
            atom
        };

        self.atoms
            .entry(atom.to_short_string().to_string())
            .or_insert(atom)
            .value()
            .clone()
    }

    pub fn add_node(&self, atom_type: &str, name: &str) -> Handle {
        self.add(Atom::node(atom_type, name))
    }

    pub fn add_link(&self, atom_type: &str, outgoing: Vec<Handle>) -> Handle {
        self.add(Atom::link(atom_type, outgoing))
    }

    pub fn get(&self, text: &str) -> Option<Handle> {
        self.atoms.get(text).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, atom: &Handle) -> bool {
        self.atoms.contains_key(atom.to_short_string())
    }

    pub fn remove(&self, atom: &Handle) -> bool {
        self.atoms.remove(atom.to_short_string()).is_some()
    }

    /// Every atom, ordered by short text.
    pub fn all(&self) -> Vec<Handle> {
        let mut atoms: Vec<Handle> = self.atoms.iter().map(|entry| entry.value().clone()).collect();
        atoms.sort_by(|a, b| a.to_short_string().cmp(b.to_short_string()));
        atoms
    }

    pub fn by_type(&self, atom_type: &str) -> Vec<Handle> {
        self.all()
            .into_iter()
            .filter(|atom| atom.atom_type() == atom_type)
            .collect()
    }

    /// Links in the table whose outgoing set contains `target`.
    pub fn incoming(&self, target: &Handle) -> Vec<Handle> {
        self.all()
            .into_iter()
            .filter(|atom| atom.outgoing().iter().any(|child| child == target))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn clear(&self) {
        self.atoms.clear();
    }
}

impl AtomResolver for AtomTable {
    fn resolve(&self, atom: Handle) -> Handle {
        self.add(atom)
    }
}
