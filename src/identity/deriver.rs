use super::types::Identifier;
use crate::atom::Handle;

use dashmap::DashMap;

const GUID_DOMAIN: &str = "atom-guid";
const MEMBERSHIP_DOMAIN: &str = "membership";
const SPACE_DOMAIN: &str = "space";
const INCOMING_DOMAIN: &str = "incoming";

/// GUID of an atom, from its canonical short text alone.
pub fn guid_of(short_text: &str) -> Identifier {
    Identifier::derive(GUID_DOMAIN, &[short_text.as_bytes()])
}

/// Identity of one atom's value set within the named collection.
pub fn membership_of(guid: &Identifier, collection: &str) -> Identifier {
    Identifier::derive(MEMBERSHIP_DOMAIN, &[collection.as_bytes(), guid.as_bytes()])
}

/// Key of the ledger listing every atom in the collection.
pub fn space_key_of(collection: &str) -> Identifier {
    Identifier::derive(SPACE_DOMAIN, &[collection.as_bytes()])
}

/// Key of the ledger listing the atoms that reference `target`.
pub fn incoming_key_of(collection: &str, target: &Identifier) -> Identifier {
    Identifier::derive(INCOMING_DOMAIN, &[collection.as_bytes(), target.as_bytes()])
}

/// Memoizing identifier derivation for one collection.
///
/// Each cache is its own concurrent map; a shard lock is held only for the
/// single lookup or insert, never across a network wait. Losing the caches
/// costs recomputation only.
pub struct IdentifierDeriver {
    collection: String,
    guids: DashMap<Handle, Identifier>,
    memberships: DashMap<Handle, Identifier>,
    decoded: DashMap<Identifier, Handle>,
}

impl IdentifierDeriver {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            guids: DashMap::new(),
            memberships: DashMap::new(),
            decoded: DashMap::new(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn get_guid(&self, atom: &Handle) -> Identifier {
        if let Some(guid) = self.guids.get(atom) {
            return *guid;
        }

        let guid = guid_of(atom.to_short_string());
        self.guids.insert(atom.clone(), guid);
        self.decoded.entry(guid).or_insert_with(|| atom.clone());
        guid
    }

    /// Membership hash of `atom` in the configured collection.
    pub fn get_membership(&self, atom: &Handle) -> Identifier {
        if let Some(muid) = self.memberships.get(atom) {
            return *muid;
        }

        let muid = membership_of(&self.get_guid(atom), &self.collection);
        self.memberships.insert(atom.clone(), muid);
        muid
    }

    pub fn space_key(&self) -> Identifier {
        space_key_of(&self.collection)
    }

    pub fn incoming_key(&self, target: &Identifier) -> Identifier {
        incoming_key_of(&self.collection, target)
    }

    /// Atom previously seen under `guid`, if any.
    pub fn lookup(&self, guid: &Identifier) -> Option<Handle> {
        self.decoded.get(guid).map(|entry| entry.value().clone())
    }

    /// Records an atom resolved from the DHT under its GUID.
    pub fn remember(&self, guid: Identifier, atom: &Handle) {
        self.decoded.insert(guid, atom.clone());
        self.guids.entry(atom.clone()).or_insert(guid);
    }

    pub fn forget(&self, atom: &Handle) {
        if let Some((_, guid)) = self.guids.remove(atom) {
            self.decoded.remove(&guid);
        }
        self.memberships.remove(atom);
    }

    pub fn cached_guids(&self) -> usize {
        self.guids.len()
    }

    pub fn cached_memberships(&self) -> usize {
        self.memberships.len()
    }

    pub fn clear(&self) {
        self.guids.clear();
        self.memberships.clear();
        self.decoded.clear();
    }
}
