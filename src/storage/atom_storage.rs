use super::incoming::IncomingIndex;
use super::ledger::Ledger;
use super::stats::{StatsSnapshot, StorageStats, bump, bump_by};
use crate::atom::{Atom, AtomTable, Handle};
use crate::codec::{MAX_DEPTH, decode_alist_onto, decode_atom, encode_atom_values, nesting_depth};
use crate::config::StorageConfig;
use crate::dht::{DhtTransport, EntryWriter, chronological, latest_payload};
use crate::error::{Result, StorageError};
use crate::identity::{Identifier, IdentifierDeriver, guid_of, membership_of};

use dashmap::DashSet;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

/// Atom persistence on top of a DHT transport.
///
/// Every atom has three kinds of DHT records:
/// - its short text under its GUID (a `""` record means removed),
/// - its association list under its membership hash,
/// - a `+guid` entry in the collection's space ledger, and one in the
///   incoming ledger of each atom it references.
///
/// Writes issued while recursing into dependent atoms are not rolled back
/// when a later write fails.
pub struct DhtAtomStorage {
    config: StorageConfig,
    transport: Arc<dyn DhtTransport>,
    writer: Arc<EntryWriter>,
    ids: IdentifierDeriver,
    table: Arc<AtomTable>,
    published: DashSet<Handle>,
    space: Ledger,
    incoming: IncomingIndex,
    stats: StorageStats,
    pending: Mutex<PendingStores>,
}

/// Background stores not yet reported by a barrier.
#[derive(Default)]
struct PendingStores {
    tasks: JoinSet<Result<()>>,
    failures: Vec<StorageError>,
}

impl PendingStores {
    fn record(&mut self, joined: std::result::Result<Result<()>, tokio::task::JoinError>) {
        let outcome = match joined {
            Ok(outcome) => outcome,
            Err(e) => Err(StorageError::Internal(format!("store task failed: {}", e))),
        };
        if let Err(e) = outcome {
            self.failures.push(e);
        }
    }

    /// Collects tasks that already finished, without waiting.
    fn reap(&mut self) {
        while let Some(joined) = self.tasks.try_join_next() {
            self.record(joined);
        }
    }
}

impl DhtAtomStorage {
    /// Opens the store named by `uri`, e.g. `dht:///animals`.
    pub fn open(uri: &str) -> Result<Arc<Self>> {
        Ok(Self::new(StorageConfig::from_uri(uri)?))
    }

    pub fn new(config: StorageConfig) -> Arc<Self> {
        let transport = config.transport();
        Self::with_transport(config, transport)
    }

    /// Store over an explicit transport, e.g. a `MemoryDht` shared by
    /// several stores.
    pub fn with_transport(config: StorageConfig, transport: Arc<dyn DhtTransport>) -> Arc<Self> {
        let writer = Arc::new(EntryWriter::new());
        let ledger = Ledger::new(transport.clone(), writer.clone());

        tracing::info!(
            "Opening {} (collection '{}', {} peers{})",
            config.uri,
            config.collection,
            config.peers.len(),
            if config.observe_only { ", observe-only" } else { "" }
        );

        Arc::new(Self {
            ids: IdentifierDeriver::new(config.collection.clone()),
            incoming: IncomingIndex::new(ledger.clone(), config.collection.clone()),
            space: ledger,
            config,
            transport,
            writer,
            table: Arc::new(AtomTable::new()),
            published: DashSet::new(),
            stats: StorageStats::new(),
            pending: Mutex::new(PendingStores::default()),
        })
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Local table that fetched atoms are interned into.
    pub fn table(&self) -> &Arc<AtomTable> {
        &self.table
    }

    pub fn deriver(&self) -> &IdentifierDeriver {
        &self.ids
    }

    pub fn is_published(&self, atom: &Handle) -> bool {
        self.published.contains(atom)
    }

    fn check_writable(&self, operation: &str) -> Result<()> {
        if self.config.observe_only {
            return Err(StorageError::observing_only(operation));
        }
        Ok(())
    }

    // ==================== Values ====================

    /// Writes the atom's complete value set as one entry.
    ///
    /// An atom without keys only clobbers the remote set when that set is
    /// non-empty, so a bare atom costs a get but no put. A value set whose
    /// wire form nests deeper than the decoder accepts is refused before
    /// anything is written.
    pub async fn store_values(&self, atom: &Handle) -> Result<()> {
        self.check_writable("store_values")?;
        let muid = self.ids.get_membership(atom);

        if atom.key_count() == 0 {
            let entries = self.transport.get(&muid).await?;
            if !latest_payload(&entries).is_empty() {
                self.delete_values(atom).await?;
            }
            return Ok(());
        }

        let alist = encode_atom_values(atom);
        if nesting_depth(&alist) > MAX_DEPTH {
            return Err(StorageError::syntax(
                format!("Value set nests deeper than {}", MAX_DEPTH),
                atom.to_short_string(),
            ));
        }

        for key in atom.keys() {
            self.ensure_published(&key).await?;
        }

        tracing::debug!("values {} <- {}", atom, alist);
        self.transport.put(&muid, self.writer.entry(alist)).await?;
        bump(&self.stats.value_updates);
        Ok(())
    }

    /// Tombstones the remote value set. Local values are left alone.
    pub async fn delete_values(&self, atom: &Handle) -> Result<()> {
        self.check_writable("delete_values")?;
        let muid = self.ids.get_membership(atom);
        self.transport.put(&muid, self.writer.tombstone()).await?;
        bump(&self.stats.value_deletes);
        Ok(())
    }

    /// Replaces the atom's local key set with the latest remote one.
    ///
    /// On a decode failure the atom keeps its current keys.
    pub async fn fetch_values(&self, atom: &Handle) -> Result<Handle> {
        let muid = self.ids.get_membership(atom);
        let entries = self.transport.get(&muid).await?;
        let alist = latest_payload(&entries);

        let count = decode_alist_onto(atom, alist, self.table.as_ref())?;
        tracing::debug!("values {} -> {} keys", atom, count);
        bump(&self.stats.value_fetches);
        Ok(atom.clone())
    }

    // ==================== Atoms ====================

    /// Publishes the atom, everything it depends on, and its values.
    ///
    /// With `synchronous == false` the write runs in the background and its
    /// outcome is reported by the next [`barrier`](Self::barrier).
    pub async fn store_atom(self: &Arc<Self>, atom: &Handle, synchronous: bool) -> Result<()> {
        self.check_writable("store_atom")?;

        if synchronous {
            return self.store_atom_now(atom).await;
        }

        let this = self.clone();
        let atom = atom.clone();
        let mut pending = self.pending.lock().await;
        pending.reap();
        pending
            .tasks
            .spawn(async move { this.store_atom_now(&atom).await });
        Ok(())
    }

    /// Background stores still running or finished but not yet reaped.
    pub async fn pending_stores(&self) -> usize {
        self.pending.lock().await.tasks.len()
    }

    async fn store_atom_now(&self, atom: &Handle) -> Result<()> {
        self.ensure_published(atom).await?;
        self.store_values(atom).await
    }

    /// Publishes `root` and every atom reachable through outgoing sets and
    /// value keys, children before parents.
    ///
    /// Atoms already published are skipped; the visited set ends cycles
    /// that run through keys.
    async fn ensure_published(&self, root: &Handle) -> Result<()> {
        let mut visited: HashSet<Handle> = HashSet::new();
        let mut stack: Vec<(Handle, bool)> = vec![(root.clone(), false)];

        while let Some((atom, expanded)) = stack.pop() {
            if expanded {
                self.publish_atom(&atom).await?;
                continue;
            }
            if self.published.contains(&atom) || !visited.insert(atom.clone()) {
                continue;
            }

            let mut deps: Vec<Handle> = atom.outgoing().to_vec();
            deps.extend(atom.keys());
            stack.push((atom, true));
            for dep in deps.into_iter().rev() {
                if !visited.contains(&dep) {
                    stack.push((dep, false));
                }
            }
        }
        Ok(())
    }

    async fn publish_atom(&self, atom: &Handle) -> Result<()> {
        let guid = self.ids.get_guid(atom);
        self.transport
            .put(&guid, self.writer.entry(atom.to_short_string()))
            .await?;
        self.space.add(&self.ids.space_key(), &guid).await?;

        if atom.is_link() {
            let mut seen = HashSet::new();
            for target in atom.outgoing() {
                let target_guid = self.ids.get_guid(target);
                if seen.insert(target_guid) {
                    self.incoming.record_reference(&guid, &target_guid).await?;
                }
            }
            bump(&self.stats.link_inserts);
        } else {
            bump(&self.stats.node_inserts);
        }

        tracing::debug!("published {} as {}", atom, guid);
        self.published.insert(atom.clone());
        bump(&self.stats.store_count);
        Ok(())
    }

    /// Reads the atom record under `guid` and interns the atom.
    ///
    /// `None` when the record is missing or removed.
    async fn load_record(&self, guid: &Identifier) -> Result<Option<Handle>> {
        let entries = self.transport.get(guid).await?;
        let text = latest_payload(&entries);
        if text.is_empty() {
            return Ok(None);
        }

        let atom = match self.ids.lookup(guid) {
            Some(cached) if cached.to_short_string() == text => self.table.add(cached),
            _ => decode_atom(text, self.table.as_ref())?,
        };
        if guid_of(atom.to_short_string()) != *guid {
            return Err(StorageError::syntax(
                "Atom record does not match its identifier",
                text,
            ));
        }

        self.ids.remember(*guid, &atom);
        bump(&self.stats.get_atoms);
        Ok(Some(atom))
    }

    /// Resolves `guid` to an atom with its values.
    pub async fn fetch_atom(&self, guid: &Identifier) -> Result<Option<Handle>> {
        match self.load_record(guid).await? {
            Some(atom) => Ok(Some(self.fetch_values(&atom).await?)),
            None => Ok(None),
        }
    }

    pub async fn get_node(&self, atom_type: &str, name: &str) -> Result<Option<Handle>> {
        let guid = guid_of(Atom::node(atom_type, name).to_short_string());
        let found = self.fetch_atom(&guid).await?;
        if found.is_some() {
            bump(&self.stats.got_nodes);
        }
        Ok(found)
    }

    pub async fn get_link(&self, atom_type: &str, outgoing: Vec<Handle>) -> Result<Option<Handle>> {
        let guid = guid_of(Atom::link(atom_type, outgoing).to_short_string());
        let found = self.fetch_atom(&guid).await?;
        if found.is_some() {
            bump(&self.stats.got_links);
        }
        Ok(found)
    }

    /// Removes the atom from the collection.
    ///
    /// With `recursive`, every link referencing it (transitively) goes first.
    pub async fn remove_atom(&self, atom: &Handle, recursive: bool) -> Result<()> {
        self.check_writable("remove_atom")?;
        bump(&self.stats.atom_removes);

        if !recursive {
            return self.delete_atom(atom).await;
        }

        let mut visited: HashSet<Handle> = HashSet::new();
        let mut stack: Vec<(Handle, bool)> = vec![(atom.clone(), false)];
        while let Some((current, expanded)) = stack.pop() {
            if expanded {
                self.delete_atom(&current).await?;
                continue;
            }
            if !visited.insert(current.clone()) {
                continue;
            }

            let guid = self.ids.get_guid(&current);
            let sources = self.incoming.sources(&guid).await?;
            stack.push((current, true));
            for source in sources {
                if let Some(referrer) = self.load_record(&source).await?
                    && !visited.contains(&referrer)
                {
                    stack.push((referrer, false));
                }
            }
        }
        Ok(())
    }

    async fn delete_atom(&self, atom: &Handle) -> Result<()> {
        let guid = self.ids.get_guid(atom);
        let muid = self.ids.get_membership(atom);

        self.transport.put(&guid, self.writer.tombstone()).await?;
        self.transport.put(&muid, self.writer.tombstone()).await?;
        self.space.remove(&self.ids.space_key(), &guid).await?;

        let mut seen = HashSet::new();
        for target in atom.outgoing() {
            let target_guid = self.ids.get_guid(target);
            if seen.insert(target_guid) {
                self.incoming.forget_reference(&guid, &target_guid).await?;
            }
        }

        self.published.remove(atom);
        self.table.remove(atom);
        tracing::debug!("removed {}", atom);
        bump(&self.stats.atom_deletes);
        Ok(())
    }

    // ==================== Incoming sets ====================

    /// Links currently referencing `atom`, with their values.
    pub async fn get_incoming_set(&self, atom: &Handle) -> Result<Vec<Handle>> {
        bump(&self.stats.get_insets);
        let guid = self.ids.get_guid(atom);

        let mut links = Vec::new();
        for source in self.incoming.sources(&guid).await? {
            if let Some(link) = self.fetch_atom(&source).await? {
                links.push(link);
            }
        }
        bump_by(&self.stats.get_inlinks, links.len());
        Ok(links)
    }

    pub async fn get_incoming_by_type(&self, atom: &Handle, atom_type: &str) -> Result<Vec<Handle>> {
        Ok(self
            .get_incoming_set(atom)
            .await?
            .into_iter()
            .filter(|link| link.atom_type() == atom_type)
            .collect())
    }

    // ==================== Bulk ====================

    /// Fetches every atom in the collection into the local table.
    ///
    /// Returns the number of atoms loaded.
    pub async fn load_atomspace(&self) -> Result<usize> {
        let members = self.space.members(&self.ids.space_key()).await?;
        tracing::info!("Loading {} atoms from '{}'", members.len(), self.config.collection);

        let mut loaded = 0;
        for guid in members.iter() {
            if self.fetch_atom(guid).await?.is_some() {
                loaded += 1;
            }
        }
        bump(&self.stats.load_count);
        Ok(loaded)
    }

    /// Stores every atom of the local table.
    pub async fn store_atomspace(&self) -> Result<()> {
        self.check_writable("store_atomspace")?;
        let atoms = self.table.all();
        tracing::info!("Storing {} atoms to '{}'", atoms.len(), self.config.collection);

        for atom in atoms.iter() {
            self.store_atom_now(atom).await?;
        }
        Ok(())
    }

    /// Fetches the collection's atoms of one type, with their values.
    pub async fn load_type(&self, atom_type: &str) -> Result<Vec<Handle>> {
        let members = self.space.members(&self.ids.space_key()).await?;

        let mut loaded = Vec::new();
        for guid in members.iter() {
            if let Some(atom) = self.load_record(guid).await?
                && atom.atom_type() == atom_type
            {
                loaded.push(self.fetch_values(&atom).await?);
            }
        }
        bump(&self.stats.load_count);
        Ok(loaded)
    }

    // ==================== Lifecycle ====================

    /// Waits for background stores, then for the transport.
    ///
    /// Reports the first background failure; the rest are logged.
    pub async fn barrier(&self) -> Result<()> {
        let failures = {
            let mut pending = self.pending.lock().await;
            while let Some(joined) = pending.tasks.join_next().await {
                pending.record(joined);
            }
            std::mem::take(&mut pending.failures)
        };

        let mut failures = failures.into_iter();
        let first_error = failures.next();
        for e in failures {
            tracing::error!("Background store failed: {}", e);
        }

        self.transport.barrier().await?;
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub async fn connected(&self) -> bool {
        self.transport.connected().await
    }

    /// Tombstones every atom in the collection and drops all local caches.
    ///
    /// Returns the number of atoms removed.
    pub async fn kill_data(&self) -> Result<usize> {
        self.check_writable("kill_data")?;
        let space_key = self.ids.space_key();
        let members = self.space.members(&space_key).await?;
        tracing::warn!(
            "Killing {} atoms in '{}'",
            members.len(),
            self.config.collection
        );

        for guid in members.iter() {
            let muid = membership_of(guid, &self.config.collection);
            self.transport.put(guid, self.writer.tombstone()).await?;
            self.transport.put(&muid, self.writer.tombstone()).await?;
            self.space.remove(&space_key, guid).await?;
        }

        self.ids.clear();
        self.published.clear();
        self.table.clear();
        Ok(members.len())
    }

    /// Dump of every entry under the hex identifier `id`, oldest first.
    pub async fn examine(&self, id: &str) -> Result<String> {
        let key = Identifier::from_hex(id.trim())?;
        let entries = chronological(self.transport.get(&key).await?);

        let mut out = format!("{}: {} entries", key, entries.len());
        if let Some(atom) = self.ids.lookup(&key) {
            out.push_str(&format!(" (atom {})", atom));
        }
        for entry in entries.iter() {
            out.push_str(&format!(
                "\n  [{}] {}: {}",
                entry.timestamp,
                entry.writer.0,
                if entry.is_tombstone() {
                    "<tombstone>"
                } else {
                    entry.payload.as_str()
                }
            ));
        }
        Ok(out)
    }

    // ==================== Statistics ====================

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn print_stats(&self) -> String {
        let report = self.stats.snapshot().render();
        for line in report.lines() {
            tracing::info!("{}", line);
        }
        report
    }

    pub fn clear_stats(&self) {
        self.stats.clear();
    }
}
