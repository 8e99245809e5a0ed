use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Identity of one writing process.
///
/// Random per storage instance; only used to order entries that share a
/// timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WriterId(pub String);

impl WriterId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for WriterId {
    fn default() -> Self {
        Self::new()
    }
}

/// One stored record under a DHT key.
///
/// Several entries may coexist under one key. An empty payload is a tombstone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DhtEntry {
    pub payload: String,
    /// Microseconds since the epoch, as assigned by the writer's clock.
    pub timestamp: u64,
    pub writer: WriterId,
}

impl DhtEntry {
    pub fn is_tombstone(&self) -> bool {
        self.payload.is_empty()
    }
}

/// Strictly increasing timestamps for one writer.
///
/// Follows wall-clock time, but never repeats or steps backwards within the
/// process.
#[derive(Debug, Default)]
pub struct Clock {
    last: AtomicU64,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&self) -> u64 {
        let now = now_us();
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let next = now.max(last + 1);
            match self
                .last
                .compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return next,
                Err(current) => last = current,
            }
        }
    }
}

/// Stamps payloads with one writer's identity and clock.
#[derive(Debug, Default)]
pub struct EntryWriter {
    clock: Clock,
    writer: WriterId,
}

impl EntryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_writer(writer: WriterId) -> Self {
        Self {
            clock: Clock::new(),
            writer,
        }
    }

    pub fn writer(&self) -> &WriterId {
        &self.writer
    }

    pub fn entry(&self, payload: impl Into<String>) -> DhtEntry {
        DhtEntry {
            payload: payload.into(),
            timestamp: self.clock.tick(),
            writer: self.writer.clone(),
        }
    }

    pub fn tombstone(&self) -> DhtEntry {
        self.entry(String::new())
    }
}

/// Helper to get the current system time in microseconds.
pub fn now_us() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros() as u64
}
