//! Storage configuration.
//!
//! A store is named by a URI:
//! - `dht:///collection` uses an in-process `MemoryDht`;
//! - `dht://host:port/collection` talks to a peer over HTTP. More peers can
//!   be added with [`StorageConfig::with_peer`].
//!
//! An empty collection name opens the store observe-only.

use crate::dht::{DhtTransport, HttpDht, MemoryDht};
use crate::error::{Result, StorageError};

use std::sync::Arc;
use std::time::Duration;

const URI_SCHEME: &str = "dht://";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_RETRY_ATTEMPTS: usize = 3;

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub uri: String,
    pub collection: String,
    pub peers: Vec<String>,
    pub observe_only: bool,
    pub request_timeout: Duration,
    pub retry_attempts: usize,
}

impl StorageConfig {
    /// In-process configuration for `collection`.
    pub fn new(collection: impl Into<String>) -> Self {
        let collection = collection.into();
        Self {
            uri: format!("{}/{}", URI_SCHEME, collection),
            observe_only: collection.is_empty(),
            collection,
            peers: Vec::new(),
            request_timeout: DEFAULT_TIMEOUT,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
        }
    }

    pub fn from_uri(uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix(URI_SCHEME)
            .ok_or_else(|| StorageError::Config(format!("unknown URI scheme: {}", uri)))?;

        let (authority, path) = match rest.find('/') {
            Some(idx) => (&rest[..idx], &rest[idx + 1..]),
            None => {
                return Err(StorageError::Config(format!(
                    "missing collection path: {}",
                    uri
                )));
            }
        };

        if path.contains('/') {
            return Err(StorageError::Config(format!(
                "collection name may not contain '/': {}",
                uri
            )));
        }

        let mut config = Self::new(path);
        config.uri = uri.to_string();
        if !authority.is_empty() {
            if !authority.contains(':') {
                return Err(StorageError::Config(format!(
                    "peer must be host:port: {}",
                    authority
                )));
            }
            config.peers.push(authority.to_string());
        }
        Ok(config)
    }

    pub fn with_peer(mut self, peer: impl Into<String>) -> Self {
        self.peers.push(peer.into());
        self
    }

    pub fn with_observe_only(mut self, observe_only: bool) -> Self {
        self.observe_only = observe_only;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_retry_attempts(mut self, attempts: usize) -> Self {
        self.retry_attempts = attempts;
        self
    }

    /// Transport named by the configuration: HTTP when peers are set,
    /// otherwise a fresh in-process node.
    pub fn transport(&self) -> Arc<dyn DhtTransport> {
        if self.peers.is_empty() {
            Arc::new(MemoryDht::new())
        } else {
            Arc::new(HttpDht::new(
                self.peers.clone(),
                self.request_timeout,
                self.retry_attempts,
            ))
        }
    }
}
