use super::protocol::{ENDPOINT_GET, ENDPOINT_HEALTH, ENDPOINT_PUT, GetResponse, PutRequest};
use super::transport::DhtTransport;
use super::types::DhtEntry;
use crate::error::{Result, StorageError};
use crate::identity::Identifier;

use async_trait::async_trait;
use std::time::Duration;

/// `DhtTransport` over HTTP to one or more `MemoryDht` peers.
///
/// Puts go to every peer and succeed when at least one acknowledges. Gets
/// merge the entries of every reachable peer; reconciliation happens above.
pub struct HttpDht {
    peers: Vec<String>,
    http_client: reqwest::Client,
    timeout: Duration,
    attempts: usize,
}

impl HttpDht {
    pub fn new(peers: Vec<String>, timeout: Duration, attempts: usize) -> Self {
        let peers = peers
            .into_iter()
            .map(|peer| {
                let cleaned = peer.trim_end_matches('/');
                if cleaned.starts_with("http://") || cleaned.starts_with("https://") {
                    cleaned.to_string()
                } else {
                    format!("http://{}", cleaned)
                }
            })
            .collect();

        Self {
            peers,
            http_client: reqwest::Client::new(),
            timeout,
            attempts: attempts.max(1),
        }
    }

    pub fn peers(&self) -> &[String] {
        &self.peers
    }

    /// Sends the request built by `build`, retrying connection failures
    /// with exponential backoff and jitter. HTTP error statuses are returned
    /// as responses, not retried.
    async fn send_with_retry<F>(&self, build: F) -> anyhow::Result<reqwest::Response>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut delay_ms = 150u64;

        for attempt in 0..self.attempts {
            match build().timeout(self.timeout).send().await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    if attempt + 1 == self.attempts {
                        return Err(anyhow::anyhow!(e));
                    }
                    let jitter = rand::random::<u64>() % 50;
                    tokio::time::sleep(Duration::from_millis(delay_ms + jitter)).await;
                    delay_ms = (delay_ms * 2).min(1200);
                }
            }
        }

        Err(anyhow::anyhow!("Retry attempts exhausted"))
    }

    async fn put_to_peer(&self, peer: &str, payload: &PutRequest) -> anyhow::Result<()> {
        let url = format!("{}{}", peer, ENDPOINT_PUT);
        let response = self
            .send_with_retry(|| self.http_client.post(&url).json(payload))
            .await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("PUT failed {}", response.status()));
        }
        Ok(())
    }

    async fn get_from_peer(&self, peer: &str, key: &Identifier) -> anyhow::Result<Vec<DhtEntry>> {
        let url = format!("{}{}/{}", peer, ENDPOINT_GET, key);
        let response = self
            .send_with_retry(|| self.http_client.get(&url))
            .await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("GET request failed {}", response.status()));
        }

        let get_response: GetResponse = response.json().await?;
        Ok(get_response.entries)
    }
}

#[async_trait]
impl DhtTransport for HttpDht {
    async fn put(&self, key: &Identifier, entry: DhtEntry) -> Result<()> {
        let payload = PutRequest {
            key: key.to_hex(),
            entry,
        };

        let mut acked = 0;
        let mut last_error = None;
        for peer in self.peers.iter() {
            match self.put_to_peer(peer, &payload).await {
                Ok(()) => acked += 1,
                Err(e) => {
                    tracing::warn!("PUT {} to {} failed: {}", key, peer, e);
                    last_error = Some(e);
                }
            }
        }

        if acked == 0 {
            return Err(StorageError::transport(match last_error {
                Some(e) => format!("no peer acknowledged put of {}: {}", key, e),
                None => "no peers configured".to_string(),
            }));
        }
        Ok(())
    }

    async fn get(&self, key: &Identifier) -> Result<Vec<DhtEntry>> {
        let mut merged: Vec<DhtEntry> = Vec::new();
        let mut reached = 0;
        let mut last_error = None;

        for peer in self.peers.iter() {
            match self.get_from_peer(peer, key).await {
                Ok(entries) => {
                    reached += 1;
                    for entry in entries {
                        if !merged.contains(&entry) {
                            merged.push(entry);
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("GET {} from {} failed: {}", key, peer, e);
                    last_error = Some(e);
                }
            }
        }

        if reached == 0 {
            return Err(StorageError::transport(match last_error {
                Some(e) => format!("no peer answered get of {}: {}", key, e),
                None => "no peers configured".to_string(),
            }));
        }
        Ok(merged)
    }

    async fn connected(&self) -> bool {
        for peer in self.peers.iter() {
            let probe = self
                .http_client
                .get(format!("{}{}", peer, ENDPOINT_HEALTH))
                .timeout(self.timeout)
                .send()
                .await;
            if let Ok(resp) = probe
                && resp.status().is_success()
            {
                return true;
            }
        }
        false
    }

    // Puts return only after a peer acknowledged them.
    async fn barrier(&self) -> Result<()> {
        Ok(())
    }
}
