//! DHT Peer Network Protocol
//!
//! Defines the API endpoints and Data Transfer Objects (DTOs) a `MemoryDht`
//! peer serves over HTTP and `HttpDht` consumes.
//!
//! Keys travel as lowercase hex identifiers; entries travel as JSON.

use super::types::DhtEntry;
use serde::{Deserialize, Serialize};

// --- API Endpoints ---

/// Endpoint for adding one entry under a key.
pub const ENDPOINT_PUT: &str = "/dht/put";
/// Endpoint for reading every entry under a key (`/dht/get/{hex}`).
pub const ENDPOINT_GET: &str = "/dht/get";
/// Liveness probe.
pub const ENDPOINT_HEALTH: &str = "/dht/health";

// --- Data Transfer Objects ---

/// Payload for adding an entry on a peer.
#[derive(Debug, Serialize, Deserialize)]
pub struct PutRequest {
    /// Hex form of the identifier.
    pub key: String,
    pub entry: DhtEntry,
}

/// Standard acknowledgment for put operations.
#[derive(Debug, Serialize, Deserialize)]
pub struct PutResponse {
    pub success: bool,
}

/// Every entry a peer holds under the requested key.
#[derive(Debug, Serialize, Deserialize)]
pub struct GetResponse {
    pub entries: Vec<DhtEntry>,
}

/// Peer liveness and size.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub keys: usize,
    pub entries: usize,
}
