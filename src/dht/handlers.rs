use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, post},
};
use std::sync::Arc;

use super::memory::MemoryDht;
use super::protocol::{
    ENDPOINT_GET, ENDPOINT_HEALTH, ENDPOINT_PUT, GetResponse, HealthResponse, PutRequest,
    PutResponse,
};
use crate::identity::Identifier;

/// Routes serving `dht` to `HttpDht` clients.
pub fn router(dht: Arc<MemoryDht>) -> Router {
    Router::new()
        .route(ENDPOINT_PUT, post(handle_put))
        .route(&format!("{}/:key", ENDPOINT_GET), get(handle_get))
        .route(ENDPOINT_HEALTH, get(handle_health))
        .layer(Extension(dht))
}

pub async fn handle_put(
    Extension(dht): Extension<Arc<MemoryDht>>,
    Json(req): Json<PutRequest>,
) -> (StatusCode, Json<PutResponse>) {
    let key: Identifier = match req.key.parse() {
        Ok(k) => k,
        Err(e) => {
            tracing::error!("Failed to parse key: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(PutResponse { success: false }),
            );
        }
    };

    tracing::debug!(
        "PUT {} ({} bytes, ts={})",
        key,
        req.entry.payload.len(),
        req.entry.timestamp
    );
    dht.store_local(key, req.entry);
    (StatusCode::OK, Json(PutResponse { success: true }))
}

pub async fn handle_get(
    Extension(dht): Extension<Arc<MemoryDht>>,
    Path(key_str): Path<String>,
) -> (StatusCode, Json<GetResponse>) {
    let key: Identifier = match key_str.parse() {
        Ok(k) => k,
        Err(e) => {
            tracing::error!("Failed to parse key: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(GetResponse { entries: vec![] }),
            );
        }
    };

    let entries = dht.get_local(&key);
    tracing::debug!("GET {} -> {} entries", key, entries.len());
    (StatusCode::OK, Json(GetResponse { entries }))
}

pub async fn handle_health(
    Extension(dht): Extension<Arc<MemoryDht>>,
) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            keys: dht.key_count(),
            entries: dht.entry_count(),
        }),
    )
}
