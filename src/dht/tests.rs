//! DHT Module Tests
//!
//! ## Test Scopes
//! - **Reconciler**: latest-wins regardless of arrival order, deterministic ties.
//! - **Clock**: strictly increasing timestamps.
//! - **MemoryDht**: append-only storage behind the transport trait.
//! - **HTTP**: `HttpDht` against a `MemoryDht` peer served on a local port.

#[cfg(test)]
mod tests {
    use crate::dht::handlers::router;
    use crate::dht::{
        Clock, DhtEntry, DhtTransport, EntryWriter, HttpDht, MemoryDht, WriterId, chronological,
        latest_payload, select_latest,
    };
    use crate::identity::guid_of;
    use std::sync::Arc;
    use std::time::Duration;

    fn entry(payload: &str, timestamp: u64, writer: &str) -> DhtEntry {
        DhtEntry {
            payload: payload.to_string(),
            timestamp,
            writer: WriterId(writer.to_string()),
        }
    }

    // ============================================================
    // RECONCILER TESTS
    // ============================================================

    #[test]
    fn test_latest_timestamp_wins_in_any_order() {
        let older = entry("old", 10, "w");
        let newer = entry("new", 20, "w");

        let forward = vec![older.clone(), newer.clone()];
        let backward = vec![newer, older];

        assert_eq!(latest_payload(&forward), "new");
        assert_eq!(latest_payload(&backward), "new");
    }

    #[test]
    fn test_timestamp_tie_broken_by_writer() {
        let a = entry("from-a", 5, "writer-a");
        let b = entry("from-b", 5, "writer-b");

        assert_eq!(latest_payload(&[a.clone(), b.clone()]), "from-b");
        assert_eq!(latest_payload(&[b, a]), "from-b");
    }

    #[test]
    fn test_full_tie_broken_by_payload() {
        let a = entry("aaa", 5, "same");
        let b = entry("bbb", 5, "same");

        assert_eq!(latest_payload(&[b.clone(), a.clone()]), "bbb");
        assert_eq!(latest_payload(&[a, b]), "bbb");
    }

    #[test]
    fn test_no_entries_selects_nothing() {
        assert!(select_latest(&[]).is_none());
        assert_eq!(latest_payload(&[]), "");
    }

    #[test]
    fn test_newer_tombstone_hides_older_payload() {
        let entries = vec![entry("((k . v))", 1, "w"), entry("", 2, "w")];

        let latest = select_latest(&entries).unwrap();
        assert!(latest.is_tombstone());
        assert_eq!(latest_payload(&entries), "");
    }

    #[test]
    fn test_chronological_sorts_oldest_first() {
        let sorted = chronological(vec![
            entry("c", 30, "w"),
            entry("a", 10, "w"),
            entry("b", 20, "w"),
        ]);

        let payloads: Vec<&str> = sorted.iter().map(|e| e.payload.as_str()).collect();
        assert_eq!(payloads, vec!["a", "b", "c"]);
    }

    // ============================================================
    // CLOCK TESTS
    // ============================================================

    #[test]
    fn test_clock_strictly_increases() {
        let clock = Clock::new();
        let mut last = clock.tick();
        for _ in 0..1000 {
            let next = clock.tick();
            assert!(next > last, "{} should be > {}", next, last);
            last = next;
        }
    }

    #[test]
    fn test_entry_writer_stamps_in_order() {
        let writer = EntryWriter::with_writer(WriterId("me".to_string()));

        let first = writer.entry("a");
        let second = writer.tombstone();

        assert!(second.timestamp > first.timestamp);
        assert_eq!(first.writer, WriterId("me".to_string()));
        assert!(second.is_tombstone());
        // Same-instant writes from one writer still reconcile to the later one
        assert_eq!(latest_payload(&[second, first]), "");
    }

    #[test]
    fn test_writer_ids_are_unique() {
        assert_ne!(WriterId::new(), WriterId::new());
    }

    // ============================================================
    // MEMORY DHT TESTS
    // ============================================================

    #[tokio::test]
    async fn test_memory_dht_keeps_every_entry() {
        // ARRANGE
        let dht = MemoryDht::new();
        let key = guid_of("(ConceptNode \"x\")");

        // ACT
        dht.put(&key, entry("one", 1, "w")).await.unwrap();
        dht.put(&key, entry("two", 2, "w")).await.unwrap();

        // ASSERT
        let entries = dht.get(&key).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(latest_payload(&entries), "two");
        assert_eq!(dht.key_count(), 1);
        assert_eq!(dht.entry_count(), 2);
    }

    #[tokio::test]
    async fn test_memory_dht_ignores_identical_put() {
        let dht = MemoryDht::new();
        let key = guid_of("(ConceptNode \"dup\")");

        dht.put(&key, entry("same", 1, "w")).await.unwrap();
        dht.put(&key, entry("same", 1, "w")).await.unwrap();

        assert_eq!(dht.get(&key).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_memory_dht_unknown_key_is_empty() {
        let dht = MemoryDht::new();
        let key = guid_of("(ConceptNode \"missing\")");

        assert!(dht.get(&key).await.unwrap().is_empty());
        assert!(dht.connected().await);
        dht.barrier().await.unwrap();
    }

    // ============================================================
    // HTTP TRANSPORT TESTS
    // ============================================================

    async fn spawn_peer() -> (Arc<MemoryDht>, String) {
        let dht = Arc::new(MemoryDht::new());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(dht.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (dht, addr.to_string())
    }

    #[test]
    fn test_http_peer_addresses_normalized() {
        let client = HttpDht::new(
            vec!["127.0.0.1:4555/".to_string(), "https://node.example:443".to_string()],
            Duration::from_secs(1),
            0,
        );

        assert_eq!(
            client.peers(),
            &["http://127.0.0.1:4555".to_string(), "https://node.example:443".to_string()]
        );
    }

    #[tokio::test]
    async fn test_http_round_trip() {
        // ARRANGE
        let (peer, addr) = spawn_peer().await;
        let client = HttpDht::new(vec![addr], Duration::from_secs(2), 3);
        let key = guid_of("(ConceptNode \"remote\")");

        // ACT
        client.put(&key, entry("((a . b))", 7, "w")).await.unwrap();
        let entries = client.get(&key).await.unwrap();

        // ASSERT
        assert_eq!(entries, vec![entry("((a . b))", 7, "w")]);
        assert_eq!(peer.entry_count(), 1);
        assert!(client.connected().await);
    }

    #[tokio::test]
    async fn test_http_get_merges_peers() {
        // ARRANGE: each peer already holds a different entry, plus one shared
        let (first, first_addr) = spawn_peer().await;
        let (second, second_addr) = spawn_peer().await;
        let key = guid_of("(ConceptNode \"split\")");
        first.store_local(key, entry("old", 1, "w"));
        first.store_local(key, entry("shared", 3, "w"));
        second.store_local(key, entry("new", 2, "w"));
        second.store_local(key, entry("shared", 3, "w"));

        let client = HttpDht::new(vec![first_addr, second_addr], Duration::from_secs(2), 1);

        // ACT
        let entries = client.get(&key).await.unwrap();

        // ASSERT
        assert_eq!(entries.len(), 3);
        assert_eq!(latest_payload(&entries), "shared");
    }

    #[tokio::test]
    async fn test_http_put_survives_one_dead_peer() {
        let (peer, addr) = spawn_peer().await;
        // Port 9 on loopback has no listener
        let client = HttpDht::new(
            vec![addr, "127.0.0.1:9".to_string()],
            Duration::from_millis(500),
            1,
        );
        let key = guid_of("(ConceptNode \"partial\")");

        client.put(&key, entry("v", 1, "w")).await.unwrap();

        assert_eq!(peer.get_local(&key).len(), 1);
    }

    #[tokio::test]
    async fn test_http_fails_without_reachable_peer() {
        let client = HttpDht::new(
            vec!["127.0.0.1:9".to_string()],
            Duration::from_millis(500),
            1,
        );
        let key = guid_of("(ConceptNode \"nowhere\")");

        let put = client.put(&key, entry("v", 1, "w")).await;
        let get = client.get(&key).await;

        assert!(matches!(put, Err(crate::error::StorageError::Transport(_))));
        assert!(matches!(get, Err(crate::error::StorageError::Transport(_))));
        assert!(!client.connected().await);
    }
}
