use atomspace_dht::dht::MemoryDht;
use atomspace_dht::dht::handlers::router;
use std::net::SocketAddr;
use std::sync::Arc;

const DEFAULT_BIND: &str = "127.0.0.1:4555";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut bind_addr: Option<SocketAddr> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--bind" => {
                let value = args
                    .get(i + 1)
                    .ok_or_else(|| anyhow::anyhow!("--bind needs <addr:port>"))?;
                bind_addr = Some(value.parse()?);
                i += 2;
            }
            "--help" | "-h" => {
                eprintln!("Usage: {} [--bind <addr:port>]", args[0]);
                eprintln!("Example: {} --bind 127.0.0.1:4555", args[0]);
                return Ok(());
            }
            _ => {
                i += 1;
            }
        }
    }

    let bind_addr = match bind_addr {
        Some(addr) => addr,
        None => std::env::var("DHT_BIND")
            .unwrap_or_else(|_| DEFAULT_BIND.to_string())
            .parse()?,
    };

    // 1. Local DHT node:
    let dht = Arc::new(MemoryDht::new());

    // 2. Spawn stats reporter:
    let stats_dht = dht.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(30));

        loop {
            interval.tick().await;
            tracing::info!(
                "DHT stats: {} keys, {} entries",
                stats_dht.key_count(),
                stats_dht.entry_count()
            );
        }
    });

    // 3. Start HTTP server:
    let app = router(dht);

    tracing::info!("DHT node listening on {}", bind_addr);
    tracing::info!("Clients connect with dht://{}/<collection>", bind_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
