//! OpalDB - HTTP server

use std::env;

use opaldb::executor::QueryExecutor;
use opaldb::server::{self, ServerConfig};
use opaldb::snapshot::JsonSnapshot;
use tracing_subscriber::EnvFilter;

/// Default snapshot file next to the working directory
const DEFAULT_SNAPSHOT: &str = "opaldb.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args: Vec<String> = env::args().collect();
    let mut config = ServerConfig::new();
    let mut snapshot_path = Some(DEFAULT_SNAPSHOT.to_string());

    // Simple argument parsing
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--port" | "-p" => {
                if let Some(port) = args.get(i + 1).and_then(|s| s.parse().ok()) {
                    config = config.port(port);
                }
                i += 1;
            }
            "--host" => {
                if let Some(host) = args.get(i + 1) {
                    config = config.host(host.as_str());
                }
                i += 1;
            }
            "--file" | "-f" => {
                if let Some(path) = args.get(i + 1) {
                    snapshot_path = Some(path.clone());
                }
                i += 1;
            }
            "--no-persist" => {
                snapshot_path = None;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                eprintln!("Usage: opaldb-server [--host HOST] [--port PORT] [--file PATH | --no-persist]");
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let executor = match snapshot_path {
        Some(path) => QueryExecutor::with_snapshot(Box::new(JsonSnapshot::new(path)))?,
        None => QueryExecutor::new(),
    };

    println!("Starting OpalDB server on {}", config.bind_address());
    server::serve(config, executor).await?;
    Ok(())
}
