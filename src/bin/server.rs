//! SortKV Server Binary
//!
//! Starts the TCP server for SortKV.

use std::sync::Arc;

use clap::Parser;
use sortkv::network::Server;
use sortkv::{Config, Engine, WalSyncStrategy};
use tracing_subscriber::{fmt, EnvFilter};

/// SortKV Server
#[derive(Parser, Debug)]
#[command(name = "sortkv-server")]
#[command(about = "Sorted key-value store with range scans, batches and snapshot export")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./sortkv_data")]
    data_dir: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:7000")]
    listen: String,

    /// Maximum connections queued or being served
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Worker threads serving connections
    #[arg(short, long, default_value = "8")]
    workers: usize,

    /// WAL size in MB that triggers a checkpoint
    #[arg(short = 'c', long, default_value = "64")]
    checkpoint_mb: u64,

    /// fsync the WAL after this many batches (1 = every batch)
    #[arg(long, default_value = "100")]
    sync_every: usize,

    /// Idle connection timeout in milliseconds (0 = none)
    #[arg(long, default_value = "30000")]
    read_timeout_ms: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sortkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("SortKV Server v{}", sortkv::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);
    tracing::info!("Listen address: {}", args.listen);

    let sync_strategy = match args.sync_every {
        1 => WalSyncStrategy::EveryWrite,
        count => WalSyncStrategy::EveryNEntries { count },
    };

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .worker_threads(args.workers)
        .checkpoint_bytes(args.checkpoint_mb * 1024 * 1024)
        .wal_sync_strategy(sync_strategy)
        .read_timeout_ms(args.read_timeout_ms)
        .build();

    let engine = match Engine::open(config.clone()) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Engine initialized with {} entries", engine.entry_count());

    let mut server = Server::new(config, Arc::clone(&engine));
    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
    drop(server);

    match Arc::try_unwrap(engine) {
        Ok(engine) => {
            if let Err(e) = engine.close() {
                tracing::error!("Failed to close engine: {}", e);
                std::process::exit(1);
            }
        }
        Err(engine) => {
            if let Err(e) = sortkv::KvWrite::flush(&*engine) {
                tracing::error!("Failed to flush engine: {}", e);
            }
        }
    }

    tracing::info!("Server stopped");
}
