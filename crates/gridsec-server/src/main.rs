use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use gridsec_core::ScoreWeights;
use gridsec_engine::SecurityEngine;
use gridsec_server::{build_router, load_weights, AppState, DEFAULT_MAX_BODY_BYTES};

#[derive(Parser)]
#[command(author, version, about = "Static security assessment over HTTP", long_about = None)]
struct Opt {
    /// Address to bind the server to
    #[arg(long, default_value = "127.0.0.1:8000")]
    addr: SocketAddr,

    /// Set the logging level
    #[arg(long, default_value = "info")]
    log_level: tracing::Level,

    /// Largest request body accepted, in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_BYTES)]
    max_body_bytes: usize,

    /// JSON file overriding the scoring weights
    #[arg(long)]
    weights: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let opts = Opt::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(opts.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");

    let weights = match &opts.weights {
        Some(path) => load_weights(path)?,
        None => ScoreWeights::default(),
    };
    let state = Arc::new(AppState {
        engine: SecurityEngine::with_weights(weights),
    });
    let app = build_router(state, opts.max_body_bytes);

    let listener = TcpListener::bind(opts.addr)
        .await
        .with_context(|| format!("binding {}", opts.addr))?;
    info!("Security assessment server listening on {}", opts.addr);
    axum::serve(listener, app).await?;

    Ok(())
}
