use anyhow::{Context, Result};
use std::sync::Arc;

use clap::Parser;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use tokio::sync::Mutex;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = exercise_tracker::config::Cli::parse();
    run_server(cli.config).await
}

async fn run_server(config: exercise_tracker::config::Config) -> Result<()> {
    let bind = config.bind_addr();
    let error_status = config.error_status;
    let store = Arc::new(Mutex::new(exercise_tracker::state::MemoryStore::new()));

    let app = exercise_tracker::http::build_router(config, store)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    info!(
        %bind,
        ?error_status,
        version = exercise_tracker::version::VERSION,
        "starting exercise-tracker"
    );
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("bind {bind}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("exercise-tracker stopped");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).compact().init();
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
