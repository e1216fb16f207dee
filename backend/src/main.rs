use anyhow::Context;
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use objection_coach::config::{Config, LoggingConfig};
use objection_coach::services::{GeminiClient, KnowledgeStore};
use objection_coach::{AppState, build_router};

#[derive(Parser, Debug)]
#[command(name = "objection-coach", version, about = "Sales objection coaching backend")]
struct Args {
    /// Path to config.toml (default: conf/config.toml or ./config.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Override server.host
    #[arg(long)]
    host: Option<String>,

    /// Override server.port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // .env must be loaded before the config reads its overrides
    dotenvy::dotenv().ok();

    // Console-only until the configured logger is installed
    let bootstrap = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    let mut config = match Config::load_with_subscriber(bootstrap, args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        },
    };
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let _log_guard = init_logging(&config.logging);

    let knowledge = Arc::new(KnowledgeStore::load(&config.knowledge));
    let client = GeminiClient::new(&config.gemini).context("Failed to build Gemini client")?;
    tracing::info!(
        "Using model {} (timeout {}s)",
        config.gemini.model,
        config.gemini.timeout_secs
    );

    let deadline = Duration::from_secs(config.server.request_timeout_secs);
    let state = Arc::new(AppState::new(Arc::new(client), knowledge, deadline));
    let app = build_router(state, &config.server);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Objection coach listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Console logging plus an optional daily-rolling file.
/// The returned guard must live until exit so buffered lines get flushed.
fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let registry = tracing_subscriber::registry().with(filter).with(fmt::layer());

    match config.file.as_deref() {
        Some(file) => {
            let path = Path::new(file);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "objection-coach.log".into());

            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, name));
            registry.with(fmt::layer().with_ansi(false).with_writer(writer)).init();
            Some(guard)
        },
        None => {
            registry.init();
            None
        },
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
