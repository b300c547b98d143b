use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use backend_client::HttpBackend;
use clap::Parser;
use server_api::ApiContext;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod api;
mod app_state;
mod config;
mod stream;

use app_state::AppState;
use config::{load_settings, Settings};

#[derive(Debug, Parser)]
#[command(name = "server", about = "A2UI ticket UI server")]
struct Cli {
    /// Settings file; defaults to ./server.toml when present.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;
    let state = build_state(&settings)?;
    let app = api::build_router(Arc::new(state), &settings);

    let addr: SocketAddr = settings
        .bind_addr
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.bind_addr))?;
    info!(%addr, backend = %settings.backend_url, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_state(settings: &Settings) -> anyhow::Result<AppState> {
    let backend = HttpBackend::new(&settings.backend_url, settings.request_timeout())
        .with_context(|| format!("invalid backend url '{}'", settings.backend_url))?;
    let api = ApiContext::new(Arc::new(backend))
        .with_surface_id(settings.surface_id.as_str())
        .with_page_size(settings.page_size);
    Ok(AppState { api })
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
