use anyhow::Context;
use tracing_subscriber::EnvFilter;

use edit_xml::api::{self, AppState};
use edit_xml::cli::Cli;
use edit_xml::config::ServerConfig;
use edit_xml::store::FileStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_cli(&cli)?;
    let address = config.socket_addr()?;
    let state = AppState::new(FileStore::new(config.data_dir.clone()));
    let app = api::router(state, &config)?;

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    tracing::info!(
        %address,
        data_dir = %config.data_dir.display(),
        origin = %config.allowed_origin,
        "edit-xml listening"
    );
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
