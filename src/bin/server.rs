use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use fieldbook::config::AppConfig;
use fieldbook::providers::ai::{AiProvider, DisabledAi, HttpAiProvider};
use fieldbook::providers::catalog::{HttpCatalog, MockCatalog, PartCatalog};
use fieldbook::routes;
use fieldbook::state::AppState;
use fieldbook::store::EntityStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    tracing::info!(
        component = "server",
        server_host = %config.server_host,
        server_port = config.server_port,
        tax_rate_basis_points = config.tax_rate_basis_points,
        ai_enabled = config.ai_endpoint.is_some(),
        external_catalog = config.catalog_endpoint.is_some(),
        "loaded backend configuration"
    );

    let ai: Arc<dyn AiProvider> = match HttpAiProvider::from_config(&config)? {
        Some(provider) => Arc::new(provider),
        None => Arc::new(DisabledAi),
    };
    let catalog: Arc<dyn PartCatalog> = match config.catalog_endpoint.as_deref() {
        Some(endpoint) => Arc::new(HttpCatalog::new(endpoint)?),
        None => Arc::new(MockCatalog::default()),
    };

    let store = Arc::new(EntityStore::seeded());
    let listen_addr: SocketAddr =
        format!("{}:{}", config.server_host, config.server_port).parse()?;
    let state = AppState::new(store, config, ai, catalog);
    let router = routes::create_router(state);

    let listener = TcpListener::bind(listen_addr).await?;
    tracing::info!("listening on {}", listen_addr);

    axum::serve(listener, router).await?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
