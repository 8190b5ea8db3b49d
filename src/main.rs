use tracing_subscriber::EnvFilter;

use cinetrack::{
    config::Config,
    create_router,
    db::SnapshotStore,
    services::{catalog::CatalogRepository, recommendations::RecommendationService},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let store = SnapshotStore::new(&config.catalog_path);
    let catalog = CatalogRepository::open(store);

    // A missing API key disables recommendations but not the catalog
    let recommender = match RecommendationService::create(&config) {
        Ok(service) => Some(service),
        Err(e) => {
            tracing::warn!(error = %e, "Recommendations disabled");
            None
        }
    };

    let state = AppState::new(catalog, recommender);
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
