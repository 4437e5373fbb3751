use std::{future::Future, net::SocketAddr, sync::Arc};

use axum::Router;
use configs::{AppConfig, StoreConfig};
use models::customer::sample_customers;
use service::customer::InMemoryCustomerRepository;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes;
use crate::state::ServerState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Create the in-memory store and, if enabled, load the sample customers into it.
pub async fn build_state(store: &StoreConfig) -> Result<ServerState, StartupError> {
    let repo = Arc::new(InMemoryCustomerRepository::new());
    let state = ServerState::new(repo.clone());
    if store.seed_sample_data {
        let inserted = state.customers.seed(sample_customers()).await?;
        info!(service = "server", event = "seeded", inserted, "sample customers loaded");
    }
    let customers = repo.count().await;
    info!(service = "server", event = "store_ready", customers, "customer store ready");
    Ok(state)
}

/// Parse the configured host/port into a socket address.
fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    cfg.server
        .bind_addr()
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("{}: {e}", cfg.server.bind_addr())))
}

/// Build the app from an already loaded `cfg` and serve it until `shutdown` resolves.
///
/// In-flight requests are allowed to finish before this returns.
pub async fn run_with_config<F>(cfg: AppConfig, shutdown: F) -> Result<(), StartupError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let state = build_state(&cfg.store).await?;
    let app: Router = routes::build_router(state, build_cors());

    let addr = bind_addr(&cfg)?;
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(anyhow::Error::from)?;
    info!(addr = %listener.local_addr().map_err(anyhow::Error::from)?, "starting customer api");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(anyhow::Error::from)?;
    info!(service = "server", event = "drained", "http server stopped");
    Ok(())
}
