use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;

use configs::CorruptPolicy;
use service::file::TodoStore;
use service::runtime;
use service::storage::RecoveryPolicy;

use crate::routes;

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_default();
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn recovery_policy(cfg: CorruptPolicy) -> RecoveryPolicy {
    match cfg {
        CorruptPolicy::Recover => RecoveryPolicy::RecoverToEmpty,
        CorruptPolicy::Fail => RecoveryPolicy::FailFast,
    }
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let cfg = configs::AppConfig::load_and_validate()?;

    runtime::ensure_env(&cfg.storage.data_file).await?;

    // Todo collection persisted as a JSON array in a single file
    let store = TodoStore::new(&cfg.storage.data_file, recovery_policy(cfg.storage.on_corrupt)).await?;

    // Build router
    let cors = build_cors();
    let app: Router = routes::build_router(Arc::clone(&store), cors);

    // Bind and serve
    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(%addr, data_file = %cfg.storage.data_file, "starting todo service");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
