//! Products API - REST server over PostgreSQL

use axum::Router;
use axum_helpers::EntityAlerts;
use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use migration::Migrator;
use tower_http::cors::CorsLayer;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

/// Public router: `/api/products`, docs, `/health` and `/ready`
fn build_app(state: &AppState, alerts: EntityAlerts, cors: CorsLayer) -> Router {
    axum_helpers::create_router::<openapi::ApiDoc>(api::routes(state, alerts), cors)
        .merge(health_router(state.config.app))
        .merge(api::health::router(state.clone()))
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!(app = config.app.name, version = config.app.version, "Connecting to PostgreSQL");
    let db =
        database::postgres::connect_from_config_with_retry(config.database.clone(), None).await?;

    if config.run_migrations {
        database::postgres::run_migrations::<Migrator>(&db, config.app.name).await?;
    }

    let state = AppState {
        config: config.clone(),
        db,
    };

    let alerts = api::products::alerts(&state)?;
    let cors = axum_helpers::cors_layer_from_env(api::products::exposed_headers(&alerts))?;
    let app = build_app(&state, alerts, cors);

    info!("Starting Products API on port {}", state.config.server.port);

    let db = state.db.clone();
    create_production_app(app, &state.config.server, async move {
        info!("Shutting down: closing PostgreSQL pool");
        if let Err(e) = db.close().await {
            tracing::warn!("Error closing database pool: {}", e);
        }
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Products API shutdown complete");
    Ok(())
}
