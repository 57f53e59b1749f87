//! Products API routes

use axum::Router;
use axum::http::{HeaderName, header};
use axum_helpers::{AlertConfigError, EntityAlerts, X_TOTAL_COUNT};
use domain_products::{ENTITY_NAME, PgProductRepository, ProductService, handlers};

use crate::state::AppState;

/// Create products router
pub fn router(state: &AppState, alerts: EntityAlerts) -> Router {
    let repository = PgProductRepository::new(state.db.clone());
    let service = ProductService::new(repository);
    handlers::router(service, alerts, state.config.pagination)
}

/// Alert headers for products under the configured application name
pub fn alerts(state: &AppState) -> Result<EntityAlerts, AlertConfigError> {
    EntityAlerts::new(&state.config.app_name, ENTITY_NAME)
}

/// Response headers browsers may read cross-origin
pub fn exposed_headers(alerts: &EntityAlerts) -> Vec<HeaderName> {
    vec![
        header::LINK,
        header::LOCATION,
        X_TOTAL_COUNT,
        alerts.alert_header().clone(),
        alerts.params_header().clone(),
    ]
}
