//! API routes module

pub mod health;
pub mod products;

use axum::Router;
use axum_helpers::EntityAlerts;

use crate::state::AppState;

/// Routes served under `/api`
pub fn routes(state: &AppState, alerts: EntityAlerts) -> Router {
    Router::new().nest("/products", products::router(state, alerts))
}
