//! # Axum Helpers
//!
//! Shared building blocks for the HTTP services in this workspace.
//!
//! ## Modules
//!
//! - **[`errors`]**: `AppError` and the JSON `ErrorResponse` with error codes
//! - **[`extractors`]**: `IdPath` and `ValidatedJson`
//! - **[`pagination`]**: `PageRequest`/`Page` and `X-Total-Count`/`Link` headers
//! - **[`alerts`]**: entity alert headers for successful mutations
//! - **[`server`]**: router composition, health endpoints, graceful shutdown
//! - **[`http`]**: CORS and security header middleware
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum::Router;
//! use axum_helpers::{create_router, create_app, http::cors_layer_from_env};
//! use core_config::server::ServerConfig;
//! use utoipa::OpenApi;
//!
//! #[derive(OpenApi)]
//! #[openapi(paths())]
//! struct ApiDoc;
//!
//! let router = create_router::<ApiDoc>(Router::new(), cors_layer_from_env(vec![])?);
//! create_app(router, &ServerConfig::default()).await?;
//! ```

pub mod alerts;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod pagination;
pub mod server;

pub use alerts::{AlertConfigError, EntityAlerts};

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_app, create_production_app,
    create_router, health_router, run_health_checks, shutdown_signal,
};

pub use http::{cors_layer_from_env, create_cors_layer, security_headers};

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use extractors::{IdPath, ValidatedJson};

pub use pagination::{Page, PageRequest, SortDirection, SortOrder, X_TOTAL_COUNT, pagination_headers};
