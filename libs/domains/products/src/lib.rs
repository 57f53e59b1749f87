//! Products Domain
//!
//! CRUD over a single `Product` entity with criteria filtering and paging.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, alert and pagination headers
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Id rules, validation, name uniqueness
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Trait + in-memory and PostgreSQL implementations
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │  Criteria   │  ← Filters rendered as a closure or a SeaORM Condition
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use axum_helpers::EntityAlerts;
//! use core_config::pagination::PaginationConfig;
//! use domain_products::{handlers, PgProductRepository, ProductService, ENTITY_NAME};
//!
//! let service = ProductService::new(PgProductRepository::new(db));
//! let alerts = EntityAlerts::new("productsApp", ENTITY_NAME)?;
//! let router = handlers::router(service, alerts, PaginationConfig::default());
//! ```

pub mod criteria;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use criteria::{ProductCriteria, RangeFilter, StringFilter};
pub use error::{ENTITY_NAME, ProductError, ProductResult};
pub use handlers::ApiDoc;
pub use models::{NewProduct, Product, ProductPatch, ProductPayload};
pub use postgres::PgProductRepository;
pub use repository::{InMemoryProductRepository, ProductRepository};
pub use service::ProductService;
