//! Configuration for Products API

use core_config::{
    AppInfo, FromEnv, app_info, env_or_default, env_parse_or, pagination::PaginationConfig,
    server::ServerConfig,
};
use database::postgres::PostgresConfig;

pub use core_config::Environment;

/// Application name used in alert headers when `APP_NAME` is unset
pub const DEFAULT_APP_NAME: &str = "productsApp";

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    /// Prefix of the `X-<app>-alert` headers
    pub app_name: String,
    pub database: PostgresConfig,
    pub pagination: PaginationConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    pub run_migrations: bool,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            app: app_info!(),
            app_name: env_or_default("APP_NAME", DEFAULT_APP_NAME),
            database: PostgresConfig::from_env()?,
            pagination: PaginationConfig::from_env()?,
            server: ServerConfig::from_env()?,
            environment: Environment::from_env(),
            run_migrations: env_parse_or("RUN_MIGRATIONS", true)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgres://localhost/products")),
                ("APP_NAME", None),
                ("RUN_MIGRATIONS", None),
                ("PAGE_DEFAULT_SIZE", None),
                ("PAGE_MAX_SIZE", None),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.app_name, "productsApp");
                assert!(config.run_migrations);
                assert_eq!(config.pagination, PaginationConfig::default());
                assert_eq!(config.app.name, "products_api");
            },
        );
    }

    #[test]
    fn test_config_requires_database_url() {
        temp_env::with_var_unset("DATABASE_URL", || {
            assert!(Config::from_env().is_err());
        });
    }

    #[test]
    fn test_run_migrations_must_be_a_boolean() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgres://localhost/products")),
                ("RUN_MIGRATIONS", Some("sometimes")),
            ],
            || {
                assert!(Config::from_env().is_err());
            },
        );
    }
}
