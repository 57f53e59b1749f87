use crate::{env_parse_or, ConfigError, FromEnv};

/// Page size used when a request carries no `size` parameter
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Largest page a client may request; bigger sizes are clamped
pub const MAX_PAGE_SIZE: u64 = 2000;

/// Limits applied when binding `page`/`size` query parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaginationConfig {
    pub default_size: u64,
    pub max_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_size: DEFAULT_PAGE_SIZE,
            max_size: MAX_PAGE_SIZE,
        }
    }
}

impl FromEnv for PaginationConfig {
    /// - PAGE_DEFAULT_SIZE: defaults to 20
    /// - PAGE_MAX_SIZE: defaults to 2000
    fn from_env() -> Result<Self, ConfigError> {
        let default_size = env_parse_or("PAGE_DEFAULT_SIZE", DEFAULT_PAGE_SIZE)?;
        let max_size = env_parse_or("PAGE_MAX_SIZE", MAX_PAGE_SIZE)?;

        if default_size == 0 || max_size == 0 || default_size > max_size {
            return Err(ConfigError::ParseError {
                key: "PAGE_DEFAULT_SIZE".to_string(),
                details: format!(
                    "default size {} must be between 1 and the max size {}",
                    default_size, max_size
                ),
            });
        }

        Ok(Self {
            default_size,
            max_size,
        })
    }
}
