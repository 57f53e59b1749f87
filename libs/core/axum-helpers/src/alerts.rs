//! Entity alert headers attached to successful mutations.
//!
//! For an application named `productsApp`, creating product 7 yields:
//!
//! ```text
//! X-productsApp-alert: productsApp.products.created
//! X-productsApp-params: 7
//! ```
//!
//! Header names are case-insensitive on the wire and are stored lowercase.

use axum::http::{
    HeaderMap, HeaderName, HeaderValue,
    header::{InvalidHeaderName, InvalidHeaderValue},
};
use std::fmt::Display;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlertConfigError {
    #[error("application name '{0}' is not usable in a header name")]
    InvalidName(String, #[source] InvalidHeaderName),

    #[error("application name '{0}' is not usable in a header value")]
    InvalidValue(String, #[source] InvalidHeaderValue),
}

/// Builds alert headers for one entity of one application.
#[derive(Debug, Clone)]
pub struct EntityAlerts {
    alert_header: HeaderName,
    params_header: HeaderName,
    prefix: String,
}

impl EntityAlerts {
    pub fn new(app_name: &str, entity_name: &str) -> Result<Self, AlertConfigError> {
        let header = |suffix: &str| {
            HeaderName::try_from(format!("x-{}-{}", app_name, suffix))
                .map_err(|e| AlertConfigError::InvalidName(app_name.to_string(), e))
        };
        let prefix = format!("{}.{}", app_name, entity_name);
        HeaderValue::from_str(&prefix)
            .map_err(|e| AlertConfigError::InvalidValue(app_name.to_string(), e))?;

        Ok(Self {
            alert_header: header("alert")?,
            params_header: header("params")?,
            prefix,
        })
    }

    pub fn alert_header(&self) -> &HeaderName {
        &self.alert_header
    }

    pub fn params_header(&self) -> &HeaderName {
        &self.params_header
    }

    pub fn created(&self, id: impl Display) -> HeaderMap {
        self.alert("created", id)
    }

    pub fn updated(&self, id: impl Display) -> HeaderMap {
        self.alert("updated", id)
    }

    pub fn deleted(&self, id: impl Display) -> HeaderMap {
        self.alert("deleted", id)
    }

    fn alert(&self, action: &str, id: impl Display) -> HeaderMap {
        let mut headers = HeaderMap::new();
        // Both values are checked printable ASCII: the prefix in `new`, the id by Display of an integer
        if let Ok(value) = HeaderValue::from_str(&format!("{}.{}", self.prefix, action)) {
            headers.insert(self.alert_header.clone(), value);
        }
        if let Ok(value) = HeaderValue::from_str(&id.to_string()) {
            headers.insert(self.params_header.clone(), value);
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_headers() {
        let alerts = EntityAlerts::new("productsApp", "products").unwrap();
        let headers = alerts.created(7);

        assert_eq!(
            headers.get("X-productsApp-alert").unwrap(),
            "productsApp.products.created"
        );
        assert_eq!(headers.get("x-productsapp-params").unwrap(), "7");
    }

    #[test]
    fn test_updated_and_deleted_actions() {
        let alerts = EntityAlerts::new("shop", "products").unwrap();
        assert_eq!(
            alerts.updated(1).get(alerts.alert_header()).unwrap(),
            "shop.products.updated"
        );
        assert_eq!(
            alerts.deleted(1).get(alerts.alert_header()).unwrap(),
            "shop.products.deleted"
        );
    }

    #[test]
    fn test_invalid_app_name_is_rejected() {
        assert!(EntityAlerts::new("my app", "products").is_err());
    }
}
