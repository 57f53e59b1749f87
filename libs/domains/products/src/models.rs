use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{ProductError, ProductResult};

/// Properties accepted by `sort=<property>[,asc|desc]`
pub const SORTABLE_PROPERTIES: &[&str] = &["id", "name", "price"];

/// A persisted product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// Server-assigned identifier
    #[schema(example = 1)]
    pub id: i64,
    /// Unique product name
    #[schema(example = "AAAAAAAAAA")]
    pub name: String,
    #[schema(example = 1.0)]
    pub price: f64,
}

/// Body of create and full-update requests.
///
/// Every field is optional at the JSON level so that a missing `name` or
/// `price` is reported as a validation error instead of a parse error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct ProductPayload {
    /// Must be absent on create and match the path on update
    pub id: Option<i64>,

    #[validate(required, length(min = 1, max = 255))]
    #[schema(example = "AAAAAAAAAA")]
    pub name: Option<String>,

    #[validate(required)]
    #[schema(example = 1.0)]
    pub price: Option<f64>,
}

impl ProductPayload {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
            price: Some(price),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Validated name and price, ready to be written.
    pub fn into_new_product(self) -> ProductResult<NewProduct> {
        self.validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        let name = self
            .name
            .ok_or_else(|| ProductError::Validation("name is required".to_string()))?;
        let price = self
            .price
            .ok_or_else(|| ProductError::Validation("price is required".to_string()))?;

        NewProduct::new(name, price)
    }
}

/// Body of merge-patch requests; `null` or absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct ProductPatch {
    pub id: Option<i64>,

    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,

    pub price: Option<f64>,
}

impl ProductPatch {
    /// Overwrite the fields of `product` that this patch sets.
    pub fn apply_to(self, product: &mut Product) -> ProductResult<()> {
        self.validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(price) = self.price {
            product.price = check_price(price)?;
        }
        Ok(())
    }
}

/// Name and price of a product that has no id yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, price: f64) -> ProductResult<Self> {
        Ok(Self {
            name: name.into(),
            price: check_price(price)?,
        })
    }

    pub fn with_id(self, id: i64) -> Product {
        Product {
            id,
            name: self.name,
            price: self.price,
        }
    }
}

fn check_price(price: f64) -> ProductResult<f64> {
    if price.is_finite() {
        Ok(price)
    } else {
        Err(ProductError::Validation(
            "price must be a finite number".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_requires_name_and_price() {
        let missing_name = ProductPayload {
            price: Some(1.0),
            ..Default::default()
        };
        assert!(matches!(
            missing_name.into_new_product(),
            Err(ProductError::Validation(_))
        ));

        let missing_price = ProductPayload {
            name: Some("AAAAAAAAAA".into()),
            ..Default::default()
        };
        assert!(missing_price.validate().is_err());
    }

    #[test]
    fn test_payload_rejects_empty_and_long_names() {
        assert!(ProductPayload::new("", 1.0).validate().is_err());
        assert!(ProductPayload::new("x".repeat(256), 1.0).validate().is_err());
        assert!(ProductPayload::new("x".repeat(255), 1.0).validate().is_ok());
    }

    #[test]
    fn test_non_finite_price_is_rejected() {
        assert!(NewProduct::new("a", f64::NAN).is_err());
        assert!(NewProduct::new("a", f64::INFINITY).is_err());
        assert_eq!(NewProduct::new("a", -3.5).unwrap().price, -3.5);
    }

    #[test]
    fn test_patch_only_overwrites_present_fields() {
        let mut product = Product {
            id: 1,
            name: "AAAAAAAAAA".into(),
            price: 1.0,
        };

        ProductPatch {
            price: Some(2.0),
            ..Default::default()
        }
        .apply_to(&mut product)
        .unwrap();

        assert_eq!(product.name, "AAAAAAAAAA");
        assert_eq!(product.price, 2.0);
    }

    #[test]
    fn test_product_json_shape() {
        let json = serde_json::to_value(Product {
            id: 1,
            name: "AAAAAAAAAA".into(),
            price: 1.0,
        })
        .unwrap();

        assert_eq!(json, serde_json::json!({"id": 1, "name": "AAAAAAAAAA", "price": 1.0}));
    }
}
