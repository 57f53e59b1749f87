use async_trait::async_trait;
use axum_helpers::{PageRequest, SortDirection, SortOrder};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering as AtomicOrdering};
use tokio::sync::RwLock;

use crate::criteria::ProductCriteria;
use crate::error::{ProductError, ProductResult};
use crate::models::{NewProduct, Product};

/// Repository trait for Product persistence
///
/// Listing and counting take the same [`ProductCriteria`], so an unpaged
/// `find_all` always returns `count` rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a product and assign its id
    async fn insert(&self, input: NewProduct) -> ProductResult<Product>;

    /// Replace name and price of an existing product; `None` if the row is gone
    async fn save(&self, product: Product) -> ProductResult<Option<Product>>;

    async fn find_by_id(&self, id: i64) -> ProductResult<Option<Product>>;

    async fn exists_by_id(&self, id: i64) -> ProductResult<bool>;

    /// Whether another product (not `excluding_id`) already uses `name`
    async fn exists_by_name(&self, name: String, excluding_id: Option<i64>) -> ProductResult<bool>;

    /// Matching products ordered by the page's sort (then id), optionally paged
    async fn find_all(
        &self,
        criteria: ProductCriteria,
        page: Option<PageRequest>,
    ) -> ProductResult<Vec<Product>>;

    async fn count(&self, criteria: ProductCriteria) -> ProductResult<u64>;

    /// Delete by id; `false` when nothing was deleted
    async fn delete_by_id(&self, id: i64) -> ProductResult<bool>;
}

/// Order two products by `orders`, falling back to ascending id.
pub fn compare_products(a: &Product, b: &Product, orders: &[SortOrder]) -> Ordering {
    orders
        .iter()
        .map(|order| {
            let ordering = match order.property.as_str() {
                "name" => a.name.cmp(&b.name),
                "price" => a.price.total_cmp(&b.price),
                _ => a.id.cmp(&b.id),
            };
            match order.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or_else(|| a.id.cmp(&b.id))
}

/// In-memory implementation of ProductRepository
///
/// Mirrors the table's constraints: ids come from a sequence and names are unique.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<BTreeMap<i64, Product>>>,
    sequence: Arc<AtomicI64>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn name_taken(products: &BTreeMap<i64, Product>, name: &str, excluding_id: Option<i64>) -> bool {
    products
        .values()
        .any(|p| p.name == name && Some(p.id) != excluding_id)
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn insert(&self, input: NewProduct) -> ProductResult<Product> {
        let mut products = self.products.write().await;
        if name_taken(&products, &input.name, None) {
            return Err(ProductError::DuplicateName(input.name));
        }

        let id = self.sequence.fetch_add(1, AtomicOrdering::SeqCst) + 1;
        let product = input.with_id(id);
        products.insert(id, product.clone());
        Ok(product)
    }

    async fn save(&self, product: Product) -> ProductResult<Option<Product>> {
        let mut products = self.products.write().await;
        if !products.contains_key(&product.id) {
            return Ok(None);
        }
        if name_taken(&products, &product.name, Some(product.id)) {
            return Err(ProductError::DuplicateName(product.name));
        }

        products.insert(product.id, product.clone());
        Ok(Some(product))
    }

    async fn find_by_id(&self, id: i64) -> ProductResult<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.get(&id).cloned())
    }

    async fn exists_by_id(&self, id: i64) -> ProductResult<bool> {
        let products = self.products.read().await;
        Ok(products.contains_key(&id))
    }

    async fn exists_by_name(&self, name: String, excluding_id: Option<i64>) -> ProductResult<bool> {
        let products = self.products.read().await;
        Ok(name_taken(&products, &name, excluding_id))
    }

    async fn find_all(
        &self,
        criteria: ProductCriteria,
        page: Option<PageRequest>,
    ) -> ProductResult<Vec<Product>> {
        let predicate = criteria.predicate();
        let products = self.products.read().await;

        // Rows are keyed by id, so `distinct` never has duplicates to collapse
        let mut matched: Vec<Product> = products.values().filter(|p| predicate(p)).cloned().collect();

        let Some(page) = page else {
            return Ok(matched);
        };

        matched.sort_by(|a, b| compare_products(a, b, &page.sort));
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let size = usize::try_from(page.size).unwrap_or(usize::MAX);
        Ok(matched.into_iter().skip(offset).take(size).collect())
    }

    async fn count(&self, criteria: ProductCriteria) -> ProductResult<u64> {
        let predicate = criteria.predicate();
        let products = self.products.read().await;
        Ok(products.values().filter(|p| predicate(p)).count() as u64)
    }

    async fn delete_by_id(&self, id: i64) -> ProductResult<bool> {
        let mut products = self.products.write().await;
        Ok(products.remove(&id).is_some())
    }
}
