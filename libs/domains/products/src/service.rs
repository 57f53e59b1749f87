//! Product Service - Business logic layer

use axum_helpers::{Page, PageRequest};
use std::sync::Arc;
use tracing::instrument;

use crate::criteria::ProductCriteria;
use crate::error::{ProductError, ProductResult};
use crate::models::{Product, ProductPatch, ProductPayload};
use crate::repository::ProductRepository;

/// Product service: id rules, validation and name uniqueness on top of a repository
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a product; the payload must not carry an id.
    #[instrument(skip(self, payload), fields(product_name = ?payload.name))]
    pub async fn create_product(&self, payload: ProductPayload) -> ProductResult<Product> {
        tracing::debug!(?payload, "Request to create product");
        if payload.id.is_some() {
            return Err(ProductError::IdExists);
        }

        let input = payload.into_new_product()?;
        if self.repository.exists_by_name(input.name.clone(), None).await? {
            return Err(ProductError::DuplicateName(input.name));
        }

        self.repository.insert(input).await
    }

    /// Replace name and price of product `id`.
    #[instrument(skip(self, payload), fields(product_id = id))]
    pub async fn update_product(&self, id: i64, payload: ProductPayload) -> ProductResult<Product> {
        tracing::debug!(?payload, "Request to update product");
        self.check_id(id, payload.id).await?;

        let product = payload.into_new_product()?.with_id(id);
        if self
            .repository
            .exists_by_name(product.name.clone(), Some(id))
            .await?
        {
            return Err(ProductError::DuplicateName(product.name));
        }

        self.repository
            .save(product)
            .await?
            .ok_or(ProductError::IdNotFound)
    }

    /// Merge the non-null fields of `patch` into product `id`.
    ///
    /// `Ok(None)` when the product disappeared after the existence check.
    #[instrument(skip(self, patch), fields(product_id = id))]
    pub async fn partial_update_product(
        &self,
        id: i64,
        patch: ProductPatch,
    ) -> ProductResult<Option<Product>> {
        tracing::debug!(?patch, "Request to partially update product");
        self.check_id(id, patch.id).await?;

        let Some(mut product) = self.repository.find_by_id(id).await? else {
            return Ok(None);
        };

        let renamed = patch.name.as_ref().is_some_and(|name| *name != product.name);
        patch.apply_to(&mut product)?;

        if renamed
            && self
                .repository
                .exists_by_name(product.name.clone(), Some(id))
                .await?
        {
            return Err(ProductError::DuplicateName(product.name));
        }

        self.repository.save(product).await
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: i64) -> ProductResult<Option<Product>> {
        tracing::debug!("Request to get product");
        self.repository.find_by_id(id).await
    }

    /// Delete product `id`; a missing id is not an error.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: i64) -> ProductResult<()> {
        tracing::debug!("Request to delete product");
        if !self.repository.delete_by_id(id).await? {
            tracing::debug!(product_id = id, "Nothing to delete");
        }
        Ok(())
    }

    /// One page of matches plus the total match count.
    #[instrument(skip(self))]
    pub async fn find_by_criteria_paged(
        &self,
        criteria: ProductCriteria,
        page_request: PageRequest,
    ) -> ProductResult<Page<Product>> {
        tracing::debug!("Find product page by criteria");
        let total = self.repository.count(criteria.clone()).await?;
        let content = self
            .repository
            .find_all(criteria, Some(page_request.clone()))
            .await?;

        Ok(Page::new(content, &page_request, total))
    }

    #[instrument(skip(self))]
    pub async fn count_by_criteria(&self, criteria: ProductCriteria) -> ProductResult<u64> {
        tracing::debug!("Count products by criteria");
        self.repository.count(criteria).await
    }

    /// Whether product `id` is stored
    pub async fn exists(&self, id: i64) -> ProductResult<bool> {
        self.repository.exists_by_id(id).await
    }

    /// Id rules shared by full and partial updates.
    async fn check_id(&self, path_id: i64, body_id: Option<i64>) -> ProductResult<()> {
        match body_id {
            None => Err(ProductError::IdNull),
            Some(body_id) if body_id != path_id => Err(ProductError::IdInvalid),
            Some(_) if !self.exists(path_id).await? => {
                Err(ProductError::IdNotFound)
            }
            Some(_) => Ok(()),
        }
    }
}
