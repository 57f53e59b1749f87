use async_trait::async_trait;
use axum_helpers::{PageRequest, SortDirection};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr,
};

use crate::{
    criteria::ProductCriteria,
    entity,
    error::{ProductError, ProductResult},
    models::{NewProduct, Product},
    repository::ProductRepository,
};

/// SeaORM repository over the `products` table
pub struct PgProductRepository {
    db: DatabaseConnection,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Unique violations on `name` become `DuplicateName`.
fn write_error(e: DbErr, name: &str) -> ProductError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => ProductError::DuplicateName(name.to_string()),
        _ => ProductError::Database(e),
    }
}

fn sort_column(property: &str) -> ProductResult<entity::Column> {
    match property {
        "id" => Ok(entity::Column::Id),
        "name" => Ok(entity::Column::Name),
        "price" => Ok(entity::Column::Price),
        other => Err(ProductError::InvalidFilter(format!(
            "cannot sort by '{}'",
            other
        ))),
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn insert(&self, input: NewProduct) -> ProductResult<Product> {
        let name = input.name.clone();
        let active_model: entity::ActiveModel = input.into();

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| write_error(e, &name))?;

        tracing::info!(product_id = model.id, "Created product");
        Ok(model.into())
    }

    async fn save(&self, product: Product) -> ProductResult<Option<Product>> {
        let id = product.id;
        let name = product.name.clone();
        let active_model: entity::ActiveModel = product.into();

        match active_model.update(&self.db).await {
            Ok(model) => {
                tracing::info!(product_id = id, "Updated product");
                Ok(Some(model.into()))
            }
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(e) => Err(write_error(e, &name)),
        }
    }

    async fn find_by_id(&self, id: i64) -> ProductResult<Option<Product>> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await?;

        Ok(model.map(Into::into))
    }

    async fn exists_by_id(&self, id: i64) -> ProductResult<bool> {
        let count = entity::Entity::find_by_id(id)
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    async fn exists_by_name(&self, name: String, excluding_id: Option<i64>) -> ProductResult<bool> {
        let mut query = entity::Entity::find().filter(entity::Column::Name.eq(name));
        if let Some(id) = excluding_id {
            query = query.filter(entity::Column::Id.ne(id));
        }

        let count = query.count(&self.db).await?;
        Ok(count > 0)
    }

    async fn find_all(
        &self,
        criteria: ProductCriteria,
        page: Option<PageRequest>,
    ) -> ProductResult<Vec<Product>> {
        let mut query = entity::Entity::find().filter(criteria.condition());
        if criteria.is_distinct() {
            query = query.distinct();
        }

        if let Some(page) = &page {
            // OFFSET and LIMIT are bound as BIGINT; such a page has no rows
            if page.offset() > i64::MAX as u64 || page.size > i64::MAX as u64 {
                return Ok(Vec::new());
            }
            for order in &page.sort {
                let direction = match order.direction {
                    SortDirection::Asc => Order::Asc,
                    SortDirection::Desc => Order::Desc,
                };
                query = query.order_by(sort_column(&order.property)?, direction);
            }
            query = query.offset(page.offset()).limit(page.size);
        }
        // Stable pages: id always breaks ties
        query = query.order_by_asc(entity::Column::Id);

        let models = query.all(&self.db).await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn count(&self, criteria: ProductCriteria) -> ProductResult<u64> {
        let mut query = entity::Entity::find().filter(criteria.condition());
        if criteria.is_distinct() {
            query = query.distinct();
        }

        Ok(query.count(&self.db).await?)
    }

    async fn delete_by_id(&self, id: i64) -> ProductResult<bool> {
        let result = entity::Entity::delete_by_id(id)
            .exec(&self.db)
            .await?;

        if result.rows_affected > 0 {
            tracing::info!(product_id = id, "Deleted product");
        }
        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn model(id: i64, name: &str, price: f64) -> entity::Model {
        entity::Model {
            id,
            name: name.to_string(),
            price,
        }
    }

    #[tokio::test]
    async fn test_find_by_id_maps_model() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model(7, "AAAAAAAAAA", 1.0)]])
            .into_connection();
        let repo = PgProductRepository::new(db);

        let product = repo.find_by_id(7).await.unwrap().unwrap();
        assert_eq!(product.name, "AAAAAAAAAA");
        assert_eq!(product.price, 1.0);
    }

    #[tokio::test]
    async fn test_find_all_returns_rows_in_query_order() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model(2, "b", 2.0), model(1, "a", 1.0)]])
            .into_connection();
        let repo = PgProductRepository::new(db);

        let page = PageRequest::new(0, 20).with_sort("price", SortDirection::Desc);
        let products = repo
            .find_all(ProductCriteria::new().with_distinct(true), Some(page))
            .await
            .unwrap();

        assert_eq!(products.iter().map(|p| p.id).collect::<Vec<_>>(), vec![2, 1]);
    }

    #[tokio::test]
    async fn test_page_past_bigint_offset_skips_the_query() {
        // No query results queued: any statement would fail
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repo = PgProductRepository::new(db);

        let products = repo
            .find_all(ProductCriteria::new(), Some(PageRequest::new(u64::MAX, 20)))
            .await
            .unwrap();

        assert!(products.is_empty());
    }

    #[tokio::test]
    async fn test_delete_of_missing_row_is_false() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let repo = PgProductRepository::new(db);

        assert!(!repo.delete_by_id(99).await.unwrap());
    }

    #[tokio::test]
    async fn test_query_failure_is_a_database_error() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("connection reset".into())])
            .into_connection();
        let repo = PgProductRepository::new(db);

        assert!(matches!(
            repo.find_by_id(1).await,
            Err(ProductError::Database(_))
        ));
    }

    #[test]
    fn test_unknown_sort_property_is_rejected() {
        assert!(sort_column("password").is_err());
        assert!(sort_column("price").is_ok());
    }
}
