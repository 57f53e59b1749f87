//! Integration tests for Products domain
//!
//! These use real PostgreSQL via testcontainers to check that:
//! - SeaORM conditions built from criteria agree with the in-memory predicate
//! - The unique index on `name` surfaces as `DuplicateName`
//! - Paging and sorting are stable
//!
//! They need Docker: `cargo test -p domain_products -- --ignored`

use axum_helpers::{PageRequest, SortDirection};
use domain_products::*;
use test_utils::{TestDataBuilder, TestDatabase, assertions::*};

// ============================================================================
// Repository Tests
// ============================================================================

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_insert_and_find_product() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("insert_and_find");

    let input = NewProduct::new(builder.name("product", "main"), builder.price(0)).unwrap();
    let created = repo.insert(input.clone()).await.unwrap();

    assert!(created.id > 0);
    assert_eq!(created.name, input.name);
    assert_close(created.price, input.price, "created price");

    let retrieved = repo.find_by_id(created.id).await.unwrap();
    let retrieved = assert_some(retrieved, "product should exist");
    assert_eq!(retrieved, created);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_duplicate_name_constraint() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("duplicate_name");
    let name = builder.name("product", "dup");

    repo.insert(NewProduct::new(name.clone(), 1.0).unwrap())
        .await
        .unwrap();
    let result = repo.insert(NewProduct::new(name, 2.0).unwrap()).await;

    assert!(matches!(result, Err(ProductError::DuplicateName(_))));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_save_replaces_fields_and_reports_missing_rows() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("save");

    let created = repo
        .insert(NewProduct::new(builder.name("product", "before"), 1.0).unwrap())
        .await
        .unwrap();

    let replacement = Product {
        id: created.id,
        name: builder.name("product", "after"),
        price: 9.5,
    };
    let saved = repo.save(replacement.clone()).await.unwrap();
    assert_eq!(saved, Some(replacement));

    let ghost = Product {
        id: created.id + 1000,
        name: builder.name("product", "ghost"),
        price: 1.0,
    };
    assert_eq!(repo.save(ghost).await.unwrap(), None);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_delete_by_id() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());

    let created = repo
        .insert(NewProduct::new("to-delete", 1.0).unwrap())
        .await
        .unwrap();

    assert!(repo.delete_by_id(created.id).await.unwrap());
    assert!(!repo.delete_by_id(created.id).await.unwrap());
    assert!(!repo.exists_by_id(created.id).await.unwrap());
}

// ============================================================================
// Criteria Tests
// ============================================================================

async fn seed(repo: &PgProductRepository) {
    for (name, price) in [
        ("apple", 1.0),
        ("banana", 2.5),
        ("cherry", 4.0),
        ("50% off", 3.0),
        ("500 grams", 3.0),
        ("under_score", 5.0),
    ] {
        repo.insert(NewProduct::new(name, price).unwrap())
            .await
            .unwrap();
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_sql_and_in_memory_filters_agree() {
    let db = TestDatabase::new().await;
    let pg = PgProductRepository::new(db.connection());
    let memory = InMemoryProductRepository::new();
    seed(&pg).await;
    for product in pg.find_all(ProductCriteria::new(), None).await.unwrap() {
        memory
            .insert(NewProduct::new(product.name, product.price).unwrap())
            .await
            .unwrap();
    }

    let cases = vec![
        ProductCriteria::new(),
        ProductCriteria::new().with_name(StringFilter::Contains("an".into())),
        ProductCriteria::new().with_name(StringFilter::Contains("50%".into())),
        ProductCriteria::new().with_name(StringFilter::Contains("_".into())),
        ProductCriteria::new().with_name(StringFilter::DoesNotContain("e".into())),
        ProductCriteria::new()
            .with_price(RangeFilter::GreaterThan(2.5))
            .with_price(RangeFilter::LessThanOrEqual(4.0)),
        ProductCriteria::new().with_price(RangeFilter::In(vec![1.0, 3.0])),
        ProductCriteria::new().with_id(RangeFilter::In(Vec::new())),
        ProductCriteria::new().with_id(RangeFilter::NotIn(Vec::new())),
        ProductCriteria::new()
            .with_name(StringFilter::Specified(true))
            .with_distinct(true),
    ];

    for criteria in cases {
        let from_sql: Vec<String> = pg
            .find_all(criteria.clone(), None)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        let from_memory: Vec<String> = memory
            .find_all(criteria.clone(), None)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();

        assert_eq!(from_sql, from_memory, "criteria: {:?}", criteria);
        assert_eq!(
            pg.count(criteria.clone()).await.unwrap(),
            from_sql.len() as u64,
            "count for {:?}",
            criteria
        );
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_wildcards_match_literally() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    seed(&repo).await;

    let names: Vec<String> = repo
        .find_all(
            ProductCriteria::new().with_name(StringFilter::Contains("50%".into())),
            None,
        )
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();

    assert_eq!(names, vec!["50% off"]);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_paging_with_sort_is_stable() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    seed(&repo).await;

    let mut seen = Vec::new();
    for page in 0..3 {
        let request = PageRequest::new(page, 2).with_sort("price", SortDirection::Desc);
        let products = repo
            .find_all(ProductCriteria::new(), Some(request))
            .await
            .unwrap();
        assert_eq!(products.len(), 2);
        seen.extend(products);
    }

    let prices: Vec<f64> = seen.iter().map(|p| p.price).collect();
    assert_eq!(prices, vec![5.0, 4.0, 3.0, 3.0, 2.5, 1.0]);
    // Equal prices fall back to ascending id
    assert!(seen[2].id < seen[3].id);
}

// ============================================================================
// Service Tests
// ============================================================================

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_service_paged_listing_against_postgres() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    seed(&repo).await;
    let service = ProductService::new(repo);

    let page = service
        .find_by_criteria_paged(
            ProductCriteria::new().with_price(RangeFilter::GreaterThanOrEqual(3.0)),
            PageRequest::new(0, 3),
        )
        .await
        .unwrap();

    assert_eq!(page.total_elements, 4);
    assert_eq!(page.total_pages(), 2);
    assert_eq!(page.content.len(), 3);
}
