//! HTTP handlers for Products API

use axum::{
    Json, Router,
    extract::{OriginalUri, Query, State},
    http::{HeaderValue, StatusCode, header::LOCATION},
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    AppError, EntityAlerts, IdPath, PageRequest, ValidatedJson,
    errors::responses::{
        BadRequestAlertResponse, BadRequestIdResponse, BadRequestValidationResponse,
        ConflictResponse, InternalServerErrorResponse, NotFoundResponse,
    },
    pagination_headers,
};
use core_config::pagination::PaginationConfig;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi};

use crate::criteria::ProductCriteria;
use crate::error::ProductError;
use crate::models::{Product, ProductPatch, ProductPayload, SORTABLE_PROPERTIES};
use crate::repository::ProductRepository;
use crate::service::ProductService;

type ApiResult<T> = Result<T, AppError>;

/// OpenAPI documentation for Products API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        count_products,
        create_product,
        get_product,
        update_product,
        partial_update_product,
        delete_product,
    ),
    components(
        schemas(Product, ProductPayload, ProductPatch),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestAlertResponse,
            BadRequestIdResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Products", description = "Product management endpoints")
    )
)]
pub struct ApiDoc;

/// Query parameters understood by the list and count endpoints.
///
/// Documentation only: binding goes through [`ProductCriteria::from_query_pairs`]
/// and [`PageRequest::from_query_pairs`], which also accept the remaining
/// operators (`notEquals`, `notIn`, `specified`, `greaterThanOrEqual`, ...).
#[allow(dead_code)]
#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    #[serde(rename = "id.equals")]
    id_equals: Option<i64>,
    /// Comma-separated ids
    #[serde(rename = "id.in")]
    id_in: Option<String>,
    #[serde(rename = "name.equals")]
    name_equals: Option<String>,
    /// Case-sensitive substring
    #[serde(rename = "name.contains")]
    name_contains: Option<String>,
    #[serde(rename = "name.doesNotContain")]
    name_does_not_contain: Option<String>,
    #[serde(rename = "price.greaterThan")]
    price_greater_than: Option<f64>,
    #[serde(rename = "price.lessThan")]
    price_less_than: Option<f64>,
    /// Return each product at most once
    distinct: Option<bool>,
    /// Zero-based page index
    page: Option<u64>,
    /// Page size; 0 means the default
    size: Option<u64>,
    /// `property[,asc|desc]`, repeatable; properties: id, name, price
    sort: Option<String>,
}

/// Shared state of the products routes
pub struct ProductsApi<R: ProductRepository> {
    pub service: ProductService<R>,
    pub alerts: EntityAlerts,
    pub pagination: PaginationConfig,
}

/// Create the products router; mount it at `/products`
pub fn router<R: ProductRepository + 'static>(
    service: ProductService<R>,
    alerts: EntityAlerts,
    pagination: PaginationConfig,
) -> Router {
    let state = Arc::new(ProductsApi {
        service,
        alerts,
        pagination,
    });

    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/count", get(count_products))
        .route(
            "/{id}",
            get(get_product)
                .put(update_product)
                .patch(partial_update_product)
                .delete(delete_product),
        )
        .with_state(state)
}

/// List products matching the filters, one page at a time
#[utoipa::path(
    get,
    path = "",
    tag = "Products",
    params(ProductQuery),
    responses(
        (status = 200, description = "Page of products; X-Total-Count and Link headers describe the rest", body = Vec<Product>),
        (status = 400, response = BadRequestAlertResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: ProductRepository>(
    State(api): State<Arc<ProductsApi<R>>>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<impl IntoResponse> {
    let criteria = ProductCriteria::from_query_pairs(&params)?;
    let page_request =
        PageRequest::from_query_pairs(&params, &api.pagination, SORTABLE_PROPERTIES)?;

    let page = api
        .service
        .find_by_criteria_paged(criteria, page_request)
        .await?;
    let headers = pagination_headers(&uri, &page);

    Ok((headers, Json(page.content)))
}

/// Count products matching the filters
#[utoipa::path(
    get,
    path = "/count",
    tag = "Products",
    params(ProductQuery),
    responses(
        (status = 200, description = "Number of matching products", body = u64),
        (status = 400, response = BadRequestAlertResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn count_products<R: ProductRepository>(
    State(api): State<Arc<ProductsApi<R>>>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<Json<u64>> {
    let criteria = ProductCriteria::from_query_pairs(&params)?;
    let count = api.service.count_by_criteria(criteria).await?;
    Ok(Json(count))
}

/// Create a new product
#[utoipa::path(
    post,
    path = "",
    tag = "Products",
    request_body = ProductPayload,
    responses(
        (status = 201, description = "Product created; Location points at it", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<R: ProductRepository>(
    State(api): State<Arc<ProductsApi<R>>>,
    OriginalUri(uri): OriginalUri,
    ValidatedJson(payload): ValidatedJson<ProductPayload>,
) -> ApiResult<impl IntoResponse> {
    let product = api.service.create_product(payload).await?;

    let location = format!("{}/{}", uri.path().trim_end_matches('/'), product.id);
    let location = HeaderValue::from_str(&location)
        .map_err(|e| AppError::InternalServerError(format!("Invalid Location header: {}", e)))?;

    let mut headers = api.alerts.created(product.id);
    headers.insert(LOCATION, location);

    Ok((StatusCode::CREATED, headers, Json(product)))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Products",
    params(("id" = i64, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<R: ProductRepository>(
    State(api): State<Arc<ProductsApi<R>>>,
    IdPath(id): IdPath,
) -> ApiResult<Json<Product>> {
    let product = api
        .service
        .get_product(id)
        .await?
        .ok_or(ProductError::NotFound(id))?;
    Ok(Json(product))
}

/// Replace a product
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Products",
    params(("id" = i64, Path, description = "Product ID")),
    request_body = ProductPayload,
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 400, response = BadRequestAlertResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<R: ProductRepository>(
    State(api): State<Arc<ProductsApi<R>>>,
    IdPath(id): IdPath,
    ValidatedJson(payload): ValidatedJson<ProductPayload>,
) -> ApiResult<impl IntoResponse> {
    let product = api.service.update_product(id, payload).await?;
    Ok((api.alerts.updated(product.id), Json(product)))
}

/// Partially update a product; absent or null fields are kept
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Products",
    params(("id" = i64, Path, description = "Product ID")),
    request_body(content = ProductPatch, content_type = "application/merge-patch+json"),
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 400, response = BadRequestAlertResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn partial_update_product<R: ProductRepository>(
    State(api): State<Arc<ProductsApi<R>>>,
    IdPath(id): IdPath,
    ValidatedJson(patch): ValidatedJson<ProductPatch>,
) -> ApiResult<impl IntoResponse> {
    let product = api
        .service
        .partial_update_product(id, patch)
        .await?
        .ok_or(ProductError::NotFound(id))?;
    Ok((api.alerts.updated(product.id), Json(product)))
}

/// Delete a product by ID
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Products",
    params(("id" = i64, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Product deleted, or there was nothing to delete"),
        (status = 400, response = BadRequestIdResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<R: ProductRepository>(
    State(api): State<Arc<ProductsApi<R>>>,
    IdPath(id): IdPath,
) -> ApiResult<impl IntoResponse> {
    api.service.delete_product(id).await?;
    Ok((StatusCode::NO_CONTENT, api.alerts.deleted(id)))
}
