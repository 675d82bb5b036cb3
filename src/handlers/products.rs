use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::errors::ServiceError;
use crate::handlers::common::{
    created_response, no_content_response, success_response, validate_input,
};
use crate::services::catalog::{CreateProductInput, CreateVariantInput, UpdateProductInput};
use crate::{AppState, ListQuery};

/// Product and nested variant management endpoints.
pub fn products_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/", post(create_product))
        .route("/:id", get(get_product))
        .route("/:id", put(update_product))
        .route("/:id", delete(delete_product))
        .route("/:id/variants", post(add_variant))
}

/// Variant endpoints addressed by variant id.
pub fn variants_routes() -> Router<AppState> {
    Router::new()
        .route("/:id/quantity", put(set_variant_quantity))
        .route("/:id", delete(delete_variant))
}

/// List products with their variants summary
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(("search" = Option<String>, Query, description = "Filter by name or reference")),
    responses(
        (status = 200, description = "Products retrieved"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let products = state
        .services
        .catalog
        .list_products(query.search.as_deref())
        .await?;
    Ok(success_response(products))
}

/// Create a new product
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CreateProductInput,
    responses(
        (status = 201, description = "Product created"),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 409, description = "Reference already in use", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductInput>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let product = state.services.catalog.create_product(payload).await?;
    Ok(created_response(product))
}

/// Get a product by id, with its variants
#[utoipa::path(
    get,
    path = "/api/v1/products/:id",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product retrieved"),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.services.catalog.get_product(id).await?;
    Ok(success_response(product))
}

/// Update a product
#[utoipa::path(
    put,
    path = "/api/v1/products/:id",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateProductInput,
    responses(
        (status = 200, description = "Product updated"),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductInput>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let product = state.services.catalog.update_product(id, payload).await?;
    Ok(success_response(product))
}

/// Delete a product and its variants
#[utoipa::path(
    delete,
    path = "/api/v1/products/:id",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.catalog.delete_product(id).await?;
    Ok(no_content_response())
}

/// Add a variant to a product
#[utoipa::path(
    post,
    path = "/api/v1/products/:id/variants",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = CreateVariantInput,
    responses(
        (status = 201, description = "Variant created"),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Products"
)]
pub async fn add_variant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateVariantInput>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let variant = state.services.catalog.add_variant(id, payload).await?;
    Ok(created_response(variant))
}

/// Set a variant's stock quantity
#[utoipa::path(
    put,
    path = "/api/v1/variants/:id/quantity",
    params(("id" = Uuid, Path, description = "Variant ID")),
    request_body = SetQuantityRequest,
    responses(
        (status = 200, description = "Quantity updated"),
        (status = 400, description = "Negative quantity", body = crate::errors::ErrorResponse),
        (status = 404, description = "Variant not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Variants"
)]
pub async fn set_variant_quantity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetQuantityRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let variant = state
        .services
        .catalog
        .set_variant_quantity(id, payload.quantity)
        .await?;
    Ok(success_response(variant))
}

/// Delete a variant
#[utoipa::path(
    delete,
    path = "/api/v1/variants/:id",
    params(("id" = Uuid, Path, description = "Variant ID")),
    responses(
        (status = 204, description = "Variant deleted"),
        (status = 404, description = "Variant not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Variants"
)]
pub async fn delete_variant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.catalog.delete_variant(id).await?;
    Ok(no_content_response())
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct SetQuantityRequest {
    #[validate(range(min = 0))]
    pub quantity: i32,
}
