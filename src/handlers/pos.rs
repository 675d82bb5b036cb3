use axum::{
    extract::{Json, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use crate::errors::ServiceError;
use crate::handlers::common::{created_response, success_response, validate_input};
use crate::services::checkout::CheckoutLineInput;
use crate::{AppState, ListQuery};

/// Point-of-sale endpoints: the searchable catalog and checkout.
pub fn pos_routes() -> Router<AppState> {
    Router::new()
        .route("/catalog", get(pos_catalog))
        .route("/checkout", post(checkout))
}

/// Searchable sale catalog: products joined with in-stock variants
#[utoipa::path(
    get,
    path = "/api/v1/pos/catalog",
    params(("search" = Option<String>, Query, description = "Filter by name or reference")),
    responses(
        (status = 200, description = "Catalog retrieved"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "POS"
)]
pub async fn pos_catalog(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let catalog = state
        .services
        .catalog
        .list_catalog(query.search.as_deref())
        .await?;
    Ok(success_response(catalog))
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CheckoutRequest {
    #[validate]
    pub items: Vec<CheckoutLineInput>,
}

/// Finalize a sale: validates the cart, decrements stock and records the
/// sale atomically
#[utoipa::path(
    post,
    path = "/api/v1/pos/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Sale completed", body = crate::services::checkout::CheckoutReceipt),
        (status = 400, description = "Empty cart or invalid payload", body = crate::errors::ErrorResponse),
        (status = 422, description = "Insufficient stock", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "POS"
)]
pub async fn checkout(
    State(state): State<AppState>,
    Json(payload): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let cart = state.services.checkout.build_cart(&payload.items).await?;
    let receipt = state.services.checkout.checkout(&cart).await?;
    info!(sale_id = %receipt.sale.id, "sale completed");
    Ok(created_response(receipt))
}
