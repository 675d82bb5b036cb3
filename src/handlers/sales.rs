use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::handlers::common::success_response;
use crate::{AppState, ListQuery, PaginatedResponse};

/// Sales history and dashboard endpoints.
pub fn sales_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sales))
        .route("/dashboard", get(dashboard_summary))
        .route("/:id", get(get_sale))
}

/// Sales history, newest first
#[utoipa::path(
    get,
    path = "/api/v1/sales",
    params(
        ("page" = Option<u64>, Query, description = "Page number"),
        ("limit" = Option<u64>, Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "Sales retrieved"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Sales"
)]
pub async fn list_sales(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let (sales, total) = state
        .services
        .sales
        .list_sales(query.page, query.limit)
        .await?;
    Ok(success_response(PaginatedResponse {
        items: sales,
        total,
        page: query.page,
        limit: query.limit,
    }))
}

/// One sale with its line items
#[utoipa::path(
    get,
    path = "/api/v1/sales/:id",
    params(("id" = Uuid, Path, description = "Sale ID")),
    responses(
        (status = 200, description = "Sale retrieved"),
        (status = 404, description = "Sale not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Sales"
)]
pub async fn get_sale(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let sale = state.services.sales.get_sale(id).await?;
    Ok(success_response(sale))
}

/// Store-wide counters for the dashboard
#[utoipa::path(
    get,
    path = "/api/v1/sales/dashboard",
    responses(
        (status = 200, description = "Summary retrieved"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Sales"
)]
pub async fn dashboard_summary(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let summary = state.services.sales.dashboard_summary().await?;
    Ok(success_response(summary))
}
