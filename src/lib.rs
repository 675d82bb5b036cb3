//! PDV API Library
//!
//! This crate provides the core functionality for the PDV point-of-sale API:
//! catalog management, the in-memory cart engine, atomic checkout and sales
//! history for a small retail store.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod currency;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod openapi;
pub mod services;

use std::sync::Arc;

use axum::{extract::State, middleware, response::Json, routing::get, Router};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use utoipa::ToSchema;

use crate::auth::{auth_middleware, AuthService};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: Arc<events::EventSender>,
    pub services: handlers::AppServices,
}

// Common query parameters for list endpoints
#[derive(Debug, Deserialize, ToSchema)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub search: Option<String>,
}

fn default_page() -> u64 {
    1
}
fn default_limit() -> u64 {
    20
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

/// All `/api/v1` routes. The auth subtree is public; everything else sits
/// behind bearer-token middleware.
pub fn api_v1_routes(auth: Arc<AuthService>) -> Router<AppState> {
    let require_auth = middleware::from_fn_with_state(auth, auth_middleware);

    let auth_router = handlers::auth_routes()
        .merge(handlers::session_routes().layer(require_auth.clone()));

    let protected = Router::new()
        .nest("/products", handlers::products_routes())
        .nest("/variants", handlers::variants_routes())
        .nest("/pos", handlers::pos_routes())
        .nest("/sales", handlers::sales_routes())
        .route("/dashboard", get(handlers::sales::dashboard_summary))
        .layer(require_auth);

    Router::new()
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        .nest("/auth", auth_router)
        .merge(protected)
}

async fn api_status() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "pdv-api",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Liveness plus a database ping. Mounted at the root and under `/api/v1`.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    Json(json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
