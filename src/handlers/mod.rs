pub mod auth;
pub mod common;
pub mod pos;
pub mod products;
pub mod sales;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::auth::AuthService;
use crate::events::EventSender;
use crate::services::{CatalogService, CheckoutService, SalesService};

pub use auth::{auth_routes, session_routes};
pub use pos::pos_routes;
pub use products::{products_routes, variants_routes};
pub use sales::sales_routes;

/// Service bundle shared by every handler through [`crate::AppState`].
#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<CatalogService>,
    pub checkout: Arc<CheckoutService>,
    pub sales: Arc<SalesService>,
    pub auth: Arc<AuthService>,
}

impl AppServices {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        auth: Arc<AuthService>,
    ) -> Self {
        Self {
            catalog: Arc::new(CatalogService::new(db.clone(), event_sender.clone())),
            checkout: Arc::new(CheckoutService::new(db.clone(), event_sender.clone())),
            sales: Arc::new(SalesService::new(db)),
            auth,
        }
    }
}
