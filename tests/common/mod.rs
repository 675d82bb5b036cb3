use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Method, Request},
    Router,
};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use pdv_api::{
    auth::{AuthConfig, AuthService, SignupInput},
    config::AppConfig,
    db,
    entities::{ProductModel, ProductVariantModel},
    events::{self, EventSender},
    handlers::AppServices,
    services::catalog::{CreateProductInput, CreateVariantInput},
    AppState,
};

/// Harness spinning up the full application over a throwaway SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    token: String,
    _db_dir: tempfile::TempDir,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let db_dir = tempfile::tempdir().expect("create temp dir for test database");
        let db_path = db_dir.path().join("pdv_test.db");

        let cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "test_secret_key_for_testing_purposes_only_32chars".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = Arc::new(EventSender::new(event_tx));
        let event_task = tokio::spawn(events::process_events(event_rx));

        let auth_cfg = AuthConfig::new(
            &cfg.jwt_secret,
            Duration::from_secs(cfg.jwt_expiration),
        );
        let auth_service = Arc::new(AuthService::new(
            auth_cfg,
            db_arc.clone(),
            event_sender.clone(),
        ));

        let services = AppServices::new(
            db_arc.clone(),
            event_sender.clone(),
            auth_service.clone(),
        );

        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            services,
        };

        let auth_response = auth_service
            .signup(SignupInput {
                email: format!("operator-{}@example.com", Uuid::new_v4()),
                name: "Test Operator".to_string(),
                password: "correct horse battery".to_string(),
            })
            .await
            .expect("seed test operator account");

        let router = Router::new()
            .nest("/api/v1", pdv_api::api_v1_routes(auth_service))
            .with_state(state.clone());

        Self {
            router,
            state,
            token: auth_response.token,
            _db_dir: db_dir,
            _event_task: event_task,
        }
    }

    /// Bearer token for the seeded operator account.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Convenience helper for authenticated JSON requests.
    pub async fn request_authenticated(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        self.request(method, uri, body, Some(self.token())).await
    }

    /// Seed a product with one variant carrying the given stock.
    pub async fn seed_variant(
        &self,
        name: &str,
        price: Decimal,
        quantity: i32,
    ) -> (ProductModel, ProductVariantModel) {
        let catalog = self.state.services.catalog.clone();
        let product = catalog
            .create_product(CreateProductInput {
                name: name.to_string(),
                reference: format!("ref-{}", Uuid::new_v4()),
                price,
                cost_price: price / Decimal::from(2),
            })
            .await
            .expect("seed product for tests");

        let variant = catalog
            .add_variant(
                product.id,
                CreateVariantInput {
                    size: "M".to_string(),
                    color: "Preto".to_string(),
                    quantity,
                },
            )
            .await
            .expect("seed variant for tests");

        (product, variant)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

/// Read a response body as JSON.
pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read response body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be valid json")
}
