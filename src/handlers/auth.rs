use axum::{
    extract::{Extension, Json, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde_json::json;

use crate::auth::{AuthUser, LoginInput, SignupInput};
use crate::errors::ServiceError;
use crate::handlers::common::{created_response, success_response, validate_input};
use crate::AppState;

/// Public routes: account creation and login.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
}

/// Routes behind the bearer-token middleware.
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/logout", post(logout))
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    request_body = SignupInput,
    responses(
        (status = 201, description = "Account created"),
        (status = 409, description = "Email already registered", body = crate::errors::ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupInput>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let response = state.services.auth.signup(payload).await?;
    Ok(created_response(response))
}

/// Exchange credentials for a bearer token
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginInput,
    responses(
        (status = 200, description = "Authenticated"),
        (status = 401, description = "Invalid credentials", body = crate::errors::ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let response = state.services.auth.login(payload).await?;
    Ok(success_response(response))
}

/// Current-session lookup, driven by the validated token's claims.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "The authenticated account"),
        (status = 401, description = "Missing or invalid token", body = crate::errors::ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<crate::auth::Claims>,
) -> Result<impl IntoResponse, ServiceError> {
    let user = state.services.auth.current_user(&claims).await?;
    Ok(success_response(user))
}

/// Sessions are stateless bearer tokens; sign-out is the client discarding
/// its token. The endpoint exists so clients have an explicit action to call.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 200, description = "Signed out"),
        (status = 401, description = "Missing or invalid token", body = crate::errors::ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn logout(
    Extension(auth_user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ServiceError> {
    tracing::info!(user_id = %auth_user.id, "user signed out");
    Ok(success_response(json!({ "message": "Signed out" })))
}
