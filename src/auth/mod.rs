//! Authentication for the API: email/password accounts with JWT sessions.
//!
//! Passwords are hashed with Argon2id; sessions are stateless bearer tokens
//! validated on every request by [`auth_middleware`].

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

pub mod user;

pub use user::{Entity as User, Model as UserModel};

/// JWT claims carried by every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    /// Expiry (seconds since epoch)
    pub exp: i64,
    /// Issued at (seconds since epoch)
    pub iat: i64,
}

/// Identity attached to the request by [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

#[derive(Clone)]
pub struct AuthConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
}

impl AuthConfig {
    pub fn new(secret: &str, token_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl,
        }
    }
}

#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl AuthService {
    pub fn new(
        config: AuthConfig,
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
    ) -> Self {
        Self {
            config,
            db,
            event_sender,
        }
    }

    /// Registers a new account and returns the user with a fresh token.
    #[instrument(skip(self, input))]
    pub async fn signup(&self, input: SignupInput) -> Result<AuthResponse, ServiceError> {
        let existing = User::find()
            .filter(user::Column::Email.eq(input.email.clone()))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Email {} is already registered",
                input.email
            )));
        }

        let password_hash = hash_password(&input.password)?;
        let user = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(input.email),
            name: Set(input.name),
            password_hash: Set(password_hash),
            created_at: Set(Utc::now()),
        };
        let user = user.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::UserRegistered(user.id))
            .await;

        let token = self.generate_token(&user)?;
        Ok(AuthResponse { user, token })
    }

    /// Verifies credentials and returns the user with a fresh token.
    #[instrument(skip(self, input))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthResponse, ServiceError> {
        let user = User::find()
            .filter(user::Column::Email.eq(input.email.clone()))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::AuthError("Invalid email or password".to_string()))?;

        if !verify_password(&input.password, &user.password_hash)? {
            return Err(ServiceError::AuthError(
                "Invalid email or password".to_string(),
            ));
        }

        let token = self.generate_token(&user)?;
        Ok(AuthResponse { user, token })
    }

    /// Looks up the account behind a validated token.
    pub async fn current_user(&self, claims: &Claims) -> Result<UserModel, ServiceError> {
        let id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ServiceError::AuthError("Malformed token subject".to_string()))?;
        User::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::AuthError("Account no longer exists".to_string()))
    }

    pub fn generate_token(&self, user: &UserModel) -> Result<String, ServiceError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            iat: now,
            exp: now + self.config.token_ttl.as_secs() as i64,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.config.encoding_key)
            .map_err(|e| ServiceError::AuthError(format!("Token generation failed: {}", e)))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, ServiceError> {
        let data = decode::<Claims>(
            token,
            &self.config.decoding_key,
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| {
            debug!("Token validation failed: {}", e);
            ServiceError::Unauthorized("Invalid or expired token".to_string())
        })?;
        Ok(data.claims)
    }
}

fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ServiceError::InternalError(format!("Password hashing failed: {}", e)))
}

fn verify_password(password: &str, hash: &str) -> Result<bool, ServiceError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| ServiceError::InternalError(format!("Stored hash is invalid: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Request guard for the protected API subtree.
///
/// Validates the `Authorization: Bearer` token and inserts an [`AuthUser`]
/// extension for downstream handlers.
pub async fn auth_middleware(
    State(auth): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| ServiceError::Unauthorized("Missing bearer token".to_string()))?;

    let claims = auth.validate_token(token)?;
    let id = Uuid::parse_str(&claims.sub)
        .map_err(|_| ServiceError::Unauthorized("Malformed token subject".to_string()))?;

    request.extensions_mut().insert(AuthUser {
        id,
        email: claims.email.clone(),
    });
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// Signup request payload
#[derive(Debug, Deserialize, validator::Validate, utoipa::ToSchema)]
pub struct SignupInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 8))]
    pub password: String,
}

/// Login request payload
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// User plus access token, returned by signup and login
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub user: UserModel,
    pub token: String,
}
