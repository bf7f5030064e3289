//! Bearer-token sessions (HS256 JWT) plus Google ID-token verification.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::ApiError;
use crate::models::User;
use crate::state::AppState;

const TOKEN_TTL_MINUTES: i64 = 30;
const GOOGLE_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

pub struct AuthConfig {
    pub secret: String,
    pub google_client_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
}

pub fn create_access_token(config: &AuthConfig, email: &str) -> Result<String, ApiError> {
    let claims = Claims {
        sub: email.to_string(),
        exp: (Utc::now() + Duration::minutes(TOKEN_TTL_MINUTES)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(anyhow::anyhow!("token encoding failed: {e}")))
}

/// Returns the subject email for a valid, unexpired token.
pub fn verify_token(config: &AuthConfig, token: &str) -> Option<String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )
    .ok()
    .map(|data| data.claims.sub)
}

#[derive(Debug, Deserialize)]
pub struct GoogleClaims {
    pub email: String,
    pub aud: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Verify a Google ID token against the tokeninfo endpoint and check the
/// audience matches our client id.
pub async fn verify_google_token(
    http: &reqwest::Client,
    google_client_id: &str,
    id_token: &str,
) -> Result<GoogleClaims, ApiError> {
    let response = http
        .get(GOOGLE_TOKENINFO_URL)
        .query(&[("id_token", id_token)])
        .send()
        .await
        .map_err(|e| {
            tracing::error!("❌ Google tokeninfo request failed: {}", e);
            ApiError::Unauthorized("Invalid Google token".into())
        })?;

    if !response.status().is_success() {
        return Err(ApiError::Unauthorized("Invalid Google token".into()));
    }

    let claims: GoogleClaims = response
        .json()
        .await
        .map_err(|_| ApiError::Unauthorized("Invalid Google token".into()))?;

    if claims.aud != google_client_id {
        tracing::warn!("⚠️ Google token audience mismatch");
        return Err(ApiError::Unauthorized("Invalid Google token".into()));
    }

    Ok(claims)
}

pub async fn get_or_create_user(pool: &PgPool, email: &str) -> Result<User, ApiError> {
    if let Some(user) = find_user_by_email(pool, email).await? {
        return Ok(user);
    }

    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (email) VALUES ($1)
         RETURNING id, email, age, cycle_start_date, period_duration, created_at",
    )
    .bind(email)
    .fetch_one(pool)
    .await?;

    tracing::info!("👤 Created user {}", user.id);
    Ok(user)
}

pub async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, ApiError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, age, cycle_start_date, period_duration, created_at
         FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// Extractor for authenticated routes: validates the bearer token and loads
/// the matching user row. Rejects with 401 on any failure.
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let unauthorized = || ApiError::Unauthorized("Could not validate credentials".into());

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(unauthorized)?;

        let email = verify_token(&state.auth, token).ok_or_else(unauthorized)?;

        let user = find_user_by_email(&state.pool, &email)
            .await?
            .ok_or_else(unauthorized)?;

        Ok(AuthUser(user))
    }
}
