use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::auth::{self, create_access_token, verify_google_token};
use crate::error::ApiError;
use crate::state::AppState;

const DEMO_EMAIL: &str = "demo@cyclewise.app";

#[derive(Deserialize)]
pub struct GoogleLogin {
    pub id_token: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/auth/google", post(google_login))
        .route("/demo/auth", post(demo_login))
        .with_state(state)
}

/// Verify a Google ID token, create the user on first login, and issue a
/// bearer session token.
async fn google_login(
    State(state): State<AppState>,
    Json(body): Json<GoogleLogin>,
) -> Result<Json<TokenResponse>, ApiError> {
    let claims = verify_google_token(
        &state.http,
        &state.auth.google_client_id,
        &body.id_token,
    )
    .await?;

    let user = auth::get_or_create_user(&state.pool, &claims.email).await?;
    let access_token = create_access_token(&state.auth, &user.email)?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}

/// Session for the fixed demo account, no Google round trip.
async fn demo_login(State(state): State<AppState>) -> Result<Json<TokenResponse>, ApiError> {
    let user = auth::get_or_create_user(&state.pool, DEMO_EMAIL).await?;
    let access_token = create_access_token(&state.auth, &user.email)?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}
