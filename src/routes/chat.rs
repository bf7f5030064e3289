use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::agent::{self, log::record_interaction};
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub response: String,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/demo/chat", post(demo_chat))
        .with_state(state)
}

/// Authenticated chat: full pipeline, then a durable interaction record.
/// A storage failure while logging is the one pipeline error that reaches
/// the client (as a 500).
async fn chat(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = body.message.trim();
    if message.is_empty() {
        return Err(ApiError::Validation("message must not be empty".into()));
    }

    let outcome = agent::run_chat(&state, Some(user.id), message).await;
    record_interaction(&state.pool, user.id, message, &outcome.response).await?;

    Ok(Json(ChatResponse {
        response: outcome.response,
    }))
}

/// Unauthenticated demo variant: no persistence, and every failure mode
/// inside the pipeline degrades, so this always answers 200 with text.
async fn demo_chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let outcome = agent::run_chat(&state, None, &body.message).await;
    Json(ChatResponse {
        response: outcome.response,
    })
}
