use axum::http::StatusCode;
use axum::{extract::State, routing::get, Json, Router};
use serde::Deserialize;

use crate::agent::log::record_interaction;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::Interaction;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct NewInteraction {
    pub message: String,
    pub response: String,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/interactions",
            get(list_interactions).post(create_interaction),
        )
        .with_state(state)
}

async fn create_interaction(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(body): Json<NewInteraction>,
) -> Result<(StatusCode, Json<Interaction>), ApiError> {
    let interaction =
        record_interaction(&state.pool, user.id, &body.message, &body.response).await?;
    Ok((StatusCode::CREATED, Json(interaction)))
}

async fn list_interactions(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Interaction>>, ApiError> {
    let interactions = sqlx::query_as::<_, Interaction>(
        "SELECT id, user_id, message, response, created_at
         FROM interactions WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user.id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(interactions))
}
