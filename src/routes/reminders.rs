use axum::http::StatusCode;
use axum::{extract::State, routing::get, Json, Router};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::Reminder;
use crate::state::AppState;

/// A reminder is a record, not a live timer; no scheduler delivers it.
#[derive(Deserialize)]
pub struct NewReminder {
    #[serde(rename = "type")]
    pub kind: String,
    pub time: String,
    pub method: String,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/reminders", get(list_reminders).post(create_reminder))
        .with_state(state)
}

async fn create_reminder(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(body): Json<NewReminder>,
) -> Result<(StatusCode, Json<Reminder>), ApiError> {
    let reminder = sqlx::query_as::<_, Reminder>(
        "INSERT INTO reminders (user_id, kind, time, method)
         VALUES ($1, $2, $3, $4)
         RETURNING id, user_id, kind, time, method, active, created_at",
    )
    .bind(user.id)
    .bind(&body.kind)
    .bind(&body.time)
    .bind(&body.method)
    .fetch_one(&state.pool)
    .await?;

    Ok((StatusCode::CREATED, Json(reminder)))
}

async fn list_reminders(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Reminder>>, ApiError> {
    let reminders = sqlx::query_as::<_, Reminder>(
        "SELECT id, user_id, kind, time, method, active, created_at
         FROM reminders WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user.id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(reminders))
}
