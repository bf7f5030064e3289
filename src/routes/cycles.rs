use axum::http::StatusCode;
use axum::{extract::State, routing::get, Json, Router};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::{phase_for_day, Cycle, Phase};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct NewCycle {
    pub start_date: NaiveDate,
    pub symptoms: Option<String>,
    pub moods: Option<String>,
}

#[derive(Serialize)]
pub struct PhaseResponse {
    pub phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_since: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/cycles", get(list_cycles).post(log_cycle))
        .route("/phase", get(current_phase))
        .with_state(state)
}

async fn log_cycle(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(body): Json<NewCycle>,
) -> Result<(StatusCode, Json<Cycle>), ApiError> {
    let cycle = sqlx::query_as::<_, Cycle>(
        "INSERT INTO cycles (user_id, start_date, symptoms, moods)
         VALUES ($1, $2, $3, $4)
         RETURNING id, user_id, start_date, symptoms, moods, created_at",
    )
    .bind(user.id)
    .bind(body.start_date)
    .bind(&body.symptoms)
    .bind(&body.moods)
    .fetch_one(&state.pool)
    .await?;

    Ok((StatusCode::CREATED, Json(cycle)))
}

async fn list_cycles(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Cycle>>, ApiError> {
    let cycles = sqlx::query_as::<_, Cycle>(
        "SELECT id, user_id, start_date, symptoms, moods, created_at
         FROM cycles WHERE user_id = $1 ORDER BY start_date DESC",
    )
    .bind(user.id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(cycles))
}

async fn current_phase(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> Result<Json<PhaseResponse>, ApiError> {
    let last_cycle = sqlx::query_as::<_, Cycle>(
        "SELECT id, user_id, start_date, symptoms, moods, created_at
         FROM cycles WHERE user_id = $1 ORDER BY start_date DESC LIMIT 1",
    )
    .bind(user.id)
    .fetch_optional(&state.pool)
    .await?;

    let Some(cycle) = last_cycle else {
        return Ok(Json(PhaseResponse {
            phase: Phase::Unknown,
            days_since: None,
            message: Some("No cycle data found.".into()),
        }));
    };

    let today = Utc::now().date_naive();
    let days_since = (today - cycle.start_date).num_days();

    Ok(Json(PhaseResponse {
        phase: phase_for_day(days_since),
        days_since: Some(days_since),
        message: None,
    }))
}
