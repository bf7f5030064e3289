use axum::http::StatusCode;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::auth::{find_user_by_email, AuthUser};
use crate::error::ApiError;
use crate::models::User;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub age: Option<i32>,
    pub cycle_start_date: Option<NaiveDate>,
    pub period_duration: Option<i32>,
}

#[derive(Deserialize)]
pub struct UpdateUser {
    pub age: Option<i32>,
    pub cycle_start_date: Option<NaiveDate>,
    pub period_duration: Option<i32>,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/users", post(create_user))
        .route("/me", get(get_me).put(update_me))
        .with_state(state)
}

async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUser>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    if find_user_by_email(&state.pool, &body.email).await?.is_some() {
        return Err(ApiError::Validation("Email already registered".into()));
    }

    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (email, age, cycle_start_date, period_duration)
         VALUES ($1, $2, $3, $4)
         RETURNING id, email, age, cycle_start_date, period_duration, created_at",
    )
    .bind(&body.email)
    .bind(body.age)
    .bind(body.cycle_start_date)
    .bind(body.period_duration)
    .fetch_one(&state.pool)
    .await
    .map_err(|e| ApiError::on_unique_violation(e, "Email already registered"))?;

    Ok((StatusCode::CREATED, Json(user)))
}

async fn get_me(AuthUser(user): AuthUser) -> Json<User> {
    Json(user)
}

async fn update_me(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(body): Json<UpdateUser>,
) -> Result<Json<User>, ApiError> {
    let updated = sqlx::query_as::<_, User>(
        "UPDATE users SET
             age = COALESCE($2, age),
             cycle_start_date = COALESCE($3, cycle_start_date),
             period_duration = COALESCE($4, period_duration)
         WHERE id = $1
         RETURNING id, email, age, cycle_start_date, period_duration, created_at",
    )
    .bind(user.id)
    .bind(body.age)
    .bind(body.cycle_start_date)
    .bind(body.period_duration)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(updated))
}
