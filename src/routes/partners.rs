use axum::http::StatusCode;
use axum::{extract::State, routing::get, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{find_user_by_email, AuthUser};
use crate::error::ApiError;
use crate::models::{Cycle, Partner, PARTNER_ACCEPTED, PARTNER_PENDING, PARTNER_REVOKED};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct PartnerInvite {
    pub partner_email: String,
    #[serde(default = "default_consent")]
    pub consent_type: String,
}

fn default_consent() -> String {
    "cycle".to_string()
}

#[derive(Deserialize)]
pub struct PartnerRespond {
    pub partner_id: Uuid,
    pub status: String,
}

#[derive(Serialize)]
pub struct InviteResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct SharedInfo {
    pub owner: String,
    pub cycles: Vec<Cycle>,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/invite-partner", post(invite_partner))
        .route("/partners/respond", post(respond_to_invite))
        .route("/shared-info", get(shared_info))
        .with_state(state)
}

async fn invite_partner(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(body): Json<PartnerInvite>,
) -> Result<(StatusCode, Json<InviteResponse>), ApiError> {
    let partner_user = find_user_by_email(&state.pool, &body.partner_email)
        .await?
        .ok_or(ApiError::NotFound("Partner user"))?;

    if partner_user.id == user.id {
        return Err(ApiError::Validation("Cannot invite yourself".into()));
    }

    let existing = sqlx::query_as::<_, Partner>(
        "SELECT id, user_id, partner_user_id, consent_type, status, created_at
         FROM partners WHERE user_id = $1 AND partner_user_id = $2",
    )
    .bind(user.id)
    .bind(partner_user.id)
    .fetch_optional(&state.pool)
    .await?;

    if existing.is_some() {
        return Err(ApiError::Validation("Invitation already sent".into()));
    }

    sqlx::query(
        "INSERT INTO partners (user_id, partner_user_id, consent_type, status)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(user.id)
    .bind(partner_user.id)
    .bind(&body.consent_type)
    .bind(PARTNER_PENDING)
    .execute(&state.pool)
    .await
    .map_err(|e| ApiError::on_unique_violation(e, "Invitation already sent"))?;

    Ok((
        StatusCode::CREATED,
        Json(InviteResponse {
            message: format!("Invitation sent to {}", body.partner_email),
        }),
    ))
}

/// Only the invitee may accept or revoke.
async fn respond_to_invite(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(body): Json<PartnerRespond>,
) -> Result<Json<Partner>, ApiError> {
    if body.status != PARTNER_ACCEPTED && body.status != PARTNER_REVOKED {
        return Err(ApiError::Validation(
            "status must be 'accepted' or 'revoked'".into(),
        ));
    }

    let updated = sqlx::query_as::<_, Partner>(
        "UPDATE partners SET status = $3
         WHERE id = $1 AND partner_user_id = $2
         RETURNING id, user_id, partner_user_id, consent_type, status, created_at",
    )
    .bind(body.partner_id)
    .bind(user.id)
    .bind(&body.status)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(ApiError::NotFound("Partner invitation"))?;

    Ok(Json(updated))
}

/// Cycle data shared with the current user by owners who accepted consent.
async fn shared_info(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<SharedInfo>>, ApiError> {
    let links = sqlx::query_as::<_, Partner>(
        "SELECT id, user_id, partner_user_id, consent_type, status, created_at
         FROM partners WHERE partner_user_id = $1 AND status = $2",
    )
    .bind(user.id)
    .bind(PARTNER_ACCEPTED)
    .fetch_all(&state.pool)
    .await?;

    let mut shared = Vec::new();
    for link in links {
        if link.consent_type != "cycle" {
            continue;
        }
        let owner_email: Option<(String,)> =
            sqlx::query_as("SELECT email FROM users WHERE id = $1")
                .bind(link.user_id)
                .fetch_optional(&state.pool)
                .await?;
        let Some((owner,)) = owner_email else {
            continue;
        };

        let cycles = sqlx::query_as::<_, Cycle>(
            "SELECT id, user_id, start_date, symptoms, moods, created_at
             FROM cycles WHERE user_id = $1 ORDER BY start_date DESC",
        )
        .bind(link.user_id)
        .fetch_all(&state.pool)
        .await?;

        shared.push(SharedInfo { owner, cycles });
    }

    Ok(Json(shared))
}
