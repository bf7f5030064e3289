//! Interaction log: the one pipeline component that does not swallow its
//! own errors. Storage failures propagate to the caller.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::Interaction;

/// Trim both fields and reject empties before any write.
pub fn validate_interaction<'a>(
    message: &'a str,
    response: &'a str,
) -> Result<(&'a str, &'a str), ApiError> {
    let message = message.trim();
    let response = response.trim();
    if message.is_empty() {
        return Err(ApiError::Validation("message must not be empty".into()));
    }
    if response.is_empty() {
        return Err(ApiError::Validation("response must not be empty".into()));
    }
    Ok((message, response))
}

/// Append one exchange. Exactly one row per call; the insert either commits
/// or the error is re-raised.
pub async fn record_interaction(
    pool: &PgPool,
    user_id: Uuid,
    message: &str,
    response: &str,
) -> Result<Interaction, ApiError> {
    let (message, response) = validate_interaction(message, response)?;

    let interaction = sqlx::query_as::<_, Interaction>(
        "INSERT INTO interactions (user_id, message, response) VALUES ($1, $2, $3)
         RETURNING id, user_id, message, response, created_at",
    )
    .bind(user_id)
    .bind(message)
    .bind(response)
    .fetch_one(pool)
    .await?;

    Ok(interaction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_message_rejected() {
        assert!(validate_interaction("", "reply").is_err());
        assert!(validate_interaction("   ", "reply").is_err());
    }

    #[test]
    fn empty_response_rejected() {
        assert!(validate_interaction("hi", "").is_err());
        assert!(validate_interaction("hi", "\n\t").is_err());
    }

    #[test]
    fn valid_pair_is_trimmed() {
        let (m, r) = validate_interaction("  hi  ", " reply ").unwrap();
        assert_eq!(m, "hi");
        assert_eq!(r, "reply");
    }
}
