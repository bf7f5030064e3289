use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors that cross the HTTP boundary. Pipeline-internal failures
/// (planner, executor, composer) are absorbed before reaching here.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Concurrent check-then-insert races surface as unique violations;
    /// report those as the same validation failure the pre-check gives.
    pub fn on_unique_violation(e: sqlx::Error, message: &str) -> ApiError {
        if let sqlx::Error::Database(db_err) = &e {
            if matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation) {
                return ApiError::Validation(message.to_string());
            }
        }
        ApiError::Database(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(e) => {
                if let Some(db_err) = e.as_database_error() {
                    tracing::error!("❌ DB error: {}", db_err.message());
                    if let Some(code) = db_err.code() {
                        tracing::info!("ℹ️ SQLSTATE code: {}", code);
                    }
                    if let Some(constraint) = db_err.constraint() {
                        tracing::info!("🔒 Constraint violated: {}", constraint);
                    }
                } else {
                    tracing::error!("❌ Unknown DB error: {}", e);
                }
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Internal(e) => {
                tracing::error!("❌ Internal error: {:#}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    #[derive(Debug)]
    struct StubDbError {
        unique: bool,
    }

    impl std::fmt::Display for StubDbError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "stub database error")
        }
    }

    impl std::error::Error for StubDbError {}

    impl sqlx::error::DatabaseError for StubDbError {
        fn message(&self) -> &str {
            "stub database error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            self.unique.then(|| Cow::Borrowed("23505"))
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            if self.unique {
                sqlx::error::ErrorKind::UniqueViolation
            } else {
                sqlx::error::ErrorKind::Other
            }
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }
    }

    #[test]
    fn unique_violation_becomes_validation_error() {
        let e = sqlx::Error::Database(Box::new(StubDbError { unique: true }));
        match ApiError::on_unique_violation(e, "Invitation already sent") {
            ApiError::Validation(msg) => assert_eq!(msg, "Invitation already sent"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn other_database_errors_stay_database_errors() {
        let e = sqlx::Error::Database(Box::new(StubDbError { unique: false }));
        assert!(matches!(
            ApiError::on_unique_violation(e, "nope"),
            ApiError::Database(_)
        ));
    }
}
