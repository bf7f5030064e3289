use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::AuthConfig;
use crate::gemini::GenerativeClient;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub ai: Arc<dyn GenerativeClient>,
    pub http: reqwest::Client,
    pub auth: Arc<AuthConfig>,
}
