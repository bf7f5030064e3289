use anyhow::Result;
use axum::{routing::get, Router};
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::{env, net::SocketAddr, sync::Arc};

use cyclewise_backend::auth::AuthConfig;
use cyclewise_backend::gemini::{GeminiClient, GenerativeClient};
use cyclewise_backend::routes;
use cyclewise_backend::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let database_url = env::var("DATABASE_URL")?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;
    sqlx::migrate!().run(&pool).await?;

    let ai: Arc<dyn GenerativeClient> = Arc::new(GeminiClient::new(env::var("GEMINI_API_KEY")?)?);
    let auth = Arc::new(AuthConfig {
        secret: env::var("SECRET_KEY")?,
        google_client_id: env::var("GOOGLE_CLIENT_ID")?,
    });

    let state = AppState {
        pool,
        ai,
        http: reqwest::Client::new(),
        auth,
    };

    let app = Router::new()
        .merge(routes::auth::routes(state.clone()))
        .merge(routes::users::routes(state.clone()))
        .merge(routes::cycles::routes(state.clone()))
        .merge(routes::reminders::routes(state.clone()))
        .merge(routes::partners::routes(state.clone()))
        .merge(routes::insights::routes(state.clone()))
        .merge(routes::interactions::routes(state.clone()))
        .merge(routes::chat::routes(state.clone()))
        .route("/health", get(|| async { "✅ Backend up" }));

    let addr = SocketAddr::from(([0, 0, 0, 0], 8000));
    tracing::info!("🧠 Server running at {}", addr);

    axum::serve(
        tokio::net::TcpListener::bind(addr).await?,
        app.into_make_service(),
    )
    .await?;

    Ok(())
}
