pub mod agent;
pub mod auth;
pub mod error;
pub mod gemini;
pub mod models;
pub mod routes;
pub mod state;
