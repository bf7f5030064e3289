//! The chat pipeline: retriever -> planner -> executor -> composer -> log,
//! strictly sequential. Every stage except the log degrades internally, so
//! `run_chat` itself cannot fail.

pub mod compose;
pub mod executor;
pub mod log;
pub mod memory;
pub mod planner;
pub mod tools;

use uuid::Uuid;

use crate::state::AppState;

use compose::{Composed, ComposeSource};
use planner::{Plan, PlanSource};

#[derive(Debug)]
pub struct ChatOutcome {
    pub response: String,
    pub plan_source: PlanSource,
    pub compose_source: ComposeSource,
    pub memory_degraded: bool,
}

/// Run one chat exchange. With `user_id = None` (the demo variant) no
/// database is touched and the stages fall back to their no-data paths.
/// Logging is left to the caller so the demo route can skip it while the
/// authenticated route propagates storage failures.
pub async fn run_chat(state: &AppState, user_id: Option<Uuid>, message: &str) -> ChatOutcome {
    let memory = memory::retrieve(state.ai.as_ref(), &state.pool, user_id, message).await;

    let plan: Plan = planner::plan_tasks(
        state.ai.as_ref(),
        &state.pool,
        user_id,
        message,
        &memory.text,
    )
    .await;
    tracing::info!(
        "🧭 Planned {} task(s) via {:?}",
        plan.tasks.len(),
        plan.source
    );

    let composed: Composed = compose::compose(state.ai.as_ref(), message, &memory.text, &plan).await;
    if composed.source == ComposeSource::Template {
        tracing::info!("📋 Served templated fallback response");
    }

    ChatOutcome {
        response: composed.text,
        plan_source: plan.source,
        compose_source: composed.source,
        memory_degraded: memory.degraded,
    }
}
