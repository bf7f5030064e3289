//! Intent planner: two sequential model calls with a structured JSON
//! contract. The first call proposes one tool action, the second reflects
//! on the observation and emits a categorized task list. Every failure
//! path converges on the default plan; the planner never returns an error.

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::gemini::GenerativeClient;

use super::executor::{self, Action};

/// Closed category set for planned tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    TrackSymptoms,
    RecommendRemedies,
    ExplainCondition,
    SetReminder,
    ChatGeneral,
    SendPartnerUpdate,
}

impl TaskCategory {
    pub const ALL: [TaskCategory; 6] = [
        TaskCategory::TrackSymptoms,
        TaskCategory::RecommendRemedies,
        TaskCategory::ExplainCondition,
        TaskCategory::SetReminder,
        TaskCategory::ChatGeneral,
        TaskCategory::SendPartnerUpdate,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            TaskCategory::TrackSymptoms => "track_symptoms",
            TaskCategory::RecommendRemedies => "recommend_remedies",
            TaskCategory::ExplainCondition => "explain_condition",
            TaskCategory::SetReminder => "set_reminder",
            TaskCategory::ChatGeneral => "chat_general",
            TaskCategory::SendPartnerUpdate => "send_partner_update",
        }
    }

    pub fn from_id(id: &str) -> Option<TaskCategory> {
        TaskCategory::ALL.into_iter().find(|c| c.id() == id)
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct PlannedTask {
    pub task: String,
    pub category: TaskCategory,
    pub reason: String,
}

/// How the plan was produced, so callers can tell fallback from success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanSource {
    Model,
    KeywordFallback,
    Default,
}

#[derive(Debug, Clone)]
pub struct Plan {
    pub tasks: Vec<PlannedTask>,
    pub source: PlanSource,
    pub observation: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlanStep {
    thought: String,
    action: String,
}

#[derive(Debug, Deserialize)]
struct RawTask {
    task: String,
    category: String,
    reason: Option<String>,
}

const TOOL_MENU: &str = "\
  check_calendar - today's schedule and stress level
  check_health - hydration, exercise and sleep data
  get_medical_info - evidence-based information for a symptom
  check_weather - weather conditions that correlate with symptoms
  check_cycle_phase - the user's current menstrual phase
  log_symptom - record a symptom the user reported
  set_reminder - schedule a health reminder
  check_partner_status - partner sharing status
  comprehensive_analysis - combine schedule, health and weather data";

pub async fn plan_tasks(
    ai: &dyn GenerativeClient,
    pool: &PgPool,
    user_id: Option<Uuid>,
    user_input: &str,
    memory_context: &str,
) -> Plan {
    let step = request_plan_step(ai, user_input, memory_context).await;

    let (thought, action_label, observation) = match step {
        Some(step) => {
            let action = Action::parse(&step.action);
            let observation = executor::execute(&action, user_id, pool).await;
            (step.thought, step.action, observation)
        }
        None => (
            "Analysis of user needs".to_string(),
            "none".to_string(),
            "No specific action to execute.".to_string(),
        ),
    };

    let tasks = request_tasks(ai, user_input, &thought, &action_label, &observation).await;

    match tasks {
        Some((tasks, source)) => Plan {
            tasks,
            source,
            observation: Some(observation),
        },
        None => Plan {
            tasks: default_tasks(),
            source: PlanSource::Default,
            observation: Some(observation),
        },
    }
}

/// First model call: elicit a {thought, action} step, retrying once with a
/// stricter reminder when the reply does not match the schema.
async fn request_plan_step(
    ai: &dyn GenerativeClient,
    user_input: &str,
    memory_context: &str,
) -> Option<PlanStep> {
    let prompt = format!(
        "You are the planning step of a menstrual health assistant.\n\n\
         CONTEXT:\n{memory_context}\n\n\
         USER MESSAGE: \"{user_input}\"\n\n\
         Think about what the user needs, then pick exactly one tool to gather \
         supporting data. Available tools:\n{TOOL_MENU}\n\n\
         Respond with only a JSON object, no prose:\n\
         {{\"thought\": \"<your reasoning>\", \"action\": \"<one tool name>\"}}"
    );

    let reply = match ai.generate(&prompt).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!("❌ Planning call failed: {}", e);
            return None;
        }
    };
    if let Some(step) = parse_plan_step(&reply) {
        return Some(step);
    }

    tracing::warn!("⚠️ Planning reply did not match the schema, retrying once");
    let retry_prompt = format!(
        "{prompt}\n\nYour previous reply was not valid JSON. Respond with only \
         the JSON object, nothing else."
    );
    match ai.generate(&retry_prompt).await {
        Ok(reply) => parse_plan_step(&reply),
        Err(e) => {
            tracing::error!("❌ Planning retry failed: {}", e);
            None
        }
    }
}

/// Second model call: reflect on the observation and emit the task list.
async fn request_tasks(
    ai: &dyn GenerativeClient,
    user_input: &str,
    thought: &str,
    action: &str,
    observation: &str,
) -> Option<(Vec<PlannedTask>, PlanSource)> {
    let categories = TaskCategory::ALL.map(|c| c.id()).join(", ");
    let prompt = format!(
        "You are the reflection step of a menstrual health assistant.\n\n\
         USER MESSAGE: \"{user_input}\"\n\
         THOUGHT: {thought}\n\
         ACTION: {action}\n\
         OBSERVATION: {observation}\n\n\
         Reflect on the observation and respond with only a JSON array of \
         tasks that would help the user. Each element:\n\
         {{\"task\": \"<what to do>\", \"category\": \"<one of {categories}>\", \
         \"reason\": \"<why>\"}}"
    );

    let reply = match ai.generate(&prompt).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!("❌ Reflection call failed: {}", e);
            return None;
        }
    };

    let tasks = parse_tasks(&reply);
    if !tasks.is_empty() {
        return Some((tasks, PlanSource::Model));
    }

    tracing::warn!("⚠️ Reflection reply did not match the schema, retrying once");
    let retry_prompt = format!(
        "{prompt}\n\nYour previous reply was not a valid JSON array. \
         Respond with only the JSON array, nothing else."
    );
    let retry_reply = match ai.generate(&retry_prompt).await {
        Ok(retry_reply) => Some(retry_reply),
        Err(e) => {
            tracing::error!("❌ Reflection retry failed: {}", e);
            None
        }
    };

    if let Some(retry_reply) = &retry_reply {
        let tasks = parse_tasks(retry_reply);
        if !tasks.is_empty() {
            return Some((tasks, PlanSource::Model));
        }
    }

    // No JSON array ever arrived; scan both raw replies for category ids.
    for candidate in std::iter::once(&reply).chain(retry_reply.as_ref()) {
        let fallback = keyword_fallback(candidate);
        if !fallback.is_empty() {
            return Some((fallback, PlanSource::KeywordFallback));
        }
    }
    None
}

/// Locate the outermost JSON object in a reply that may be wrapped in prose
/// or code fences, then validate it against the step schema.
fn parse_plan_step(reply: &str) -> Option<PlanStep> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&reply[start..=end]).ok()
}

/// Locate the outermost JSON array, parse it, and keep only tasks whose
/// category belongs to the closed set.
fn parse_tasks(reply: &str) -> Vec<PlannedTask> {
    let Some(start) = reply.find('[') else {
        return Vec::new();
    };
    let Some(end) = reply.rfind(']') else {
        return Vec::new();
    };
    if end < start {
        return Vec::new();
    }

    let raw: Vec<RawTask> = match serde_json::from_str(&reply[start..=end]) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!("⚠️ Task array did not parse: {}", e);
            return Vec::new();
        }
    };

    raw.into_iter()
        .filter_map(|t| {
            let category = TaskCategory::from_id(&t.category)?;
            Some(PlannedTask {
                task: t.task,
                category,
                reason: t.reason.unwrap_or_else(|| "No reason provided".to_string()),
            })
        })
        .collect()
}

/// Intersect category identifiers against the raw reply text.
fn keyword_fallback(reply: &str) -> Vec<PlannedTask> {
    let lowered = reply.to_lowercase();
    TaskCategory::ALL
        .into_iter()
        .filter(|c| lowered.contains(c.id()))
        .map(|category| PlannedTask {
            task: format!("Handle {}", category.id()),
            category,
            reason: "Detected from response".to_string(),
        })
        .collect()
}

pub fn default_tasks() -> Vec<PlannedTask> {
    vec![PlannedTask {
        task: "Provide general support and information".to_string(),
        category: TaskCategory::ChatGeneral,
        reason: "Fallback due to processing error".to_string(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plan_step_parses_through_code_fences() {
        let reply = "Sure! ```json\n{\"thought\": \"user has cramps\", \
                     \"action\": \"get_medical_info\"}\n```";
        let step = parse_plan_step(reply).unwrap();
        assert_eq!(step.action, "get_medical_info");
    }

    #[test]
    fn plan_step_rejects_prose() {
        assert!(parse_plan_step("I think we should check the calendar").is_none());
    }

    #[test]
    fn tasks_with_unknown_categories_are_dropped() {
        let reply = r#"[
            {"task": "log cramps", "category": "track_symptoms", "reason": "reported"},
            {"task": "bad", "category": "not_a_category", "reason": "x"}
        ]"#;
        let tasks = parse_tasks(reply);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].category, TaskCategory::TrackSymptoms);
    }

    #[test]
    fn missing_reason_gets_placeholder() {
        let reply = r#"[{"task": "t", "category": "chat_general"}]"#;
        assert_eq!(parse_tasks(reply)[0].reason, "No reason provided");
    }

    #[test]
    fn keyword_fallback_scans_categories() {
        let tasks =
            keyword_fallback("we should recommend_remedies and track_symptoms here");
        let categories: Vec<_> = tasks.iter().map(|t| t.category).collect();
        assert!(categories.contains(&TaskCategory::RecommendRemedies));
        assert!(categories.contains(&TaskCategory::TrackSymptoms));
        assert_eq!(tasks.len(), 2);
    }

    #[test]
    fn default_plan_is_general_chat() {
        let tasks = default_tasks();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].category, TaskCategory::ChatGeneral);
    }

    #[test]
    fn category_ids_round_trip() {
        for category in TaskCategory::ALL {
            assert_eq!(TaskCategory::from_id(category.id()), Some(category));
        }
        assert_eq!(TaskCategory::from_id("other"), None);
    }
}
