//! Maps a planner-proposed action onto a data fetch and returns a
//! one-sentence observation.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{phase_for_day, Cycle};

use super::tools::{health_snapshot, medical_info, schedule_snapshot, weather_snapshot, Symptom};

/// Every action the planner may request, parsed from the model's free-text
/// action label. Unmatched input stays distinguishable as `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    CheckCalendar,
    CheckHealth,
    MedicalInfo(Option<Symptom>),
    CheckWeather,
    CheckCyclePhase,
    LogSymptom,
    SetReminder,
    CheckPartnerStatus,
    ComprehensiveAnalysis,
    Unknown(String),
}

impl Action {
    /// Ordered substring triggers, first match wins.
    pub fn parse(raw: &str) -> Action {
        let text = raw.to_lowercase();
        if text.contains("check_calendar") || text.contains("check_schedule") {
            Action::CheckCalendar
        } else if text.contains("check_health") || text.contains("check_hydration") {
            Action::CheckHealth
        } else if text.contains("get_medical_info") || text.contains("research_symptom") {
            Action::MedicalInfo(Symptom::detect(&text))
        } else if text.contains("check_weather") {
            Action::CheckWeather
        } else if text.contains("check_cycle_phase") {
            Action::CheckCyclePhase
        } else if text.contains("log_symptom") {
            Action::LogSymptom
        } else if text.contains("set_reminder") {
            Action::SetReminder
        } else if text.contains("check_partner_status") {
            Action::CheckPartnerStatus
        } else if text.contains("comprehensive_analysis") {
            Action::ComprehensiveAnalysis
        } else {
            Action::Unknown(raw.trim().to_string())
        }
    }
}

/// Run one action and describe the result. Failures in any branch become a
/// textual "Action failed" observation instead of an error.
pub async fn execute(action: &Action, user_id: Option<Uuid>, pool: &PgPool) -> String {
    match run(action, user_id, pool).await {
        Ok(observation) => observation,
        Err(e) => {
            tracing::error!("❌ Action execution failed: {}", e);
            format!("Action failed: {e}")
        }
    }
}

async fn run(action: &Action, user_id: Option<Uuid>, pool: &PgPool) -> Result<String, sqlx::Error> {
    let observation = match action {
        Action::CheckCalendar => {
            let schedule = schedule_snapshot();
            format!(
                "Calendar: {}. Stress level: {}. This may affect your symptoms.",
                schedule.description, schedule.stress_level
            )
        }
        Action::CheckHealth => {
            let health = health_snapshot();
            format!(
                "Health Status: Hydration {}% ({}ml), Exercise {} steps, Sleep {} hours.",
                health.hydration_percentage,
                health.water_intake_ml,
                health.steps_today,
                health.sleep_hours
            )
        }
        Action::MedicalInfo(Some(symptom)) => {
            let info = medical_info(*symptom);
            format!(
                "Medical Info for {}: {}. Evidence level: {}. Remedies: {}.",
                symptom.name(),
                info.description,
                info.evidence_level,
                info.remedies[..info.remedies.len().min(2)].join(", ")
            )
        }
        Action::MedicalInfo(None) => {
            "No specific symptom detected for medical research.".to_string()
        }
        Action::CheckWeather => {
            let weather = weather_snapshot();
            format!(
                "Weather: {}, {}°F. {}",
                weather.condition, weather.temperature_f, weather.impact
            )
        }
        Action::CheckCyclePhase => cycle_phase_observation(user_id, pool).await?,
        Action::LogSymptom => {
            "Symptom noted. Pattern analysis shows correlation with cycle phase and stress levels."
                .to_string()
        }
        Action::SetReminder => {
            "Reminder set for hydration. Will notify user every 2 hours.".to_string()
        }
        Action::CheckPartnerStatus => {
            "Partner has access to cycle info. Can send supportive message.".to_string()
        }
        Action::ComprehensiveAnalysis => {
            let schedule = schedule_snapshot();
            let health = health_snapshot();
            let weather = weather_snapshot();
            format!(
                "Comprehensive Analysis: Stress level {}, Hydration {}%, Weather {}. \
                 Combined factors may affect your symptoms.",
                schedule.stress_level, health.hydration_percentage, weather.condition
            )
        }
        Action::Unknown(raw) => format!("Action '{raw}' executed successfully."),
    };
    Ok(observation)
}

/// The only branch computed from real stored data.
async fn cycle_phase_observation(
    user_id: Option<Uuid>,
    pool: &PgPool,
) -> Result<String, sqlx::Error> {
    let Some(user_id) = user_id else {
        return Ok(no_cycle_data());
    };

    let last_cycle = sqlx::query_as::<_, Cycle>(
        "SELECT id, user_id, start_date, symptoms, moods, created_at
         FROM cycles WHERE user_id = $1 ORDER BY start_date DESC LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(match last_cycle {
        Some(cycle) => {
            let today = Utc::now().date_naive();
            let days_since = (today - cycle.start_date).num_days();
            let phase = phase_for_day(days_since);
            format!(
                "Cycle Phase: {phase} (day {days_since}). \
                 This phase typically affects energy levels and symptoms."
            )
        }
        None => no_cycle_data(),
    })
}

fn no_cycle_data() -> String {
    "No cycle data found. Please log your period start date for phase tracking.".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn every_trigger_maps_to_its_variant() {
        assert_eq!(Action::parse("check_calendar for stress"), Action::CheckCalendar);
        assert_eq!(Action::parse("check_schedule"), Action::CheckCalendar);
        assert_eq!(Action::parse("CHECK_HEALTH"), Action::CheckHealth);
        assert_eq!(Action::parse("check_hydration now"), Action::CheckHealth);
        assert_eq!(Action::parse("check_weather"), Action::CheckWeather);
        assert_eq!(Action::parse("check_cycle_phase"), Action::CheckCyclePhase);
        assert_eq!(Action::parse("log_symptom cramps"), Action::LogSymptom);
        assert_eq!(Action::parse("set_reminder"), Action::SetReminder);
        assert_eq!(Action::parse("check_partner_status"), Action::CheckPartnerStatus);
        assert_eq!(
            Action::parse("comprehensive_analysis"),
            Action::ComprehensiveAnalysis
        );
    }

    #[test]
    fn medical_action_carries_detected_symptom() {
        assert_eq!(
            Action::parse("get_medical_info about cramps"),
            Action::MedicalInfo(Some(Symptom::Cramps))
        );
        assert_eq!(
            Action::parse("research_symptom headache"),
            Action::MedicalInfo(None)
        );
    }

    #[test]
    fn first_match_wins() {
        // calendar trigger precedes weather in the ordered list
        assert_eq!(
            Action::parse("check_calendar then check_weather"),
            Action::CheckCalendar
        );
    }

    #[test]
    fn unmatched_input_is_unknown() {
        assert_eq!(
            Action::parse("  do_something_else  "),
            Action::Unknown("do_something_else".to_string())
        );
    }
}
