//! Read-only wellness data endpoints: the schedule/health/weather
//! snapshots the executor already draws on, plus a combined insights view
//! that folds in the current cycle phase. The snapshot endpoint lives at
//! /health-data because /health is the liveness route.

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::agent::tools::{
    health_snapshot, schedule_snapshot, weather_snapshot, HealthSnapshot, ScheduleSnapshot,
    WeatherSnapshot,
};
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::{phase_for_day, Cycle, Phase};
use crate::state::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/calendar", get(calendar_data))
        .route("/weather", get(weather_data))
        .route("/health-data", get(health_data))
        .route("/health/insights", get(health_insights))
        .with_state(state)
}

async fn calendar_data(AuthUser(_user): AuthUser) -> Json<ScheduleSnapshot> {
    Json(schedule_snapshot())
}

async fn weather_data(AuthUser(_user): AuthUser) -> Json<WeatherSnapshot> {
    Json(weather_snapshot())
}

async fn health_data(AuthUser(_user): AuthUser) -> Json<HealthSnapshot> {
    Json(health_snapshot())
}

#[derive(Debug, Serialize)]
pub struct Insights {
    pub phase: Phase,
    pub recommendations: Vec<&'static str>,
    pub focus_areas: Vec<&'static str>,
    pub correlations: Vec<&'static str>,
}

#[derive(Serialize)]
pub struct InsightsResponse {
    pub insights: Insights,
    pub calendar: ScheduleSnapshot,
    pub health: HealthSnapshot,
    pub weather: WeatherSnapshot,
}

async fn health_insights(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> Result<Json<InsightsResponse>, ApiError> {
    let phase = current_phase(&state.pool, user.id).await?;
    let calendar = schedule_snapshot();
    let health = health_snapshot();
    let weather = weather_snapshot();
    let insights = build_insights(phase, &calendar, &health, &weather);

    Ok(Json(InsightsResponse {
        insights,
        calendar,
        health,
        weather,
    }))
}

async fn current_phase(pool: &PgPool, user_id: Uuid) -> Result<Phase, ApiError> {
    let last_cycle = sqlx::query_as::<_, Cycle>(
        "SELECT id, user_id, start_date, symptoms, moods, created_at
         FROM cycles WHERE user_id = $1 ORDER BY start_date DESC LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(match last_cycle {
        Some(cycle) => {
            let days_since = (Utc::now().date_naive() - cycle.start_date).num_days();
            phase_for_day(days_since)
        }
        None => Phase::Unknown,
    })
}

/// Threshold-based recommendations over the day's snapshots and phase.
pub fn build_insights(
    phase: Phase,
    schedule: &ScheduleSnapshot,
    health: &HealthSnapshot,
    weather: &WeatherSnapshot,
) -> Insights {
    let mut insights = Insights {
        phase,
        recommendations: Vec::new(),
        focus_areas: Vec::new(),
        correlations: Vec::new(),
    };

    if health.hydration_percentage < 80 {
        insights
            .recommendations
            .push("Increase water intake by 500ml today");
        insights.focus_areas.push("hydration");
    }
    if health.steps_today < 8_000 {
        insights
            .recommendations
            .push("Take a 15-minute walk during your free time");
        insights.focus_areas.push("activity");
    }
    if health.sleep_hours < 7.0 {
        insights
            .recommendations
            .push("Prioritize getting 8 hours of sleep tonight");
        insights.focus_areas.push("sleep");
    }
    if schedule.stress_level == "high" {
        insights
            .recommendations
            .push("Practice stress management between meetings");
        insights.focus_areas.push("stress_management");
    }
    if weather.humidity > 60 {
        insights
            .correlations
            .push("High humidity may affect bloating - stay hydrated");
    }
    match phase {
        Phase::Luteal => insights
            .recommendations
            .push("This is your luteal phase - prioritize rest and self-care"),
        Phase::Menstrual => insights
            .recommendations
            .push("During your period - be gentle with yourself and rest as needed"),
        _ => {}
    }

    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn schedule(stress_level: &'static str) -> ScheduleSnapshot {
        ScheduleSnapshot {
            description: "3 meetings today, 2.2 hours total".to_string(),
            stress_level,
            meeting_count: 3,
            total_hours: 2.2,
        }
    }

    fn health(hydration: u32, steps: u32, sleep: f64) -> HealthSnapshot {
        HealthSnapshot {
            hydration_percentage: hydration,
            water_intake_ml: hydration * 20,
            steps_today: steps,
            sleep_hours: sleep,
        }
    }

    fn weather(humidity: u32) -> WeatherSnapshot {
        WeatherSnapshot {
            temperature_f: 72,
            condition: "partly cloudy",
            humidity,
            impact: "",
        }
    }

    #[test]
    fn poor_metrics_drive_recommendations() {
        let insights = build_insights(
            Phase::Luteal,
            &schedule("high"),
            &health(60, 4_000, 5.5),
            &weather(75),
        );

        assert_eq!(
            insights.focus_areas,
            vec!["hydration", "activity", "sleep", "stress_management"]
        );
        assert!(insights
            .recommendations
            .iter()
            .any(|r| r.contains("luteal phase")));
        assert!(insights
            .correlations
            .iter()
            .any(|c| c.contains("High humidity")));
    }

    #[test]
    fn healthy_metrics_yield_no_noise() {
        let insights = build_insights(
            Phase::Follicular,
            &schedule("low"),
            &health(95, 10_000, 8.0),
            &weather(40),
        );

        assert!(insights.recommendations.is_empty());
        assert!(insights.focus_areas.is_empty());
        assert!(insights.correlations.is_empty());
        assert_eq!(insights.phase, Phase::Follicular);
    }

    #[test]
    fn menstrual_phase_gets_its_own_line() {
        let insights = build_insights(
            Phase::Menstrual,
            &schedule("low"),
            &health(95, 10_000, 8.0),
            &weather(40),
        );
        assert!(insights
            .recommendations
            .iter()
            .any(|r| r.contains("During your period")));
    }
}
