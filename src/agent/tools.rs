//! Mock data sources for the tool executor.
//!
//! Calendar, health and weather snapshots are in-process generators with
//! rand-jittered values; only cycle-phase lookup (in the executor) reads
//! real stored data. Whether live integrations should replace these is an
//! open question, so the mocks are the contract here.

use rand::Rng;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleSnapshot {
    pub description: String,
    pub stress_level: &'static str,
    pub meeting_count: u32,
    pub total_hours: f64,
}

pub fn schedule_snapshot() -> ScheduleSnapshot {
    let mut rng = rand::thread_rng();
    let meeting_count = rng.gen_range(0..=6);
    let total_hours = meeting_count as f64 * 0.75;
    let stress_level = match meeting_count {
        0..=1 => "low",
        2..=4 => "moderate",
        _ => "high",
    };
    ScheduleSnapshot {
        description: format!("{meeting_count} meetings today, {total_hours:.1} hours total"),
        stress_level,
        meeting_count,
        total_hours,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    pub hydration_percentage: u32,
    pub water_intake_ml: u32,
    pub steps_today: u32,
    pub sleep_hours: f64,
}

pub fn health_snapshot() -> HealthSnapshot {
    let mut rng = rand::thread_rng();
    let hydration_percentage = rng.gen_range(50..=100);
    HealthSnapshot {
        hydration_percentage,
        water_intake_ml: hydration_percentage * 20,
        steps_today: rng.gen_range(2_000..=12_000),
        sleep_hours: rng.gen_range(50..=90) as f64 / 10.0,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WeatherSnapshot {
    pub temperature_f: i32,
    pub condition: &'static str,
    pub humidity: u32,
    pub impact: &'static str,
}

pub fn weather_snapshot() -> WeatherSnapshot {
    let mut rng = rand::thread_rng();
    let humidity = rng.gen_range(35..=85);
    let impact = if humidity > 60 {
        "High humidity may worsen bloating; staying hydrated helps."
    } else {
        "Conditions are unlikely to aggravate symptoms today."
    };
    WeatherSnapshot {
        temperature_f: rng.gen_range(45..=90),
        condition: ["clear", "partly cloudy", "overcast", "rainy"][rng.gen_range(0..4)],
        humidity,
        impact,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symptom {
    Cramps,
    Fatigue,
    MoodChanges,
    Bloating,
}

impl Symptom {
    pub fn detect(text: &str) -> Option<Symptom> {
        let text = text.to_lowercase();
        if text.contains("cramp") {
            Some(Symptom::Cramps)
        } else if text.contains("fatigue") || text.contains("tired") {
            Some(Symptom::Fatigue)
        } else if text.contains("mood") {
            Some(Symptom::MoodChanges)
        } else if text.contains("bloat") {
            Some(Symptom::Bloating)
        } else {
            None
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Symptom::Cramps => "cramps",
            Symptom::Fatigue => "fatigue",
            Symptom::MoodChanges => "mood changes",
            Symptom::Bloating => "bloating",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MedicalInfo {
    pub description: &'static str,
    pub remedies: &'static [&'static str],
    pub evidence_level: &'static str,
}

pub fn medical_info(symptom: Symptom) -> MedicalInfo {
    match symptom {
        Symptom::Cramps => MedicalInfo {
            description: "Uterine muscle contractions driven by prostaglandins",
            remedies: &["heat therapy", "gentle stretching", "NSAIDs if appropriate"],
            evidence_level: "strong",
        },
        Symptom::Fatigue => MedicalInfo {
            description: "Energy dips linked to hormonal shifts and iron loss",
            remedies: &["iron-rich foods", "consistent sleep schedule", "light exercise"],
            evidence_level: "moderate",
        },
        Symptom::MoodChanges => MedicalInfo {
            description: "Mood variability tied to estrogen and progesterone swings",
            remedies: &["regular exercise", "stress-reduction techniques"],
            evidence_level: "moderate",
        },
        Symptom::Bloating => MedicalInfo {
            description: "Water retention influenced by hormonal fluctuation",
            remedies: &["reduced sodium intake", "hydration", "potassium-rich foods"],
            evidence_level: "moderate",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn snapshots_stay_in_range() {
        for _ in 0..50 {
            let schedule = schedule_snapshot();
            assert!(schedule.meeting_count <= 6);
            let health = health_snapshot();
            assert!((50..=100).contains(&health.hydration_percentage));
            assert!(health.sleep_hours >= 5.0 && health.sleep_hours <= 9.0);
            let weather = weather_snapshot();
            assert!((35..=85).contains(&weather.humidity));
        }
    }

    #[test]
    fn symptom_detection() {
        assert_eq!(Symptom::detect("I have cramps"), Some(Symptom::Cramps));
        assert_eq!(Symptom::detect("so tired lately"), Some(Symptom::Fatigue));
        assert_eq!(Symptom::detect("mood swings"), Some(Symptom::MoodChanges));
        assert_eq!(Symptom::detect("feeling bloated"), Some(Symptom::Bloating));
        assert_eq!(Symptom::detect("headache"), None);
    }

    #[test]
    fn medical_table_has_remedies() {
        for symptom in [
            Symptom::Cramps,
            Symptom::Fatigue,
            Symptom::MoodChanges,
            Symptom::Bloating,
        ] {
            assert!(!medical_info(symptom).remedies.is_empty());
        }
    }
}
