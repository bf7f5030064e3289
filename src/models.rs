use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub age: Option<i32>,
    pub cycle_start_date: Option<NaiveDate>,
    pub period_duration: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Interaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub response: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Cycle {
    pub id: Uuid,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub symptoms: Option<String>,
    pub moods: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Reminder {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    pub time: String,
    pub method: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

pub const PARTNER_PENDING: &str = "pending";
pub const PARTNER_ACCEPTED: &str = "accepted";
pub const PARTNER_REVOKED: &str = "revoked";

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Partner {
    pub id: Uuid,
    pub user_id: Uuid,
    pub partner_user_id: Uuid,
    pub consent_type: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Menstrual phase derived from days since the latest cycle start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Menstrual,
    Follicular,
    Ovulatory,
    Luteal,
    Unknown,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Menstrual => "menstrual",
            Phase::Follicular => "follicular",
            Phase::Ovulatory => "ovulatory",
            Phase::Luteal => "luteal",
            Phase::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Day-offset table: 0-4 menstrual, 5-13 follicular, 14-16 ovulatory,
/// 17-28 luteal, anything else (including negative) unknown.
pub fn phase_for_day(days_since_start: i64) -> Phase {
    match days_since_start {
        0..=4 => Phase::Menstrual,
        5..=13 => Phase::Follicular,
        14..=16 => Phase::Ovulatory,
        17..=28 => Phase::Luteal,
        _ => Phase::Unknown,
    }
}
