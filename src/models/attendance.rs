use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Row of the `assistance` table. Keyed by the ticket it references, so a
/// registration can never carry more than one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Attendance {
    pub ticket: Uuid,
    pub check_in: bool,
    pub check_in_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttendanceStatus {
    Registered,
    CheckedIn,
}

impl AttendanceStatus {
    pub fn from_attendance(attendance: Option<&Attendance>) -> Self {
        match attendance {
            Some(_) => AttendanceStatus::CheckedIn,
            None => AttendanceStatus::Registered,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AttendanceStatus::Registered => "Registered",
            AttendanceStatus::CheckedIn => "Checked In",
        }
    }
}
