use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: String,
    pub capacity: i32,
    pub registered: i32,
    pub created_at: DateTime<Utc>,
}
