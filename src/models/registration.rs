use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A user's claim on an event. The id doubles as the ticket code printed in the QR badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Registration {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub confirmed: bool,
    pub created_at: DateTime<Utc>,
}

impl Registration {
    pub fn new(user_id: Uuid, event_id: Uuid, confirmed: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            event_id,
            confirmed,
            created_at: Utc::now(),
        }
    }
}
