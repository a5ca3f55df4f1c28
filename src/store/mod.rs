//! Record store seam.
//!
//! Everything the check-in flow and the reporting view read or write goes
//! through [`RecordStore`]. Two backends ship: PostgreSQL for deployments and
//! an in-memory store used when no `DATABASE_URL` is configured and in tests.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;
use uuid::Uuid;

use crate::models::{Attendance, Event, Registration, User};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result of the conditional attendance insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// No record existed; this one was written.
    Inserted(Attendance),
    /// A record already existed and was left untouched.
    Existing(Attendance),
    /// The ticket is unknown or its registration is not confirmed.
    Ineligible,
}

/// Change feed handed out by [`RecordStore::subscribe`]. The value is a
/// revision counter bumped after every committed write.
pub type ChangeFeed = watch::Receiver<u64>;

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get_registration(&self, id: Uuid) -> Result<Option<Registration>, StoreError>;

    async fn get_event(&self, id: Uuid) -> Result<Option<Event>, StoreError>;

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_attendance(&self, ticket: Uuid) -> Result<Option<Attendance>, StoreError>;

    async fn list_registrations(&self, approved_only: bool)
        -> Result<Vec<Registration>, StoreError>;

    async fn list_attendance(&self) -> Result<Vec<Attendance>, StoreError>;

    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    async fn list_events(&self) -> Result<Vec<Event>, StoreError>;

    /// Creates the attendance record for `ticket` iff none exists and the
    /// registration is confirmed, as a single atomic step. The timestamp is
    /// assigned by the store.
    async fn insert_attendance_if_absent(&self, ticket: Uuid)
        -> Result<InsertOutcome, StoreError>;

    fn subscribe(&self) -> ChangeFeed;
}
