use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tokio::sync::watch;
use uuid::Uuid;

use super::{ChangeFeed, InsertOutcome, RecordStore, StoreError};
use crate::models::{Attendance, Event, Registration, User};

const REGISTRATION_COLUMNS: &str = "id, user_id, event_id, confirmed, created_at";
const EVENT_COLUMNS: &str = "id, title, date, time, location, capacity, registered, created_at";
const USER_COLUMNS: &str = "id, first_name, last_name, email, created_at";
const ATTENDANCE_COLUMNS: &str = "ticket, check_in, check_in_time";

pub struct PgStore {
    pool: PgPool,
    changes: watch::Sender<u64>,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        let (changes, _) = watch::channel(0);
        Self { pool, changes }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        tracing::info!("Successfully connected to database");

        sqlx::migrate!()
            .run(&pool)
            .await
            .map_err(|e| StoreError::Unavailable(format!("migrations failed: {e}")))?;

        tracing::info!("Migrations run successfully");

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn get_registration(&self, id: Uuid) -> Result<Option<Registration>, StoreError> {
        let sql = format!("SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE id = $1");
        let registration = sqlx::query_as::<_, Registration>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(registration)
    }

    async fn get_event(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(event)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_attendance(&self, ticket: Uuid) -> Result<Option<Attendance>, StoreError> {
        let sql = format!("SELECT {ATTENDANCE_COLUMNS} FROM assistance WHERE ticket = $1");
        let attendance = sqlx::query_as::<_, Attendance>(&sql)
            .bind(ticket)
            .fetch_optional(&self.pool)
            .await?;
        Ok(attendance)
    }

    async fn list_registrations(
        &self,
        approved_only: bool,
    ) -> Result<Vec<Registration>, StoreError> {
        let sql = format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations \
             WHERE ($1 = FALSE OR confirmed = TRUE) ORDER BY created_at, id"
        );
        let registrations = sqlx::query_as::<_, Registration>(&sql)
            .bind(approved_only)
            .fetch_all(&self.pool)
            .await?;
        Ok(registrations)
    }

    async fn list_attendance(&self) -> Result<Vec<Attendance>, StoreError> {
        let sql = format!("SELECT {ATTENDANCE_COLUMNS} FROM assistance");
        let attendance = sqlx::query_as::<_, Attendance>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(attendance)
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users");
        let users = sqlx::query_as::<_, User>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn list_events(&self) -> Result<Vec<Event>, StoreError> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events");
        let events = sqlx::query_as::<_, Event>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(events)
    }

    async fn insert_attendance_if_absent(
        &self,
        ticket: Uuid,
    ) -> Result<InsertOutcome, StoreError> {
        // The primary key on `assistance.ticket` decides the winner; the
        // SELECT only yields a row for a confirmed registration.
        let insert = format!(
            "INSERT INTO assistance (ticket, check_in, check_in_time) \
             SELECT id, TRUE, NOW() FROM registrations WHERE id = $1 AND confirmed \
             ON CONFLICT (ticket) DO NOTHING \
             RETURNING {ATTENDANCE_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Attendance>(&insert)
            .bind(ticket)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(attendance) = inserted {
            self.changes.send_modify(|revision| *revision += 1);
            return Ok(InsertOutcome::Inserted(attendance));
        }

        match self.find_attendance(ticket).await? {
            Some(existing) => Ok(InsertOutcome::Existing(existing)),
            None => Ok(InsertOutcome::Ineligible),
        }
    }

    fn subscribe(&self) -> ChangeFeed {
        self.changes.subscribe()
    }
}
