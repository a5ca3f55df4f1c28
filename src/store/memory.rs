use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::watch;
use uuid::Uuid;

use super::{ChangeFeed, InsertOutcome, RecordStore, StoreError};
use crate::models::{Attendance, Event, Registration, User};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    events: HashMap<Uuid, Event>,
    registrations: HashMap<Uuid, Registration>,
    assistance: HashMap<Uuid, Attendance>,
}

/// Process-local store. A single mutex covers all tables, which is what makes
/// the conditional attendance insert atomic.
pub struct MemoryStore {
    tables: Mutex<Tables>,
    changes: watch::Sender<u64>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            tables: Mutex::new(Tables::default()),
            changes,
        }
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn bump(&self) {
        self.changes.send_modify(|revision| *revision += 1);
    }

    pub fn add_user(&self, user: User) {
        self.tables().users.insert(user.id, user);
        self.bump();
    }

    pub fn add_event(&self, event: Event) {
        self.tables().events.insert(event.id, event);
        self.bump();
    }

    pub fn add_registration(&self, registration: Registration) {
        self.tables()
            .registrations
            .insert(registration.id, registration);
        self.bump();
    }

    pub fn attendance_count(&self) -> usize {
        self.tables().assistance.len()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get_registration(&self, id: Uuid) -> Result<Option<Registration>, StoreError> {
        Ok(self.tables().registrations.get(&id).cloned())
    }

    async fn get_event(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
        Ok(self.tables().events.get(&id).cloned())
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.tables().users.get(&id).cloned())
    }

    async fn find_attendance(&self, ticket: Uuid) -> Result<Option<Attendance>, StoreError> {
        Ok(self.tables().assistance.get(&ticket).cloned())
    }

    async fn list_registrations(
        &self,
        approved_only: bool,
    ) -> Result<Vec<Registration>, StoreError> {
        let mut registrations: Vec<Registration> = self
            .tables()
            .registrations
            .values()
            .filter(|registration| !approved_only || registration.confirmed)
            .cloned()
            .collect();
        registrations.sort_by_key(|registration| (registration.created_at, registration.id));
        Ok(registrations)
    }

    async fn list_attendance(&self) -> Result<Vec<Attendance>, StoreError> {
        Ok(self.tables().assistance.values().cloned().collect())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.tables().users.values().cloned().collect())
    }

    async fn list_events(&self) -> Result<Vec<Event>, StoreError> {
        Ok(self.tables().events.values().cloned().collect())
    }

    async fn insert_attendance_if_absent(
        &self,
        ticket: Uuid,
    ) -> Result<InsertOutcome, StoreError> {
        let outcome = {
            let mut tables = self.tables();
            let confirmed = tables
                .registrations
                .get(&ticket)
                .is_some_and(|registration| registration.confirmed);
            if let Some(existing) = tables.assistance.get(&ticket) {
                InsertOutcome::Existing(existing.clone())
            } else if !confirmed {
                InsertOutcome::Ineligible
            } else {
                let attendance = Attendance {
                    ticket,
                    check_in: true,
                    check_in_time: Utc::now(),
                };
                tables.assistance.insert(ticket, attendance.clone());
                InsertOutcome::Inserted(attendance)
            }
        };

        if matches!(outcome, InsertOutcome::Inserted(_)) {
            self.bump();
        }
        Ok(outcome)
    }

    fn subscribe(&self) -> ChangeFeed {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn confirmed_ticket(store: &MemoryStore) -> Uuid {
        let registration = Registration::new(Uuid::new_v4(), Uuid::new_v4(), true);
        let ticket = registration.id;
        store.add_registration(registration);
        ticket
    }

    #[tokio::test]
    async fn test_insert_if_absent_keeps_first_record() {
        let store = MemoryStore::new();
        let ticket = confirmed_ticket(&store);

        let first = store.insert_attendance_if_absent(ticket).await.unwrap();
        let second = store.insert_attendance_if_absent(ticket).await.unwrap();

        let InsertOutcome::Inserted(written) = first else {
            panic!("first insert should write");
        };
        assert_eq!(second, InsertOutcome::Existing(written));
        assert_eq!(store.attendance_count(), 1);
    }

    #[tokio::test]
    async fn test_insert_refuses_unknown_and_unconfirmed_tickets() {
        let store = MemoryStore::new();
        let unconfirmed = Registration::new(Uuid::new_v4(), Uuid::new_v4(), false);
        let unconfirmed_ticket = unconfirmed.id;
        store.add_registration(unconfirmed);

        for ticket in [Uuid::new_v4(), unconfirmed_ticket] {
            assert_eq!(
                store.insert_attendance_if_absent(ticket).await.unwrap(),
                InsertOutcome::Ineligible
            );
        }
        assert_eq!(store.attendance_count(), 0);
    }

    #[tokio::test]
    async fn test_list_registrations_filters_unapproved() {
        let store = MemoryStore::new();
        store.add_registration(Registration::new(Uuid::new_v4(), Uuid::new_v4(), true));
        store.add_registration(Registration::new(Uuid::new_v4(), Uuid::new_v4(), false));

        assert_eq!(store.list_registrations(true).await.unwrap().len(), 1);
        assert_eq!(store.list_registrations(false).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_subscribe_sees_writes() {
        let store = MemoryStore::new();
        let mut feed = store.subscribe();
        let ticket = confirmed_ticket(&store);
        let before = *feed.borrow_and_update();

        store.insert_attendance_if_absent(ticket).await.unwrap();

        assert!(feed.has_changed().unwrap());
        assert!(*feed.borrow_and_update() > before);
    }
}
