#![allow(dead_code)]

use chrono::{NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use agora_checkin::models::{Event, Registration, User};
use agora_checkin::store::MemoryStore;

pub struct Seeded {
    pub user: User,
    pub event: Event,
    pub registration: Registration,
}

pub fn user(first: &str, last: &str) -> User {
    User {
        id: Uuid::new_v4(),
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: format!("{}.{}@example.com", first, last).to_lowercase(),
        created_at: Utc::now(),
    }
}

pub fn event(title: &str) -> Event {
    Event {
        id: Uuid::new_v4(),
        title: title.to_string(),
        date: NaiveDate::from_ymd_opt(2025, 6, 12).unwrap(),
        time: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
        location: "Main Hall".to_string(),
        capacity: 200,
        registered: 1,
        created_at: Utc::now(),
    }
}

/// One attendee registered to one event.
pub fn seed(store: &MemoryStore, confirmed: bool) -> Seeded {
    let user = user("Ana", "Torres");
    let event = event("Rust Meetup");
    let registration = Registration::new(user.id, event.id, confirmed);

    store.add_user(user.clone());
    store.add_event(event.clone());
    store.add_registration(registration.clone());

    Seeded {
        user,
        event,
        registration,
    }
}
