//! Read-side attendance projection for the admin dashboard.
//!
//! A [`Roster`] is one fetch of every approved registration joined with its
//! attendee, event and attendance. Filters are applied to the roster in
//! memory, so changing the search text never re-queries the store.
//!
//! The headline counts always describe the whole approved roster of the
//! selected event (or of every event). Status and search only narrow the
//! rows shown underneath them.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Attendance, AttendanceStatus, Event, Registration, User};
use crate::store::{RecordStore, StoreError};

pub mod feed;

pub use feed::ReportFeed;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendeeRow {
    pub ticket: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub email: String,
    pub event_title: String,
    pub status: AttendanceStatus,
    pub checked_in_at: Option<DateTime<Utc>>,
}

impl AttendeeRow {
    fn matches_search(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.email.to_lowercase().contains(needle)
            || self.ticket.to_string().contains(needle)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusFilter {
    #[default]
    All,
    CheckedIn,
    Pending,
}

impl StatusFilter {
    fn admits(&self, status: AttendanceStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::CheckedIn => status == AttendanceStatus::CheckedIn,
            StatusFilter::Pending => status == AttendanceStatus::Registered,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReportFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: StatusFilter,
    #[serde(default)]
    pub event_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceReport {
    pub total_approved: usize,
    pub checked_in: usize,
    pub pending: usize,
    /// Rounded percentage, 0 when there is nothing to count.
    pub rate: u32,
    /// Number of rows left after the status and search filters.
    pub matching: usize,
    pub rows: Vec<AttendeeRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    rows: Vec<AttendeeRow>,
}

impl Roster {
    pub async fn load(store: &dyn RecordStore) -> Result<Self, StoreError> {
        let registrations = store.list_registrations(true).await?;
        let attendance = store.list_attendance().await?;
        let users = store.list_users().await?;
        let events = store.list_events().await?;
        Ok(Self::build(registrations, attendance, users, events))
    }

    pub fn build(
        registrations: Vec<Registration>,
        attendance: Vec<Attendance>,
        users: Vec<User>,
        events: Vec<Event>,
    ) -> Self {
        let attendance: HashMap<Uuid, Attendance> = attendance
            .into_iter()
            .map(|record| (record.ticket, record))
            .collect();
        let users: HashMap<Uuid, User> = users.into_iter().map(|u| (u.id, u)).collect();
        let events: HashMap<Uuid, Event> = events.into_iter().map(|e| (e.id, e)).collect();

        let rows = registrations
            .into_iter()
            .filter(|registration| registration.confirmed)
            .map(|registration| {
                let record = attendance.get(&registration.id);
                let user = users.get(&registration.user_id);
                AttendeeRow {
                    ticket: registration.id,
                    event_id: registration.event_id,
                    name: user.map(User::full_name).unwrap_or_default(),
                    email: user.map(|u| u.email.clone()).unwrap_or_default(),
                    event_title: events
                        .get(&registration.event_id)
                        .map(|e| e.title.clone())
                        .unwrap_or_default(),
                    status: AttendanceStatus::from_attendance(record),
                    checked_in_at: record.map(|r| r.check_in_time),
                }
            })
            .collect();

        Self { rows }
    }

    pub fn rows(&self) -> &[AttendeeRow] {
        &self.rows
    }

    pub fn report(&self, filter: &ReportFilter) -> AttendanceReport {
        let needle = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let scoped: Vec<&AttendeeRow> = self
            .rows
            .iter()
            .filter(|row| filter.event_id.map_or(true, |id| row.event_id == id))
            .collect();

        let total_approved = scoped.len();
        let checked_in = scoped
            .iter()
            .filter(|row| row.status == AttendanceStatus::CheckedIn)
            .count();

        let rows: Vec<AttendeeRow> = scoped
            .into_iter()
            .filter(|row| filter.status.admits(row.status))
            .filter(|row| needle.as_deref().map_or(true, |n| row.matches_search(n)))
            .cloned()
            .collect();

        AttendanceReport {
            total_approved,
            checked_in,
            pending: total_approved - checked_in,
            rate: attendance_rate(checked_in, total_approved),
            matching: rows.len(),
            rows,
        }
    }
}

pub fn attendance_rate(checked_in: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((checked_in as f64 / total as f64) * 100.0).round() as u32
}
