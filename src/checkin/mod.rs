//! Ticket check-in.
//!
//! A candidate code flows from [`intake::ScanIntake`] (camera frames or manual
//! entry) through [`resolver::resolve`] to [`recorder::record`]. The
//! [`service::CheckInService`] ties the last two together and is the single
//! entry point where failures become user-facing [`Notification`]s.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::Attendance;
use crate::store::StoreError;

pub mod intake;
pub mod recorder;
pub mod resolver;
pub mod service;

pub use intake::{FrameDecoder, FrameDisposition, ScanIntake, ScanOutcome, ScanSource};
pub use service::CheckInService;

/// Display details for the person behind a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendeeInfo {
    pub ticket: Uuid,
    pub attendee_name: String,
    pub attendee_email: Option<String>,
    pub event_title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckInReceipt {
    pub attendee: AttendeeInfo,
    pub attendance: Attendance,
}

#[derive(Debug, Error)]
pub enum CheckInError {
    #[error("ticket not found")]
    NotFound,

    #[error("registration {0} is not approved")]
    Unapproved(Uuid),

    #[error("ticket already checked in at {checked_in_at}")]
    AlreadyCheckedIn {
        attendee: AttendeeInfo,
        checked_in_at: DateTime<Utc>,
    },

    #[error("store unavailable")]
    StoreUnavailable(#[from] StoreError),
}

impl CheckInError {
    pub fn notification(&self) -> Notification {
        match self {
            CheckInError::NotFound => {
                Notification::error("Ticket not found. Check the code and try again.")
            }
            CheckInError::Unapproved(_) => {
                Notification::warning("This registration has not been approved yet.")
            }
            CheckInError::AlreadyCheckedIn {
                attendee,
                checked_in_at,
            } => Notification::warning(format!(
                "{} already checked in to {} at {}.",
                attendee.attendee_name,
                attendee.event_title,
                checked_in_at.format("%H:%M")
            )),
            CheckInError::StoreUnavailable(_) => {
                Notification::error("Check-in failed. Please try again.")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Warning,
    Error,
}

/// Message shown to the operator at the door.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    pub fn checked_in(receipt: &CheckInReceipt) -> Self {
        Self::success(format!(
            "{} checked in to {}.",
            receipt.attendee.attendee_name, receipt.attendee.event_title
        ))
    }
}
