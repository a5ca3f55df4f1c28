use super::{AttendeeInfo, CheckInError, CheckInReceipt};
use crate::models::Registration;
use crate::store::{InsertOutcome, RecordStore, StoreError};

/// Records attendance for an approved registration, at most once.
///
/// The lookup up front only saves a write for the common repeat scan. The
/// store's conditional insert is what settles concurrent attempts: whichever
/// loses sees [`CheckInError::AlreadyCheckedIn`] just like a sequential
/// repeat would. Every read happens before the insert, so a failed read never
/// leaves a committed record behind an error.
pub async fn record(
    store: &dyn RecordStore,
    registration: &Registration,
) -> Result<CheckInReceipt, CheckInError> {
    if !registration.confirmed {
        return Err(CheckInError::Unapproved(registration.id));
    }

    let existing = store.find_attendance(registration.id).await?;
    let attendee = attendee_info(store, registration).await?;

    if let Some(existing) = existing {
        return Err(CheckInError::AlreadyCheckedIn {
            attendee,
            checked_in_at: existing.check_in_time,
        });
    }

    match store.insert_attendance_if_absent(registration.id).await? {
        InsertOutcome::Inserted(attendance) => {
            tracing::info!(
                ticket = %registration.id,
                event_id = %registration.event_id,
                "Attendee checked in"
            );
            Ok(CheckInReceipt {
                attendee,
                attendance,
            })
        }
        InsertOutcome::Existing(existing) => {
            tracing::warn!(ticket = %registration.id, "Concurrent check-in lost the race");
            Err(CheckInError::AlreadyCheckedIn {
                attendee,
                checked_in_at: existing.check_in_time,
            })
        }
        InsertOutcome::Ineligible => {
            tracing::warn!(ticket = %registration.id, "Store refused check-in for unapproved ticket");
            Err(CheckInError::Unapproved(registration.id))
        }
    }
}

/// Looks up the names shown to the operator. Missing user or event rows fall
/// back to placeholders rather than failing the check-in.
pub async fn attendee_info(
    store: &dyn RecordStore,
    registration: &Registration,
) -> Result<AttendeeInfo, StoreError> {
    let user = store.get_user(registration.user_id).await?;
    let event = store.get_event(registration.event_id).await?;

    Ok(AttendeeInfo {
        ticket: registration.id,
        attendee_name: user
            .as_ref()
            .map(|user| user.full_name())
            .unwrap_or_else(|| "Unknown attendee".to_string()),
        attendee_email: user.map(|user| user.email),
        event_title: event
            .map(|event| event.title)
            .unwrap_or_else(|| "Unknown event".to_string()),
    })
}
