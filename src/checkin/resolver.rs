use uuid::Uuid;

use super::CheckInError;
use crate::models::Registration;
use crate::store::RecordStore;

/// Resolves a scanned or typed code to an approved registration.
///
/// Blank codes and codes that are not ticket ids fail with
/// [`CheckInError::NotFound`] before the store is touched.
pub async fn resolve(store: &dyn RecordStore, code: &str) -> Result<Registration, CheckInError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(CheckInError::NotFound);
    }

    let Ok(ticket) = Uuid::parse_str(code) else {
        tracing::debug!(code, "Code is not a ticket id");
        return Err(CheckInError::NotFound);
    };

    let registration = store
        .get_registration(ticket)
        .await?
        .ok_or(CheckInError::NotFound)?;

    if !registration.confirmed {
        return Err(CheckInError::Unapproved(registration.id));
    }

    Ok(registration)
}
