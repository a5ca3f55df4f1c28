use std::sync::Arc;

use super::{recorder, resolver, CheckInError, CheckInReceipt, Notification};
use crate::models::AttendanceStatus;
use crate::store::{RecordStore, StoreError};
use uuid::Uuid;

#[derive(Clone)]
pub struct CheckInService {
    store: Arc<dyn RecordStore>,
}

impl CheckInService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub async fn check_in(&self, code: &str) -> Result<CheckInReceipt, CheckInError> {
        let registration = resolver::resolve(self.store.as_ref(), code).await?;
        recorder::record(self.store.as_ref(), &registration).await
    }

    /// Runs one check-in and folds every outcome into an operator message.
    pub async fn check_in_and_notify(&self, code: &str) -> Notification {
        Self::notify(&self.check_in(code).await)
    }

    /// Operator message for a finished check-in. Store failures are logged here.
    pub fn notify(result: &Result<CheckInReceipt, CheckInError>) -> Notification {
        match result {
            Ok(receipt) => Notification::checked_in(receipt),
            Err(err) => {
                match err {
                    CheckInError::StoreUnavailable(source) => {
                        tracing::error!(error = ?source, "Check-in failed on store access");
                    }
                    other => tracing::debug!(reason = %other, "Check-in rejected"),
                }
                err.notification()
            }
        }
    }

    /// Derived status of a single ticket, `None` if the ticket does not exist.
    pub async fn status(&self, ticket: Uuid) -> Result<Option<AttendanceStatus>, StoreError> {
        if self.store.get_registration(ticket).await?.is_none() {
            return Ok(None);
        }
        let attendance = self.store.find_attendance(ticket).await?;
        Ok(Some(AttendanceStatus::from_attendance(attendance.as_ref())))
    }
}
