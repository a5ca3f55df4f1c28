//! Scan intake: the door-side controller that owns the scanner flag.
//!
//! Camera frames are decoded on a background task while the scanner is
//! active. The first frame that yields a code pauses the scanner and
//! dispatches exactly one check-in; an operator resumes it for the next
//! badge. A code that matches no ticket re-arms the scanner on its own.
//! Manual entry bypasses the flag entirely.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::{CheckInError, CheckInService, Notification};

pub const DEFAULT_FRAME_QUEUE: usize = 16;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("frame payload is not valid UTF-8")]
    InvalidEncoding,

    #[error("unreadable frame: {0}")]
    Unreadable(String),
}

/// Turns one camera frame into a candidate code. `Ok(None)` means the frame
/// simply held no code.
pub trait FrameDecoder: Send + Sync {
    fn decode(&self, frame: &[u8]) -> Result<Option<String>, DecodeError>;
}

/// Decoder for frames whose QR payload was already extracted client-side and
/// arrive as text.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextFrameDecoder;

impl FrameDecoder for TextFrameDecoder {
    fn decode(&self, frame: &[u8]) -> Result<Option<String>, DecodeError> {
        let text = std::str::from_utf8(frame).map_err(|_| DecodeError::InvalidEncoding)?;
        let text = text.trim();
        if text.is_empty() {
            Ok(None)
        } else {
            Ok(Some(text.to_string()))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanSource {
    Camera,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanOutcome {
    pub code: String,
    pub source: ScanSource,
    pub notification: Notification,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameDisposition {
    Queued,
    /// Scanner is paused.
    Ignored,
    /// Decoder is behind; a later frame supersedes this one.
    Dropped,
}

struct Shared {
    active: watch::Sender<bool>,
    outcomes: watch::Sender<Option<ScanOutcome>>,
}

impl Shared {
    fn publish(&self, outcome: ScanOutcome) {
        self.outcomes.send_replace(Some(outcome));
    }
}

pub struct ScanIntake {
    shared: Arc<Shared>,
    frames: mpsc::Sender<Vec<u8>>,
    service: CheckInService,
    worker: JoinHandle<()>,
}

impl ScanIntake {
    /// Starts the frame decoding task. The scanner starts paused.
    pub fn spawn(
        service: CheckInService,
        decoder: Arc<dyn FrameDecoder>,
        queue_capacity: usize,
    ) -> Self {
        let (active, _) = watch::channel(false);
        let (outcomes, _) = watch::channel(None);
        let shared = Arc::new(Shared { active, outcomes });
        let (frames, receiver) = mpsc::channel(queue_capacity.max(1));

        let worker = tokio::spawn(run_decoder(
            receiver,
            shared.clone(),
            service.clone(),
            decoder,
        ));

        Self {
            shared,
            frames,
            service,
            worker,
        }
    }

    pub fn is_active(&self) -> bool {
        *self.shared.active.borrow()
    }

    pub fn resume(&self) {
        self.shared.active.send_replace(true);
        tracing::info!("Scanner resumed");
    }

    pub fn pause(&self) {
        self.shared.active.send_replace(false);
        tracing::info!("Scanner paused");
    }

    pub fn submit_frame(&self, frame: Vec<u8>) -> FrameDisposition {
        if !self.is_active() {
            return FrameDisposition::Ignored;
        }
        match self.frames.try_send(frame) {
            Ok(()) => FrameDisposition::Queued,
            Err(mpsc::error::TrySendError::Full(_)) => FrameDisposition::Dropped,
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!("Frame decoder has stopped; dropping frame");
                FrameDisposition::Dropped
            }
        }
    }

    /// Manual code entry. Runs the check-in inline, no debouncing.
    pub async fn submit_manual(&self, code: &str) -> ScanOutcome {
        let notification = self.service.check_in_and_notify(code).await;
        let outcome = ScanOutcome {
            code: code.trim().to_string(),
            source: ScanSource::Manual,
            notification,
            at: Utc::now(),
        };
        self.shared.publish(outcome.clone());
        outcome
    }

    pub fn last_outcome(&self) -> Option<ScanOutcome> {
        self.shared.outcomes.borrow().clone()
    }

    pub fn outcomes(&self) -> watch::Receiver<Option<ScanOutcome>> {
        self.shared.outcomes.subscribe()
    }
}

impl Drop for ScanIntake {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

async fn run_decoder(
    mut frames: mpsc::Receiver<Vec<u8>>,
    shared: Arc<Shared>,
    service: CheckInService,
    decoder: Arc<dyn FrameDecoder>,
) {
    while let Some(frame) = frames.recv().await {
        // Frames queued before a pause are discarded.
        if !*shared.active.borrow() {
            continue;
        }

        let code = match decoder.decode(&frame) {
            Ok(Some(code)) => code,
            Ok(None) => continue,
            Err(e) => {
                tracing::debug!(error = %e, "Skipping undecodable frame");
                continue;
            }
        };

        shared.active.send_replace(false);
        tracing::debug!(code = %code, "Code decoded; scanner paused");

        // Detached so that pausing or dropping the intake never cancels a
        // check-in that is already under way.
        let service = service.clone();
        let shared = shared.clone();
        tokio::spawn(async move {
            let result = service.check_in(&code).await;
            // A code that matches no ticket keeps the scanner armed.
            if matches!(result, Err(CheckInError::NotFound)) {
                shared.active.send_replace(true);
                tracing::debug!(code = %code, "Unknown code; scanner resumed");
            }
            let notification = CheckInService::notify(&result);
            shared.publish(ScanOutcome {
                code,
                source: ScanSource::Camera,
                notification,
                at: Utc::now(),
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkin::NotificationLevel;
    use crate::models::Registration;
    use crate::store::MemoryStore;
    use std::time::Duration;
    use uuid::Uuid;

    fn intake_with(store: Arc<MemoryStore>) -> ScanIntake {
        ScanIntake::spawn(
            CheckInService::new(store),
            Arc::new(TextFrameDecoder),
            DEFAULT_FRAME_QUEUE,
        )
    }

    async fn next_outcome(
        outcomes: &mut watch::Receiver<Option<ScanOutcome>>,
    ) -> ScanOutcome {
        tokio::time::timeout(Duration::from_secs(5), outcomes.changed())
            .await
            .expect("timed out waiting for a scan outcome")
            .unwrap();
        outcomes.borrow_and_update().clone().unwrap()
    }

    #[test]
    fn test_text_decoder() {
        let decoder = TextFrameDecoder;
        assert_eq!(decoder.decode(b" abc \n").unwrap(), Some("abc".to_string()));
        assert_eq!(decoder.decode(b"   ").unwrap(), None);
        assert!(matches!(
            decoder.decode(&[0xff, 0xfe]),
            Err(DecodeError::InvalidEncoding)
        ));
    }

    #[tokio::test]
    async fn test_paused_scanner_ignores_frames() {
        let intake = intake_with(Arc::new(MemoryStore::new()));
        assert!(!intake.is_active());
        assert_eq!(
            intake.submit_frame(b"anything".to_vec()),
            FrameDisposition::Ignored
        );
    }

    #[tokio::test]
    async fn test_decode_pauses_after_one_check_in() {
        let store = Arc::new(MemoryStore::new());
        let registration = Registration::new(Uuid::new_v4(), Uuid::new_v4(), true);
        let ticket = registration.id.to_string();
        store.add_registration(registration);

        let intake = intake_with(store.clone());
        let mut outcomes = intake.outcomes();
        intake.resume();

        // A garbled frame is skipped and scanning carries on.
        assert_eq!(
            intake.submit_frame(vec![0xff, 0xfe]),
            FrameDisposition::Queued
        );
        assert_eq!(
            intake.submit_frame(ticket.clone().into_bytes()),
            FrameDisposition::Queued
        );

        let outcome = next_outcome(&mut outcomes).await;
        assert_eq!(outcome.code, ticket);
        assert_eq!(outcome.source, ScanSource::Camera);
        assert_eq!(outcome.notification.level, NotificationLevel::Success);
        assert!(!intake.is_active());
        assert_eq!(
            intake.submit_frame(ticket.into_bytes()),
            FrameDisposition::Ignored
        );
        assert_eq!(store.attendance_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_code_leaves_scanner_active() {
        let store = Arc::new(MemoryStore::new());
        let intake = intake_with(store.clone());
        let mut outcomes = intake.outcomes();
        intake.resume();

        let unknown = Uuid::new_v4().to_string();
        assert_eq!(
            intake.submit_frame(unknown.clone().into_bytes()),
            FrameDisposition::Queued
        );

        let outcome = next_outcome(&mut outcomes).await;
        assert_eq!(outcome.code, unknown);
        assert_eq!(outcome.notification.level, NotificationLevel::Error);
        assert!(intake.is_active());
        assert_eq!(store.attendance_count(), 0);
    }

    #[tokio::test]
    async fn test_manual_entry_works_while_paused() {
        let store = Arc::new(MemoryStore::new());
        let intake = intake_with(store.clone());

        let outcome = intake.submit_manual("  ").await;
        assert_eq!(outcome.source, ScanSource::Manual);
        assert_eq!(outcome.notification.level, NotificationLevel::Error);
        assert_eq!(intake.last_outcome(), Some(outcome));
        assert_eq!(store.attendance_count(), 0);
    }
}
