use std::sync::Arc;

use crate::checkin::intake::TextFrameDecoder;
use crate::checkin::{CheckInService, ScanIntake};
use crate::store::RecordStore;

/// Shared handler state. One scan intake per process: the scanner flag is
/// owned here rather than by any single request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub checkin: CheckInService,
    pub intake: Arc<ScanIntake>,
}

impl AppState {
    /// Must be called from within a tokio runtime; spawns the frame decoder.
    pub fn new(store: Arc<dyn RecordStore>, frame_queue: usize) -> Self {
        let checkin = CheckInService::new(store.clone());
        let decoder = Arc::new(TextFrameDecoder);
        let intake = ScanIntake::spawn(checkin.clone(), decoder, frame_queue);

        Self {
            store,
            checkin,
            intake: Arc::new(intake),
        }
    }
}
