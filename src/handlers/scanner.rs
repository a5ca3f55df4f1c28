use axum::body::Bytes;
use axum::extract::State;
use axum::response::Response;
use serde::Serialize;

use crate::checkin::{FrameDisposition, ScanOutcome};
use crate::state::AppState;
use crate::utils::response::{accepted, success};

#[derive(Serialize)]
pub struct ScannerPayload {
    pub active: bool,
    pub last_outcome: Option<ScanOutcome>,
}

fn scanner_payload(state: &AppState) -> ScannerPayload {
    ScannerPayload {
        active: state.intake.is_active(),
        last_outcome: state.intake.last_outcome(),
    }
}

pub async fn scanner_state(State(state): State<AppState>) -> Response {
    success(scanner_payload(&state), "Scanner state")
}

pub async fn resume_scanner(State(state): State<AppState>) -> Response {
    state.intake.resume();
    success(scanner_payload(&state), "Scanner resumed")
}

pub async fn pause_scanner(State(state): State<AppState>) -> Response {
    state.intake.pause();
    success(scanner_payload(&state), "Scanner paused")
}

#[derive(Serialize)]
pub struct FramePayload {
    pub disposition: FrameDisposition,
}

/// Raw frame body from the scanner page.
pub async fn submit_frame(State(state): State<AppState>, frame: Bytes) -> Response {
    let disposition = state.intake.submit_frame(frame.to_vec());
    let message = match disposition {
        FrameDisposition::Queued => "Frame queued",
        FrameDisposition::Ignored => "Scanner is paused",
        FrameDisposition::Dropped => "Scanner busy, frame dropped",
    };
    accepted(FramePayload { disposition }, message)
}
