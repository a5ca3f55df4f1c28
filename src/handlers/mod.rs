use axum::response::Response;
use serde::Serialize;

use crate::utils::response::success;

pub mod checkin;
pub mod report;
pub mod scanner;

pub use checkin::{check_in, registration_status};
pub use report::attendance_report;
pub use scanner::{pause_scanner, resume_scanner, scanner_state, submit_frame};

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "agora-checkin",
    };

    success(payload, "Health check successful")
}
