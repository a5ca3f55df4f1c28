use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::{
    attendance_report, check_in, health_check, pause_scanner, registration_status,
    resume_scanner, scanner_state, submit_frame,
};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/checkin", post(check_in))
        .route("/registrations/:id/status", get(registration_status))
        .route("/attendance/report", get(attendance_report))
        .route("/scanner", get(scanner_state))
        .route("/scanner/frames", post(submit_frame))
        .route("/scanner/resume", post(resume_scanner))
        .route("/scanner/pause", post(pause_scanner))
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer())
        .layer(create_cors_layer())
        .with_state(state)
}
