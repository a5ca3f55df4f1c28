//! Door check-in and live attendance reporting for Agora events.

pub mod checkin;
pub mod config;
pub mod handlers;
pub mod models;
pub mod reporting;
pub mod routes;
pub mod state;
pub mod store;
pub mod utils;

pub use state::AppState;
