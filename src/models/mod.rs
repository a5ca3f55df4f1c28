pub mod attendance;
pub mod event;
pub mod registration;
pub mod user;

pub use attendance::{Attendance, AttendanceStatus};
pub use event::Event;
pub use registration::Registration;
pub use user::User;
