//! Operations that combine policy decisions with storage.

pub mod appointments;
pub mod users;

pub use appointments::AppointmentService;
pub use users::UserService;
