//! Storage for appointments and users.
//!
//! Services only see the repository traits. The in-memory implementations back the REST
//! runner and the tests.

pub mod appointments;
pub mod shared;
pub mod users;

pub use appointments::{AppointmentCriteria, AppointmentRepository, InMemoryAppointments};
pub use shared::{Page, PageRequest};
pub use users::{InMemoryUsers, UserCriteria, UserRepository};
