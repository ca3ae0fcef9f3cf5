//! Authorization decisions.
//!
//! Nothing under this module touches storage. Callers pass in the resolved [`Actor`](crate::Actor)
//! and whatever records the decision needs, then persist the result themselves.

pub mod appointments;
pub mod users;

pub use appointments::{AppointmentPolicy, ListingScope};
pub use users::UserPolicy;
