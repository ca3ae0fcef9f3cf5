//! # Clinic Core
//!
//! Core business logic for the clinic scheduling backend.
//!
//! This crate contains:
//! - Role resolution and the [`Actor`] passed into every decision
//! - The appointment lifecycle and access-control policy engine ([`policy`])
//! - Repository traits with thread-safe in-memory implementations
//! - Services that combine decisions with storage, plus startup config and seed loading
//!
//! **No API concerns**: authentication, HTTP servers and wire envelopes belong in `api-rest`
//! and `api-shared`.

pub mod appointment;
pub mod config;
pub mod constants;
pub mod error;
pub mod policy;
pub mod repositories;
pub mod role;
pub mod seed;
pub mod services;
pub mod user;
pub mod validation;

pub use appointment::{Appointment, AppointmentDraft, AppointmentStatus, BookingRequest, TimeSlot};
pub use config::CoreConfig;
pub use error::{ClinicError, ClinicResult, PolicyError, PolicyResult};
pub use policy::{AppointmentPolicy, ListingScope, UserPolicy};
pub use role::{classify, same_identity, Actor, Role};
pub use services::{AppointmentService, UserService};
pub use user::{Department, Gender, NewUser, User, UserUpdate};

pub use clinic_ids::{IdError, IdService, ShortId};
