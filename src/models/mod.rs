//! Domain models for the capacity planner.
//!
//! # Core Concepts
//!
//! - [`User`]: Anyone who can act on the system. Engineers carry a `max_capacity`,
//!   the ceiling their concurrent assignments may add up to. Managers staff projects.
//! - [`Project`]: A time-bounded piece of work with required skills and a target team size.
//! - [`Assignment`]: An engineer committed to a project for a date range at some
//!   allocation percentage. This is the only entity whose writes are checked against
//!   capacity (see [`crate::conformance`]).
//! - [`CapacityReport`] / [`AvailabilityReport`]: Read-only views derived from assignments.

mod assignment;
mod capacity;
mod project;
mod user;

pub use assignment::*;
pub use capacity::*;
pub use project::*;
pub use user::*;
