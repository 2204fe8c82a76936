//! Resource allocation tracking for engineering teams.
//!
//! Engineers, projects and time-bounded assignments live in SQLite ([`db`]) and are
//! served over HTTP ([`api`]). Every assignment write goes through the capacity
//! check in [`conformance`], which keeps an engineer's overlapping allocations
//! within their `max_capacity`.

pub mod api;
pub mod conformance;
pub mod db;
pub mod error;
pub mod models;
