//! Domain errors raised by the storage layer.
//!
//! Storage functions return `anyhow::Result`; these typed errors travel inside it
//! so the API layer can downcast and pick a status code. Conformance failures use
//! [`crate::conformance::ConformanceError`] instead.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// The named entity does not exist (or is not of the required kind).
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A field-level rule failed.
    #[error("{0}")]
    Invalid(String),

    /// The write collides with existing data.
    #[error("{0}")]
    Conflict(String),
}

impl DomainError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}
