//! Public error types for the `campus-orgs` module.
//!
//! These errors are safe to expose to other modules and consumers.

use thiserror::Error;

/// Errors that can be returned by the `CampusOrgsClientV1`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CampusOrgsError {
    /// Required input was missing or malformed. Nothing was read or written.
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// A business rule rejected the action. Nothing was written.
    #[error("{message}")]
    Guard { message: String },

    /// A date, time or venue could not be parsed.
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// The referenced organization or user does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The document store failed. The whole transition may be retried.
    #[error("Store error: {message}")]
    Store { message: String },
}

impl CampusOrgsError {
    /// Create a Validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a Guard error.
    #[must_use]
    pub fn guard(message: impl Into<String>) -> Self {
        Self::Guard {
            message: message.into(),
        }
    }

    /// Create a Parse error.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a `NotFound` error.
    #[must_use]
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create a Store error.
    #[must_use]
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Whether the failure came from the document store rather than from input or business rules.
    #[must_use]
    pub fn is_store_error(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Store { .. })
    }
}

/// Returned when a string does not name a bookable venue.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown venue: '{input}'")]
pub struct ParseVenueError {
    input: String,
}

impl ParseVenueError {
    pub(crate) fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }

    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }
}
