use campus_orgs_sdk::CampusOrgsError;
use thiserror::Error;

/// Business rules a membership action can violate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardViolation {
    #[error("Course '{course}' is not eligible to join {organization}")]
    IneligibleCourse {
        course: String,
        organization: String,
    },

    #[error("{email} has already applied to {organization}")]
    AlreadyApplicant { email: String, organization: String },

    #[error("{email} is already a member of {organization}")]
    AlreadyMember { email: String, organization: String },

    #[error("{email} is already an officer of {organization}")]
    AlreadyOfficer { email: String, organization: String },

    #[error("{email} has no pending application to {organization}")]
    NotApplicant { email: String, organization: String },

    #[error("{email} is not a member of {organization}")]
    NotMember { email: String, organization: String },

    #[error("{email} holds an officer position in {organization}; remove them from it first")]
    HoldsOfficerPosition { email: String, organization: String },

    #[error("{email} is not an officer of {organization}")]
    NotOfficer { email: String, organization: String },

    #[error("{email} already has a pending renewal request for {organization}")]
    RenewalAlreadyPending { email: String, organization: String },

    #[error("{email} has no pending renewal request for {organization}")]
    NoPendingRenewal { email: String, organization: String },
}

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error(transparent)]
    Guard(#[from] GuardViolation),

    #[error("Cannot parse '{input}' as {expected}")]
    Parse { input: String, expected: String },

    #[error("{collection}/{id} not found")]
    NotFound { collection: String, id: String },

    #[error("Malformed record {collection}/{id}: {reason}")]
    MalformedRecord {
        collection: String,
        id: String,
        reason: String,
    },

    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl DomainError {
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn parse(input: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::Parse {
            input: input.into(),
            expected: expected.into(),
        }
    }

    #[must_use]
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    #[must_use]
    pub fn malformed(
        collection: impl Into<String>,
        id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedRecord {
            collection: collection.into(),
            id: id.into(),
            reason: reason.into(),
        }
    }
}

/// Convert domain errors to SDK errors for public API consumption.
impl From<DomainError> for CampusOrgsError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation { field, message } => {
                Self::validation(format!("{field}: {message}"))
            }
            DomainError::Guard(violation) => Self::guard(violation.to_string()),
            DomainError::Parse { input, expected } => {
                Self::parse(format!("'{input}' is not a valid {expected}"))
            }
            DomainError::NotFound { collection, id } => Self::not_found(collection, id),
            other @ (DomainError::MalformedRecord { .. } | DomainError::Store(_)) => {
                Self::store(other.to_string())
            }
        }
    }
}
