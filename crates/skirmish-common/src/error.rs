//! Error types for Skirmish.

use thiserror::Error;

use crate::ids::EntityId;

/// Top-level error type for Skirmish operations.
#[derive(Debug, Error)]
pub enum SkirmishError {
    /// A tuning value or level description is out of range.
    #[error("invalid configuration: {field}: {reason}")]
    InvalidConfiguration {
        /// Offending field, dotted path
        field: String,
        /// Why it was rejected
        reason: String,
    },

    /// A collaborator an operation needs is absent.
    #[error("missing dependency for {entity}: {what}")]
    MissingDependency {
        /// Entity that needed it
        entity: EntityId,
        /// What was missing
        what: String,
    },

    /// Configuration file parse errors
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SkirmishError {
    /// Shorthand for an [`SkirmishError::InvalidConfiguration`].
    #[must_use]
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for an [`SkirmishError::MissingDependency`].
    #[must_use]
    pub fn missing(entity: EntityId, what: impl Into<String>) -> Self {
        Self::MissingDependency {
            entity,
            what: what.into(),
        }
    }

    /// Whether this error should stop the caller rather than degrade a single actor.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::MissingDependency { .. })
    }
}

/// Result type alias for Skirmish operations.
pub type SkirmishResult<T> = Result<T, SkirmishError>;
