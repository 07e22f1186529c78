//! Configuration errors.
//!
//! Everything here is detected before evolution starts. Infeasible
//! placements are never errors; they surface as fitness penalties.

use thiserror::Error;

use crate::constraints::ConstraintId;
use crate::validation::ValidationError;

/// A problem or run configuration that cannot be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The problem definition failed validation.
    #[error("invalid problem definition ({} issue(s)): {}", .0.len(), join_messages(.0))]
    Validation(Vec<ValidationError>),

    /// A constraint id does not exist in the problem.
    #[error("unknown constraint {0}")]
    UnknownConstraint(ConstraintId),

    /// The constraint kind has no hard form.
    #[error("constraint {id} ({code}) cannot be hardified")]
    NotHardifiable { id: ConstraintId, code: &'static str },

    /// The constraint was promoted already.
    #[error("constraint {0} is already hard")]
    AlreadyHard(ConstraintId),

    /// A GA parameter is out of range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Malformed JSON input.
    #[error("malformed input: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    pub(crate) fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
