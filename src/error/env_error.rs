//! The resolution failure taxonomy.

use crate::error::FieldErrors;

/// Why a whole orchestration run failed.
///
/// `Missing`, `Transform` and `Unexpected` are structural failures: they are
/// raised for the first offending field and abort the run before any later
/// field is evaluated. `Aggregate` is raised once, after every field has
/// been resolved, and batches all validator violations so a configuration
/// author sees every broken variable in one report.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EnvError {
    /// The raw value was absent, the field has no default and is not optional.
    #[error("missing value for required variable `{field}`")]
    Missing {
        /// The environment variable name.
        field: String,
    },

    /// A transformer failed to convert the raw input (e.g. an unparseable
    /// boolean token).
    #[error("failed to transform variable `{field}`: {message}")]
    Transform {
        /// The environment variable name.
        field: String,
        /// The transformer's failure message.
        message: String,
    },

    /// One or more validators reported violations for otherwise successfully
    /// transformed values.
    #[error("{0}")]
    Aggregate(FieldErrors),

    /// A failure outside the taxonomy, wrapped with the field name rather
    /// than silently swallowed (e.g. a source returning a non-unicode value).
    #[error("unexpected failure for variable `{field}`: {message}")]
    Unexpected {
        /// The environment variable name.
        field: String,
        /// The underlying message.
        message: String,
    },
}

impl EnvError {
    /// Returns the batched validator errors if this is an aggregate failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            EnvError::Aggregate(errors) => Some(errors),
            _ => None,
        }
    }

    /// Returns the field name for the single-field failure cases.
    pub fn field(&self) -> Option<&str> {
        match self {
            EnvError::Missing { field }
            | EnvError::Transform { field, .. }
            | EnvError::Unexpected { field, .. } => Some(field),
            EnvError::Aggregate(_) => None,
        }
    }
}
