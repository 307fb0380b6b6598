//! Field-level validation error types.
//!
//! This module provides [`FieldError`] for a single validator violation and
//! [`FieldErrors`] for the accumulated collection raised as one aggregate
//! failure after every field has been resolved.

use std::fmt::{self, Display};

use stillwater::prelude::*;

use crate::schema::Violation;

/// A single validator violation attached to a named field.
///
/// `FieldError` captures everything a configuration author needs to fix the
/// variable:
/// - **field**: the environment variable name
/// - **message**: human-readable description of the failure
/// - **got**: the actual value that failed validation (optional)
/// - **expected**: what was expected instead (optional)
/// - **code**: machine-readable code for programmatic handling
///
/// # Example
///
/// ```rust
/// use envschema::FieldError;
///
/// let error = FieldError::new("APP_PORT", "must be a port number between 1 and 65535")
///     .with_code("port")
///     .with_got("70000");
///
/// assert_eq!(error.code, "port");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    /// The environment variable name.
    pub field: String,
    /// Human-readable error message.
    pub message: String,
    /// The actual value that was received (formatted as string).
    pub got: Option<String>,
    /// Description of what was expected.
    pub expected: Option<String>,
    /// Machine-readable error code (e.g. `min_length`).
    pub code: String,
}

impl FieldError {
    /// Creates a new field error with the given field name and message.
    ///
    /// The code defaults to `validation_error`; use `with_code` to set a
    /// more specific one.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            got: None,
            expected: None,
            code: "validation_error".to_string(),
        }
    }

    /// Attaches a validator's [`Violation`] to a field name.
    pub fn from_violation(field: impl Into<String>, violation: Violation) -> Self {
        Self {
            field: field.into(),
            message: violation.message,
            got: violation.got,
            expected: violation.expected,
            code: violation.code,
        }
    }

    /// Sets the error code and returns self for chaining.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Sets the "got" (actual value) field and returns self for chaining.
    pub fn with_got(mut self, got: impl Into<String>) -> Self {
        self.got = Some(got.into());
        self
    }

    /// Sets the "expected" field and returns self for chaining.
    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)?;

        if let Some(ref expected) = self.expected {
            write!(f, " (expected: {})", expected)?;
        }
        if let Some(ref got) = self.got {
            write!(f, " (got: {})", got)?;
        }

        Ok(())
    }
}

impl std::error::Error for FieldError {}

// All fields are owned types, so Send + Sync hold; these assertions keep
// that true if the types change.
const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<FieldError>();
    assert_sync::<FieldError>();
};

/// A non-empty collection of field errors.
///
/// Wraps a `NonEmptyVec<FieldError>` so an aggregate failure always carries
/// at least one error, which is what `Validation<T, FieldErrors>` requires.
/// Implements `Semigroup` so errors from independently resolved fields can
/// be combined:
///
/// ```rust
/// use envschema::{FieldError, FieldErrors};
/// use stillwater::prelude::*;
///
/// let a = FieldErrors::single(FieldError::new("APP_PORT", "out of range"));
/// let b = FieldErrors::single(FieldError::new("APP_URL", "not a URL"));
///
/// let combined = a.combine(b);
/// assert_eq!(combined.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldErrors(NonEmptyVec<FieldError>);

impl FieldErrors {
    /// Creates a collection containing a single error.
    pub fn single(error: FieldError) -> Self {
        Self(NonEmptyVec::singleton(error))
    }

    /// Creates a collection from a `Vec<FieldError>`.
    ///
    /// # Panics
    ///
    /// Panics if the provided vec is empty.
    pub fn from_vec(errors: Vec<FieldError>) -> Self {
        Self(NonEmptyVec::from_vec(errors).expect("FieldErrors requires at least one error"))
    }

    /// Returns the number of errors in this collection.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns false; the collection is guaranteed non-empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns an iterator over the contained errors.
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Returns the first error in the collection.
    pub fn first(&self) -> &FieldError {
        self.0.head()
    }

    /// Returns all errors for the given field, in validator order.
    pub fn for_field(&self, field: &str) -> Vec<&FieldError> {
        self.0.iter().filter(|e| e.field == field).collect()
    }

    /// Returns all errors with the given code.
    pub fn with_code(&self, code: &str) -> Vec<&FieldError> {
        self.0.iter().filter(|e| e.code == code).collect()
    }

    /// Converts this collection into a `Vec<FieldError>`.
    pub fn into_vec(self) -> Vec<FieldError> {
        self.0.into_vec()
    }
}

impl Semigroup for FieldErrors {
    fn combine(self, other: Self) -> Self {
        FieldErrors(self.0.combine(other.0))
    }
}

impl Display for FieldErrors {
    /// Enumerates, per field, that field's joined messages.
    ///
    /// Errors arrive grouped in field declaration order, so consecutive
    /// errors with the same field name are joined onto one line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "environment validation failed with {} error(s):", self.len())?;

        let mut current: Option<&str> = None;
        for error in self.iter() {
            if current == Some(error.field.as_str()) {
                write!(f, "; {}", error.message)?;
            } else {
                if current.is_some() {
                    writeln!(f)?;
                }
                write!(f, "  {}: {}", error.field, error.message)?;
                current = Some(error.field.as_str());
            }
        }
        writeln!(f)
    }
}

impl std::error::Error for FieldErrors {}

impl IntoIterator for FieldErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

impl<'a> IntoIterator for &'a FieldErrors {
    type Item = &'a FieldError;
    type IntoIter = Box<dyn Iterator<Item = &'a FieldError> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.0.iter())
    }
}
