//! Error types for schema resolution.
//!
//! This module provides the failure taxonomy ([`EnvError`]) and the
//! accumulating per-field error types ([`FieldError`], [`FieldErrors`]).

mod env_error;
mod field_error;

pub use env_error::EnvError;
pub use field_error::{FieldError, FieldErrors};
