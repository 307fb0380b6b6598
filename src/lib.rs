//! Schema-driven environment validation that reports every broken variable
//! before your app runs.
//!
//! Declare the variables your application needs once, with their types,
//! conversions and constraints, then resolve the whole set in one call:
//!
//! ```rust
//! use envschema::{EnvSchema, MapSource, Schema};
//!
//! let schema = EnvSchema::new()
//!     .field("DATABASE_URL", Schema::string().url())
//!     .field("APP_PORT", Schema::number().port().default(8080))
//!     .field("DEBUG", Schema::boolean().default(false))
//!     .field("CORS_ORIGINS", Schema::array().optional())
//!     .environment("APP_ENV", Schema::string().default("development"));
//!
//! let source = MapSource::new()
//!     .with_var("DATABASE_URL", "postgres://db.internal/app")
//!     .with_var("APP_ENV", "production");
//!
//! let config = schema.resolve(&source)?;
//! assert_eq!(config.get_i64("APP_PORT"), Some(8080));
//! assert!(config.is_prod());
//! # Ok::<(), envschema::EnvError>(())
//! ```
//!
//! # Error policy
//!
//! Two failure modes get two different treatments. Structural failures (a
//! required variable that is missing, a value that cannot be converted, a
//! source that cannot produce a string) abort resolution at the first
//! offending field. Constraint violations accumulate: every validator of
//! every field runs, and the violations come back batched in a single
//! [`EnvError::Aggregate`], so one resolution run tells a configuration
//! author everything that needs fixing.
//!
//! Accumulation is built on `stillwater`'s `Validation` applicative:
//! per-field violations become a [`FieldErrors`] (a non-empty collection
//! with a `Semigroup` instance), and independent fields' failures are
//! combined rather than short-circuited.
//!
//! # Sources
//!
//! Resolution reads raw values through the [`EnvSource`] trait:
//! [`ProcessEnv`] for the real process environment, [`MapSource`] for tests
//! and programmatic configuration.

mod enrich;
mod env;
mod error;
mod resolve;
mod schema;
mod source;

pub use env::{EnvConfig, EnvSchema};
pub use error::{EnvError, FieldError, FieldErrors};
pub use schema::{
    ArraySchema, AsyncValidator, BooleanSchema, NumberSchema, ObjectSchema, Schema, SchemaDef,
    StringSchema, Transformer, TypeTag, Validator, Violation,
};
pub use source::{EnvSource, MapSource, ProcessEnv};

/// Result alias for validation phases that accumulate errors.
pub type ValidationResult<T> = stillwater::Validation<T, FieldErrors>;
