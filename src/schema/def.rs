//! The shared schema definition model.
//!
//! Every primitive factory (string, number, boolean, array, object) wraps a
//! [`SchemaDef`]: a type tag, an ordered list of transformers, an ordered list
//! of validators, a declared-only list of async validators, an optional flag,
//! and an optional default value. Refinement methods consume the schema and
//! return a new one, so a base schema can be branched into independent
//! refinement chains without one chain's constraints leaking into the other.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// The primitive type a definition resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    /// A UTF-8 string value.
    String,
    /// An integer or float value.
    Number,
    /// A boolean value.
    Boolean,
    /// A sequence of values.
    Array,
    /// A JSON object value.
    Object,
}

impl TypeTag {
    /// Returns the lowercase name used in error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            TypeTag::String => "string",
            TypeTag::Number => "number",
            TypeTag::Boolean => "boolean",
            TypeTag::Array => "array",
            TypeTag::Object => "object",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single constraint violation reported by a validator.
///
/// Carries the human-readable message plus machine-readable context
/// (code, expected, got). The resolution pipeline attaches the field name
/// to produce a [`FieldError`](crate::FieldError).
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// Human-readable description of the failure.
    pub message: String,
    /// Machine-readable code (e.g. `min_length`, `one_of`).
    pub code: String,
    /// Description of what was expected.
    pub expected: Option<String>,
    /// The actual value that was received (formatted as string).
    pub got: Option<String>,
}

impl Violation {
    /// Creates a violation with the given message and the default code
    /// `validation_error`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: "validation_error".to_string(),
            expected: None,
            got: None,
        }
    }

    /// Sets the code and returns self for chaining.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Sets the "expected" field and returns self for chaining.
    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// Sets the "got" (actual value) field and returns self for chaining.
    pub fn with_got(mut self, got: impl Into<String>) -> Self {
        self.got = Some(got.into());
        self
    }
}

/// A conversion step applied to a raw or partially-converted value.
///
/// Transformers run strictly before any validator, in declaration order,
/// each consuming the previous transformer's output. An `Err` is a
/// transformation failure and aborts the whole orchestration.
pub type Transformer = Arc<dyn Fn(Value) -> Result<Value, String> + Send + Sync>;

/// A check applied to the fully transformed value.
///
/// Validators never mutate the value and are not short-circuited against
/// each other: every validator runs and every violation is collected.
pub type Validator = Arc<dyn Fn(&Value) -> Option<Violation> + Send + Sync>;

/// A validator that needs external resources (database lookups, API calls).
///
/// # API Design Note
///
/// Async validators are a declared capability of the schema model: they can
/// be attached to any primitive via `async_validator()`, but the synchronous
/// resolution pipeline never invokes them. Running them would require the
/// pipeline to become asynchronous end-to-end (resolving fields
/// independently and joining), which the core deliberately does not do.
///
/// The trait itself uses a synchronous signature rather than boxed futures:
/// implementations receive the transformed value and the field name and
/// return an optional violation directly, which keeps the trait object-safe
/// and free of any executor dependency.
pub trait AsyncValidator: Send + Sync {
    /// Checks the transformed value for the named field.
    fn validate_async(&self, value: &Value, field: &str) -> Option<Violation>;
}

/// The immutable definition of one field's expected shape.
///
/// Built once during schema declaration and safe to reuse across any number
/// of resolution runs. `Clone` shares the closure lists structurally, so
/// cloning is cheap and branched definitions stay independent.
#[derive(Clone)]
pub struct SchemaDef {
    tag: TypeTag,
    transformers: Vec<Transformer>,
    validators: Vec<Validator>,
    async_validators: Vec<Arc<dyn AsyncValidator>>,
    optional: bool,
    default: Option<Value>,
}

impl SchemaDef {
    pub(crate) fn new(tag: TypeTag) -> Self {
        Self {
            tag,
            transformers: Vec::new(),
            validators: Vec::new(),
            async_validators: Vec::new(),
            optional: false,
            default: None,
        }
    }

    /// Returns the primitive type this definition resolves to.
    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    /// Returns true if an absent raw value resolves to an absent typed value
    /// instead of a missing-value failure.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Returns the default substituted for an absent raw value, if any.
    ///
    /// Defaults are trusted as already-correct: they bypass both
    /// transformation and validation.
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Returns the number of declared async validators.
    ///
    /// These are never invoked by the synchronous pipeline; see
    /// [`AsyncValidator`].
    pub fn async_validator_count(&self) -> usize {
        self.async_validators.len()
    }

    pub(crate) fn transformers(&self) -> &[Transformer] {
        &self.transformers
    }

    pub(crate) fn validators(&self) -> &[Validator] {
        &self.validators
    }

    pub(crate) fn push_transformer(mut self, t: Transformer) -> Self {
        self.transformers.push(t);
        self
    }

    // Used when sealing wrapper-level settings (the array split step must run
    // before any refinement transformer).
    pub(crate) fn prepend_transformer(mut self, t: Transformer) -> Self {
        self.transformers.insert(0, t);
        self
    }

    pub(crate) fn push_validator(mut self, v: Validator) -> Self {
        self.validators.push(v);
        self
    }

    pub(crate) fn push_async_validator(mut self, v: Arc<dyn AsyncValidator>) -> Self {
        self.async_validators.push(v);
        self
    }

    pub(crate) fn set_optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub(crate) fn set_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }
}

impl fmt::Debug for SchemaDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaDef")
            .field("tag", &self.tag)
            .field("transformers", &self.transformers.len())
            .field("validators", &self.validators.len())
            .field("async_validators", &self.async_validators.len())
            .field("optional", &self.optional)
            .field("default", &self.default)
            .finish()
    }
}
