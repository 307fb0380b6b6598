//! Schema declaration: type tags, violations, and the primitive factories.
//!
//! [`Schema`] is the entry point. Each factory method returns a primitive
//! schema whose refinement methods consume the schema and return a new one,
//! so a base schema can be cloned and branched into independent chains.

mod array;
mod boolean;
mod def;
mod number;
mod object;
mod string;

pub use array::ArraySchema;
pub use boolean::BooleanSchema;
pub use def::{AsyncValidator, SchemaDef, Transformer, TypeTag, Validator, Violation};
pub use number::NumberSchema;
pub use object::ObjectSchema;
pub use string::StringSchema;

use serde_json::Value;

/// Factory for the five primitive schemas.
///
/// # Example
///
/// ```rust
/// use envschema::{EnvSchema, MapSource, Schema};
///
/// let schema = EnvSchema::new()
///     .field("APP_PORT", Schema::number().port())
///     .field("DEBUG", Schema::boolean().default(false));
///
/// let source = MapSource::new().with_var("APP_PORT", "8080");
/// let config = schema.resolve(&source).unwrap();
/// assert_eq!(config.get_i64("APP_PORT"), Some(8080));
/// assert_eq!(config.get_bool("DEBUG"), Some(false));
/// ```
pub struct Schema;

impl Schema {
    /// A string schema; the raw value is kept as-is.
    pub fn string() -> StringSchema {
        StringSchema::new()
    }

    /// A number schema; the raw value is parsed as an integer or float.
    pub fn number() -> NumberSchema {
        NumberSchema::new()
    }

    /// A boolean schema; the raw value is parsed from a fixed token set.
    pub fn boolean() -> BooleanSchema {
        BooleanSchema::new()
    }

    /// An array schema; the raw value is split on a separator.
    pub fn array() -> ArraySchema {
        ArraySchema::new()
    }

    /// An object schema; the raw value is parsed as JSON.
    pub fn object() -> ObjectSchema {
        ObjectSchema::new()
    }
}

/// Lowercase JSON type name for error messages.
pub(crate) fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
