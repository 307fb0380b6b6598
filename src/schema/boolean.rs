//! Boolean schema factory.

use std::sync::Arc;

use serde_json::Value;

use super::def::{AsyncValidator, SchemaDef, TypeTag, Violation};
use super::value_type_name;

/// A schema for boolean flags.
///
/// The base transformer accepts `true`/`1`/`yes` and `false`/`0`/`no`
/// (case-insensitive). Any other token is a transformation failure, which
/// aborts the whole resolution run rather than accumulating: a flag like
/// `"maybe"` is a typo to fix immediately, not a constraint violation.
#[derive(Clone)]
pub struct BooleanSchema {
    def: SchemaDef,
}

impl BooleanSchema {
    pub(crate) fn new() -> Self {
        let def = SchemaDef::new(TypeTag::Boolean)
            .push_transformer(Arc::new(parse_boolean))
            .push_validator(Arc::new(|value| {
                if value.is_boolean() {
                    None
                } else {
                    Some(
                        Violation::new("must be a boolean")
                            .with_code("invalid_type")
                            .with_expected("boolean")
                            .with_got(value_type_name(value)),
                    )
                }
            }));
        Self { def }
    }

    /// Marks the field as optional.
    pub fn optional(mut self) -> Self {
        self.def = self.def.set_optional();
        self
    }

    /// Sets a default substituted for an absent raw value.
    ///
    /// Defaults bypass both transformation and validation.
    pub fn default(mut self, value: bool) -> Self {
        self.def = self.def.set_default(Value::Bool(value));
        self
    }

    /// Declares an async validator; see [`AsyncValidator`].
    pub fn async_validator(mut self, validator: impl AsyncValidator + 'static) -> Self {
        self.def = self.def.push_async_validator(Arc::new(validator));
        self
    }
}

impl From<BooleanSchema> for SchemaDef {
    fn from(schema: BooleanSchema) -> Self {
        schema.def
    }
}

fn parse_boolean(value: Value) -> Result<Value, String> {
    let Value::String(s) = &value else {
        return Ok(value);
    };
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(Value::Bool(true)),
        "false" | "0" | "no" => Ok(Value::Bool(false)),
        other => Err(format!(
            "expected a boolean token (true/1/yes or false/0/no), got `{}`",
            other
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(raw: &str) -> Result<Value, String> {
        let def: SchemaDef = BooleanSchema::new().into();
        def.transformers()
            .iter()
            .try_fold(json!(raw), |v, t| t(v))
    }

    #[test]
    fn test_truthy_tokens() {
        for raw in ["true", "TRUE", "True", "1", "yes", "YES", " yes "] {
            assert_eq!(parse(raw), Ok(json!(true)), "token {:?}", raw);
        }
    }

    #[test]
    fn test_falsy_tokens() {
        for raw in ["false", "FALSE", "0", "no", "No"] {
            assert_eq!(parse(raw), Ok(json!(false)), "token {:?}", raw);
        }
    }

    #[test]
    fn test_unrecognized_token_fails_transformation() {
        let err = parse("maybe").unwrap_err();
        assert!(err.contains("`maybe`"));
        assert!(err.contains("true/1/yes"));
    }

    #[test]
    fn test_already_boolean_values_pass_through() {
        let def: SchemaDef = BooleanSchema::new().into();
        let out = def.transformers()[0](json!(true)).unwrap();
        assert_eq!(out, json!(true));
    }

    #[test]
    fn test_base_validator_rejects_non_boolean() {
        let def: SchemaDef = BooleanSchema::new().into();
        let violation = def.validators()[0](&json!(1)).unwrap();
        assert_eq!(violation.code, "invalid_type");
    }

    #[test]
    fn test_default_bypasses_parsing() {
        let def: SchemaDef = BooleanSchema::new().default(false).into();
        assert_eq!(def.default_value(), Some(&json!(false)));
    }
}
