//! Number schema factory.

use std::sync::Arc;

use serde_json::Value;

use super::def::{AsyncValidator, SchemaDef, TypeTag, Violation};
use super::value_type_name;

/// A schema for numeric variables.
///
/// The base transformer parses the raw string as an integer first and falls
/// back to a float, so `"443"` resolves to the integer `443` rather than
/// `443.0`. A string that parses as neither (including `"NaN"`, which JSON
/// numbers cannot represent) is left untouched, so the base validator
/// reports it as a validation failure instead of aborting the run.
#[derive(Clone)]
pub struct NumberSchema {
    def: SchemaDef,
}

impl NumberSchema {
    pub(crate) fn new() -> Self {
        let def = SchemaDef::new(TypeTag::Number)
            .push_transformer(Arc::new(|value| Ok(parse_number(value))))
            .push_validator(Arc::new(|value| {
                if value.is_number() {
                    None
                } else {
                    Some(
                        Violation::new("must be a number")
                            .with_code("invalid_type")
                            .with_expected("number")
                            .with_got(describe(value)),
                    )
                }
            }));
        Self { def }
    }

    /// Requires the value to be at least `min`.
    pub fn min(mut self, min: f64) -> Self {
        self.def = self.def.push_validator(Arc::new(move |value| {
            let n = value.as_f64()?;
            if n < min {
                Some(
                    Violation::new(format!("must be at least {}, got {}", min, n))
                        .with_code("min")
                        .with_expected(format!("at least {}", min))
                        .with_got(n.to_string()),
                )
            } else {
                None
            }
        }));
        self
    }

    /// Requires the value to be at most `max`.
    pub fn max(mut self, max: f64) -> Self {
        self.def = self.def.push_validator(Arc::new(move |value| {
            let n = value.as_f64()?;
            if n > max {
                Some(
                    Violation::new(format!("must be at most {}, got {}", max, n))
                        .with_code("max")
                        .with_expected(format!("at most {}", max))
                        .with_got(n.to_string()),
                )
            } else {
                None
            }
        }));
        self
    }

    /// Requires the value to be an integer in the valid TCP port range
    /// 1 through 65535.
    pub fn port(mut self) -> Self {
        self.def = self.def.push_validator(Arc::new(|value| {
            let ok = value
                .as_i64()
                .is_some_and(|n| (1..=65535).contains(&n));
            if ok {
                None
            } else {
                Some(
                    Violation::new("must be a port number between 1 and 65535")
                        .with_code("port")
                        .with_expected("integer between 1 and 65535")
                        .with_got(describe(value)),
                )
            }
        }));
        self
    }

    /// Marks the field as optional.
    pub fn optional(mut self) -> Self {
        self.def = self.def.set_optional();
        self
    }

    /// Sets a default substituted for an absent raw value.
    ///
    /// Defaults bypass both transformation and validation.
    pub fn default(mut self, value: impl Into<serde_json::Number>) -> Self {
        self.def = self.def.set_default(Value::Number(value.into()));
        self
    }

    /// Declares an async validator; see [`AsyncValidator`].
    pub fn async_validator(mut self, validator: impl AsyncValidator + 'static) -> Self {
        self.def = self.def.push_async_validator(Arc::new(validator));
        self
    }
}

impl From<NumberSchema> for SchemaDef {
    fn from(schema: NumberSchema) -> Self {
        schema.def
    }
}

fn parse_number(value: Value) -> Value {
    let Value::String(s) = &value else {
        return value;
    };
    let trimmed = s.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    value
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => value_type_name(other).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(schema: NumberSchema, raw: &str) -> (Value, Vec<Violation>) {
        let def: SchemaDef = schema.into();
        let value = def
            .transformers()
            .iter()
            .fold(json!(raw), |v, t| t(v).expect("number transformers are infallible"));
        let violations = def.validators().iter().filter_map(|v| v(&value)).collect();
        (value, violations)
    }

    #[test]
    fn test_integer_strings_parse_as_integers() {
        let (value, violations) = run(NumberSchema::new(), "443");
        assert_eq!(value, json!(443));
        assert!(value.is_i64());
        assert!(violations.is_empty());
    }

    #[test]
    fn test_float_strings_parse_as_floats() {
        let (value, violations) = run(NumberSchema::new(), "3.14");
        assert_eq!(value, json!(3.14));
        assert!(violations.is_empty());
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let (value, _) = run(NumberSchema::new(), "  42  ");
        assert_eq!(value, json!(42));
    }

    #[test]
    fn test_unparseable_input_is_a_validation_failure() {
        let (value, violations) = run(NumberSchema::new(), "abc");
        assert_eq!(value, json!("abc"));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, "invalid_type");
        assert!(violations[0].message.contains("number"));
    }

    #[test]
    fn test_nan_is_a_validation_failure() {
        // f64::NAN has no JSON representation, so the raw string stays put.
        let (value, violations) = run(NumberSchema::new(), "NaN");
        assert_eq!(value, json!("NaN"));
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn test_min_and_max_bounds() {
        let (_, violations) = run(NumberSchema::new().min(10.0), "5");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, "min");

        let (_, violations) = run(NumberSchema::new().max(10.0), "15");
        assert_eq!(violations[0].code, "max");

        let (_, violations) = run(NumberSchema::new().min(1.0).max(100.0), "50");
        assert!(violations.is_empty());
    }

    #[test]
    fn test_port_range() {
        let (_, violations) = run(NumberSchema::new().port(), "443");
        assert!(violations.is_empty());

        let (_, violations) = run(NumberSchema::new().port(), "70000");
        assert_eq!(violations[0].code, "port");

        let (_, violations) = run(NumberSchema::new().port(), "0");
        assert_eq!(violations[0].code, "port");
    }

    #[test]
    fn test_port_rejects_floats() {
        let (_, violations) = run(NumberSchema::new().port(), "80.5");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, "port");
    }

    #[test]
    fn test_bound_validators_skip_unparsed_values() {
        // Only the base type failure is reported for non-numbers.
        let (_, violations) = run(NumberSchema::new().min(1.0).max(2.0), "oops");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, "invalid_type");
    }
}
