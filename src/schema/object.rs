//! Object schema factory.

use std::sync::Arc;

use serde_json::Value;

use super::def::{AsyncValidator, SchemaDef, TypeTag, Violation};
use super::value_type_name;

/// A schema for JSON-object variables.
///
/// The base transformer parses a raw string as JSON; a string that is not
/// valid JSON, or JSON that is not an object, is left for the base validator
/// to reject. Member constraints are declared with
/// [`field`](ObjectSchema::field), and [`strict`](ObjectSchema::strict)
/// rejects members that were not declared.
#[derive(Clone)]
pub struct ObjectSchema {
    def: SchemaDef,
    declared: Vec<String>,
}

impl ObjectSchema {
    pub(crate) fn new() -> Self {
        let def = SchemaDef::new(TypeTag::Object)
            .push_transformer(Arc::new(|value| Ok(parse_object(value))))
            .push_validator(Arc::new(|value| {
                if value.is_object() {
                    None
                } else {
                    Some(
                        Violation::new("must be a JSON object")
                            .with_code("invalid_type")
                            .with_expected("object")
                            .with_got(value_type_name(value)),
                    )
                }
            }));
        Self {
            def,
            declared: Vec::new(),
        }
    }

    /// Requires the member `name` to be present and satisfy `schema`.
    ///
    /// An optional member schema makes the member's absence acceptable. The
    /// member schema's transformers run against the member value before its
    /// validators, so e.g. a number member given as `"8080"` still counts.
    pub fn field(mut self, name: impl Into<String>, schema: impl Into<SchemaDef>) -> Self {
        let name = name.into();
        self.declared.push(name.clone());
        let member_def: SchemaDef = schema.into();
        self.def = self.def.push_validator(Arc::new(move |value| {
            let object = value.as_object()?;
            let Some(member) = object.get(&name) else {
                if member_def.is_optional() || member_def.default_value().is_some() {
                    return None;
                }
                return Some(
                    Violation::new(format!("missing member `{}`", name))
                        .with_code("missing_member")
                        .with_expected(format!("member `{}`", name)),
                );
            };
            check_member(&member_def, member).map(|message| {
                Violation::new(format!("member `{}`: {}", name, message))
                    .with_code("member")
                    .with_got(member.to_string())
            })
        }));
        self
    }

    /// Rejects members not declared with `field`.
    ///
    /// Captures the set of members declared so far, so call it after the
    /// last `field` declaration.
    pub fn strict(mut self) -> Self {
        let declared = self.declared.clone();
        self.def = self.def.push_validator(Arc::new(move |value| {
            let object = value.as_object()?;
            let unknown: Vec<&str> = object
                .keys()
                .filter(|k| !declared.iter().any(|d| d == *k))
                .map(String::as_str)
                .collect();
            if unknown.is_empty() {
                None
            } else {
                Some(
                    Violation::new(format!("unknown member(s): {}", unknown.join(", ")))
                        .with_code("strict")
                        .with_expected(format!("only: {}", declared.join(", "))),
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
    pub fn default(mut self, value: Value) -> Self {
        self.def = self.def.set_default(value);
        self
    }

    /// Declares an async validator; see [`AsyncValidator`].
    pub fn async_validator(mut self, validator: impl AsyncValidator + 'static) -> Self {
        self.def = self.def.push_async_validator(Arc::new(validator));
        self
    }
}

impl From<ObjectSchema> for SchemaDef {
    fn from(schema: ObjectSchema) -> Self {
        schema.def
    }
}

fn parse_object(value: Value) -> Value {
    let Value::String(s) = &value else {
        return value;
    };
    match serde_json::from_str::<Value>(s) {
        Ok(parsed @ Value::Object(_)) => parsed,
        _ => value,
    }
}

fn check_member(def: &SchemaDef, member: &Value) -> Option<String> {
    let mut value = member.clone();
    for t in def.transformers() {
        match t(value) {
            Ok(next) => value = next,
            Err(message) => return Some(message),
        }
    }
    def.validators().iter().find_map(|v| v(&value).map(|violation| violation.message))
}
