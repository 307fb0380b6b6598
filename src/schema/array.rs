//! Array schema factory.

use std::sync::Arc;

use serde_json::Value;

use super::def::{AsyncValidator, SchemaDef, TypeTag, Violation};
use super::value_type_name;

/// A schema for delimiter-separated list variables.
///
/// A raw string is split on the separator (`","` unless overridden) and each
/// element is trimmed unless [`no_trim`](ArraySchema::no_trim) was called.
/// Splitting is sealed into the definition only when the schema is converted
/// into a [`SchemaDef`], so `with_separator` can be called at any point in
/// the refinement chain and still wins.
#[derive(Clone)]
pub struct ArraySchema {
    def: SchemaDef,
    separator: String,
    trim: bool,
}

impl ArraySchema {
    pub(crate) fn new() -> Self {
        let def = SchemaDef::new(TypeTag::Array).push_validator(Arc::new(|value| {
            if value.is_array() {
                None
            } else {
                Some(
                    Violation::new("must be an array")
                        .with_code("invalid_type")
                        .with_expected("array")
                        .with_got(value_type_name(value)),
                )
            }
        }));
        Self {
            def,
            separator: ",".to_string(),
            trim: true,
        }
    }

    /// Splits the raw string on `separator` instead of `","`.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Keeps surrounding whitespace on each element.
    pub fn no_trim(mut self) -> Self {
        self.trim = false;
        self
    }

    /// Requires at least `min` elements.
    pub fn min(mut self, min: usize) -> Self {
        self.def = self.def.push_validator(Arc::new(move |value| {
            let items = value.as_array()?;
            if items.len() < min {
                Some(
                    Violation::new(format!(
                        "must have at least {} item(s), got {}",
                        min,
                        items.len()
                    ))
                    .with_code("min_items")
                    .with_expected(format!("at least {} item(s)", min))
                    .with_got(format!("{} item(s)", items.len())),
                )
            } else {
                None
            }
        }));
        self
    }

    /// Requires at most `max` elements.
    pub fn max(mut self, max: usize) -> Self {
        self.def = self.def.push_validator(Arc::new(move |value| {
            let items = value.as_array()?;
            if items.len() > max {
                Some(
                    Violation::new(format!(
                        "must have at most {} item(s), got {}",
                        max,
                        items.len()
                    ))
                    .with_code("max_items")
                    .with_expected(format!("at most {} item(s)", max))
                    .with_got(format!("{} item(s)", items.len())),
                )
            } else {
                None
            }
        }));
        self
    }

    /// Requires every element to satisfy the given element schema.
    ///
    /// Elements are checked in order and the first failing element is
    /// reported with its index; later elements are not checked. The element
    /// schema's transformers run against each element before its validators.
    pub fn items(mut self, schema: impl Into<SchemaDef>) -> Self {
        let item_def: SchemaDef = schema.into();
        self.def = self.def.push_validator(Arc::new(move |value| {
            let items = value.as_array()?;
            for (i, item) in items.iter().enumerate() {
                if let Some(message) = check_item(&item_def, item) {
                    return Some(
                        Violation::new(format!("item {}: {}", i, message))
                            .with_code("items")
                            .with_got(item.to_string()),
                    );
                }
            }
            None
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
    pub fn default(mut self, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let items: Vec<Value> = values
            .into_iter()
            .map(|v| Value::String(v.into()))
            .collect();
        self.def = self.def.set_default(Value::Array(items));
        self
    }

    /// Declares an async validator; see [`AsyncValidator`].
    pub fn async_validator(mut self, validator: impl AsyncValidator + 'static) -> Self {
        self.def = self.def.push_async_validator(Arc::new(validator));
        self
    }
}

impl From<ArraySchema> for SchemaDef {
    fn from(schema: ArraySchema) -> Self {
        let separator = schema.separator;
        let trim = schema.trim;
        // The split step must see the raw string, so it goes first even
        // though refinements were declared earlier.
        schema.def.prepend_transformer(Arc::new(move |value| {
            Ok(split_raw(value, &separator, trim))
        }))
    }
}

fn split_raw(value: Value, separator: &str, trim: bool) -> Value {
    let Value::String(s) = &value else {
        return value;
    };
    let items = s
        .split(separator)
        .map(|item| {
            let item = if trim { item.trim() } else { item };
            Value::String(item.to_string())
        })
        .collect();
    Value::Array(items)
}

fn check_item(def: &SchemaDef, item: &Value) -> Option<String> {
    let mut value = item.clone();
    for t in def.transformers() {
        match t(value) {
            Ok(next) => value = next,
            Err(message) => return Some(message),
        }
    }
    def.validators().iter().find_map(|v| v(&value).map(|violation| violation.message))
}
