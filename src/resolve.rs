//! The per-field resolution pipeline.
//!
//! One field resolves in four stages: presence handling (default, optional,
//! or missing), transformation (in declaration order, fail-fast), validation
//! (every validator runs, violations accumulate), and the result. Structural
//! failures surface as `Err(EnvError)` and abort the orchestration;
//! validator violations come back inside a `Validation::Failure` so the
//! orchestrator can combine them across fields before reporting.

use serde_json::Value;
use stillwater::prelude::*;

use crate::error::{EnvError, FieldError, FieldErrors};
use crate::schema::SchemaDef;

/// The outcome of resolving one field, before cross-field aggregation.
#[derive(Debug)]
pub(crate) struct FieldResult {
    /// The field's typed value, or `None` for an absent optional field.
    pub value: Option<Value>,
    /// Accumulated validator violations for this field, if any.
    pub validation: Validation<(), FieldErrors>,
}

impl FieldResult {
    fn clean(value: Option<Value>) -> Self {
        Self {
            value,
            validation: Validation::Success(()),
        }
    }
}

/// Resolves one field against its definition.
///
/// `raw` is the source lookup result: `Ok(None)` for an absent variable,
/// `Err` for a source-level failure (surfaced as [`EnvError::Unexpected`]).
pub(crate) fn resolve_field(
    field: &str,
    def: &SchemaDef,
    raw: Result<Option<String>, String>,
) -> Result<FieldResult, EnvError> {
    let raw = raw.map_err(|message| EnvError::Unexpected {
        field: field.to_string(),
        message,
    })?;

    let Some(raw) = raw else {
        // Defaults are trusted as already-correct and skip the pipeline.
        if let Some(default) = def.default_value() {
            return Ok(FieldResult::clean(Some(default.clone())));
        }
        if def.is_optional() {
            return Ok(FieldResult::clean(None));
        }
        return Err(EnvError::Missing {
            field: field.to_string(),
        });
    };

    let mut value = Value::String(raw);
    for transformer in def.transformers() {
        value = transformer(value).map_err(|message| EnvError::Transform {
            field: field.to_string(),
            message,
        })?;
    }

    Ok(FieldResult {
        validation: run_validators(field, def, &value),
        value: Some(value),
    })
}

/// Runs every validator and accumulates the violations.
fn run_validators(field: &str, def: &SchemaDef, value: &Value) -> Validation<(), FieldErrors> {
    let errors: Vec<FieldError> = def
        .validators()
        .iter()
        .filter_map(|v| v(value))
        .map(|violation| FieldError::from_violation(field, violation))
        .collect();

    if errors.is_empty() {
        Validation::Success(())
    } else {
        Validation::Failure(FieldErrors::from_vec(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use serde_json::json;

    fn def(schema: impl Into<SchemaDef>) -> SchemaDef {
        schema.into()
    }

    #[test]
    fn test_present_valid_value_resolves() {
        let result =
            resolve_field("APP_PORT", &def(Schema::number().port()), Ok(Some("443".into())))
                .unwrap();
        assert_eq!(result.value, Some(json!(443)));
        assert!(result.validation.is_success());
    }

    #[test]
    fn test_missing_required_is_structural() {
        let err = resolve_field("APP_PORT", &def(Schema::number()), Ok(None)).unwrap_err();
        assert_eq!(
            err,
            EnvError::Missing {
                field: "APP_PORT".to_string()
            }
        );
    }

    #[test]
    fn test_default_bypasses_validation() {
        // The default "x" violates min(5) but is trusted as-is.
        let result =
            resolve_field("NAME", &def(Schema::string().min(5).default("x")), Ok(None)).unwrap();
        assert_eq!(result.value, Some(json!("x")));
        assert!(result.validation.is_success());
    }

    #[test]
    fn test_optional_absent_resolves_to_no_value() {
        let result =
            resolve_field("NAME", &def(Schema::string().optional()), Ok(None)).unwrap();
        assert_eq!(result.value, None);
        assert!(result.validation.is_success());
    }

    #[test]
    fn test_present_value_ignores_default() {
        let result = resolve_field(
            "NAME",
            &def(Schema::string().default("fallback")),
            Ok(Some("actual".into())),
        )
        .unwrap();
        assert_eq!(result.value, Some(json!("actual")));
    }

    #[test]
    fn test_transform_failure_is_structural() {
        let err = resolve_field("DEBUG", &def(Schema::boolean()), Ok(Some("maybe".into())))
            .unwrap_err();
        match err {
            EnvError::Transform { field, message } => {
                assert_eq!(field, "DEBUG");
                assert!(message.contains("`maybe`"));
            }
            other => panic!("expected Transform, got {:?}", other),
        }
    }

    #[test]
    fn test_violations_accumulate_per_field() {
        let schema = Schema::string().min(10).one_of(["alpha", "beta"]);
        let result = resolve_field("MODE", &def(schema), Ok(Some("x".into()))).unwrap();

        let errors = match result.validation {
            Validation::Failure(errors) => errors,
            Validation::Success(()) => panic!("expected violations"),
        };
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.with_code("min_length").len(), 1);
        assert_eq!(errors.with_code("one_of").len(), 1);
    }

    #[test]
    fn test_source_failure_is_unexpected() {
        let err = resolve_field(
            "KEY",
            &def(Schema::string()),
            Err("value is not valid unicode".to_string()),
        )
        .unwrap_err();
        match err {
            EnvError::Unexpected { field, message } => {
                assert_eq!(field, "KEY");
                assert!(message.contains("unicode"));
            }
            other => panic!("expected Unexpected, got {:?}", other),
        }
    }
}
