//! The schema orchestrator and the resolved configuration.

use indexmap::IndexMap;
use serde_json::Value;
use stillwater::prelude::*;

use crate::enrich::enrich;
use crate::error::{EnvError, FieldErrors};
use crate::resolve::resolve_field;
use crate::schema::SchemaDef;
use crate::source::EnvSource;

/// A declared set of environment variables and their schemas.
///
/// Fields resolve in declaration order. Structural failures (a missing
/// required variable, a failed transformation, a source failure) abort the
/// run at the first offending field; validator violations are collected
/// across every field and raised once as [`EnvError::Aggregate`], so a
/// configuration author sees every broken variable in one report.
///
/// The schema is immutable after construction and reusable: `resolve` can
/// run any number of times, against any source.
///
/// # Example
///
/// ```rust
/// use envschema::{EnvSchema, MapSource, Schema};
///
/// let schema = EnvSchema::new()
///     .field("DATABASE_URL", Schema::string().url())
///     .field("APP_PORT", Schema::number().port().default(8080))
///     .environment("APP_ENV", Schema::string().default("development"));
///
/// let source = MapSource::new().with_var("DATABASE_URL", "postgres://db/app");
/// let config = schema.resolve(&source).unwrap();
///
/// assert_eq!(config.get_i64("APP_PORT"), Some(8080));
/// assert_eq!(config.is_dev(), true);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EnvSchema {
    fields: IndexMap<String, SchemaDef>,
    environment_field: Option<String>,
}

impl EnvSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a field. Re-declaring a name replaces its schema but keeps
    /// its original position in the resolution order.
    pub fn field(mut self, name: impl Into<String>, schema: impl Into<SchemaDef>) -> Self {
        self.fields.insert(name.into(), schema.into());
        self
    }

    /// Declares a field and designates it as the environment name.
    ///
    /// The resolved configuration is then enriched with `is_prod`, `is_dev`,
    /// `is_test` and `is_staging` flags plus an `environment` key; see the
    /// flag accessors on [`EnvConfig`].
    pub fn environment(mut self, name: impl Into<String>, schema: impl Into<SchemaDef>) -> Self {
        let name = name.into();
        self.environment_field = Some(name.clone());
        self.field(name, schema)
    }

    /// Returns the declared field names in resolution order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Resolves every declared field against `source`.
    pub fn resolve(&self, source: &dyn EnvSource) -> Result<EnvConfig, EnvError> {
        let mut values: IndexMap<String, Value> = IndexMap::with_capacity(self.fields.len());
        let mut failures: Option<FieldErrors> = None;

        for (name, def) in &self.fields {
            let result = resolve_field(name, def, source.get(name))?;

            if let Validation::Failure(errors) = result.validation {
                failures = Some(match failures {
                    Some(acc) => acc.combine(errors),
                    None => errors,
                });
            }
            if let Some(value) = result.value {
                values.insert(name.clone(), value);
            }
        }

        if let Some(errors) = failures {
            return Err(EnvError::Aggregate(errors));
        }

        if let Some(field) = &self.environment_field {
            if let Some(name) = values.get(field).cloned() {
                enrich(&mut values, &name);
            }
        }

        Ok(EnvConfig { values })
    }
}

/// The typed values produced by a successful resolution run.
///
/// Keys are the declared field names (plus the enrichment keys, when the
/// schema designated an environment field), in resolution order. Absent
/// optional fields have no entry.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvConfig {
    values: IndexMap<String, Value>,
}

impl EnvConfig {
    /// Returns the typed value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Returns the value for `key` as a string slice.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key)?.as_str()
    }

    /// Returns the value for `key` as an integer.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.values.get(key)?.as_i64()
    }

    /// Returns the value for `key` as a float. Integer values convert.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.values.get(key)?.as_f64()
    }

    /// Returns the value for `key` as a boolean.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get(key)?.as_bool()
    }

    /// Returns the value for `key` as an array of values.
    pub fn get_array(&self, key: &str) -> Option<&Vec<Value>> {
        self.values.get(key)?.as_array()
    }

    /// True when the designated environment field resolved to `production`.
    pub fn is_prod(&self) -> bool {
        self.get_bool("is_prod").unwrap_or(false)
    }

    /// True when the designated environment field resolved to `development`.
    pub fn is_dev(&self) -> bool {
        self.get_bool("is_dev").unwrap_or(false)
    }

    /// True when the designated environment field resolved to `test`.
    pub fn is_test(&self) -> bool {
        self.get_bool("is_test").unwrap_or(false)
    }

    /// True when the designated environment field resolved to `staging`.
    pub fn is_staging(&self) -> bool {
        self.get_bool("is_staging").unwrap_or(false)
    }

    /// Returns the keys in resolution order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// True if the configuration holds a value for `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Serializes the configuration as a JSON object, keys in resolution
    /// order.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.values
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use crate::source::MapSource;
    use serde_json::json;

    #[test]
    fn test_fields_resolve_in_declaration_order() {
        let schema = EnvSchema::new()
            .field("B", Schema::string())
            .field("A", Schema::string());
        let source = MapSource::new().with_var("A", "1").with_var("B", "2");

        let config = schema.resolve(&source).unwrap();
        let keys: Vec<_> = config.keys().collect();
        assert_eq!(keys, vec!["B", "A"]);
    }

    #[test]
    fn test_redeclaring_a_field_replaces_its_schema() {
        let schema = EnvSchema::new()
            .field("N", Schema::string())
            .field("N", Schema::number());
        let source = MapSource::new().with_var("N", "7");

        let config = schema.resolve(&source).unwrap();
        assert_eq!(config.get_i64("N"), Some(7));
    }

    #[test]
    fn test_missing_aborts_before_later_fields_validate() {
        let schema = EnvSchema::new()
            .field("FIRST", Schema::string())
            .field("SECOND", Schema::string().min(100));
        let source = MapSource::new().with_var("SECOND", "too short");

        let err = schema.resolve(&source).unwrap_err();
        assert_eq!(
            err,
            EnvError::Missing {
                field: "FIRST".to_string()
            }
        );
    }

    #[test]
    fn test_violations_aggregate_across_fields() {
        let schema = EnvSchema::new()
            .field("NAME", Schema::string().min(10))
            .field("PORT", Schema::number().port());
        let source = MapSource::new()
            .with_var("NAME", "x")
            .with_var("PORT", "70000");

        let err = schema.resolve(&source).unwrap_err();
        let errors = err.field_errors().expect("aggregate failure");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.for_field("NAME").len(), 1);
        assert_eq!(errors.for_field("PORT").len(), 1);
    }

    #[test]
    fn test_optional_absent_field_has_no_entry() {
        let schema = EnvSchema::new().field("OPT", Schema::string().optional());
        let config = schema.resolve(&MapSource::new()).unwrap();

        assert!(!config.contains("OPT"));
        assert_eq!(config.get("OPT"), None);
    }

    #[test]
    fn test_typed_accessors() {
        let schema = EnvSchema::new()
            .field("S", Schema::string())
            .field("N", Schema::number())
            .field("F", Schema::number())
            .field("B", Schema::boolean())
            .field("A", Schema::array());
        let source = MapSource::new()
            .with_var("S", "hello")
            .with_var("N", "42")
            .with_var("F", "2.5")
            .with_var("B", "yes")
            .with_var("A", "a,b");

        let config = schema.resolve(&source).unwrap();
        assert_eq!(config.get_str("S"), Some("hello"));
        assert_eq!(config.get_i64("N"), Some(42));
        assert_eq!(config.get_f64("N"), Some(42.0));
        assert_eq!(config.get_f64("F"), Some(2.5));
        assert_eq!(config.get_bool("B"), Some(true));
        assert_eq!(config.get_array("A"), Some(&vec![json!("a"), json!("b")]));
        assert_eq!(config.get_str("MISSING"), None);
    }

    #[test]
    fn test_environment_enrichment() {
        let schema = EnvSchema::new().environment("APP_ENV", Schema::string());
        let source = MapSource::new().with_var("APP_ENV", "production");

        let config = schema.resolve(&source).unwrap();
        assert!(config.is_prod());
        assert!(!config.is_dev());
        assert!(!config.is_test());
        assert!(!config.is_staging());
        assert_eq!(config.get_str("environment"), Some("production"));
    }

    #[test]
    fn test_flags_default_false_without_environment_field() {
        let schema = EnvSchema::new().field("A", Schema::string());
        let config = schema
            .resolve(&MapSource::new().with_var("A", "1"))
            .unwrap();

        assert!(!config.is_prod());
        assert!(!config.contains("environment"));
    }

    #[test]
    fn test_to_json_preserves_order() {
        let schema = EnvSchema::new()
            .field("A", Schema::string())
            .field("B", Schema::number());
        let source = MapSource::new().with_var("A", "x").with_var("B", "1");

        let json = schema.resolve(&source).unwrap().to_json();
        assert_eq!(json, json!({"A": "x", "B": 1}));
    }

    #[test]
    fn test_schema_is_reusable_across_runs() {
        let schema = EnvSchema::new().field("A", Schema::number().min(0.0));
        let source = MapSource::new().with_var("A", "1");

        assert!(schema.resolve(&source).is_ok());
        source.set_var("A", "-5");
        assert!(schema.resolve(&source).is_err());
        source.set_var("A", "2");
        assert_eq!(schema.resolve(&source).unwrap().get_i64("A"), Some(2));
    }
}
