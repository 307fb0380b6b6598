//! Where raw variable values come from.
//!
//! [`EnvSource`] abstracts the lookup so the same schema can resolve against
//! the real process environment in production and an in-memory map in tests.

use std::collections::HashMap;
use std::env;

use parking_lot::RwLock;

/// A provider of raw (string) variable values.
pub trait EnvSource {
    /// Looks up the raw value for `key`.
    ///
    /// `Ok(None)` means the variable is absent. `Err` means the source could
    /// not produce a string for a variable that exists (e.g. a non-unicode
    /// value in the process environment); the orchestrator surfaces it as an
    /// unexpected failure rather than treating the variable as absent.
    fn get(&self, key: &str) -> Result<Option<String>, String>;
}

/// The real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl ProcessEnv {
    pub fn new() -> Self {
        Self
    }
}

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Result<Option<String>, String> {
        match env::var(key) {
            Ok(value) => Ok(Some(value)),
            Err(env::VarError::NotPresent) => Ok(None),
            Err(env::VarError::NotUnicode(_)) => {
                Err(format!("value of `{}` is not valid unicode", key))
            }
        }
    }
}

/// An in-memory source for tests and programmatic configuration.
///
/// Interior mutability lets a test mutate the source between resolution
/// runs while the schema keeps borrowing it immutably.
///
/// # Example
///
/// ```rust
/// use envschema::{EnvSchema, MapSource, Schema};
///
/// let schema = EnvSchema::new().field("APP_NAME", Schema::string().min(1));
/// let source = MapSource::new().with_var("APP_NAME", "svc");
///
/// assert!(schema.resolve(&source).is_ok());
///
/// source.remove_var("APP_NAME");
/// assert!(schema.resolve(&source).is_err());
/// ```
#[derive(Debug, Default)]
pub struct MapSource {
    vars: RwLock<HashMap<String, String>>,
}

impl MapSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a variable and returns self, for building a source inline.
    pub fn with_var(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.write().insert(key.into(), value.into());
        self
    }

    /// Sets a variable on an existing source.
    pub fn set_var(&self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.write().insert(key.into(), value.into());
    }

    /// Removes a variable.
    pub fn remove_var(&self, key: &str) {
        self.vars.write().remove(key);
    }
}

impl EnvSource for MapSource {
    fn get(&self, key: &str) -> Result<Option<String>, String> {
        Ok(self.vars.read().get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_source_lookup() {
        let source = MapSource::new().with_var("A", "1").with_var("B", "2");
        assert_eq!(source.get("A"), Ok(Some("1".to_string())));
        assert_eq!(source.get("MISSING"), Ok(None));
    }

    #[test]
    fn test_map_source_mutation() {
        let source = MapSource::new().with_var("A", "1");
        source.set_var("A", "2");
        assert_eq!(source.get("A"), Ok(Some("2".to_string())));

        source.remove_var("A");
        assert_eq!(source.get("A"), Ok(None));
    }

    #[test]
    fn test_process_env_absent_key() {
        let source = ProcessEnv::new();
        assert_eq!(source.get("ENVSCHEMA_DEFINITELY_UNSET_VAR"), Ok(None));
    }
}
