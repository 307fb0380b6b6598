//! Environment-name enrichment.
//!
//! When a schema designates one field as the environment name, the resolved
//! configuration is enriched with convenience flags derived from it:
//! `is_prod`, `is_dev`, `is_test` and `is_staging`, each true only when the
//! name equals the corresponding canonical value, plus an `environment` key
//! carrying the name itself.

use indexmap::IndexMap;
use serde_json::Value;

const FLAGS: [(&str, &str); 4] = [
    ("is_prod", "production"),
    ("is_dev", "development"),
    ("is_test", "test"),
    ("is_staging", "staging"),
];

/// Inserts the derived flags and the `environment` pass-through key.
///
/// `name` is the resolved value of the designated field; a non-string value
/// (possible if the designated field was declared with a non-string schema)
/// yields all-false flags.
pub(crate) fn enrich(values: &mut IndexMap<String, Value>, name: &Value) {
    let name_str = name.as_str().unwrap_or("");
    for (flag, canonical) in FLAGS {
        values.insert(flag.to_string(), Value::Bool(name_str == canonical));
    }
    values.insert("environment".to_string(), name.clone());
}
