//! String schema factory.
//!
//! This module provides [`StringSchema`] with length bounds, membership,
//! regex patterns, URL parsing and structural email validation.

use std::sync::Arc;

use regex::Regex;
use serde_json::Value;
use url::Url;

use super::def::{AsyncValidator, SchemaDef, TypeTag, Violation};
use super::value_type_name;

/// A schema for string-valued variables.
///
/// The base validator rejects non-string input; every refinement appends
/// exactly one validator (plus, for `email`, one transformer) and returns a
/// new schema, leaving the original untouched.
///
/// # Example
///
/// ```rust
/// use envschema::{EnvSchema, MapSource, Schema};
///
/// let schema = EnvSchema::new().field(
///     "LOG_LEVEL",
///     Schema::string().one_of(["debug", "info", "warn", "error"]),
/// );
///
/// let source = MapSource::new().with_var("LOG_LEVEL", "info");
/// let config = schema.resolve(&source).unwrap();
/// assert_eq!(config.get_str("LOG_LEVEL"), Some("info"));
/// ```
#[derive(Clone)]
pub struct StringSchema {
    def: SchemaDef,
}

impl StringSchema {
    pub(crate) fn new() -> Self {
        let def = SchemaDef::new(TypeTag::String).push_validator(Arc::new(|value| {
            if value.is_string() {
                None
            } else {
                Some(
                    Violation::new("must be a string")
                        .with_code("invalid_type")
                        .with_expected("string")
                        .with_got(value_type_name(value)),
                )
            }
        }));
        Self { def }
    }

    /// Requires at least `min` characters (Unicode scalar values).
    ///
    /// The message reports the violated bound and the actual length.
    pub fn min(mut self, min: usize) -> Self {
        self.def = self.def.push_validator(Arc::new(move |value| {
            let s = value.as_str()?;
            let len = s.chars().count();
            if len < min {
                Some(
                    Violation::new(format!("length must be at least {}, got {}", min, len))
                        .with_code("min_length")
                        .with_expected(format!("at least {} characters", min))
                        .with_got(format!("{} characters", len)),
                )
            } else {
                None
            }
        }));
        self
    }

    /// Requires at most `max` characters (Unicode scalar values).
    pub fn max(mut self, max: usize) -> Self {
        self.def = self.def.push_validator(Arc::new(move |value| {
            let s = value.as_str()?;
            let len = s.chars().count();
            if len > max {
                Some(
                    Violation::new(format!("length must be at most {}, got {}", max, len))
                        .with_code("max_length")
                        .with_expected(format!("at most {} characters", max))
                        .with_got(format!("{} characters", len)),
                )
            } else {
                None
            }
        }));
        self
    }

    /// Requires the value to be one of `values`.
    ///
    /// The message lists every allowed value in declaration order.
    pub fn one_of<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed: Vec<String> = values.into_iter().map(Into::into).collect();
        self.def = self.def.push_validator(Arc::new(move |value| {
            let s = value.as_str()?;
            if allowed.iter().any(|a| a == s) {
                None
            } else {
                Some(
                    Violation::new(format!("must be one of: {}", allowed.join(", ")))
                        .with_code("one_of")
                        .with_expected(format!("one of: {}", allowed.join(", ")))
                        .with_got(s.to_string()),
                )
            }
        }));
        self
    }

    /// Requires the value to match `pattern`.
    ///
    /// Returns an error if the regex pattern itself is invalid.
    pub fn pattern(mut self, pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(pattern)?;
        let pattern_str = pattern.to_string();
        self.def = self.def.push_validator(Arc::new(move |value| {
            let s = value.as_str()?;
            if regex.is_match(s) {
                None
            } else {
                Some(
                    Violation::new(format!("must match pattern '{}'", pattern_str))
                        .with_code("pattern")
                        .with_expected(format!("string matching '{}'", pattern_str))
                        .with_got(s.to_string()),
                )
            }
        }));
        Ok(self)
    }

    /// Requires the value to parse as a well-formed absolute URL.
    pub fn url(mut self) -> Self {
        self.def = self.def.push_validator(Arc::new(|value| {
            let s = value.as_str()?;
            if Url::parse(s).is_ok() {
                None
            } else {
                Some(
                    Violation::new("must be a valid absolute URL")
                        .with_code("url")
                        .with_expected("absolute URL")
                        .with_got(s.to_string()),
                )
            }
        }));
        self
    }

    /// Requires the value to be a structurally valid email address.
    ///
    /// Appends one transformer and one validator. The transformer rewrites
    /// non-ASCII domain labels of structurally valid addresses into their
    /// ASCII-compatible (punycode) form; invalid addresses pass through
    /// unchanged so the validator can report them. The validator enforces:
    /// non-empty, at most 254 characters, exactly one `@`, a local part of
    /// at most 64 characters following quoted-string or dot-atom rules, and
    /// a domain that is either a bracketed IPv4/IPv6 literal or a dotted
    /// label sequence with a valid top-level label.
    pub fn email(mut self) -> Self {
        self.def = self
            .def
            .push_transformer(Arc::new(|value| Ok(normalize_email(value))))
            .push_validator(Arc::new(|value| {
                let s = value.as_str()?;
                email_violation(s)
            }));
        self
    }

    /// Marks the field as optional: an absent raw value resolves to an
    /// absent typed value instead of a missing-value failure.
    pub fn optional(mut self) -> Self {
        self.def = self.def.set_optional();
        self
    }

    /// Sets a default substituted for an absent raw value.
    ///
    /// Defaults bypass both transformation and validation.
    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.def = self.def.set_default(Value::String(value.into()));
        self
    }

    /// Declares an async validator.
    ///
    /// Declared only: the synchronous pipeline never invokes it. See
    /// [`AsyncValidator`].
    pub fn async_validator(mut self, validator: impl AsyncValidator + 'static) -> Self {
        self.def = self.def.push_async_validator(Arc::new(validator));
        self
    }
}

impl From<StringSchema> for SchemaDef {
    fn from(schema: StringSchema) -> Self {
        schema.def
    }
}

// Specials allowed in an unquoted local-part atom, per RFC 5322 atext.
const ATOM_SPECIALS: &str = "!#$%&'*+/=?^_`{|}~-";

fn is_atom_char(c: char) -> bool {
    c.is_alphanumeric() || ATOM_SPECIALS.contains(c)
}

fn email_violation(s: &str) -> Option<Violation> {
    let fail = |message: String| {
        Some(
            Violation::new(message)
                .with_code("email")
                .with_got(s.to_string()),
        )
    };

    if s.is_empty() {
        return fail("email must not be empty".to_string());
    }
    if s.chars().count() > 254 {
        return fail("email must be at most 254 characters".to_string());
    }
    let (local, domain) = match s.split_once('@') {
        Some((local, domain)) if !domain.contains('@') => (local, domain),
        _ => return fail("email must contain exactly one `@`".to_string()),
    };

    if local.is_empty() {
        return fail("email local part must not be empty".to_string());
    }
    if local.chars().count() > 64 {
        return fail("email local part must be at most 64 characters".to_string());
    }
    if !valid_local_part(local) {
        return fail("email local part is malformed".to_string());
    }

    domain_violation(domain).and_then(fail)
}

fn valid_local_part(local: &str) -> bool {
    if local.len() >= 2 && local.starts_with('"') && local.ends_with('"') {
        // Quoted string: backslash escapes the next character; unescaped
        // quotes, backslashes and control characters are not allowed inside.
        let mut escaped = false;
        for c in local[1..local.len() - 1].chars() {
            if escaped {
                escaped = false;
                continue;
            }
            match c {
                '\\' => escaped = true,
                '"' => return false,
                c if (c as u32) < 0x20 => return false,
                _ => {}
            }
        }
        !escaped
    } else {
        // Dot-atom: non-empty atoms separated by single dots.
        if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
            return false;
        }
        local
            .split('.')
            .all(|atom| !atom.is_empty() && atom.chars().all(is_atom_char))
    }
}

fn domain_violation(domain: &str) -> Option<String> {
    if domain.is_empty() {
        return Some("email domain must not be empty".to_string());
    }

    if domain.starts_with('[') {
        if !domain.ends_with(']') || domain.len() < 3 {
            return Some("email domain literal must be bracketed".to_string());
        }
        let inner = &domain[1..domain.len() - 1];
        let ok = match inner.strip_prefix("IPv6:") {
            Some(v6) => v6.parse::<std::net::Ipv6Addr>().is_ok(),
            None => inner.parse::<std::net::Ipv4Addr>().is_ok(),
        };
        return if ok {
            None
        } else {
            Some("email domain literal must be a valid IPv4 or IPv6 address".to_string())
        };
    }

    if domain.starts_with('.') || domain.ends_with('.') || domain.contains("..") {
        return Some("email domain has an empty label".to_string());
    }

    let labels: Vec<&str> = domain.split('.').collect();
    for label in &labels {
        if label.chars().count() > 63 {
            return Some("email domain label exceeds 63 characters".to_string());
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Some("email domain label must not start or end with a hyphen".to_string());
        }
        if !label.chars().all(|c| c.is_alphanumeric() || c == '-') {
            return Some("email domain label contains an invalid character".to_string());
        }
    }

    match labels.last() {
        Some(tld) if tld.chars().count() >= 2 && !tld.chars().all(|c| c.is_ascii_digit()) => None,
        _ => Some("email domain has an invalid top-level label".to_string()),
    }
}

/// Rewrites a structurally valid address with a non-ASCII domain into its
/// ASCII-compatible form. Everything else passes through unchanged.
fn normalize_email(value: Value) -> Value {
    let Value::String(s) = &value else {
        return value;
    };
    if email_violation(s).is_some() {
        return value;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return value;
    };
    if domain.starts_with('[') || domain.is_ascii() {
        return value;
    }
    // The url crate applies IDNA mapping to the host.
    if let Ok(parsed) = Url::parse(&format!("https://{domain}")) {
        if let Some(host) = parsed.host_str() {
            return Value::String(format!("{local}@{host}"));
        }
    }
    value
}
