//! Environment-variable overlay fragments.
//!
//! Variables are handed in as explicit `(key, value)` pairs rather than
//! read from ambient process state inside the engine; the
//! [`EnvOverlay::from_process_env`] convenience captures `std::env::vars()`
//! once, at the edge.

use toml::{Table, Value};

use super::fragment::{set_at_path, Fragment};

/// Builds an overlay fragment from prefixed environment variables.
///
/// A variable `PREFIX<sep>A<sep>B=v` becomes the config path `a.b` with
/// value `v`, coerced to the most specific scalar type (boolean, integer,
/// float, then string).
#[derive(Debug, Clone)]
pub struct EnvOverlay {
    prefix: String,
    separator: String,
}

impl EnvOverlay {
    /// Panics if `separator` is empty; splitting on an empty separator is
    /// a programming error.
    pub fn new(prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        let separator = separator.into();
        assert!(!separator.is_empty(), "separator must not be empty");
        Self {
            prefix: prefix.into(),
            separator,
        }
    }

    /// Builds a fragment named `name` from the given variable pairs.
    /// Pairs that don't carry the prefix are ignored.
    pub fn fragment_from_vars<I>(&self, name: &str, vars: I) -> Fragment
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let prefix_with_sep = format!("{}{}", self.prefix, self.separator);
        let mut tree = Table::new();

        for (key, value) in vars {
            let Some(path_str) = key.strip_prefix(&prefix_with_sep) else {
                continue;
            };
            if path_str.is_empty() {
                continue;
            }

            let path: Vec<String> = path_str
                .split(&self.separator)
                .map(str::to_lowercase)
                .collect();
            set_at_path(&mut tree, &path, coerce_scalar(&value));
        }

        Fragment::new(name, tree)
    }

    /// Captures the current process environment and builds a fragment
    /// from it.
    pub fn from_process_env(&self, name: &str) -> Fragment {
        self.fragment_from_vars(name, std::env::vars())
    }
}

fn coerce_scalar(s: &str) -> Value {
    if s.eq_ignore_ascii_case("true") {
        return Value::Boolean(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Boolean(false);
    }

    if looks_like_integer(s) {
        if let Ok(i) = s.parse::<i64>() {
            return Value::Integer(i);
        }
    }

    if s.contains('.') {
        if let Ok(f) = s.parse::<f64>() {
            return Value::Float(f);
        }
    }

    Value::String(s.to_string())
}

fn looks_like_integer(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn prefixed_vars_become_nested_paths() {
        let overlay = EnvOverlay::new("STRATA", "__");
        let fragment = overlay.fragment_from_vars(
            "env",
            vars(&[
                ("STRATA__DEV_SERVER__PORT", "9000"),
                ("STRATA__OUTPUT__FILENAME", "[name].js"),
                ("OTHER__IGNORED", "yes"),
            ]),
        );

        assert_eq!(
            fragment.get("dev_server.port").unwrap().as_integer(),
            Some(9000)
        );
        assert_eq!(
            fragment.get("output.filename").unwrap().as_str(),
            Some("[name].js")
        );
        assert!(fragment.get("other.ignored").is_none());
    }

    #[test]
    fn values_coerce_to_most_specific_type() {
        assert_eq!(coerce_scalar("true"), Value::Boolean(true));
        assert_eq!(coerce_scalar("FALSE"), Value::Boolean(false));
        assert_eq!(coerce_scalar("-42"), Value::Integer(-42));
        assert_eq!(coerce_scalar("9.5"), Value::Float(9.5));
        assert_eq!(coerce_scalar("9000x"), Value::String("9000x".into()));
        assert_eq!(coerce_scalar(""), Value::String(String::new()));
    }

    #[test]
    fn bare_prefix_is_ignored() {
        let overlay = EnvOverlay::new("STRATA", "__");
        let fragment = overlay.fragment_from_vars("env", vars(&[("STRATA__", "x")]));
        assert!(fragment.tree().is_empty());
    }

    #[test]
    #[should_panic(expected = "separator must not be empty")]
    fn empty_separator_is_rejected() {
        let _ = EnvOverlay::new("STRATA", "");
    }
}
