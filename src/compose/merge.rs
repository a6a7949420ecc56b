use std::collections::BTreeMap;

use toml::{Table, Value};

use super::error::ComposeError;
use super::fragment::Fragment;

/// How two values at the same key path are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// The later fragment's value replaces the earlier one.
    Overwrite,
    /// The later fragment's elements are appended to the earlier sequence.
    /// Only valid for arrays.
    Concatenate,
    /// Mappings are combined key by key, recursively. Degenerates to
    /// overwrite for non-table values.
    DeepMerge,
}

/// Per-path merge policy overrides.
///
/// Paths without an explicit rule fall back to the type-directed defaults:
/// tables deep-merge, arrays concatenate, scalars overwrite. An explicit
/// rule wins over the default, so a caller can for example force
/// `Overwrite` on `entry` to let a production overlay replace the entry
/// list instead of appending to it.
#[derive(Debug, Clone, Default)]
pub struct PolicySet {
    rules: BTreeMap<String, MergePolicy>,
}

impl PolicySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the policy for a dotted key path, replacing any previous rule
    /// for that path. Exactly one policy ever applies at a given path.
    pub fn set(&mut self, path: impl Into<String>, policy: MergePolicy) {
        self.rules.insert(path.into(), policy);
    }

    pub fn with(mut self, path: impl Into<String>, policy: MergePolicy) -> Self {
        self.set(path, policy);
        self
    }

    fn for_path(&self, path: &str) -> Option<MergePolicy> {
        self.rules.get(path).copied()
    }
}

/// Merges fragments left to right into one resolved tree.
///
/// Later fragments take precedence: a scalar conflict is won by the
/// rightmost fragment, tables deep-merge, and arrays accumulate in order
/// (no de-duplication). The input fragments are never modified, so the
/// same list merges to the same tree every time.
///
/// Combining an array with a non-array at one path is a
/// [`ComposeError::TypeMismatch`], never a silent coercion.
pub fn merge(fragments: &[&Fragment], policies: &PolicySet) -> Result<Table, ComposeError> {
    let mut resolved = Table::new();

    for fragment in fragments {
        apply(&mut resolved, fragment.tree(), "", policies)?;
    }

    Ok(resolved)
}

fn apply(
    base: &mut Table,
    overlay: &Table,
    prefix: &str,
    policies: &PolicySet,
) -> Result<(), ComposeError> {
    for (key, incoming) in overlay {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        match base.get_mut(key) {
            None => {
                base.insert(key.clone(), incoming.clone());
            }
            Some(existing) => combine(existing, incoming, &path, policies)?,
        }
    }

    Ok(())
}

fn combine(
    existing: &mut Value,
    incoming: &Value,
    path: &str,
    policies: &PolicySet,
) -> Result<(), ComposeError> {
    // Sequence/non-sequence clashes are schema errors under every policy.
    if existing.is_array() != incoming.is_array() {
        return Err(ComposeError::TypeMismatch {
            path: path.to_string(),
            expected: existing.type_str(),
            found: incoming.type_str(),
        });
    }

    let policy = policies
        .for_path(path)
        .unwrap_or_else(|| default_policy(existing, incoming));

    match policy {
        MergePolicy::Overwrite => {
            *existing = incoming.clone();
        }
        MergePolicy::Concatenate => match (&mut *existing, incoming) {
            (Value::Array(base), Value::Array(items)) => {
                base.extend(items.iter().cloned());
            }
            _ => {
                return Err(ComposeError::TypeMismatch {
                    path: path.to_string(),
                    expected: "array",
                    found: incoming.type_str(),
                });
            }
        },
        MergePolicy::DeepMerge => match (&mut *existing, incoming) {
            (Value::Table(base), Value::Table(overlay)) => {
                apply(base, overlay, path, policies)?;
            }
            _ => {
                *existing = incoming.clone();
            }
        },
    }

    Ok(())
}

fn default_policy(existing: &Value, incoming: &Value) -> MergePolicy {
    match (existing, incoming) {
        (Value::Table(_), Value::Table(_)) => MergePolicy::DeepMerge,
        (Value::Array(_), Value::Array(_)) => MergePolicy::Concatenate,
        _ => MergePolicy::Overwrite,
    }
}
