//! `${path.to.field}` placeholder expansion on the merged tree.
//!
//! Runs once, after merging and before validation, so references see the
//! final layered values. `$$` escapes a literal `$`. Square-bracket tokens
//! such as `[name]` or `[hash]` belong to the external build tool and pass
//! through untouched.

use toml::{Table, Value};

use super::error::ComposeError;
use super::fragment::lookup;

/// Expands every placeholder in the tree, in place.
///
/// References are resolved against a snapshot of the unexpanded tree;
/// chained references expand recursively, and a reference chain that
/// revisits a path fails with [`ComposeError::CircularReference`].
pub(crate) fn expand(tree: &mut Table) -> Result<(), ComposeError> {
    let snapshot = tree.clone();
    expand_table(tree, &snapshot, "")
}

fn expand_table(table: &mut Table, root: &Table, prefix: &str) -> Result<(), ComposeError> {
    for (key, value) in table.iter_mut() {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        expand_value(value, root, &path)?;
    }
    Ok(())
}

fn expand_value(value: &mut Value, root: &Table, path: &str) -> Result<(), ComposeError> {
    match value {
        Value::String(text) => {
            let mut chain = Vec::new();
            *text = expand_str(text, root, path, &mut chain)?;
        }
        Value::Table(nested) => expand_table(nested, root, path)?,
        Value::Array(items) => {
            for item in items.iter_mut() {
                expand_value(item, root, path)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn expand_str(
    input: &str,
    root: &Table,
    at: &str,
    chain: &mut Vec<String>,
) -> Result<String, ComposeError> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            out.push(ch);
            continue;
        }
        match chars.peek() {
            Some('$') => {
                chars.next();
                out.push('$');
            }
            Some('{') => {
                chars.next();
                let mut reference = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    reference.push(c);
                }
                if !closed {
                    return Err(ComposeError::UnclosedReference {
                        path: at.to_string(),
                    });
                }
                out.push_str(&dereference(&reference, root, chain)?);
            }
            // A lone `$` is just a dollar sign.
            _ => out.push('$'),
        }
    }

    Ok(out)
}

/// Resolves one reference to its scalar text, expanding any placeholders
/// the referenced string itself contains. `chain` holds the references
/// currently being expanded; revisiting one means a cycle.
fn dereference(
    reference: &str,
    root: &Table,
    chain: &mut Vec<String>,
) -> Result<String, ComposeError> {
    if chain.iter().any(|seen| seen == reference) {
        return Err(ComposeError::CircularReference {
            path: reference.to_string(),
        });
    }

    let value = lookup(root, reference).ok_or_else(|| ComposeError::UnresolvedReference {
        path: reference.to_string(),
    })?;

    match value {
        Value::String(text) => {
            chain.push(reference.to_string());
            let expanded = expand_str(text, root, reference, chain)?;
            chain.pop();
            Ok(expanded)
        }
        Value::Integer(n) => Ok(n.to_string()),
        Value::Float(n) => Ok(n.to_string()),
        Value::Boolean(b) => Ok(b.to_string()),
        Value::Datetime(dt) => Ok(dt.to_string()),
        Value::Array(_) | Value::Table(_) => Err(ComposeError::NonScalarReference {
            path: reference.to_string(),
        }),
    }
}
