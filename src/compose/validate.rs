use toml::{Table, Value};

use super::error::ComposeError;
use super::fragment::lookup;

/// File-path templates that, when present, must be non-empty strings.
const TEMPLATE_PATHS: &[&str] = &["output.filename", "output.path", "output.public_path"];

/// Plugin pairs that must never coexist in one resolved config. Hot
/// reloading patches modules in place; minification assumes a frozen
/// bundle.
const EXCLUSIVE_PLUGINS: &[(&str, &str)] = &[("hot-reload", "minify")];

/// Checks a fully merged tree against the external tool's baseline schema.
///
/// Runs after merging and interpolation; a failure aborts the resolution,
/// so callers never see a partially valid config.
pub fn validate(tree: &Table) -> Result<(), ComposeError> {
    check_entry(tree)?;
    check_output(tree)?;
    check_module_rules(tree)?;
    check_templates(tree)?;
    check_plugin_conflicts(tree)?;
    Ok(())
}

fn missing(path: &str) -> ComposeError {
    ComposeError::MissingSection {
        path: path.to_string(),
    }
}

fn wrong_type(path: &str, expected: &'static str, found: &Value) -> ComposeError {
    ComposeError::TypeMismatch {
        path: path.to_string(),
        expected,
        found: found.type_str(),
    }
}

/// Entry points: a non-empty array with no duplicate targets. Every entry
/// maps through the output filename template to one emitted file, so a
/// repeated entry would emit the same target twice.
fn check_entry(tree: &Table) -> Result<(), ComposeError> {
    let entry = tree.get("entry").ok_or_else(|| missing("entry"))?;
    let items = entry
        .as_array()
        .ok_or_else(|| wrong_type("entry", "array", entry))?;

    if items.is_empty() {
        return Err(missing("entry"));
    }

    let mut seen = Vec::with_capacity(items.len());
    for item in items {
        if let Some(target) = item.as_str() {
            if seen.contains(&target) {
                return Err(ComposeError::DuplicateTarget {
                    path: "entry".to_string(),
                    target: target.to_string(),
                });
            }
            seen.push(target);
        }
    }

    Ok(())
}

fn check_output(tree: &Table) -> Result<(), ComposeError> {
    let output = tree.get("output").ok_or_else(|| missing("output"))?;
    let output = output
        .as_table()
        .ok_or_else(|| wrong_type("output", "table", output))?;

    if !output.contains_key("filename") {
        return Err(missing("output.filename"));
    }

    Ok(())
}

fn check_module_rules(tree: &Table) -> Result<(), ComposeError> {
    let module = tree.get("module").ok_or_else(|| missing("module"))?;
    let module = module
        .as_table()
        .ok_or_else(|| wrong_type("module", "table", module))?;

    let rules = module.get("rules").ok_or_else(|| missing("module.rules"))?;
    rules
        .as_array()
        .ok_or_else(|| wrong_type("module.rules", "array", rules))?;

    Ok(())
}

fn check_templates(tree: &Table) -> Result<(), ComposeError> {
    for path in TEMPLATE_PATHS {
        let Some(value) = lookup(tree, path) else {
            continue;
        };
        let template = value
            .as_str()
            .ok_or_else(|| wrong_type(path, "string", value))?;
        if template.is_empty() {
            return Err(ComposeError::EmptyTemplate {
                path: path.to_string(),
            });
        }
    }

    Ok(())
}

fn check_plugin_conflicts(tree: &Table) -> Result<(), ComposeError> {
    let Some(plugins) = tree.get("plugins") else {
        return Ok(());
    };
    let plugins = plugins
        .as_array()
        .ok_or_else(|| wrong_type("plugins", "array", plugins))?;

    let names: Vec<&str> = plugins.iter().filter_map(plugin_name).collect();

    for (left, right) in EXCLUSIVE_PLUGINS {
        if names.contains(left) && names.contains(right) {
            return Err(ComposeError::ConflictingOptions {
                path: "plugins".to_string(),
                left: (*left).to_string(),
                right: (*right).to_string(),
            });
        }
    }

    Ok(())
}

/// A plugin entry is either a bare name or a table with a `name` key and
/// further options.
fn plugin_name(entry: &Value) -> Option<&str> {
    match entry {
        Value::String(name) => Some(name),
        Value::Table(table) => table.get("name").and_then(Value::as_str),
        _ => None,
    }
}
