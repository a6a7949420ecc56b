use toml::{Table, Value};

/// One named, immutable configuration overlay.
///
/// A fragment is a key/value tree whose leaves are TOML scalars, with
/// arrays for ordered sequences and tables for nested mappings. Once
/// constructed it only hands out shared references; composition never
/// mutates its inputs.
#[derive(Debug, Clone)]
pub struct Fragment {
    name: String,
    tree: Table,
}

impl Fragment {
    /// Creates a fragment from an already-built table.
    ///
    /// Panics if `name` is empty; a nameless fragment is a programming
    /// error, not a recoverable condition.
    pub fn new(name: impl Into<String>, tree: Table) -> Self {
        let name = name.into();
        assert!(!name.is_empty(), "fragment name must not be empty");
        Self { name, tree }
    }

    /// Creates a fragment with an empty tree. Useful for environments that
    /// contribute no overrides.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Table::new())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tree(&self) -> &Table {
        &self.tree
    }

    /// Looks up a value by dotted path, e.g. `"output.filename"`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        lookup(&self.tree, path)
    }
}

/// Dotted-path lookup into a table. Returns `None` for empty paths, empty
/// segments, or paths that traverse a non-table.
pub(crate) fn lookup<'a>(table: &'a Table, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next().filter(|s| !s.is_empty())?;
    let mut current = table.get(first)?;

    for segment in segments {
        if segment.is_empty() {
            return None;
        }
        current = current.as_table()?.get(segment)?;
    }

    Some(current)
}

/// Inserts `value` at a dotted path, creating intermediate tables as
/// needed. Existing non-table values along the way are displaced.
pub(crate) fn set_at_path(table: &mut Table, path: &[String], value: Value) {
    let Some((first, rest)) = path.split_first() else {
        return;
    };

    if rest.is_empty() {
        table.insert(first.clone(), value);
        return;
    }

    if !matches!(table.get(first), Some(Value::Table(_))) {
        table.insert(first.clone(), Value::Table(Table::new()));
    }

    if let Some(Value::Table(nested)) = table.get_mut(first) {
        set_at_path(nested, rest, value);
    }
}
