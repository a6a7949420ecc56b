use serde::de::DeserializeOwned;
use toml::{Table, Value};

use super::error::ComposeError;
use super::fragment::lookup;

/// The single merged, interpolated, and validated configuration tree.
///
/// Read-only: the composing [`Composer`](super::Composer) is the only
/// writer, so two resolutions never share mutable state. Hand
/// [`into_table`](Self::into_table) (or a typed view) to the external
/// build tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    tree: Table,
}

impl ResolvedConfig {
    pub(crate) fn new(tree: Table) -> Self {
        Self { tree }
    }

    pub fn tree(&self) -> &Table {
        &self.tree
    }

    /// Looks up a value by dotted path, e.g. `"dev_server.port"`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        lookup(&self.tree, path)
    }

    /// Deserializes the tree into a caller-defined type.
    pub fn try_deserialize<T: DeserializeOwned>(&self) -> Result<T, ComposeError> {
        Value::Table(self.tree.clone())
            .try_into()
            .map_err(ComposeError::Deserialize)
    }

    pub fn into_table(self) -> Table {
        self.tree
    }
}
