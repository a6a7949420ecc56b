//! File-backed fragments.
//!
//! Loading happens when [`FileFragment::load`] is called, before any
//! composition starts; the merge itself never touches the filesystem.

use std::path::{Path, PathBuf};

use super::error::ComposeError;
use super::fragment::Fragment;

/// Describes a TOML file to load one named fragment from.
///
/// Required files that don't exist fail the load; optional files that
/// don't exist yield no fragment and the layer is simply skipped.
#[derive(Debug, Clone)]
pub struct FileFragment {
    name: String,
    path: PathBuf,
    required: bool,
}

impl FileFragment {
    pub fn new(name: impl Into<String>, path: impl AsRef<Path>, required: bool) -> Self {
        Self {
            name: name.into(),
            path: path.as_ref().to_path_buf(),
            required,
        }
    }

    /// Reads and parses the file into a [`Fragment`].
    ///
    /// Returns `Ok(None)` when the file is optional and missing.
    pub fn load(&self) -> Result<Option<Fragment>, ComposeError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let tree = toml::from_str(&contents).map_err(|e| ComposeError::Parse {
                    path: self.path.clone(),
                    source: e,
                })?;
                Ok(Some(Fragment::new(self.name.clone(), tree)))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if self.required {
                    Err(ComposeError::FileNotFound(self.path.clone()))
                } else {
                    Ok(None)
                }
            }
            Err(e) => Err(ComposeError::Read {
                path: self.path.clone(),
                source: e,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn loads_a_named_fragment() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[output]\nfilename = \"[name].js\"").unwrap();

        let fragment = FileFragment::new("default", file.path(), true)
            .load()
            .unwrap()
            .unwrap();

        assert_eq!(fragment.name(), "default");
        assert_eq!(
            fragment.get("output.filename").unwrap().as_str(),
            Some("[name].js")
        );
    }

    #[test]
    fn required_missing_file_fails() {
        let result = FileFragment::new("default", "/nonexistent/strata.toml", true).load();
        assert!(matches!(result, Err(ComposeError::FileNotFound(_))));
    }

    #[test]
    fn optional_missing_file_is_skipped() {
        let loaded = FileFragment::new("local", "/nonexistent/strata.toml", false)
            .load()
            .unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn parse_failure_names_the_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not toml [[[").unwrap();

        let err = FileFragment::new("default", file.path(), true)
            .load()
            .unwrap_err();
        assert!(matches!(err, ComposeError::Parse { .. }));
    }
}
