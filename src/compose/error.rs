use std::path::PathBuf;
use thiserror::Error;

/// Broad category of a [`ComposeError`], for callers that branch on class
/// rather than variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required section, template, or reference is missing or malformed.
    Schema,
    /// Two options that cannot coexist ended up in the same resolved config.
    Conflict,
    /// A merge tried to combine incompatible value shapes at one path.
    TypeMismatch,
    /// A fragment source failed to load (I/O or parse).
    Source,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ComposeError {
    #[error("missing required section '{path}'")]
    MissingSection { path: String },

    #[error("file-path template at '{path}' must be a non-empty string")]
    EmptyTemplate { path: String },

    #[error("duplicate output target '{target}' at '{path}'")]
    DuplicateTarget { path: String, target: String },

    #[error("'{left}' and '{right}' cannot both be enabled (at '{path}')")]
    ConflictingOptions {
        path: String,
        left: String,
        right: String,
    },

    #[error("cannot merge {found} into {expected} at '{path}'")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("unresolved reference '${{{path}}}'")]
    UnresolvedReference { path: String },

    #[error("reference '${{{path}}}' points at a non-scalar value")]
    NonScalarReference { path: String },

    #[error("unclosed reference (missing '}}') in value at '{path}'")]
    UnclosedReference { path: String },

    #[error("circular reference through '${{{path}}}'")]
    CircularReference { path: String },

    #[error("required fragment file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read fragment file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse fragment file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to deserialize resolved config: {0}")]
    Deserialize(#[from] toml::de::Error),
}

impl ComposeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingSection { .. }
            | Self::EmptyTemplate { .. }
            | Self::UnresolvedReference { .. }
            | Self::NonScalarReference { .. }
            | Self::UnclosedReference { .. }
            | Self::CircularReference { .. } => ErrorKind::Schema,
            Self::DuplicateTarget { .. } | Self::ConflictingOptions { .. } => ErrorKind::Conflict,
            Self::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Self::FileNotFound(_) | Self::Read { .. } | Self::Parse { .. } | Self::Deserialize(_) => {
                ErrorKind::Source
            }
        }
    }

    /// The dotted key path the error refers to, when it refers to one.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::MissingSection { path }
            | Self::EmptyTemplate { path }
            | Self::DuplicateTarget { path, .. }
            | Self::ConflictingOptions { path, .. }
            | Self::TypeMismatch { path, .. }
            | Self::UnresolvedReference { path }
            | Self::NonScalarReference { path }
            | Self::UnclosedReference { path }
            | Self::CircularReference { path } => Some(path),
            _ => None,
        }
    }
}
