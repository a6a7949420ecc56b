//! Layered configuration composition.
//!
//! A [`Composer`] merges an ordered list of [`Fragment`]s — defaults, one
//! environment overlay picked by an [`EnvSelector`], then caller overlays —
//! into a single validated [`ResolvedConfig`].

mod composer;
mod env;
mod error;
mod file;
mod fragment;
mod interp;
mod merge;
mod resolved;
mod select;
mod validate;

pub use composer::Composer;
pub use env::EnvOverlay;
pub use error::{ComposeError, ErrorKind};
pub use file::FileFragment;
pub use fragment::Fragment;
pub use merge::{merge, MergePolicy, PolicySet};
pub use resolved::ResolvedConfig;
pub use select::{EnvSelector, Environment};
pub use validate::validate;
