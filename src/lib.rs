pub mod compose;

pub use compose::{
    ComposeError, Composer, EnvSelector, Environment, ErrorKind, Fragment, MergePolicy, PolicySet,
    ResolvedConfig,
};
