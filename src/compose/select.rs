use super::fragment::Fragment;

/// A known deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Prod,
}

impl Environment {
    /// Maps a runtime-supplied tag to an environment.
    ///
    /// Only `"prod"` selects [`Environment::Prod`]; every other tag,
    /// including the empty string, selects [`Environment::Dev`]. Unknown
    /// tags are deliberately not an error: callers that pass no tag or a
    /// misspelled one get a development build, matching the permissive
    /// defaulting the composition pattern relies on.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "prod" => Self::Prod,
            _ => Self::Dev,
        }
    }
}

/// Maps an environment tag to its overlay fragment.
#[derive(Debug, Clone)]
pub struct EnvSelector {
    dev: Fragment,
    prod: Fragment,
}

impl EnvSelector {
    pub fn new(dev: Fragment, prod: Fragment) -> Self {
        Self { dev, prod }
    }

    /// Returns the overlay fragment for `tag`, falling back to the dev
    /// fragment for anything unrecognized (see [`Environment::from_tag`]).
    pub fn select(&self, tag: &str) -> &Fragment {
        match Environment::from_tag(tag) {
            Environment::Dev => &self.dev,
            Environment::Prod => &self.prod,
        }
    }
}
