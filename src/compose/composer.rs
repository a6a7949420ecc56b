use super::error::ComposeError;
use super::fragment::Fragment;
use super::interp;
use super::merge::{merge, MergePolicy, PolicySet};
use super::resolved::ResolvedConfig;
use super::select::EnvSelector;
use super::validate::validate;

/// Composes layered configuration fragments into a [`ResolvedConfig`].
///
/// Layers are applied in a fixed order: the defaults fragment, then the
/// environment overlay picked for the supplied tag, then caller overlays
/// in registration order. Later layers take precedence on scalar
/// conflicts; sequences accumulate across layers (see
/// [`merge`](super::merge())).
///
/// [`resolve`](Self::resolve) borrows the composer, so one composer can
/// serve any number of resolutions; each is a pure function of the
/// fragments and the tag.
///
/// ## Example
///
/// ```
/// use strata::{Composer, EnvSelector, Fragment};
///
/// fn fragment(name: &str, text: &str) -> Fragment {
///     Fragment::new(name, toml::from_str(text).unwrap())
/// }
///
/// let defaults = fragment(
///     "default",
///     r#"
///     entry = ["src/index.js"]
///     plugins = ["html"]
///     [output]
///     filename = "[name].js"
///     [module]
///     rules = [{ test = "\\.js$", loader = "babel" }]
///     "#,
/// );
/// let dev = fragment("dev", r#"plugins = ["hot-reload"]"#);
/// let prod = fragment(
///     "prod",
///     r#"
///     plugins = ["minify"]
///     [output]
///     filename = "[name]-[hash].js"
///     "#,
/// );
///
/// let composer = Composer::new(defaults, EnvSelector::new(dev, prod));
/// let config = composer.resolve("prod")?;
///
/// assert_eq!(
///     config.get("output.filename").unwrap().as_str(),
///     Some("[name]-[hash].js"),
/// );
/// # Ok::<(), strata::ComposeError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Composer {
    defaults: Fragment,
    selector: EnvSelector,
    overlays: Vec<Fragment>,
    policies: PolicySet,
}

impl Composer {
    pub fn new(defaults: Fragment, selector: EnvSelector) -> Self {
        Self {
            defaults,
            selector,
            overlays: Vec::new(),
            policies: PolicySet::new(),
        }
    }

    /// Adds a caller overlay. Overlays apply after the environment layer,
    /// in the order they were added.
    #[must_use = "overlays do nothing until .resolve() is called"]
    pub fn overlay(mut self, fragment: Fragment) -> Self {
        self.overlays.push(fragment);
        self
    }

    /// Overrides the merge policy for one dotted key path.
    #[must_use = "policies do nothing until .resolve() is called"]
    pub fn policy(mut self, path: impl Into<String>, policy: MergePolicy) -> Self {
        self.policies.set(path, policy);
        self
    }

    /// Resolves the configuration for an environment tag.
    ///
    /// Selects the environment overlay (unknown tags fall back to dev),
    /// merges all layers, expands `${...}` placeholders, and validates the
    /// result. On any error the resolution is abandoned whole; no partial
    /// config is ever returned.
    pub fn resolve(&self, tag: &str) -> Result<ResolvedConfig, ComposeError> {
        let mut fragments: Vec<&Fragment> = Vec::with_capacity(2 + self.overlays.len());
        fragments.push(&self.defaults);
        fragments.push(self.selector.select(tag));
        fragments.extend(self.overlays.iter());

        let mut tree = merge(&fragments, &self.policies)?;
        interp::expand(&mut tree)?;
        validate(&tree)?;

        Ok(ResolvedConfig::new(tree))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::ErrorKind;

    fn fragment(name: &str, text: &str) -> Fragment {
        Fragment::new(name, toml::from_str(text).unwrap())
    }

    fn composer() -> Composer {
        let defaults = fragment(
            "default",
            r#"
            project = "shop"
            entry = ["src/index.js"]
            plugins = ["html", "define"]

            [output]
            filename = "[name].js"
            path = "build/public/${project}"

            [module]
            rules = [{ test = "\\.js$", loader = "babel" }]

            [dev_server]
            compress = true
            port = 9000
            "#,
        );
        let dev = fragment(
            "dev",
            r#"
            plugins = ["hot-reload"]
            [dev_server]
            hot = true
            "#,
        );
        let prod = fragment(
            "prod",
            r#"
            plugins = ["minify"]
            [output]
            filename = "[name]-[hash].js"
            "#,
        );

        Composer::new(defaults, EnvSelector::new(dev, prod))
    }

    #[test]
    fn dev_resolution_accumulates_plugins_and_keeps_defaults() {
        let config = composer().resolve("dev").unwrap();

        let plugins: Vec<_> = config
            .get("plugins")
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(plugins, ["html", "define", "hot-reload"]);
        assert_eq!(config.get("output.filename").unwrap().as_str(), Some("[name].js"));
        assert_eq!(config.get("dev_server.port").unwrap().as_integer(), Some(9000));
        assert_eq!(config.get("dev_server.hot").unwrap().as_bool(), Some(true));
    }

    #[test]
    fn prod_resolution_overwrites_the_filename_template() {
        let config = composer().resolve("prod").unwrap();
        assert_eq!(
            config.get("output.filename").unwrap().as_str(),
            Some("[name]-[hash].js")
        );
    }

    #[test]
    fn placeholders_expand_against_the_merged_tree() {
        let config = composer().resolve("dev").unwrap();
        assert_eq!(
            config.get("output.path").unwrap().as_str(),
            Some("build/public/shop")
        );
    }

    #[test]
    fn unknown_tag_resolves_exactly_like_dev() {
        let c = composer();
        assert_eq!(c.resolve("staging").unwrap(), c.resolve("dev").unwrap());
    }

    #[test]
    fn repeated_resolution_is_deterministic() {
        let c = composer();
        assert_eq!(c.resolve("prod").unwrap(), c.resolve("prod").unwrap());
    }

    #[test]
    fn caller_overlays_apply_after_the_environment_layer() {
        let config = composer()
            .overlay(fragment(
                "project",
                r#"
                plugins = ["sprite"]
                [dev_server]
                port = 3000
                "#,
            ))
            .resolve("dev")
            .unwrap();

        assert_eq!(config.get("dev_server.port").unwrap().as_integer(), Some(3000));
        let plugins = config.get("plugins").unwrap().as_array().unwrap();
        assert_eq!(plugins.last().unwrap().as_str(), Some("sprite"));
    }

    #[test]
    fn per_path_policy_lets_prod_replace_the_entry_list() {
        let prod_entry = fragment("project", r#"entry = ["src/main.js"]"#);
        let config = composer()
            .overlay(prod_entry)
            .policy("entry", MergePolicy::Overwrite)
            .resolve("prod")
            .unwrap();

        let entry: Vec<_> = config
            .get("entry")
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(entry, ["src/main.js"]);
    }

    #[test]
    fn conflicting_plugins_abort_the_resolution() {
        let err = composer()
            .overlay(fragment("project", r#"plugins = ["minify"]"#))
            .resolve("dev")
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.path(), Some("plugins"));
    }

    #[test]
    fn type_clash_in_an_overlay_aborts_the_resolution() {
        let err = composer()
            .overlay(fragment("project", r#"plugins = "minify""#))
            .resolve("dev")
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn file_and_env_fragments_layer_like_any_other() {
        use crate::compose::{EnvOverlay, FileFragment};
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[dev_server]\nport = 3000").unwrap();
        let local = FileFragment::new("local", file.path(), true)
            .load()
            .unwrap()
            .unwrap();

        let env = EnvOverlay::new("STRATA", "__").fragment_from_vars(
            "env",
            [("STRATA__DEV_SERVER__HOST".to_string(), "0.0.0.0".to_string())],
        );

        let config = composer().overlay(local).overlay(env).resolve("dev").unwrap();
        assert_eq!(config.get("dev_server.port").unwrap().as_integer(), Some(3000));
        assert_eq!(config.get("dev_server.host").unwrap().as_str(), Some("0.0.0.0"));
    }

    #[test]
    fn validation_failure_yields_no_partial_config() {
        let defaults = fragment("default", r#"mode = "development""#);
        let selector = EnvSelector::new(Fragment::empty("dev"), Fragment::empty("prod"));

        let result = Composer::new(defaults, selector).resolve("dev");
        assert!(matches!(result, Err(ComposeError::MissingSection { .. })));
    }
}
