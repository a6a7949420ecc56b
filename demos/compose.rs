use serde::Deserialize;
use strata::{Composer, EnvSelector, Fragment, MergePolicy};

#[derive(Debug, Deserialize)]
struct BuildConfig {
    entry: Vec<String>,
    plugins: Vec<String>,
    output: Output,
}

#[derive(Debug, Deserialize)]
struct Output {
    filename: String,
    path: String,
}

fn fragment(name: &str, text: &str) -> Fragment {
    Fragment::new(name, toml::from_str(text).expect("inline fragment parses"))
}

fn main() -> Result<(), strata::ComposeError> {
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
    let dev = fragment("dev", r#"plugins = ["hot-reload"]"#);
    let prod = fragment(
        "prod",
        r#"
        plugins = ["minify"]
        [output]
        filename = "[name]-[hash].js"
        "#,
    );

    let composer = Composer::new(defaults, EnvSelector::new(dev, prod))
        .overlay(fragment("project", r#"plugins = ["sprite"]"#))
        .policy("entry", MergePolicy::Overwrite);

    // The tag usually comes from a CLI argument; anything unrecognized
    // falls back to a dev build.
    let tag = std::env::args().nth(1).unwrap_or_default();
    let config: BuildConfig = composer.resolve(&tag)?.try_deserialize()?;

    println!("entry:    {:?}", config.entry);
    println!("plugins:  {:?}", config.plugins);
    println!("filename: {}", config.output.filename);
    println!("path:     {}", config.output.path);

    Ok(())
}
