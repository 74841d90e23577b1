//! The configuration model
//!
//! This is what the user provides, and which gets resolved into the runtime
//! model before the compiler sees any of it.

pub mod source;

mod content;
mod theme;

pub use content::*;
pub use theme::*;


use crate::plugins::PluginDescriptor;
use anyhow::{Context, Result, bail};
use schemars::JsonSchema;
use serde::Deserialize;
use source::Source;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Common configuration model functionality
pub trait ConfigModel {
    /// Migrate legacy constructs to newer ones, if possible
    fn migrate(&mut self) -> Result<()> {
        Ok(())
    }
}

/// The persisted Windlass configuration model
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, JsonSchema)]
pub struct Configuration {
    /// Source files to scan for class-name candidates.
    #[serde(default)]
    pub content: Content,

    /// Theme overrides and extensions.
    #[serde(default)]
    pub theme: Theme,

    /// Plugins, in declaration order.
    #[serde(default)]
    pub plugins: Vec<PluginDescriptor>,

    /// Options this engine does not interpret. Forwarded unmodified to the
    /// compiler.
    #[serde(flatten)]
    pub passthrough: BTreeMap<String, serde_json::Value>,
}

impl ConfigModel for Configuration {
    /// Run all migration steps.
    ///
    /// NOTE: This will work on the current instance only and will not alter any configuration files
    fn migrate(&mut self) -> Result<()> {
        self.content.migrate()?;
        self.theme.migrate()?;

        // handle migrations with global impact

        // handle the old top-level `exclude` field
        if let Some(value) = self.passthrough.remove("exclude") {
            tracing::warn!(
                "'exclude' is used at the top level of the configuration. This is deprecated for the 'content.exclude' field and will result in an error in a future release."
            );
            let patterns: Vec<String> = serde_json::from_value(value)
                .context("invalid legacy top-level 'exclude' field")?;
            self.content.exclude.extend(patterns);
        }

        Ok(())
    }
}

/// Locate and load the configuration, given an optional file or directory. Falling back to the
/// current directory.
pub async fn load(path: Option<PathBuf>) -> Result<(Configuration, PathBuf)> {
    match path {
        // if we have a file, load it
        Some(path) if path.is_file() => {
            // Canonicalize the path to the configuration, so that we get a proper parent.
            // Otherwise, we might end up with a parent of '', which won't work later on.
            let path = path.canonicalize().with_context(|| {
                format!(
                    "unable to canonicalize path to configuration: '{}'",
                    path.display()
                )
            })?;
            let Some(cwd) = path.parent() else {
                bail!("unable to get parent directory of '{}'", path.display());
            };
            let cwd = cwd.to_path_buf();

            Ok((Source::File(path).load().await?, cwd))
        }
        // if we have a directory, try finding a file and load it
        Some(path) if path.is_dir() => Ok((Source::find(&path)?.load().await?, path)),
        // if we have something else, we can't deal with it
        Some(path) => bail!("{} is neither a file nor a directory", path.display()),
        // if we have nothing, try to find a file in the current directory and load it
        None => {
            let cwd = std::env::current_dir().context("unable to get current directory")?;
            Ok((Source::find(&cwd)?.load().await?, cwd))
        }
    }
}
