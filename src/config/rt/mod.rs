//! The runtime configuration model: what the compiler actually consumes.

use crate::config::models::Configuration;
use crate::content::{self, FileSet};
use crate::error::ErrorReport;
use crate::plugins::{self, PluginDescriptor};
use crate::theme::{self, ResolvedTheme, ThemeMap};
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// The immutable resolved configuration handed to the compiler.
///
/// Built once per build/watch cycle. Any config or file-system change
/// produces a fresh instance; an existing one is never partially mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResolvedConfig {
    /// Canonical project root all content patterns were resolved against.
    #[serde(skip)]
    pub working_directory: PathBuf,

    /// Deduplicated absolute paths of the files to scan.
    pub files: FileSet,

    /// Fully merged theme.
    pub theme: ResolvedTheme,

    /// Plugins in application order.
    pub plugins: Vec<PluginDescriptor>,

    /// Options forwarded unmodified to the compiler.
    pub passthrough: BTreeMap<String, serde_json::Value>,
}

impl ResolvedConfig {
    /// Resolve the raw configuration against `working_directory`.
    ///
    /// All-or-nothing: failures across glob resolution, theme merging and
    /// plugin composition are collected into one [`ErrorReport`] and nothing
    /// partial is ever returned. For identical inputs and an unchanged file
    /// system the result is identical, down to the serialized bytes.
    pub fn from_config(
        config: &Configuration,
        default_theme: &ThemeMap,
        working_directory: impl AsRef<Path>,
    ) -> Result<Self> {
        let working_directory = working_directory.as_ref().canonicalize().with_context(|| {
            format!(
                "unable to canonicalize working directory '{}'",
                working_directory.as_ref().display()
            )
        })?;

        let mut report = ErrorReport::default();

        let files = content::resolve(
            &working_directory,
            &config.content.patterns,
            &config.content.exclude,
        )
        .unwrap_or_else(|errors| {
            report.absorb(errors);
            FileSet::new()
        });

        let theme = theme::merge(default_theme, &config.theme.overrides, &config.theme.extend)
            .unwrap_or_else(|errors| {
                report.absorb(errors);
                ResolvedTheme::new()
            });

        let plugins = plugins::compose(&config.plugins).unwrap_or_else(|errors| {
            report.absorb(errors);
            Vec::new()
        });

        Ok(report.into_result(Self {
            working_directory,
            files,
            theme,
            plugins,
            passthrough: config.passthrough.clone(),
        })?)
    }

    /// Canonical serialized form: sorted file paths, key-sorted maps.
    ///
    /// Byte-identical for identical inputs, so it is safe to fingerprint or
    /// persist for caching.
    pub fn to_canonical_json(&self) -> Result<String> {
        serde_json::to_string(self).context("error serializing resolved configuration")
    }

    /// Content fingerprint of the canonical form.
    pub fn fingerprint(&self) -> Result<u64> {
        Ok(seahash::hash(self.to_canonical_json()?.as_bytes()))
    }
}
