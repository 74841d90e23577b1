use crate::config::models::ConfigModel;
use crate::theme::ThemeMap;
use schemars::JsonSchema;
use serde::Deserialize;

/// Theme configuration: direct overrides plus an additive `extend` block.
///
/// ```toml
/// [theme]
/// borderRadius = { card = "0.75rem" }   # replaces the default wholesale
///
/// [theme.extend]
/// colors = { brand = "#38bdf8" }        # merged into the default
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, JsonSchema)]
pub struct Theme {
    /// Additive extensions, deep-merged into the default theme.
    #[serde(default)]
    pub extend: ThemeMap,

    /// Direct overrides: every other key under `theme` replaces the default
    /// value for that key wholesale.
    #[serde(flatten)]
    pub overrides: ThemeMap,
}

impl ConfigModel for Theme {}
