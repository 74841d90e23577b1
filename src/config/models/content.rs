use crate::config::models::ConfigModel;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer};

/// Content sources to scan for class-name candidates.
///
/// Accepts either a bare list of include patterns or the detailed form with
/// an exclude sub-list:
///
/// ```toml
/// content = ["src/**/*.rs"]
/// # or
/// content = { patterns = ["src/**/*.rs"], exclude = ["src/generated/**"] }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
pub struct Content {
    /// Include patterns, in declaration order.
    pub patterns: Vec<String>,

    /// Exclude patterns; a file matching any of these is never scanned.
    pub exclude: Vec<String>,
}

impl ConfigModel for Content {}

impl<'de> Deserialize<'de> for Content {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Patterns(Vec<String>),
            Detailed {
                #[serde(default)]
                patterns: Vec<String>,
                #[serde(default, alias = "extract")]
                exclude: Vec<String>,
            },
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Patterns(patterns) => Content {
                patterns,
                exclude: Vec::new(),
            },
            Repr::Detailed { patterns, exclude } => Content { patterns, exclude },
        })
    }
}
