//! The failure taxonomy of configuration resolution.

use std::fmt::{Display, Formatter};
use thiserror::Error;

/// A single resolution failure.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Malformed glob syntax in a content pattern.
    #[error("invalid glob pattern '{pattern}': {source}")]
    InvalidGlobPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
    /// Plugin dependency edges form a cycle.
    #[error("plugin dependency cycle among: {}", .members.join(", "))]
    CyclicDependency { members: Vec<String> },
    /// A plugin depends on a name not present in the plugin list.
    #[error("plugin '{plugin}' depends on unknown plugin '{dependency}'")]
    UnknownDependency { plugin: String, dependency: String },
    /// A theme `extend` entry tried to merge into a default value of an
    /// incompatible shape.
    #[error("cannot merge {extension} into {default} at theme path '{path}'")]
    ThemeMergeTypeConflict {
        path: String,
        default: &'static str,
        extension: &'static str,
    },
}

/// All failures of one resolution attempt, surfaced as a single error.
///
/// Resolution is all-or-nothing: if this report is non-empty, no
/// [`crate::config::rt::ResolvedConfig`] was produced.
#[derive(Debug, Default)]
pub struct ErrorReport {
    errors: Vec<ResolveError>,
}

impl ErrorReport {
    /// Record a failure.
    pub fn push(&mut self, error: ResolveError) {
        self.errors.push(error);
    }

    /// Merge another report into this one.
    pub fn absorb(&mut self, other: ErrorReport) {
        self.errors.extend(other.errors);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ResolveError] {
        &self.errors
    }

    /// Return `value` if no failures were recorded, otherwise the report itself.
    pub fn into_result<T>(self, value: T) -> Result<T, ErrorReport> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl Display for ErrorReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "configuration resolution failed with {} error(s):",
            self.errors.len()
        )?;
        for error in &self.errors {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorReport {}

impl From<ResolveError> for ErrorReport {
    fn from(error: ResolveError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}
