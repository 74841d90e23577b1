//! Common functionality and types.

use std::path::Path;

/// Turn a path into a forward-slash string.
///
/// Glob patterns always use `/`, so matching happens on this form regardless
/// of the platform separator.
pub fn path_to_slash(path: impl AsRef<Path>) -> String {
    let segments = path
        .as_ref()
        .iter()
        .map(|c| c.to_string_lossy())
        .collect::<Vec<_>>();
    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn joins_with_forward_slashes() {
        let path: PathBuf = ["src", "components", "card.rs"].iter().collect();
        assert_eq!(path_to_slash(path), "src/components/card.rs");
    }
}
