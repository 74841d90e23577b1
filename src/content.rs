//! Content discovery: expanding content patterns into the set of files the
//! compiler scans for class-name candidates.

use crate::common::path_to_slash;
use crate::error::{ErrorReport, ResolveError};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Deduplicated absolute paths of files to scan.
///
/// A sorted set, so iteration order doubles as the canonical serialization
/// order.
pub type FileSet = BTreeSet<PathBuf>;

/// Expand include and exclude patterns against `root` into a [`FileSet`].
///
/// `**` matches any depth, `*` stays within one path segment, literal
/// segments match exactly. A file matching several include patterns is
/// returned once. An empty include list yields an empty set; the engine never
/// falls back to scanning everything. Pattern roots that do not exist simply
/// contribute no files, as do patterns escaping the project root (absolute
/// ones, or ones with `..` segments): matching is always root-relative.
///
/// This is a pure read of the file system at call time; nothing is cached
/// across calls.
pub fn resolve(
    root: &Path,
    patterns: &[String],
    exclude: &[String],
) -> Result<FileSet, ErrorReport> {
    let mut report = ErrorReport::default();
    let includes = build_set(patterns, &mut report);
    let excludes = build_set(exclude, &mut report);
    if !report.is_empty() {
        return Err(report);
    }

    let mut files = FileSet::new();
    if patterns.is_empty() {
        return Ok(files);
    }

    for walk_root in walk_roots(root, patterns) {
        for entry in WalkDir::new(&walk_root)
            .follow_links(false)
            .into_iter()
            .filter_map(|entry| entry.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            let relative = path_to_slash(relative);
            if includes.is_match(&relative) && !excludes.is_match(&relative) {
                files.insert(entry.path().to_path_buf());
            }
        }
    }

    Ok(files)
}

/// Compile a pattern list, recording each malformed pattern in the report.
fn build_set(patterns: &[String], report: &mut ErrorReport) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        // `*` must not cross path segments; only `**` may.
        match GlobBuilder::new(normalize(pattern))
            .literal_separator(true)
            .build()
        {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(source) => report.push(ResolveError::InvalidGlobPattern {
                pattern: pattern.clone(),
                source,
            }),
        }
    }
    match builder.build() {
        Ok(set) => set,
        Err(source) => {
            report.push(ResolveError::InvalidGlobPattern {
                pattern: source.glob().unwrap_or_default().to_string(),
                source,
            });
            GlobSet::empty()
        }
    }
}

/// Strip the conventional `./` prefix so patterns match root-relative paths.
fn normalize(pattern: &str) -> &str {
    let mut pattern = pattern;
    while let Some(rest) = pattern.strip_prefix("./") {
        pattern = rest;
    }
    pattern
}

/// The literal (wildcard-free) prefix of each pattern, joined to the project
/// root. Walking only these keeps unrelated trees out of the traversal.
fn walk_roots(root: &Path, patterns: &[String]) -> BTreeSet<PathBuf> {
    let mut roots = BTreeSet::new();
    for pattern in patterns {
        let normalized = normalize(pattern);
        let mut prefix = PathBuf::new();
        for segment in normalized.split('/') {
            if segment.contains(['*', '?', '[', '{']) {
                break;
            }
            prefix.push(segment);
        }
        // A prefix escaping the project root can never match a root-relative
        // path; don't walk a foreign tree for it.
        if normalized.starts_with('/')
            || prefix
                .components()
                .any(|component| matches!(component, Component::ParentDir))
        {
            continue;
        }
        roots.insert(root.join(prefix));
    }

    // Drop roots nested under another collected root to avoid walking the
    // same subtree twice.
    let nested: Vec<PathBuf> = roots
        .iter()
        .filter(|path| {
            roots
                .iter()
                .any(|other| other != *path && path.starts_with(other))
        })
        .cloned()
        .collect();
    for path in nested {
        roots.remove(&path);
    }
    roots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolveError;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("should create parent directories");
        }
        fs::write(path, "").expect("should write file");
    }

    fn project() -> TempDir {
        let dir = tempdir().expect("should create temp directory");
        touch(dir.path(), "src/main.rs");
        touch(dir.path(), "src/components/card.rs");
        touch(dir.path(), "src/generated/bindings.rs");
        touch(dir.path(), "assets/index.html");
        touch(dir.path(), "assets/logo.svg");
        dir
    }

    fn patterns(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_pattern_list_yields_empty_set() {
        let dir = project();
        let files =
            resolve(dir.path(), &[], &[]).expect("empty pattern list should not be an error");
        assert!(files.is_empty());
    }

    #[test]
    fn overlapping_patterns_deduplicate() {
        let dir = project();
        let files = resolve(dir.path(), &patterns(&["src/**/*.rs", "src/main*.rs"]), &[])
            .expect("resolve should succeed");

        let expected: FileSet = [
            dir.path().join("src/main.rs"),
            dir.path().join("src/components/card.rs"),
            dir.path().join("src/generated/bindings.rs"),
        ]
        .into_iter()
        .collect();
        assert_eq!(files, expected);
    }

    #[test]
    fn single_star_stays_within_one_segment() {
        let dir = project();
        let files = resolve(dir.path(), &patterns(&["src/*.rs"]), &[])
            .expect("resolve should succeed");

        let expected: FileSet = [dir.path().join("src/main.rs")].into_iter().collect();
        assert_eq!(files, expected);
    }

    #[test]
    fn exclude_wins_over_include() {
        let dir = project();
        let files = resolve(
            dir.path(),
            &patterns(&["src/**/*.rs"]),
            &patterns(&["src/generated/**"]),
        )
        .expect("resolve should succeed");

        assert!(!files.contains(&dir.path().join("src/generated/bindings.rs")));
        assert!(files.contains(&dir.path().join("src/main.rs")));
    }

    #[test]
    fn missing_pattern_root_contributes_nothing() {
        let dir = project();
        let files = resolve(dir.path(), &patterns(&["vendor/**/*.js", "src/*.rs"]), &[])
            .expect("a missing pattern root is not an error");

        let expected: FileSet = [dir.path().join("src/main.rs")].into_iter().collect();
        assert_eq!(files, expected);
    }

    #[test]
    fn dot_prefixed_patterns_match() {
        let dir = project();
        let files = resolve(dir.path(), &patterns(&["./assets/**/*.html"]), &[])
            .expect("resolve should succeed");

        let expected: FileSet = [dir.path().join("assets/index.html")].into_iter().collect();
        assert_eq!(files, expected);
    }

    #[test]
    fn literal_pattern_matches_single_file() {
        let dir = project();
        let files = resolve(dir.path(), &patterns(&["assets/logo.svg"]), &[])
            .expect("resolve should succeed");

        let expected: FileSet = [dir.path().join("assets/logo.svg")].into_iter().collect();
        assert_eq!(files, expected);
    }

    #[test]
    fn patterns_escaping_root_contribute_nothing() {
        let outer = tempdir().expect("should create temp directory");
        let project = outer.path().join("project");
        touch(&project, "src/main.rs");
        touch(outer.path(), "sibling/secret.rs");

        let files = resolve(
            &project,
            &patterns(&["../sibling/*.rs", "/sibling/*.rs", "src/*.rs"]),
            &[],
        )
        .expect("escaping patterns are not an error");

        let expected: FileSet = [project.join("src/main.rs")].into_iter().collect();
        assert_eq!(files, expected);
    }

    #[test]
    fn malformed_patterns_are_all_reported() {
        let dir = project();
        let report = resolve(
            dir.path(),
            &patterns(&["src/[", "src/*.rs"]),
            &patterns(&["assets/["]),
        )
        .expect_err("malformed patterns should abort resolution");

        assert_eq!(report.errors().len(), 2);
        assert!(report.errors().iter().all(|error| matches!(
            error,
            ResolveError::InvalidGlobPattern { .. }
        )));
    }

    #[test]
    fn every_returned_path_matches_an_include_pattern() {
        let dir = project();
        let include = patterns(&["src/**/*.rs", "assets/*.html"]);
        let files = resolve(dir.path(), &include, &[]).expect("resolve should succeed");

        let set = build_set(&include, &mut ErrorReport::default());
        for file in &files {
            let relative = path_to_slash(file.strip_prefix(dir.path()).expect("under root"));
            assert!(set.is_match(&relative), "{relative} matched no pattern");
        }
    }
}
