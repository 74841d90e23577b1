//! The theme: built-in defaults plus user extensions and overrides.

use crate::error::{ErrorReport, ResolveError};
use once_cell::sync::Lazy;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A design-token value: scalar, list, or nested map.
///
/// Scalars are opaque strings; interpreting them is the compiler's business.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum ThemeValue {
    Scalar(String),
    List(Vec<ThemeValue>),
    Map(ThemeMap),
}

/// A theme-key to value mapping. Sorted keys, so serialization is canonical
/// by construction.
pub type ThemeMap = BTreeMap<String, ThemeValue>;

/// The fully merged theme handed to the compiler.
pub type ResolvedTheme = ThemeMap;

impl ThemeValue {
    fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "a scalar",
            Self::List(_) => "a list",
            Self::Map(_) => "a map",
        }
    }
}

/// The built-in default theme.
///
/// Loaded once at process start and never mutated; merging always works on a
/// copy.
pub static DEFAULT_THEME: Lazy<ThemeMap> = Lazy::new(|| {
    entries([
        (
            "colors",
            map([
                ("black", scalar("#000000")),
                ("white", scalar("#ffffff")),
                (
                    "gray",
                    map([
                        ("100", scalar("#f3f4f6")),
                        ("300", scalar("#d1d5db")),
                        ("500", scalar("#6b7280")),
                        ("700", scalar("#374151")),
                        ("900", scalar("#111827")),
                    ]),
                ),
            ]),
        ),
        (
            "spacing",
            map([
                ("0", scalar("0px")),
                ("1", scalar("0.25rem")),
                ("2", scalar("0.5rem")),
                ("4", scalar("1rem")),
                ("8", scalar("2rem")),
                ("16", scalar("4rem")),
            ]),
        ),
        (
            "fontFamily",
            map([
                ("sans", list(["ui-sans-serif", "system-ui", "sans-serif"])),
                ("mono", list(["ui-monospace", "SFMono-Regular", "monospace"])),
            ]),
        ),
        (
            "screens",
            map([
                ("sm", scalar("640px")),
                ("md", scalar("768px")),
                ("lg", scalar("1024px")),
                ("xl", scalar("1280px")),
            ]),
        ),
        (
            "borderRadius",
            map([
                ("none", scalar("0px")),
                ("DEFAULT", scalar("0.25rem")),
                ("full", scalar("9999px")),
            ]),
        ),
    ])
});

fn scalar(value: &str) -> ThemeValue {
    ThemeValue::Scalar(value.to_string())
}

fn list<const N: usize>(values: [&str; N]) -> ThemeValue {
    ThemeValue::List(values.into_iter().map(scalar).collect())
}

fn entries<const N: usize>(pairs: [(&str, ThemeValue); N]) -> ThemeMap {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

fn map<const N: usize>(pairs: [(&str, ThemeValue); N]) -> ThemeValue {
    ThemeValue::Map(entries(pairs))
}

/// Merge the default theme with user overrides and extensions.
///
/// Overrides replace a key's default value wholesale, nested structure
/// included. Extensions deep-merge: maps by key, lists by appending after the
/// defaults, scalars by replacement. Keys unknown to the default theme are
/// added verbatim. Shape mismatches are collected per key path and fail the
/// merge as a whole, so one report names every conflict.
pub fn merge(
    default: &ThemeMap,
    overrides: &ThemeMap,
    extend: &ThemeMap,
) -> Result<ResolvedTheme, ErrorReport> {
    let mut report = ErrorReport::default();
    let mut resolved = default.clone();

    for (key, value) in overrides {
        resolved.insert(key.clone(), value.clone());
    }

    for (key, value) in extend {
        match resolved.get_mut(key) {
            Some(base) => deep_merge(base, value, key, &mut report),
            None => {
                resolved.insert(key.clone(), value.clone());
            }
        }
    }

    report.into_result(resolved)
}

fn deep_merge(base: &mut ThemeValue, extension: &ThemeValue, path: &str, report: &mut ErrorReport) {
    match (base, extension) {
        (ThemeValue::Map(base), ThemeValue::Map(extension)) => {
            for (key, value) in extension {
                match base.get_mut(key) {
                    Some(nested) => deep_merge(nested, value, &format!("{path}.{key}"), report),
                    None => {
                        base.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (ThemeValue::List(base), ThemeValue::List(extension)) => {
            base.extend(extension.iter().cloned());
        }
        (ThemeValue::Scalar(base), ThemeValue::Scalar(extension)) => {
            *base = extension.clone();
        }
        (base, extension) => report.push(ResolveError::ThemeMergeTypeConflict {
            path: path.to_string(),
            default: base.kind(),
            extension: extension.kind(),
        }),
    }
}
