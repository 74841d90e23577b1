#![deny(clippy::unwrap_used)]

//! Configuration resolution & content discovery for the Windlass utility-CSS
//! compiler.
//!
//! This crate turns a user-authored configuration (content globs, theme
//! deltas, a plugin list) into an immutable [`ResolvedConfig`]: the
//! deduplicated set of files to scan for class-name candidates, the fully
//! merged theme, and the dependency-ordered plugin sequence. CSS generation
//! itself lives in the compiler, which consumes the resolved form and is not
//! part of this crate.

pub mod common;
pub mod config;
pub mod content;
pub mod debouncer;
pub mod error;
pub mod plugins;
pub mod theme;
pub mod watch;

pub use config::models::{Configuration, load};
pub use config::rt::ResolvedConfig;
