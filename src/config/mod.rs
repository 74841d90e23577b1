//! User configuration and its resolved runtime form.
//!
//! `models` is what the user writes; `rt` is what the compiler consumes.

pub mod models;
pub mod rt;

pub use models::*;
pub use rt::*;
