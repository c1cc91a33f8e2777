//! Platform classification and runtime environment checks.
//!
//! The classifier routes camera acquisition to a platform strategy based
//! on the environment's identification string. Both the classifier and
//! the secure-context check are pure functions over [`Environment`] so
//! they can be tested without any live platform.

mod classify;
mod env;

pub use classify::{classify, Platform};
pub use env::Environment;
