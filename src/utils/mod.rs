//! Utility helpers shared across the renderer.
//!
//! - [`path_validation`] - lexical path normalization and the confinement
//!   check that keeps cleanup entries inside their base directory

pub mod path_validation;

pub use path_validation::{is_within_directory, normalize_lexically, sanitize_cleanup_paths};
