//! Core types for jobrender.
//!
//! Holds the crate-wide error type [`JobRenderError`], the CLI-facing
//! [`ErrorContext`] wrapper and [`user_friendly_error`], which turns any
//! `anyhow::Error` into a colored message with a suggestion where one exists.

pub mod error;

pub use error::{ErrorContext, JobRenderError, user_friendly_error};
