//! Configuration management for jobrender.
//!
//! jobrender reads a single optional TOML file holding defaults for the
//! command line: the release root and the instance identity. See
//! [`RenderConfig`] for the format and lookup order.

mod global;

pub use global::{IdentityConfig, RenderConfig};
