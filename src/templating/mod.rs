//! Tera-based rendering of job templates.
//!
//! Job templates (`jobs/<job>/templates/*.tera`) are rendered against a
//! [`RenderContext`] built from resolved properties, the instance identity and
//! consumed links.
//!
//! # Template Context
//!
//! - `job.name`, `index`, `id`, `deployment`
//! - `properties.<dotted.path>`: resolved properties
//! - `links.<name>.instances[]` and `links.<name>.properties`
//!
//! # Custom Filters and Functions
//!
//! - `enum_value(path, allowed, default)`: rejects values outside `allowed`;
//!   `enum_value(rule="message_format")` uses a registered rule instead
//! - `confine_paths(base)`: drops file names that escape `base`
//! - `shell_escape`: single-quotes values that a shell would interpret
//! - `p(name, default)`: dotted property lookup
//!
//! # Syntax Notes
//!
//! Tera does not apply a filter directly to a function call result, so bind
//! the value with `{% set %}` first. Guard optional links with `is defined`:
//!
//! ```text
//! {% if links.syslog_storer is defined %}
//! {% set storer = links.syslog_storer.instances | first %}
//! {% endif %}
//! ```

pub mod context;
pub mod error;
pub mod filters;
pub mod renderer;

pub use context::{Identity, JobInfo, RenderContext};
pub use error::{ErrorLocation, TemplateError};
pub use renderer::{RenderingMetadata, TemplateRenderer};
