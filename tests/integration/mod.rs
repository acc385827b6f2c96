//! Integration test suite for jobrender
//!
//! Renders the real release assets under `jobs/` end to end: job spec
//! loading, property merging, link handling and the template extensions.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **rsyslog_conf**: `syslog_forwarder` config/rsyslog.conf (message formats, drains)
//! - **pre_start**: `syslog_forwarder` bin/pre-start (cleanup confinement)
//! - **render_context**: merge and context building through `Job`
//! - **cli**: the `jobrender` binary
//! - **packaging**: the crate's own `Cargo.toml`

mod cli;
mod packaging;
mod pre_start;
mod render_context;
mod rsyslog_conf;
