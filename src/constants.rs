//! Constants shared across the jobrender codebase.
//!
//! File layout of a release directory and the synthetic identity defaults.

/// Directory under the release root that holds one subdirectory per job.
pub const JOBS_DIR: &str = "jobs";

/// Name of the job spec file inside a job directory.
pub const JOB_SPEC_FILE: &str = "spec";

/// Directory inside a job directory that holds template sources.
pub const TEMPLATES_DIR: &str = "templates";

/// Instance index used for deterministic renders when the caller has no
/// orchestrator-assigned value.
pub const SYNTHETIC_INSTANCE_INDEX: u64 = 13;

/// Instance id used for deterministic renders when the caller has no
/// orchestrator-assigned value.
pub const SYNTHETIC_INSTANCE_ID: &str = "instance-id";

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "JOBRENDER_CONFIG_PATH";

/// Placeholder used in errors for documents parsed from memory.
pub const INLINE_SOURCE: &str = "<inline>";
