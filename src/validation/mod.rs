//! Render-time validation of property values.
//!
//! Templates call into this module (through the `enum_value` filter) when
//! they interpret a property as one of a fixed set of choices. Failures are
//! returned as [`ConfigValidationError`] so a caller can abort a batch or
//! skip a single template.

pub mod enums;

pub use enums::{ConfigValidationError, EnumRule, MessageFormat, named_rules, validate_enum};
