//! # linkweave core
//!
//! Core data models, error types, and settings for the linkweave link engine.
//! This crate defines the canonical types that the engine and the CLI share.
//!
//! ## Architecture Principles
//!
//! - **Few Dependencies**: serde for the file formats, regex for validation
//! - **Type-Driven Design**: enums replace the string kinds of the rule file
//! - **Zero Panic in Libraries**: fallible operations return `Result<T, Error>`
//! - **Immutable Rules**: scans borrow rules and never mutate them
//!
//! ## Core Modules
//!
//! - [`models`] - Rules, patterns, matches and inline annotations
//! - [`error`] - Error type and Result alias
//! - [`config`] - Settings, the path prefix table and rule-file loading
//! - [`validation`] - Rule validation reports
//! - [`utils`] - Path normalization and serialization helpers
//!
//! ## Usage Examples
//!
//! ```
//! use linkweave_core::prelude::*;
//!
//! let rule = LinkRule::new("Issue", LinkKind::Url, "https://tracker/${1}")
//!     .with_pattern(Pattern::regex(r"ISSUE-(\d+)").with_highlight_group(1));
//!
//! let report = RuleValidator::validate(std::slice::from_ref(&rule));
//! assert!(report.passed);
//! ```
//!
//! ### Loading a rule file
//!
//! ```
//! use linkweave_core::RuleFile;
//!
//! let rules = RuleFile::parse(r#"{"links": [
//!     {"name": "Docs", "type": "url", "target": "https://docs.rs",
//!      "patterns": [{"type": "text", "value": "docs.rs"}]}
//! ]}"#).unwrap();
//! assert_eq!(rules.len(), 1);
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod repair;
pub mod utils;
pub mod validation;

pub use config::{
    DEFAULT_INLINE_LINK_PATTERN, DEFAULT_RULES_PATH, LinkerSettings, PathPrefix, PathPrefixTable,
    PrefixBase, RuleFile,
};
pub use error::{Error, Result};
pub use models::*;
pub use repair::repair_json;
pub use utils::{file_extension, join_normalized, normalize_lexically, to_json_string};
pub use validation::{RuleValidator, Severity, ValidationIssue, ValidationReport, ValidationSummary};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{LinkerSettings, PathPrefixTable, PrefixBase, RuleFile};
    pub use crate::error::{Error, Result};
    pub use crate::models::{
        InlineAnnotation, LineIndex, LinkKind, LinkRule, Match, Pattern, PatternContext,
        PatternKind, TextRange,
    };
    pub use crate::validation::{RuleValidator, Severity, ValidationReport};
}
