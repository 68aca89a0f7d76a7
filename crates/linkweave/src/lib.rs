//! # linkweave
//!
//! Command-line front end for the linkweave link engine: scan source files for
//! rule matches and inline annotations, resolve prefixed paths and `${...}`
//! templates, and validate or bootstrap rule files.
//!
//! ## Quick Start
//!
//! ```bash
//! # Write .vscode/linker.json with two example rules
//! linkweave init
//!
//! # Scan a file against the workspace rules
//! linkweave scan src/main.ts --workspace .
//!
//! # Machine-readable output
//! linkweave --format json scan src/main.ts
//! ```
//!
//! ## Settings
//!
//! Settings come from built-in defaults, an optional JSON file passed with
//! `--config`, and `LINKWEAVE_*` environment variables, in that order.
//!
//! ```json
//! {
//!   "enable_inline_links": true,
//!   "inline_link_pattern": "@link\\s+\\[#(?<anchor>.+?)\\]\\((?<link>.+?)\\)",
//!   "rules_path": ".vscode/linker.json",
//!   "path_prefixes": {
//!     "#:": {"base": "workspace", "description": "Relative to workspace root"}
//!   }
//! }
//! ```
//!
//! The commands are also usable as a library:
//!
//! ```
//! use linkweave::commands::resolve_path;
//! use linkweave_core::LinkerSettings;
//! use std::path::Path;
//!
//! let report = resolve_path(&LinkerSettings::default(), "#:package.json", None, Some(Path::new("/ws"))).unwrap();
//! assert_eq!(report.resolved, Path::new("/ws/package.json"));
//! ```

pub mod commands;
pub mod output;
pub mod settings;

pub use commands::{
    InitReport, PathReport, ScanOptions, ScanReport, ValidateReport, VarsReport, init,
    resolve_path, resolve_vars, scan, validate,
};
pub use output::{OutputFormat, Render, ReportFormatter};
pub use settings::{ENV_PREFIX, expand_path, expand_path_from, load_settings};
