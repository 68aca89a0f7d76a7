//! Shared utilities for operations across linkweave crates.
//!
//! Provides helpers for:
//! - Serialization with consistent error handling
//! - Lexical path normalization (no filesystem access)
//! - File extension extraction in the rule-file convention

use crate::{Error, Result};
use std::path::{Component, Path, PathBuf};

/// Generic JSON serialization with consistent error handling
/// Works with any type that implements Serialize (including slices)
pub fn to_json_string<T: serde::Serialize + ?Sized>(data: &T, context: &str) -> Result<String> {
    serde_json::to_string_pretty(data).map_err(|e| {
        Error::config_error(format!("Failed to serialize {} as JSON: {}", context, e))
    })
}

/// Fold `.` and `..` components without touching the filesystem.
///
/// `..` never climbs above the root of an absolute path; leading `..` of a
/// relative path are kept.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                let can_pop = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push("..");
                }
            }
            Component::CurDir => {}
            Component::Normal(name) => normalized.push(name),
            Component::RootDir => normalized.push(component),
            Component::Prefix(p) => normalized.push(p.as_os_str()),
        }
    }
    normalized
}

/// Join `relative` onto `base` and normalize, like a path join in most
/// scripting runtimes.
pub fn join_normalized(base: &Path, relative: &str) -> PathBuf {
    normalize_lexically(&base.join(relative))
}

/// Extension of a document name including the leading dot (`.ts`), taken from
/// the last `.` of the file name. Dotfiles such as `.env` count as their own
/// extension; names without a dot yield an empty string.
pub fn file_extension(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .and_then(|name| name.rfind('.').map(|idx| name[idx..].to_string()))
        .unwrap_or_default()
}
