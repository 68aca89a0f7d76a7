//! Settings layering and user path expansion.
//!
//! Sources, later ones winning: built-in defaults, an optional JSON settings
//! file, then `LINKWEAVE_*` environment variables (`LINKWEAVE_DEBUG=true`,
//! `LINKWEAVE_RULES_PATH=...`). A table given in the file replaces the
//! default table as a whole.

use config::{Config, Environment, File, FileFormat};
use linkweave_core::{Error, LinkerSettings, Result};
use std::path::{Path, PathBuf};

/// Prefix of the environment variables read into [`LinkerSettings`]
pub const ENV_PREFIX: &str = "LINKWEAVE";

/// Load settings from an optional file plus the process environment.
pub fn load_settings(file: Option<&Path>) -> Result<LinkerSettings> {
    let mut builder = Config::builder();

    if let Some(path) = file {
        if !path.exists() {
            return Err(Error::file_not_found(path));
        }
        builder = builder.add_source(File::from(path).format(FileFormat::Json).required(true));
    }

    let settings = builder
        .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
        .build()
        .and_then(|config| config.try_deserialize::<LinkerSettings>())
        .map_err(|e| Error::config_error(format!("Failed to load settings: {}", e)))?;

    log::debug!(
        "Settings: enabled={} inline_links={} prefixes={} rules_path={}",
        settings.enabled,
        settings.enable_inline_links,
        settings.path_prefixes.len(),
        settings.rules_path.display()
    );
    Ok(settings)
}

/// Expand `~` and `$VAR` in a user-supplied path
pub fn expand_path(path: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(path)
        .map_err(|e| Error::config_error(format!("Failed to expand path {:?}: {}", path, e)))?;
    Ok(PathBuf::from(expanded.into_owned()))
}

/// Expand a path and anchor it at `base` when it is relative
pub fn expand_path_from(path: &str, base: &Path) -> Result<PathBuf> {
    let expanded = expand_path(path)?;
    Ok(if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkweave_core::PrefixBase;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_file() {
        let settings = load_settings(None).unwrap();
        assert!(settings.enable_inline_links);
        assert_eq!(settings.path_prefixes.len(), 4);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{
                "enable_inline_links": false,
                "rules_path": "links.json",
                "path_prefixes": {"@:": {"base": "parent", "description": "Up one"}}
            }"#,
        )
        .unwrap();

        let settings = load_settings(Some(&path)).unwrap();
        assert!(!settings.enable_inline_links);
        assert!(settings.enabled);
        assert_eq!(settings.rules_path, PathBuf::from("links.json"));
        assert_eq!(settings.path_prefixes.len(), 1);
        assert_eq!(
            settings.path_prefixes.get("@:").map(|p| p.base),
            Some(PrefixBase::Parent)
        );
    }

    #[test]
    fn test_missing_settings_file() {
        let err = load_settings(Some(Path::new("/definitely/not/here.json"))).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_malformed_settings_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.json");
        std::fs::write(&path, r#"{"enabled": "#).unwrap();
        let err = load_settings(Some(&path)).unwrap_err();
        assert!(matches!(err, Error::ConfigError { .. }));
    }

    #[test]
    fn test_expand_path_from() {
        let base = Path::new("/ws");
        assert_eq!(expand_path_from("rules.json", base).unwrap(), PathBuf::from("/ws/rules.json"));
        assert_eq!(expand_path_from("/etc/rules.json", base).unwrap(), PathBuf::from("/etc/rules.json"));
        assert!(!expand_path("~/x").unwrap().starts_with("~"));
    }
}
