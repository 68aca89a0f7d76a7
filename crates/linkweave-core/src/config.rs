//! Settings, path prefixes and rule-file loading.
//!
//! The rule file is JSON: either a bare array of rules or an object with a
//! `links` array. Settings carry the host-level knobs (inline annotations,
//! the tag pattern, the prefix table).

use crate::error::{Error, Result};
use crate::models::{LinkKind, LinkRule, Pattern, PatternKind};
use crate::repair::repair_json;
use crate::validation::{RuleValidator, ValidationReport};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};

/// Default inline annotation tag: `@link [#anchor](target)`
pub const DEFAULT_INLINE_LINK_PATTERN: &str = r"@link\s+\[#(?<anchor>.+?)\]\((?<link>.+?)\)";

/// Default rule file location, relative to the workspace root
pub const DEFAULT_RULES_PATH: &str = ".vscode/linker.json";

/// Reference point a path prefix resolves against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrefixBase {
    /// Workspace root
    Workspace,
    /// Directory of the current document
    Current,
    /// Parent of the current document's directory
    Parent,
    /// Resolves exactly like `Current`
    Child,
}

/// One entry of the prefix table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathPrefix {
    #[serde(skip)]
    pub prefix: String,
    pub base: PrefixBase,
    #[serde(default)]
    pub description: String,
}

/// Ordered mapping from literal prefix to its base.
///
/// Serialized as a JSON object keyed by prefix; entry order is significant
/// because lookup stops at the first prefix that matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefixTable {
    entries: Vec<PathPrefix>,
}

impl PathPrefixTable {
    /// An empty table (only absolute and workspace-relative resolution)
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append an entry, replacing any existing entry for the same prefix
    pub fn insert(
        &mut self,
        prefix: impl Into<String>,
        base: PrefixBase,
        description: impl Into<String>,
    ) {
        let prefix = prefix.into();
        let entry = PathPrefix {
            prefix: prefix.clone(),
            base,
            description: description.into(),
        };
        match self.entries.iter_mut().find(|e| e.prefix == prefix) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// First entry whose prefix starts `path`
    pub fn find_prefix(&self, path: &str) -> Option<&PathPrefix> {
        self.entries.iter().find(|e| path.starts_with(&e.prefix))
    }

    /// Lookup by exact prefix
    pub fn get(&self, prefix: &str) -> Option<&PathPrefix> {
        self.entries.iter().find(|e| e.prefix == prefix)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathPrefix> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PathPrefixTable {
    fn default() -> Self {
        let mut table = Self::empty();
        table.insert("#:", PrefixBase::Workspace, "Relative to workspace root");
        table.insert("~:", PrefixBase::Current, "Relative to current file directory");
        table.insert(
            "<:",
            PrefixBase::Parent,
            "Relative to parent of current file directory",
        );
        table.insert(
            ">:",
            PrefixBase::Child,
            "Relative to child directory of current file directory",
        );
        table
    }
}

impl Serialize for PathPrefixTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.prefix, entry)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PathPrefixTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = PathPrefixTable;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map from path prefix to {base, description}")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut table = PathPrefixTable::empty();
                while let Some((prefix, entry)) = access.next_entry::<String, PathPrefix>()? {
                    table.insert(prefix, entry.base, entry.description);
                }
                Ok(table)
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

/// Host-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkerSettings {
    /// Master switch
    pub enabled: bool,
    /// Verbose logging
    pub debug: bool,
    /// Run the inline annotation pass
    pub enable_inline_links: bool,
    /// Tag regex; must define `anchor` and `link` groups
    pub inline_link_pattern: String,
    pub path_prefixes: PathPrefixTable,
    /// Default for rules that leave `showInline` unset
    pub show_inline_default: bool,
    /// Rule file, relative to the workspace root unless absolute
    pub rules_path: PathBuf,
}

impl Default for LinkerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            debug: false,
            enable_inline_links: true,
            inline_link_pattern: DEFAULT_INLINE_LINK_PATTERN.to_string(),
            path_prefixes: PathPrefixTable::default(),
            show_inline_default: true,
            rules_path: PathBuf::from(DEFAULT_RULES_PATH),
        }
    }
}

impl LinkerSettings {
    /// Absolute location of the rule file for a workspace
    pub fn rules_file(&self, workspace_root: &Path) -> PathBuf {
        if self.rules_path.is_absolute() {
            self.rules_path.clone()
        } else {
            workspace_root.join(&self.rules_path)
        }
    }
}

/// Loader for the JSON rule file
pub struct RuleFile;

impl RuleFile {
    /// Load rules from disk. A missing file is not an error: it yields no rules.
    pub fn load(path: &Path) -> Result<Vec<LinkRule>> {
        if !path.exists() {
            log::debug!("No rule file at {}", path.display());
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(path)?;
        let rules = Self::parse(&content)?;
        log::info!("Loaded {} link rules from {}", rules.len(), path.display());
        Ok(rules)
    }

    /// Parse and validate rule-file text.
    pub fn parse(content: &str) -> Result<Vec<LinkRule>> {
        let rules = Self::parse_unvalidated(content)?;

        let report = RuleValidator::validate(&rules);
        if report.has_failures() {
            return Err(Error::validation_error(Self::first_failure(&report)));
        }

        Ok(rules)
    }

    /// Parse rule-file text without running the validator, so callers can
    /// report every issue instead of the first failure.
    pub fn parse_unvalidated(content: &str) -> Result<Vec<LinkRule>> {
        let content = content.trim();
        if content.is_empty() {
            log::warn!("Rule file is empty. No links will be active.");
            return Ok(Vec::new());
        }

        let value = match serde_json::from_str::<serde_json::Value>(content) {
            Ok(value) => value,
            Err(first_err) => {
                let repaired = repair_json(content);
                let value = serde_json::from_str(&repaired).map_err(|_| {
                    Error::parse_error(format!("Invalid JSON in rule file: {}", first_err))
                })?;
                log::warn!("Rule file had JSON syntax errors; loaded a repaired copy");
                value
            }
        };

        let links = match value {
            serde_json::Value::Array(_) => value,
            serde_json::Value::Object(mut map) => match map.remove("links") {
                Some(links @ serde_json::Value::Array(_)) => links,
                _ => {
                    return Err(Error::config_error(
                        "Expected array or object with \"links\" property",
                    ));
                }
            },
            _ => {
                return Err(Error::config_error(
                    "Expected array or object with \"links\" property",
                ));
            }
        };

        serde_json::from_value(links)
            .map_err(|e| Error::parse_error(format!("Invalid link configuration: {}", e)))
    }

    /// The example rule set wrapped the way `init` writes it to disk
    pub fn example_document() -> Result<String> {
        let document = serde_json::json!({ "links": Self::example() });
        crate::utils::to_json_string(&document, "example rules")
    }

    /// The starter rule set written by `init`
    pub fn example() -> Vec<LinkRule> {
        vec![
            LinkRule::new(
                "GitHub Repository",
                LinkKind::Url,
                "https://github.com/example/repo",
            )
            .with_pattern(
                Pattern::new(PatternKind::Text, "github.com/example/repo").with_case_sensitive(false),
            )
            .with_description("Example GitHub repository link"),
            LinkRule::new("Config File", LinkKind::File, "${workspaceFolder}/config.json")
                .with_pattern(Pattern::text("config.json").with_extensions([".js", ".ts", ".json"]))
                .with_description("Link to configuration file"),
        ]
    }

    fn first_failure(report: &ValidationReport) -> String {
        report
            .issues
            .iter()
            .find(|issue| issue.severity.is_failure())
            .map(|issue| issue.message.clone())
            .unwrap_or_else(|| "rule validation failed".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_prefix_table_order() {
        let table = PathPrefixTable::default();
        let prefixes: Vec<_> = table.iter().map(|p| p.prefix.as_str()).collect();
        assert_eq!(prefixes, vec!["#:", "~:", "<:", ">:"]);
        assert_eq!(table.get("<:").map(|p| p.base), Some(PrefixBase::Parent));
    }

    #[test]
    fn test_prefix_table_json_round_trip_keeps_order() {
        let json = r#"{"@/": {"base": "workspace", "description": "root"},
                       "./": {"base": "current"}}"#;
        let table: PathPrefixTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.find_prefix("@/src/lib.rs").map(|p| p.base), Some(PrefixBase::Workspace));

        let back = serde_json::to_string(&table).unwrap();
        assert!(back.find("@/").unwrap() < back.find("./").unwrap());
    }

    #[test]
    fn test_settings_defaults() {
        let settings = LinkerSettings::default();
        assert!(settings.enable_inline_links);
        assert_eq!(settings.inline_link_pattern, DEFAULT_INLINE_LINK_PATTERN);
        assert_eq!(
            settings.rules_file(Path::new("/ws")),
            PathBuf::from("/ws/.vscode/linker.json")
        );
    }

    #[test]
    fn test_settings_partial_json() {
        let settings: LinkerSettings = serde_json::from_str(r#"{"debug": true}"#).unwrap();
        assert!(settings.debug);
        assert_eq!(settings.path_prefixes.len(), 4);
    }

    #[test]
    fn test_settings_ignore_host_only_keys() {
        let settings: LinkerSettings =
            serde_json::from_str(r#"{"auto_reload": false, "enabled": false}"#).unwrap();
        assert!(!settings.enabled);
        assert!(serde_json::to_value(&settings).unwrap().get("auto_reload").is_none());
    }

    #[test]
    fn test_parse_bare_array_and_wrapped_object() {
        let bare = r#"[{"name": "A", "type": "url", "target": "https://a", "patterns": [{"type": "text", "value": "a"}]}]"#;
        assert_eq!(RuleFile::parse(bare).unwrap().len(), 1);

        let wrapped = format!(r#"{{"links": {}}}"#, bare);
        assert_eq!(RuleFile::parse(&wrapped).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_empty_is_no_rules() {
        assert!(RuleFile::parse("   \n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        let err = RuleFile::parse(r#"{"rules": []}"#).unwrap_err();
        assert!(matches!(err, Error::ConfigError { .. }));
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        let json = r#"[{"name": "A", "type": "command", "target": "x", "patterns": [{"type": "text", "value": "a"}]}]"#;
        let err = RuleFile::parse(json).unwrap_err();
        assert!(matches!(err, Error::ParseError { .. }));
    }

    #[test]
    fn test_parse_rejects_rule_without_patterns() {
        let json = r#"[{"name": "A", "type": "url", "target": "https://a", "patterns": []}]"#;
        let err = RuleFile::parse(json).unwrap_err();
        assert!(err.to_string().contains("No patterns defined"));
    }

    #[test]
    fn test_parse_repairs_trailing_commas_and_comments() {
        let json = r#"[
            // docs link
            {"name": "A", "type": "url", "target": "https://a", "patterns": [{"type": "text", "value": "a"},],},
        ]"#;
        let rules = RuleFile::parse(json).unwrap();
        assert_eq!(rules[0].target_template, "https://a");
    }

    #[test]
    fn test_parse_unvalidated_keeps_invalid_rules() {
        let json = r#"[{"name": "A", "type": "url", "target": "https://a", "patterns": []}]"#;
        let rules = RuleFile::parse_unvalidated(json).unwrap();
        assert_eq!(rules.len(), 1);
        assert!(RuleValidator::validate(&rules).has_failures());
    }

    #[test]
    fn test_example_document_parses_back() {
        let document = RuleFile::example_document().unwrap();
        assert!(document.trim_start().starts_with("{"));
        assert_eq!(RuleFile::parse(&document).unwrap(), RuleFile::example());
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let rules = RuleFile::load(&temp.path().join("missing.json")).unwrap();
        assert!(rules.is_empty());
    }

    #[test]
    fn test_load_example_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("linker.json");
        let json = serde_json::to_string_pretty(&RuleFile::example()).unwrap();
        std::fs::write(&path, json).unwrap();

        let rules = RuleFile::load(&path).unwrap();
        assert_eq!(rules, RuleFile::example());
    }
}
