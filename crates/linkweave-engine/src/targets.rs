//! Turning matches into navigation targets.
//!
//! A `url` rule yields a validated URL; a `file` rule yields an absolute path
//! plus an optional line/column taken from the matched text, and a hint
//! whether the file should open in the editor or in the system handler.

use linkweave_core::{Error, LinkKind, Match, PatternKind, Result, file_extension};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::path_resolver::PathResolver;
use crate::variables::{VariableContext, VariableResolver};

/// `file.ts:12` or `file.ts:12:5`
static LINE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":(\d+)(?::(\d+))?").unwrap());

/// Extensions opened as text; anything else goes to the system handler
pub const TEXT_FILE_EXTENSIONS: &[&str] = &[
    // source
    ".txt", ".md", ".json", ".js", ".ts", ".jsx", ".tsx", ".py", ".java", ".cpp", ".c", ".h",
    ".hpp", ".cs", ".php", ".rb", ".go", ".rs", ".swift", ".kt", ".scala", ".html", ".css",
    ".scss", ".sass", ".less", ".xml", ".yaml", ".yml", ".toml", ".ini", ".cfg", ".conf", ".log",
    ".sql", ".sh", ".bash", ".zsh", ".fish", ".dockerfile", ".gitignore", ".gitattributes",
    ".editorconfig", ".eslintrc", ".prettierrc", ".babelrc", ".env", ".env.example",
    ".env.local", ".env.production",
    // documents and data
    ".csv", ".tsv", ".rss", ".atom", ".rdf", ".svg", ".tex", ".rst", ".adoc", ".wiki", ".text",
    ".asc", ".rtf", ".odt", ".fodt", ".sxw", ".stw",
];

/// Whether a file opens as text. Files without an extension count as text.
pub fn is_text_file(path: &Path) -> bool {
    let extension = file_extension(path).to_lowercase();
    extension.is_empty() || TEXT_FILE_EXTENSIONS.contains(&extension.as_str())
}

/// Icon shown for rules that do not set one
pub fn default_icon(kind: LinkKind) -> &'static str {
    match kind {
        LinkKind::Url => "🌐",
        LinkKind::File => "📁",
    }
}

/// Where following a link leads
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ResolvedTarget {
    Url {
        url: String,
    },
    File {
        path: PathBuf,
        /// 1-based
        #[serde(skip_serializing_if = "Option::is_none")]
        line: Option<u32>,
        /// 1-based
        #[serde(skip_serializing_if = "Option::is_none")]
        column: Option<u32>,
        is_text: bool,
    },
}

impl ResolvedTarget {
    /// Classify an inline annotation href: anything with a URL scheme is a
    /// URL, everything else a file path.
    pub fn from_href(href: &str) -> Self {
        match url::Url::parse(href) {
            // single-letter schemes are Windows drive letters
            Ok(url) if url.scheme().len() > 1 => Self::Url {
                url: href.to_string(),
            },
            _ => {
                let path = PathBuf::from(href);
                let is_text = is_text_file(&path);
                Self::File {
                    path,
                    line: None,
                    column: None,
                    is_text,
                }
            }
        }
    }

    pub fn is_url(&self) -> bool {
        matches!(self, Self::Url { .. })
    }
}

impl fmt::Display for ResolvedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url { url } => write!(f, "{}", url),
            Self::File {
                path, line, column, ..
            } => {
                write!(f, "{}", path.display())?;
                if let Some(line) = line {
                    write!(f, ":{}", line)?;
                    if let Some(column) = column {
                        write!(f, ":{}", column)?;
                    }
                }
                Ok(())
            }
        }
    }
}

/// Resolves a match's rule target into a [`ResolvedTarget`]
#[derive(Debug, Clone, Default)]
pub struct TargetResolver {
    paths: PathResolver,
}

impl TargetResolver {
    pub fn new(paths: PathResolver) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &PathResolver {
        &self.paths
    }

    /// Resolve the target of `m`'s rule.
    ///
    /// Capture-group tokens (`${1}`) are only filled from regex matches.
    pub fn resolve_target(&self, m: &Match<'_>, ctx: &VariableContext<'_>) -> Result<ResolvedTarget> {
        let resolved = Self::substitute(m, ctx);

        match m.rule.kind {
            LinkKind::Url => {
                url::Url::parse(&resolved)
                    .map_err(|_| Error::invalid_target(format!("Invalid URL: {}", resolved)))?;
                Ok(ResolvedTarget::Url { url: resolved })
            }
            LinkKind::File => {
                let document = ctx.document.map(|d| d.path.as_path());
                let path = self.paths.resolve(&resolved, document, ctx.workspace_root);
                if !path.is_absolute() {
                    return Err(Error::invalid_target(
                        "No workspace folder found for relative path",
                    ));
                }

                let (line, column) = line_and_column(&m.highlighted_text);
                let is_text = is_text_file(&path);
                Ok(ResolvedTarget::File {
                    path,
                    line,
                    column,
                    is_text,
                })
            }
        }
    }

    /// One-line description of where `m` leads, without validating it
    pub fn preview(&self, m: &Match<'_>, ctx: &VariableContext<'_>) -> String {
        let resolved = Self::substitute(m, ctx);
        match m.rule.kind {
            LinkKind::Url => format!("URL: {}", resolved),
            LinkKind::File => format!("File: {}", resolved),
        }
    }

    fn substitute(m: &Match<'_>, ctx: &VariableContext<'_>) -> String {
        let ctx = if m.pattern.kind == PatternKind::Regex {
            ctx.with_match(m)
        } else {
            VariableContext {
                full_match: None,
                capture_groups: None,
                ..*ctx
            }
        };
        VariableResolver::resolve(&m.rule.target_template, &ctx)
    }
}

/// Line and column suffix (`:12`, `:12:5`) found in matched text
pub fn line_and_column(text: &str) -> (Option<u32>, Option<u32>) {
    match LINE_SUFFIX.captures(text) {
        Some(caps) => (
            caps.get(1).and_then(|m| m.as_str().parse().ok()),
            caps.get(2).and_then(|m| m.as_str().parse().ok()),
        ),
        None => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variables::{ActiveDocument, HostInfo};
    use linkweave_core::{LinkRule, Pattern, TextRange};
    use std::collections::HashMap;

    fn text_match<'a>(rule: &'a LinkRule, text: &str) -> Match<'a> {
        Match {
            rule,
            pattern: &rule.patterns[0],
            range: TextRange::new(0, text.len()),
            highlighted_text: text.to_string(),
            full_match: None,
            capture_groups: None,
        }
    }

    #[test]
    fn test_url_rule_with_captures() {
        let rule = LinkRule::new("Issue", LinkKind::Url, "https://tracker/${1}")
            .with_pattern(Pattern::regex(r"ISSUE-(\d+)"));
        let m = Match {
            full_match: Some("ISSUE-7".to_string()),
            capture_groups: Some(vec![Some("ISSUE-7".to_string()), Some("7".to_string())]),
            ..text_match(&rule, "ISSUE-7")
        };
        let env: HashMap<String, String> = HashMap::new();
        let host = HostInfo::default();
        let ctx = VariableContext::new(&env, &host);

        let target = TargetResolver::default().resolve_target(&m, &ctx).unwrap();
        assert_eq!(
            target,
            ResolvedTarget::Url {
                url: "https://tracker/7".to_string()
            }
        );
    }

    #[test]
    fn test_capture_tokens_ignored_for_text_patterns() {
        let rule = LinkRule::new("T", LinkKind::Url, "https://x/${1}").with_pattern(Pattern::text("x"));
        let m = Match {
            capture_groups: Some(vec![Some("x".to_string()), Some("y".to_string())]),
            ..text_match(&rule, "x")
        };
        let env: HashMap<String, String> = HashMap::new();
        let host = HostInfo::default();
        let ctx = VariableContext::new(&env, &host);
        assert_eq!(TargetResolver::default().preview(&m, &ctx), "URL: https://x/${1}");
    }

    #[test]
    fn test_invalid_url() {
        let rule = LinkRule::new("Bad", LinkKind::Url, "${workspaceFolder}/x").with_pattern(Pattern::text("x"));
        let m = text_match(&rule, "x");
        let env: HashMap<String, String> = HashMap::new();
        let host = HostInfo::default();
        let ctx = VariableContext::new(&env, &host);

        let err = TargetResolver::default().resolve_target(&m, &ctx).unwrap_err();
        assert!(matches!(err, Error::InvalidTarget { .. }));
        assert!(err.to_string().contains("Invalid URL: ${workspaceFolder}/x"));
    }

    #[test]
    fn test_file_rule_resolves_prefix_and_line() {
        let rule = LinkRule::new("Guide", LinkKind::File, "#:docs/guide.md")
            .with_pattern(Pattern::regex(r"guide:\d+"));
        let m = text_match(&rule, "guide:42:7");
        let env: HashMap<String, String> = HashMap::new();
        let host = HostInfo::default();
        let doc = ActiveDocument::new("/ws/src/a.ts");
        let ctx = VariableContext::new(&env, &host)
            .with_workspace(Path::new("/ws"))
            .with_document(&doc);

        let target = TargetResolver::default().resolve_target(&m, &ctx).unwrap();
        assert_eq!(
            target,
            ResolvedTarget::File {
                path: PathBuf::from("/ws/docs/guide.md"),
                line: Some(42),
                column: Some(7),
                is_text: true,
            }
        );
        assert_eq!(target.to_string(), "/ws/docs/guide.md:42:7");
    }

    #[test]
    fn test_file_rule_relative_without_workspace() {
        let rule = LinkRule::new("Cfg", LinkKind::File, "config.json").with_pattern(Pattern::text("cfg"));
        let m = text_match(&rule, "cfg");
        let env: HashMap<String, String> = HashMap::new();
        let host = HostInfo::default();
        let ctx = VariableContext::new(&env, &host);

        let err = TargetResolver::default().resolve_target(&m, &ctx).unwrap_err();
        assert_eq!(err.to_string(), "Invalid target: No workspace folder found for relative path");
    }

    #[test]
    fn test_binary_file_flag() {
        let rule = LinkRule::new("Logo", LinkKind::File, "${workspaceFolder}/logo.PNG")
            .with_pattern(Pattern::text("logo"));
        let m = text_match(&rule, "logo");
        let env: HashMap<String, String> = HashMap::new();
        let host = HostInfo::default();
        let ctx = VariableContext::new(&env, &host).with_workspace(Path::new("/ws"));

        let target = TargetResolver::default().resolve_target(&m, &ctx).unwrap();
        assert!(matches!(target, ResolvedTarget::File { is_text: false, line: None, .. }));
        assert_eq!(TargetResolver::default().preview(&m, &ctx), "File: /ws/logo.PNG");
    }

    #[test]
    fn test_is_text_file() {
        assert!(is_text_file(Path::new("/ws/README.md")));
        assert!(is_text_file(Path::new("/ws/Main.RS")));
        assert!(is_text_file(Path::new("/ws/Makefile")));
        assert!(is_text_file(Path::new("/ws/.gitignore")));
        assert!(!is_text_file(Path::new("/ws/report.pdf")));
    }

    #[test]
    fn test_from_href() {
        assert!(ResolvedTarget::from_href("https://example.com").is_url());
        assert!(ResolvedTarget::from_href("mailto:dev@example.com").is_url());
        assert!(!ResolvedTarget::from_href("/ws/helper.ts").is_url());
        assert!(!ResolvedTarget::from_href("C:/ws/helper.ts").is_url());
        assert!(!ResolvedTarget::from_href("helper").is_url());
    }

    #[test]
    fn test_line_and_column() {
        assert_eq!(line_and_column("a.ts:10"), (Some(10), None));
        assert_eq!(line_and_column("a.ts:10:3"), (Some(10), Some(3)));
        assert_eq!(line_and_column("a.ts"), (None, None));
    }

    #[test]
    fn test_default_icons() {
        assert_eq!(default_icon(LinkKind::Url), "🌐");
        assert_eq!(default_icon(LinkKind::File), "📁");
    }
}
