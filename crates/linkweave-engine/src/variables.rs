//! `${...}` template substitution for rule targets.
//!
//! Substitution is a single left-to-right pass: every token is looked up
//! once and the substituted text is never scanned again, so a value that
//! itself contains `${...}` comes through literally. Unknown or unavailable
//! tokens are left byte-for-byte unchanged.

use linkweave_core::Match;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::path_resolver::dirname;

/// Any `${name}` token
static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

/// Source of `${env:NAME}` values
pub trait Environment {
    fn var(&self, name: &str) -> Option<String>;
}

/// Reads the environment of the running process
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Host-level values: `${cwd}`, `${userHome}`, `${appName}`, `${appRoot}`,
/// `${execPath}`. Unset fields leave their token in place.
#[derive(Debug, Clone, Default)]
pub struct HostInfo {
    pub cwd: Option<PathBuf>,
    pub user_home: Option<PathBuf>,
    pub app_name: Option<String>,
    pub app_root: Option<PathBuf>,
    pub exec_path: Option<PathBuf>,
}

impl HostInfo {
    /// Populate from the running process
    pub fn from_process() -> Self {
        let exec_path = std::env::current_exe().ok();
        Self {
            cwd: std::env::current_dir().ok(),
            user_home: std::env::var_os("HOME")
                .or_else(|| std::env::var_os("USERPROFILE"))
                .map(PathBuf::from),
            app_name: Some(env!("CARGO_PKG_NAME").to_string()),
            app_root: exec_path.as_deref().and_then(Path::parent).map(Path::to_path_buf),
            exec_path,
        }
    }
}

/// The document the user is looking at
#[derive(Debug, Clone, Default)]
pub struct ActiveDocument {
    pub path: PathBuf,
    /// Zero-based line of the cursor
    pub cursor_line: usize,
    pub selected_text: Option<String>,
}

impl ActiveDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cursor_line: 0,
            selected_text: None,
        }
    }

    pub fn with_cursor_line(mut self, line: usize) -> Self {
        self.cursor_line = line;
        self
    }

    pub fn with_selection(mut self, text: impl Into<String>) -> Self {
        self.selected_text = Some(text.into());
        self
    }
}

/// Everything a template may refer to
#[derive(Clone, Copy)]
pub struct VariableContext<'a> {
    pub workspace_root: Option<&'a Path>,
    /// Display name of the workspace; defaults to the root's last component
    pub workspace_name: Option<&'a str>,
    pub document: Option<&'a ActiveDocument>,
    pub env: &'a dyn Environment,
    pub host: &'a HostInfo,
    pub full_match: Option<&'a str>,
    /// Index 0 is the whole match
    pub capture_groups: Option<&'a [Option<String>]>,
}

impl<'a> VariableContext<'a> {
    /// A context with no workspace, document or captures
    pub fn new(env: &'a dyn Environment, host: &'a HostInfo) -> Self {
        Self {
            workspace_root: None,
            workspace_name: None,
            document: None,
            env,
            host,
            full_match: None,
            capture_groups: None,
        }
    }

    pub fn with_workspace(mut self, root: &'a Path) -> Self {
        self.workspace_root = Some(root);
        self
    }

    pub fn with_workspace_name(mut self, name: &'a str) -> Self {
        self.workspace_name = Some(name);
        self
    }

    pub fn with_document(mut self, document: &'a ActiveDocument) -> Self {
        self.document = Some(document);
        self
    }

    /// Expose a match's capture groups as `${0}`, `${1}`, ...
    pub fn with_match(mut self, m: &'a Match<'_>) -> Self {
        self.full_match = m.full_match.as_deref();
        self.capture_groups = m.capture_groups.as_deref();
        self
    }
}

/// Template substitution
pub struct VariableResolver;

impl VariableResolver {
    /// Substitute every recognised token in `template`.
    ///
    /// # Example
    /// ```
    /// use linkweave_engine::{ActiveDocument, HostInfo, ProcessEnvironment, VariableContext, VariableResolver};
    /// use std::path::Path;
    ///
    /// let host = HostInfo::default();
    /// let doc = ActiveDocument::new("/ws/src/a.ts");
    /// let ctx = VariableContext::new(&ProcessEnvironment, &host)
    ///     .with_workspace(Path::new("/ws"))
    ///     .with_document(&doc);
    ///
    /// assert_eq!(VariableResolver::resolve("${workspaceFolder}/${fileBasename}", &ctx), "/ws/a.ts");
    /// assert_eq!(VariableResolver::resolve("${nope}", &ctx), "${nope}");
    /// ```
    pub fn resolve(template: &str, ctx: &VariableContext<'_>) -> String {
        TOKEN
            .replace_all(template, |caps: &Captures<'_>| {
                Self::lookup(&caps[1], ctx).unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    /// `${...}` tokens still present in `text`, in order of appearance
    pub fn unresolved_tokens(text: &str) -> Vec<&str> {
        TOKEN.find_iter(text).map(|m| m.as_str()).collect()
    }

    fn lookup(name: &str, ctx: &VariableContext<'_>) -> Option<String> {
        if let Some(var) = name.strip_prefix("env:") {
            return ctx.env.var(var).filter(|value| !value.is_empty());
        }

        if name.bytes().all(|b| b.is_ascii_digit()) {
            let index: usize = name.parse().ok()?;
            return ctx
                .capture_groups?
                .get(index)?
                .clone()
                .filter(|group| !group.is_empty());
        }

        let document = ctx.document.map(|d| d.path.as_path());

        match name {
            "workspaceFolder" => ctx.workspace_root.map(path_string),
            "workspaceFolderBasename" => {
                let root = ctx.workspace_root?;
                ctx.workspace_name
                    .map(str::to_string)
                    .or_else(|| root.file_name().map(|n| n.to_string_lossy().into_owned()))
            }
            "file" => document.map(path_string),
            "fileBasename" => document?
                .file_name()
                .map(|n| n.to_string_lossy().into_owned()),
            "fileDirname" => document.map(|doc| path_string(&dirname(doc))),
            "fileExtname" => document.map(|doc| {
                doc.extension()
                    .map(|ext| format!(".{}", ext.to_string_lossy()))
                    .unwrap_or_default()
            }),
            "relativeFile" => relative_file(document?, ctx.workspace_root?).map(|rel| path_string(&rel)),
            "relativeFileDirname" => relative_file(document?, ctx.workspace_root?)
                .map(|rel| path_string(&dirname(&rel))),
            "lineNumber" => ctx.document.map(|d| (d.cursor_line + 1).to_string()),
            "selectedText" => ctx
                .document?
                .selected_text
                .clone()
                .filter(|text| !text.is_empty()),
            "cwd" => ctx.host.cwd.as_deref().map(path_string),
            "userHome" => ctx.host.user_home.as_deref().map(path_string),
            "appName" => ctx.host.app_name.clone(),
            "appRoot" => ctx.host.app_root.as_deref().map(path_string),
            "execPath" => ctx.host.exec_path.as_deref().map(path_string),
            _ => None,
        }
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn relative_file(document: &Path, workspace_root: &Path) -> Option<PathBuf> {
    pathdiff::diff_paths(document, workspace_root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkweave_core::{LinkKind, LinkRule, Pattern, TextRange};

    fn env() -> HashMap<String, String> {
        HashMap::from([
            ("API_HOST".to_string(), "api.internal".to_string()),
            ("EMPTY".to_string(), String::new()),
        ])
    }

    fn host() -> HostInfo {
        HostInfo {
            cwd: Some(PathBuf::from("/home/dev/ws")),
            user_home: Some(PathBuf::from("/home/dev")),
            app_name: Some("linkweave".to_string()),
            app_root: None,
            exec_path: Some(PathBuf::from("/usr/bin/linkweave")),
        }
    }

    #[test]
    fn test_workspace_and_file_tokens() {
        let env = env();
        let host = host();
        let doc = ActiveDocument::new("/ws/src/lib/a.ts").with_cursor_line(9);
        let ctx = VariableContext::new(&env, &host)
            .with_workspace(Path::new("/ws"))
            .with_document(&doc);

        let cases = [
            ("${workspaceFolder}/${fileBasename}", "/ws/a.ts"),
            ("${workspaceFolderBasename}", "ws"),
            ("${file}", "/ws/src/lib/a.ts"),
            ("${fileDirname}", "/ws/src/lib"),
            ("${fileExtname}", ".ts"),
            ("${relativeFile}", "src/lib/a.ts"),
            ("${relativeFileDirname}", "src/lib"),
            ("L${lineNumber}", "L10"),
        ];
        for (template, expected) in cases {
            assert_eq!(VariableResolver::resolve(template, &ctx), expected, "{template}");
        }
    }

    #[test]
    fn test_workspace_name_overrides_basename() {
        let env = env();
        let host = host();
        let ctx = VariableContext::new(&env, &host)
            .with_workspace(Path::new("/ws"))
            .with_workspace_name("Main");
        assert_eq!(VariableResolver::resolve("${workspaceFolderBasename}", &ctx), "Main");
    }

    #[test]
    fn test_relative_file_dirname_at_root_is_dot() {
        let env = env();
        let host = host();
        let doc = ActiveDocument::new("/ws/a.ts");
        let ctx = VariableContext::new(&env, &host)
            .with_workspace(Path::new("/ws"))
            .with_document(&doc);
        assert_eq!(VariableResolver::resolve("${relativeFileDirname}", &ctx), ".");
    }

    #[test]
    fn test_env_tokens() {
        let env = env();
        let host = host();
        let ctx = VariableContext::new(&env, &host);
        assert_eq!(
            VariableResolver::resolve("https://${env:API_HOST}/x", &ctx),
            "https://api.internal/x"
        );
        assert_eq!(VariableResolver::resolve("${env:MISSING}", &ctx), "${env:MISSING}");
        assert_eq!(VariableResolver::resolve("${env:EMPTY}", &ctx), "${env:EMPTY}");
    }

    #[test]
    fn test_selected_text_only_when_non_empty() {
        let env = env();
        let host = host();
        let with = ActiveDocument::new("/ws/a.ts").with_selection("needle");
        let without = ActiveDocument::new("/ws/a.ts").with_selection("");

        let ctx = VariableContext::new(&env, &host).with_document(&with);
        assert_eq!(VariableResolver::resolve("q=${selectedText}", &ctx), "q=needle");

        let ctx = VariableContext::new(&env, &host).with_document(&without);
        assert_eq!(VariableResolver::resolve("q=${selectedText}", &ctx), "q=${selectedText}");
    }

    #[test]
    fn test_host_tokens() {
        let env = env();
        let host = host();
        let ctx = VariableContext::new(&env, &host);
        assert_eq!(
            VariableResolver::resolve("${userHome}|${cwd}|${appName}|${execPath}", &ctx),
            "/home/dev|/home/dev/ws|linkweave|/usr/bin/linkweave"
        );
        assert_eq!(VariableResolver::resolve("${appRoot}", &ctx), "${appRoot}");
    }

    #[test]
    fn test_missing_context_leaves_tokens() {
        let env = env();
        let host = HostInfo::default();
        let ctx = VariableContext::new(&env, &host);
        let template = "${workspaceFolder}/${file}/${relativeFile}/${lineNumber}/${1}";
        let resolved = VariableResolver::resolve(template, &ctx);
        assert_eq!(resolved, template);
        assert_eq!(
            VariableResolver::unresolved_tokens(&resolved),
            vec!["${workspaceFolder}", "${file}", "${relativeFile}", "${lineNumber}", "${1}"]
        );
    }

    #[test]
    fn test_unknown_and_malformed_tokens_verbatim() {
        let env = env();
        let host = host();
        let ctx = VariableContext::new(&env, &host);
        assert_eq!(VariableResolver::resolve("${nope}", &ctx), "${nope}");
        assert_eq!(VariableResolver::resolve("${}", &ctx), "${}");
        assert_eq!(VariableResolver::resolve("${unterminated", &ctx), "${unterminated");
        assert_eq!(VariableResolver::resolve("$workspaceFolder", &ctx), "$workspaceFolder");
    }

    #[test]
    fn test_capture_group_tokens() {
        let env = env();
        let host = host();
        let rule = LinkRule::new("Issue", LinkKind::Url, "https://t/${1}")
            .with_pattern(Pattern::regex(r"(\w+)-(\d+)(x)?"));
        let m = Match {
            rule: &rule,
            pattern: &rule.patterns[0],
            range: TextRange::new(0, 8),
            highlighted_text: "PROJ-123".to_string(),
            full_match: Some("PROJ-123".to_string()),
            capture_groups: Some(vec![
                Some("PROJ-123".to_string()),
                Some("PROJ".to_string()),
                Some("123".to_string()),
                None,
            ]),
        };
        let ctx = VariableContext::new(&env, &host).with_match(&m);

        assert_eq!(
            VariableResolver::resolve("https://t/${1}/issue/${2}?q=${0}", &ctx),
            "https://t/PROJ/issue/123?q=PROJ-123"
        );
        // non-participating and out-of-range groups stay verbatim
        assert_eq!(VariableResolver::resolve("${3}${9}", &ctx), "${3}${9}");
    }

    #[test]
    fn test_substituted_values_are_not_rescanned() {
        let mut env = env();
        env.insert("TRICKY".to_string(), "${env:API_HOST}".to_string());
        let host = host();
        let ctx = VariableContext::new(&env, &host);
        assert_eq!(VariableResolver::resolve("${env:TRICKY}", &ctx), "${env:API_HOST}");
    }
}
