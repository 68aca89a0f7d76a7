//! Command implementations.
//!
//! Each command does its own filesystem access (reading the scanned file,
//! loading or writing the rule file) and returns a serializable report; the
//! engine underneath stays pure.

use linkweave_core::{
    Error, LineIndex, LinkKind, LinkerSettings, PrefixBase, Result, RuleFile, RuleValidator,
    Severity, ValidationReport, normalize_lexically,
};
use linkweave_engine::{
    ActiveDocument, HostInfo, LinkEngine, PathResolver, ProcessEnvironment, ResolvedTarget,
    VariableContext, VariableResolver, default_icon,
};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::output::Render;

/// Make a user path absolute against the current directory, without
/// touching the filesystem beyond reading the current directory.
fn absolute(path: &Path) -> Result<PathBuf> {
    Ok(normalize_lexically(&std::path::absolute(path)?))
}

/// Workspace root given on the command line, else the current directory
fn workspace_or_cwd(workspace: Option<&Path>) -> Result<PathBuf> {
    match workspace {
        Some(root) => absolute(root),
        None => Ok(std::env::current_dir()?),
    }
}

// ============================================================================
// scan
// ============================================================================

/// Arguments of `linkweave scan`
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub file: PathBuf,
    /// Rule file; defaults to the settings' rules path under the workspace
    pub rules: Option<PathBuf>,
    pub workspace: Option<PathBuf>,
    pub inline_links: bool,
}

/// One rule match with its resolved target
#[derive(Debug, Clone, Serialize)]
pub struct MatchEntry {
    pub rule: String,
    pub kind: LinkKind,
    pub icon: String,
    pub line: usize,
    pub column: usize,
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub show_inline: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<ResolvedTarget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One comment-to-code pairing
#[derive(Debug, Clone, Serialize)]
pub struct AnnotationEntry {
    pub anchor: String,
    pub href: String,
    pub line: usize,
    pub column: usize,
    pub comment_line: usize,
    pub target: ResolvedTarget,
}

/// Result of scanning one file
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub file: PathBuf,
    pub rules_path: PathBuf,
    pub rule_count: usize,
    pub matches: Vec<MatchEntry>,
    pub annotations: Vec<AnnotationEntry>,
}

/// Scan a file for rule matches and inline annotations
pub fn scan(settings: &LinkerSettings, options: &ScanOptions) -> Result<ScanReport> {
    if !options.file.exists() {
        return Err(Error::file_not_found(&options.file));
    }
    let text = std::fs::read_to_string(&options.file)?;

    let workspace = workspace_or_cwd(options.workspace.as_deref())?;
    let rules_path = match &options.rules {
        Some(path) => absolute(path)?,
        None => settings.rules_file(&workspace),
    };
    let rules = RuleFile::load(&rules_path)?;
    let rule_count = rules.len();

    let mut engine = LinkEngine::new(settings, rules);
    if !options.inline_links {
        engine = engine.without_inline_links();
    }

    let document_path = absolute(&options.file)?;
    let scan = engine.scan(&text, Some(&document_path), Some(&workspace));
    let index = LineIndex::new(&text);

    let host = HostInfo::from_process();
    let env = ProcessEnvironment;

    let matches = scan
        .matches
        .iter()
        .map(|m| {
            let (line, column) = index.line_col(m.range.start);
            let document =
                ActiveDocument::new(&document_path).with_cursor_line(index.line_of(m.range.start));
            let ctx = VariableContext::new(&env, &host)
                .with_workspace(&workspace)
                .with_document(&document);

            let (target, error) = match engine.targets().resolve_target(m, &ctx) {
                Ok(target) => (Some(target), None),
                Err(e) => {
                    log::warn!("Cannot resolve target of {:?}: {}", m.rule.name, e);
                    (None, Some(e.to_string()))
                }
            };

            MatchEntry {
                rule: m.rule.name.clone(),
                kind: m.rule.kind,
                icon: m
                    .rule
                    .icon
                    .clone()
                    .unwrap_or_else(|| default_icon(m.rule.kind).to_string()),
                line,
                column,
                start: m.range.start,
                end: m.range.end,
                text: m.highlighted_text.clone(),
                show_inline: engine.shows_inline(m.rule),
                target,
                error,
            }
        })
        .collect();

    let annotations = scan
        .annotations
        .iter()
        .map(|a| {
            let (line, column) = index.line_col(a.code_range.start);
            AnnotationEntry {
                anchor: a.anchor.clone(),
                href: a.href.clone(),
                line,
                column,
                comment_line: index.line_col(a.comment_range.start).0,
                target: ResolvedTarget::from_href(&a.href),
            }
        })
        .collect();

    Ok(ScanReport {
        file: options.file.clone(),
        rules_path,
        rule_count,
        matches,
        annotations,
    })
}

impl Render for ScanReport {
    fn human(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "📄 File: {}", self.file.display());
        let _ = writeln!(
            out,
            "📋 Rules: {} ({} loaded)",
            self.rules_path.display(),
            self.rule_count
        );

        let _ = writeln!(out, "\n🔗 Matches ({}):", self.matches.len());
        if self.matches.is_empty() {
            out.push_str("  (none)\n");
        }
        for m in &self.matches {
            let destination = match (&m.target, &m.error) {
                (Some(target), _) => target.to_string(),
                (None, Some(error)) => format!("⚠️  {}", error),
                (None, None) => String::new(),
            };
            let _ = writeln!(
                out,
                "  {} {}  {}:{}  {:?} -> {}",
                m.icon, m.rule, m.line, m.column, m.text, destination
            );
        }

        let _ = writeln!(out, "\n📌 Inline annotations ({}):", self.annotations.len());
        if self.annotations.is_empty() {
            out.push_str("  (none)\n");
        }
        for a in &self.annotations {
            let _ = writeln!(out, "  {}:{}  #{} -> {}", a.line, a.column, a.anchor, a.href);
        }

        out.trim_end().to_string()
    }

    fn text(&self) -> String {
        let mut lines = Vec::new();
        for m in &self.matches {
            let destination = m
                .target
                .as_ref()
                .map(ToString::to_string)
                .or_else(|| m.error.clone())
                .unwrap_or_default();
            lines.push(format!(
                "{}:{}\t{}\t{}\t{}",
                m.line, m.column, m.rule, m.text, destination
            ));
        }
        for a in &self.annotations {
            lines.push(format!("{}:{}\t#{}\t{}", a.line, a.column, a.anchor, a.href));
        }
        lines.join("\n")
    }
}

// ============================================================================
// resolve-path
// ============================================================================

/// Result of resolving one path
#[derive(Debug, Clone, Serialize)]
pub struct PathReport {
    pub input: String,
    pub resolved: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<PrefixBase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Resolve a possibly-prefixed path
pub fn resolve_path(
    settings: &LinkerSettings,
    input: &str,
    document: Option<&Path>,
    workspace: Option<&Path>,
) -> Result<PathReport> {
    let document = document.map(absolute).transpose()?;
    let workspace = workspace.map(absolute).transpose()?;

    let resolver = PathResolver::new(settings.path_prefixes.clone());
    let resolved = resolver.resolve(input, document.as_deref(), workspace.as_deref());
    let entry = settings.path_prefixes.find_prefix(input);

    Ok(PathReport {
        input: input.to_string(),
        resolved,
        prefix: entry.map(|e| e.prefix.clone()),
        base: entry.map(|e| e.base),
        description: entry.map(|e| e.description.clone()),
    })
}

impl Render for PathReport {
    fn human(&self) -> String {
        let mut out = format!("📍 Input: {}\n", self.input);
        if let Some(prefix) = &self.prefix {
            let _ = writeln!(
                out,
                "🏷️  Prefix: {} ({})",
                prefix,
                self.description.as_deref().unwrap_or_default()
            );
        }
        let _ = write!(out, "➡️  Resolved: {}", self.resolved.display());
        out
    }

    fn text(&self) -> String {
        self.resolved.display().to_string()
    }
}

// ============================================================================
// resolve-vars
// ============================================================================

/// Result of substituting a template
#[derive(Debug, Clone, Serialize)]
pub struct VarsReport {
    pub template: String,
    pub resolved: String,
    pub unresolved: Vec<String>,
}

/// Substitute `${...}` tokens using the process environment.
///
/// `line` is 1-based, as shown in editors.
pub fn resolve_vars(
    template: &str,
    document: Option<&Path>,
    workspace: Option<&Path>,
    line: Option<usize>,
) -> Result<VarsReport> {
    let workspace = workspace.map(absolute).transpose()?;
    let document = document
        .map(absolute)
        .transpose()?
        .map(|path| ActiveDocument::new(path).with_cursor_line(line.unwrap_or(1).saturating_sub(1)));

    let host = HostInfo::from_process();
    let env = ProcessEnvironment;
    let mut ctx = VariableContext::new(&env, &host);
    if let Some(root) = workspace.as_deref() {
        ctx = ctx.with_workspace(root);
    }
    if let Some(document) = document.as_ref() {
        ctx = ctx.with_document(document);
    }

    let resolved = VariableResolver::resolve(template, &ctx);
    let unresolved = VariableResolver::unresolved_tokens(&resolved)
        .into_iter()
        .map(str::to_string)
        .collect();

    Ok(VarsReport {
        template: template.to_string(),
        resolved,
        unresolved,
    })
}

impl Render for VarsReport {
    fn human(&self) -> String {
        let mut out = format!("📝 Template: {}\n➡️  Resolved: {}", self.template, self.resolved);
        if !self.unresolved.is_empty() {
            let _ = write!(out, "\n⚠️  Unresolved: {}", self.unresolved.join(", "));
        }
        out
    }

    fn text(&self) -> String {
        self.resolved.clone()
    }
}

// ============================================================================
// validate
// ============================================================================

/// Validation result for a rule file
#[derive(Debug, Clone, Serialize)]
pub struct ValidateReport {
    pub rules_path: PathBuf,
    pub rule_count: usize,
    pub report: ValidationReport,
}

impl ValidateReport {
    pub fn passed(&self) -> bool {
        self.report.passed
    }
}

/// Validate a rule file, collecting every issue
pub fn validate(rules_path: &Path) -> Result<ValidateReport> {
    if !rules_path.exists() {
        return Err(Error::file_not_found(rules_path));
    }
    let content = std::fs::read_to_string(rules_path)?;
    let rules = RuleFile::parse_unvalidated(&content)?;
    let report = RuleValidator::validate(&rules);

    log::info!(
        "Validated {} rules: {} errors, {} warnings",
        rules.len(),
        report.summary.error_count,
        report.summary.warning_count
    );

    Ok(ValidateReport {
        rules_path: rules_path.to_path_buf(),
        rule_count: rules.len(),
        report,
    })
}

fn severity_icon(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "ℹ️ ",
        Severity::Warning => "⚠️ ",
        Severity::Error => "❌",
    }
}

impl Render for ValidateReport {
    fn human(&self) -> String {
        let mut out = format!(
            "📋 Rules: {} ({} rules)\n",
            self.rules_path.display(),
            self.rule_count
        );
        out.push_str(if self.report.passed {
            "Status: ✅ Passed\n"
        } else {
            "Status: ❌ Failed\n"
        });

        for issue in &self.report.issues {
            let location = issue
                .pattern
                .map(|i| format!(" (pattern {})", i))
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "  {} [{}] {}{}",
                severity_icon(issue.severity),
                issue.rule,
                issue.message,
                location
            );
        }

        let summary = &self.report.summary;
        let _ = write!(
            out,
            "Summary: {} errors, {} warnings, {} info",
            summary.error_count, summary.warning_count, summary.info_count
        );
        out
    }

    fn text(&self) -> String {
        let mut lines = vec![if self.report.passed { "passed" } else { "failed" }.to_string()];
        for issue in &self.report.issues {
            lines.push(format!(
                "{:?}\t{}\t{}",
                issue.severity, issue.rule, issue.message
            ));
        }
        lines.join("\n")
    }
}

// ============================================================================
// init
// ============================================================================

/// Result of writing the example rule file
#[derive(Debug, Clone, Serialize)]
pub struct InitReport {
    pub path: PathBuf,
    pub rule_count: usize,
    pub overwritten: bool,
}

/// Write the example rule file, refusing to replace an existing one unless
/// `force` is set
pub fn init(rules_path: &Path, force: bool) -> Result<InitReport> {
    let existed = rules_path.exists();
    if existed && !force {
        return Err(Error::config_error(format!(
            "Rule file already exists: {} (use --force to overwrite)",
            rules_path.display()
        )));
    }

    if let Some(parent) = rules_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(rules_path, RuleFile::example_document()?)?;
    log::info!("Wrote example rules to {}", rules_path.display());

    Ok(InitReport {
        path: rules_path.to_path_buf(),
        rule_count: RuleFile::example().len(),
        overwritten: existed,
    })
}

impl Render for InitReport {
    fn human(&self) -> String {
        let verb = if self.overwritten { "Overwrote" } else { "Created" };
        format!(
            "✅ {} {} with {} example rules",
            verb,
            self.path.display(),
            self.rule_count
        )
    }

    fn text(&self) -> String {
        self.path.display().to_string()
    }
}
