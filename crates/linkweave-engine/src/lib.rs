//! # linkweave engine
//!
//! Finds links in source text and resolves them to navigation targets.
//!
//! This crate provides:
//! - Rule-based matching: text, regex and line patterns with context
//!   constraints and capture-group highlighting
//! - Inline annotations: `// @link [#anchor](target)` tags paired with the
//!   anchor word on the next code line
//! - Path prefixes (`#:`, `~:`, `<:`, `>:`) resolved against the workspace
//!   root or the current document
//! - `${...}` template substitution (workspace, file, environment and
//!   capture-group tokens)
//!
//! ## Architecture
//!
//! Every component is a pure function of its inputs. Nothing touches the
//! filesystem or the network; path resolution only computes strings.
//!
//! - [`PatternMatcher`] scans text against an ordered rule list
//! - [`AnnotationPairer`] runs a block-comment pass then a line-comment pass
//! - [`PathResolver`] and [`VariableResolver`] turn templates into targets
//! - [`TargetResolver`] combines both into a typed [`ResolvedTarget`]
//! - [`LinkEngine`] bundles them behind the host settings
//!
//! ## Quick Start
//!
//! ```
//! use linkweave_core::{LinkKind, LinkRule, LinkerSettings, Pattern};
//! use linkweave_engine::LinkEngine;
//! use std::path::Path;
//!
//! let rules = vec![
//!     LinkRule::new("Issue", LinkKind::Url, "https://tracker/${1}")
//!         .with_pattern(Pattern::regex(r"ISSUE-(\d+)").with_highlight_group(1)),
//! ];
//! let engine = LinkEngine::new(&LinkerSettings::default(), rules);
//!
//! let text = "// fixes ISSUE-12\n// @link [#run](./run.md)\nfn run() {}";
//! let scan = engine.scan(text, Some(Path::new("/ws/src/main.rs")), Some(Path::new("/ws")));
//!
//! assert_eq!(scan.matches.len(), 1);
//! assert_eq!(scan.matches[0].highlighted_text, "12");
//! assert_eq!(scan.annotations[0].href, "/ws/run.md");
//! ```
//!
//! ### Individual components
//!
//! ```
//! use linkweave_engine::{find_annotations, PathResolver};
//! use std::path::Path;
//!
//! let found = find_annotations("// @link [#x](https://x)\nlet x = 1;", None, None);
//! assert_eq!(found.len(), 1);
//!
//! let path = PathResolver::default().resolve("~:b.ts", Some(Path::new("/ws/src/a.ts")), None);
//! assert_eq!(path, Path::new("/ws/src/b.ts"));
//! ```

mod annotations;
mod matcher;
mod path_resolver;
mod targets;
mod variables;

pub use annotations::{AnnotationPairer, has_unclosed_string, is_in_comment};
pub use matcher::PatternMatcher;
pub use path_resolver::PathResolver;
pub use targets::{
    ResolvedTarget, TEXT_FILE_EXTENSIONS, TargetResolver, default_icon, is_text_file,
    line_and_column,
};
pub use variables::{
    ActiveDocument, Environment, HostInfo, ProcessEnvironment, VariableContext, VariableResolver,
};

// Re-export core types so consumers need not depend on linkweave-core directly
pub use linkweave_core::{InlineAnnotation, LinkRule, LinkerSettings, Match, TextRange};

use serde::Serialize;
use std::path::Path;

/// Everything one scan found
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanResult<'a> {
    pub matches: Vec<Match<'a>>,
    pub annotations: Vec<InlineAnnotation>,
}

impl ScanResult<'_> {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty() && self.annotations.is_empty()
    }
}

/// Rules, annotation pairer and target resolver configured from one set of
/// [`LinkerSettings`].
#[derive(Debug, Clone)]
pub struct LinkEngine {
    rules: Vec<LinkRule>,
    pairer: AnnotationPairer,
    targets: TargetResolver,
    enabled: bool,
    inline_links: bool,
    show_inline_default: bool,
}

impl LinkEngine {
    pub fn new(settings: &LinkerSettings, rules: Vec<LinkRule>) -> Self {
        let paths = PathResolver::new(settings.path_prefixes.clone());
        Self {
            rules,
            pairer: AnnotationPairer::new(&settings.inline_link_pattern, paths.clone()),
            targets: TargetResolver::new(paths),
            enabled: settings.enabled,
            inline_links: settings.enable_inline_links,
            show_inline_default: settings.show_inline_default,
        }
    }

    /// Swap in a freshly loaded rule list
    pub fn update_rules(&mut self, rules: Vec<LinkRule>) {
        log::debug!("Replacing {} rules with {}", self.rules.len(), rules.len());
        self.rules = rules;
    }

    pub fn rules(&self) -> &[LinkRule] {
        &self.rules
    }

    /// Disable the inline annotation pass for this engine
    pub fn without_inline_links(mut self) -> Self {
        self.inline_links = false;
        self
    }

    /// Whether `rule` should be rendered inline by the host
    pub fn shows_inline(&self, rule: &LinkRule) -> bool {
        rule.shows_inline(self.show_inline_default)
    }

    /// Scan a document. The extension used for pattern filtering comes from
    /// `document`; without one only unrestricted patterns apply.
    pub fn scan(
        &self,
        text: &str,
        document: Option<&Path>,
        workspace_root: Option<&Path>,
    ) -> ScanResult<'_> {
        if !self.enabled {
            log::debug!("Link scanning disabled");
            return ScanResult::default();
        }

        let extension = document
            .map(linkweave_core::file_extension)
            .unwrap_or_default();
        let matches = PatternMatcher::find_matches(text, &extension, &self.rules);

        let annotations = if self.inline_links {
            self.pairer.find_annotations(text, document, workspace_root)
        } else {
            Vec::new()
        };

        ScanResult {
            matches,
            annotations,
        }
    }

    pub fn pairer(&self) -> &AnnotationPairer {
        &self.pairer
    }

    pub fn targets(&self) -> &TargetResolver {
        &self.targets
    }

    pub fn paths(&self) -> &PathResolver {
        self.targets.paths()
    }
}

/// Find rule matches in `text` for a document with the given extension.
///
/// # Example
/// ```
/// use linkweave_core::{LinkKind, LinkRule, Pattern};
///
/// let rules = vec![LinkRule::new("Docs", LinkKind::Url, "https://docs.rs").with_pattern(Pattern::text("docs.rs"))];
/// assert_eq!(linkweave_engine::find_matches("see docs.rs", ".md", &rules).len(), 1);
/// ```
pub fn find_matches<'a>(text: &str, extension: &str, rules: &'a [LinkRule]) -> Vec<Match<'a>> {
    PatternMatcher::find_matches(text, extension, rules)
}

/// Find inline annotations with the built-in tag pattern and prefix table.
pub fn find_annotations(
    text: &str,
    document: Option<&Path>,
    workspace_root: Option<&Path>,
) -> Vec<InlineAnnotation> {
    AnnotationPairer::default().find_annotations(text, document, workspace_root)
}
