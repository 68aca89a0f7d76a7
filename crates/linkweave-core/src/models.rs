//! Core data models: link rules, patterns and the records a scan produces.
//!
//! These types are designed to be:
//! - **Serializable**: rules round-trip through the JSON rule file
//! - **Read-only to the engine**: scans borrow rules, they never mutate them
//! - **Type-Safe**: enums replace the `"url"`/`"regex"` strings of the file format

use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;

/// Half-open byte range `[start, end)` into a document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    /// Create a new range
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True when the range covers no bytes
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Offset test with both ends inclusive, so a cursor sitting right after
    /// the last character still hits the range.
    pub fn contains_inclusive(&self, offset: usize) -> bool {
        offset >= self.start && offset <= self.end
    }

    /// True when this range lies entirely inside `outer`.
    pub fn is_within(&self, outer: &TextRange) -> bool {
        self.start >= outer.start && self.end <= outer.end
    }
}

/// Pre-computed line starts for O(log n) line/column lookup.
///
/// Build once per document, then use for all position lookups.
///
/// # Example
/// ```
/// use linkweave_core::LineIndex;
///
/// let content = "Line 1\nLine 2\nLine 3";
/// let index = LineIndex::new(content);
///
/// assert_eq!(index.line_col(7), (2, 1));
/// assert_eq!(index.line_start(3), Some(14));
/// ```
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offsets where each line starts (line 1 = index 0)
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Build line index in O(n) - do once per document.
    pub fn new(content: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, byte) in content.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// Get (line, column) for a byte offset in O(log n) via binary search.
    ///
    /// Line numbers start at 1, column numbers start at 1.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line_idx = self.line_starts.partition_point(|&start| start <= offset);
        let line = line_idx.max(1);
        let line_start = self
            .line_starts
            .get(line_idx.saturating_sub(1))
            .copied()
            .unwrap_or(0);
        (line, offset - line_start + 1)
    }

    /// Zero-based index of the line containing `offset`.
    pub fn line_of(&self, offset: usize) -> usize {
        self.line_col(offset).0 - 1
    }

    /// Get the byte offset where a (1-based) line starts.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        if line == 0 {
            return None;
        }
        self.line_starts.get(line - 1).copied()
    }

    /// Get total number of lines.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

/// What a rule's target points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// Opened in a browser
    Url,
    /// Opened in the editor (or the system handler for binary files)
    File,
}

/// Matching strategy of a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    /// Literal substring
    Text,
    /// Regular expression
    Regex,
    /// Literal substring reported against whole-line text
    Line,
}

/// Exact text required around a pattern occurrence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

/// One matching strategy attached to a [`LinkRule`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    #[serde(rename = "type")]
    pub kind: PatternKind,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_sensitive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_extensions: Option<HashSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<PatternContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_group: Option<usize>,
}

impl Pattern {
    /// Create a pattern with every optional field unset
    pub fn new(kind: PatternKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            case_sensitive: None,
            file_extensions: None,
            context: None,
            highlight_group: None,
        }
    }

    /// Shorthand for a text pattern
    pub fn text(value: impl Into<String>) -> Self {
        Self::new(PatternKind::Text, value)
    }

    /// Shorthand for a regex pattern
    pub fn regex(value: impl Into<String>) -> Self {
        Self::new(PatternKind::Regex, value)
    }

    /// Shorthand for a line pattern
    pub fn line(value: impl Into<String>) -> Self {
        Self::new(PatternKind::Line, value)
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = Some(case_sensitive);
        self
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.file_extensions = Some(extensions.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_context(mut self, before: Option<&str>, after: Option<&str>) -> Self {
        self.context = Some(PatternContext {
            before: before.map(str::to_string),
            after: after.map(str::to_string),
        });
        self
    }

    pub fn with_highlight_group(mut self, group: usize) -> Self {
        self.highlight_group = Some(group);
        self
    }

    /// Effective case sensitivity: text and line patterns default to
    /// case-sensitive, regex patterns to case-insensitive.
    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
            .unwrap_or(!matches!(self.kind, PatternKind::Regex))
    }

    /// Whether this pattern applies to a document with the given extension
    /// (leading dot included, e.g. `.ts`). Unset means every document.
    pub fn applies_to(&self, extension: &str) -> bool {
        self.file_extensions
            .as_ref()
            .is_none_or(|exts| exts.contains(extension))
    }
}

/// A named, user-configured definition of how to recognize and resolve a link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRule {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: LinkKind,
    #[serde(rename = "target")]
    pub target_template: String,
    pub patterns: Vec<Pattern>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, alias = "showCodeLens", skip_serializing_if = "Option::is_none")]
    pub show_inline: Option<bool>,
}

impl LinkRule {
    /// Create a rule with no patterns yet
    pub fn new(name: impl Into<String>, kind: LinkKind, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            target_template: target.into(),
            patterns: Vec::new(),
            description: None,
            icon: None,
            show_inline: None,
        }
    }

    /// Append a pattern
    pub fn with_pattern(mut self, pattern: Pattern) -> Self {
        self.patterns.push(pattern);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Resolve the tri-state inline flag against the host default
    pub fn shows_inline(&self, host_default: bool) -> bool {
        self.show_inline.unwrap_or(host_default)
    }
}

/// One concrete occurrence of a [`Pattern`] in a document.
///
/// Borrows the rule and pattern it came from; a fresh set is produced on
/// every scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match<'a> {
    #[serde(serialize_with = "serialize_rule_name")]
    pub rule: &'a LinkRule,
    pub pattern: &'a Pattern,
    pub range: TextRange,
    pub highlighted_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_match: Option<String>,
    /// Index 0 is the whole match; `None` marks a group that did not participate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_groups: Option<Vec<Option<String>>>,
}

fn serialize_rule_name<S: Serializer>(rule: &&LinkRule, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&rule.name)
}

/// A comment tag paired with an anchor occurrence in the adjacent code line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineAnnotation {
    pub anchor: String,
    pub href: String,
    pub comment_range: TextRange,
    pub code_range: TextRange,
    pub comment_text: String,
    pub code_text: String,
    /// 1-based line of the paired code occurrence
    pub line_number: usize,
}
