//! Inline annotations: a comment tag such as
//! `// @link [#helper](./helper.ts)` paired with the word `helper` on the
//! following code line.
//!
//! Two passes run over the text. The block pass handles `/* ... */` spans and
//! pairs with the line after the comment closes; the line pass handles tags
//! on any line the comment heuristic accepts and pairs with the next line.

mod comments;

pub use comments::{has_unclosed_string, is_in_comment};

use linkweave_core::{DEFAULT_INLINE_LINK_PATTERN, InlineAnnotation, LineIndex, TextRange};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::path_resolver::PathResolver;

/// Built-in tag pattern
static DEFAULT_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_INLINE_LINK_PATTERN).unwrap());

/// Non-greedy `/* ... */` across lines
static BLOCK_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());

/// A tag occurrence before it is paired with code
struct Tag<'t> {
    anchor: &'t str,
    href: &'t str,
    range: TextRange,
    text: &'t str,
}

/// Pairs comment tags with anchors in the adjacent code line
#[derive(Debug, Clone)]
pub struct AnnotationPairer {
    tag: Regex,
    paths: PathResolver,
}

impl Default for AnnotationPairer {
    fn default() -> Self {
        Self {
            tag: DEFAULT_TAG.clone(),
            paths: PathResolver::default(),
        }
    }
}

impl AnnotationPairer {
    /// Build a pairer around a tag regex.
    ///
    /// The pattern must compile and define the named groups `anchor` and
    /// `link`; otherwise the built-in pattern is used instead.
    pub fn new(tag_pattern: &str, paths: PathResolver) -> Self {
        let tag = match Regex::new(tag_pattern) {
            Ok(regex) if has_required_groups(&regex) => regex,
            Ok(_) => {
                log::warn!(
                    "Inline link pattern {:?} must define named groups \"anchor\" and \"link\", using default pattern",
                    tag_pattern
                );
                DEFAULT_TAG.clone()
            }
            Err(e) => {
                log::warn!(
                    "Invalid inline link pattern {:?}: {}, using default pattern",
                    tag_pattern,
                    e
                );
                DEFAULT_TAG.clone()
            }
        };

        Self { tag, paths }
    }

    /// The tag regex in effect
    pub fn tag_pattern(&self) -> &str {
        self.tag.as_str()
    }

    /// All annotations in `text`: block-comment pairs first, then line pairs.
    ///
    /// # Example
    /// ```
    /// use linkweave_engine::AnnotationPairer;
    /// use std::path::Path;
    ///
    /// let text = "// @link [#helper](./helper.ts)\nconst helper = 1;";
    /// let found = AnnotationPairer::default().find_annotations(
    ///     text,
    ///     Some(Path::new("/ws/src/main.ts")),
    ///     Some(Path::new("/ws")),
    /// );
    ///
    /// assert_eq!(found.len(), 1);
    /// assert_eq!(found[0].href, "/ws/helper.ts");
    /// assert_eq!(found[0].line_number, 2);
    /// ```
    pub fn find_annotations(
        &self,
        text: &str,
        document: Option<&Path>,
        workspace_root: Option<&Path>,
    ) -> Vec<InlineAnnotation> {
        let lines: Vec<&str> = text.split('\n').collect();
        let index = LineIndex::new(text);

        let mut annotations = self.block_pass(text, &lines, &index, workspace_root);
        annotations.extend(self.line_pass(&lines, &index, document, workspace_root));

        log::debug!("Found {} inline annotations", annotations.len());
        annotations
    }

    /// First annotation whose comment or code range contains `offset`
    /// (both ends inclusive)
    pub fn annotation_at_offset(
        &self,
        text: &str,
        offset: usize,
        document: Option<&Path>,
        workspace_root: Option<&Path>,
    ) -> Option<InlineAnnotation> {
        self.find_annotations(text, document, workspace_root)
            .into_iter()
            .find(|a| {
                a.comment_range.contains_inclusive(offset) || a.code_range.contains_inclusive(offset)
            })
    }

    /// Annotations whose comment or code range lies entirely inside `range`
    pub fn annotations_in_range(
        &self,
        text: &str,
        range: TextRange,
        document: Option<&Path>,
        workspace_root: Option<&Path>,
    ) -> Vec<InlineAnnotation> {
        self.find_annotations(text, document, workspace_root)
            .into_iter()
            .filter(|a| a.comment_range.is_within(&range) || a.code_range.is_within(&range))
            .collect()
    }

    fn block_pass(
        &self,
        text: &str,
        lines: &[&str],
        index: &LineIndex,
        workspace_root: Option<&Path>,
    ) -> Vec<InlineAnnotation> {
        // Block comments carry no document of their own; hrefs resolve against
        // a placeholder file at the workspace root.
        let placeholder = workspace_root.map(|root| root.join("temp"));
        let mut annotations = Vec::new();

        for comment in BLOCK_COMMENT.find_iter(text) {
            let end_line = index.line_of(comment.end());
            let code_line = end_line + 1;
            if code_line >= lines.len() {
                continue;
            }

            for tag in self.tags_in(comment.as_str(), comment.start()) {
                let href = self.resolve_href(tag.href, placeholder.as_deref(), workspace_root);
                self.pair(&tag, &href, lines[code_line], code_line, index, &mut annotations);
            }
        }

        annotations
    }

    fn line_pass(
        &self,
        lines: &[&str],
        index: &LineIndex,
        document: Option<&Path>,
        workspace_root: Option<&Path>,
    ) -> Vec<InlineAnnotation> {
        let mut annotations = Vec::new();

        for (line_no, pair) in lines.windows(2).enumerate() {
            let (line, next) = (pair[0], pair[1]);
            let Some(line_start) = index.line_start(line_no + 1) else {
                continue;
            };

            for tag in self.tags_in(line, line_start) {
                if !is_in_comment(line, tag.range.start - line_start) {
                    continue;
                }
                let href = self.resolve_href(tag.href, document, workspace_root);
                self.pair(&tag, &href, next, line_no + 1, index, &mut annotations);
            }
        }

        annotations
    }

    /// Tag occurrences in `haystack`, with ranges shifted by `offset`
    fn tags_in<'t>(&self, haystack: &'t str, offset: usize) -> Vec<Tag<'t>> {
        self.tag
            .captures_iter(haystack)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                Some(Tag {
                    anchor: caps.name("anchor").map_or("", |m| m.as_str()),
                    href: caps.name("link").map_or("", |m| m.as_str()),
                    range: TextRange::new(offset + whole.start(), offset + whole.end()),
                    text: whole.as_str(),
                })
            })
            .collect()
    }

    /// Emit one annotation per word-bounded anchor occurrence in the code line
    /// (`code_line` is zero-based).
    fn pair(
        &self,
        tag: &Tag<'_>,
        href: &str,
        code: &str,
        code_line: usize,
        index: &LineIndex,
        out: &mut Vec<InlineAnnotation>,
    ) {
        if tag.anchor.is_empty() {
            return;
        }
        let Some(code_start) = index.line_start(code_line + 1) else {
            return;
        };

        let anchor = match Regex::new(&format!(r"\b{}\b", regex::escape(tag.anchor))) {
            Ok(regex) => regex,
            Err(e) => {
                log::warn!("Cannot search for anchor {:?}: {}", tag.anchor, e);
                return;
            }
        };

        for found in anchor.find_iter(code) {
            out.push(InlineAnnotation {
                anchor: tag.anchor.to_string(),
                href: href.to_string(),
                comment_range: tag.range,
                code_range: TextRange::new(code_start + found.start(), code_start + found.end()),
                comment_text: tag.text.to_string(),
                code_text: found.as_str().to_string(),
                line_number: code_line + 1,
            });
        }
    }

    /// Path-like hrefs become absolute paths; anything else is kept as written.
    fn resolve_href(
        &self,
        href: &str,
        document: Option<&Path>,
        workspace_root: Option<&Path>,
    ) -> String {
        if !self.paths.looks_like_path(href) {
            return href.to_string();
        }
        let resolved: PathBuf = self.paths.resolve(href, document, workspace_root);
        resolved.to_string_lossy().into_owned()
    }
}

fn has_required_groups(regex: &Regex) -> bool {
    let names: Vec<&str> = regex.capture_names().flatten().collect();
    names.contains(&"anchor") && names.contains(&"link")
}
