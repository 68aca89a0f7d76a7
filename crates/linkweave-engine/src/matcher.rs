//! Rule-based pattern matching over raw document text.
//!
//! Every scan compiles its own regexes and walks its own iterators, so two
//! scans never share cursor state. Results come out in rule order, then
//! pattern order, then document order.

use linkweave_core::{LinkRule, Match, Pattern, PatternKind, TextRange};
use regex::{Captures, Regex, RegexBuilder};

/// Finds rule pattern occurrences in document text
pub struct PatternMatcher;

impl PatternMatcher {
    /// All matches of `rules` in `text`.
    ///
    /// `extension` is the document's extension with its leading dot (`.ts`);
    /// patterns restricted to other extensions are skipped.
    ///
    /// # Example
    /// ```
    /// use linkweave_core::{LinkKind, LinkRule, Pattern};
    /// use linkweave_engine::PatternMatcher;
    ///
    /// let rules = vec![LinkRule::new("A", LinkKind::Url, "https://a").with_pattern(Pattern::text("aa"))];
    /// let starts: Vec<_> = PatternMatcher::find_matches("aaaa", ".txt", &rules)
    ///     .iter()
    ///     .map(|m| m.range.start)
    ///     .collect();
    /// assert_eq!(starts, vec![0, 1, 2]);
    /// ```
    pub fn find_matches<'a>(text: &str, extension: &str, rules: &'a [LinkRule]) -> Vec<Match<'a>> {
        let mut matches = Vec::new();

        for rule in rules {
            for pattern in &rule.patterns {
                if !pattern.applies_to(extension) {
                    continue;
                }

                match pattern.kind {
                    PatternKind::Text => Self::find_text(text, rule, pattern, &mut matches),
                    PatternKind::Regex => Self::find_regex(text, rule, pattern, &mut matches),
                    PatternKind::Line => Self::find_line(text, rule, pattern, &mut matches),
                }
            }
        }

        log::debug!(
            "Found {} matches for {} rules in {} bytes",
            matches.len(),
            rules.len(),
            text.len()
        );
        matches
    }

    /// First match whose range contains `offset` (both ends inclusive)
    pub fn match_at_offset<'a>(
        text: &str,
        extension: &str,
        offset: usize,
        rules: &'a [LinkRule],
    ) -> Option<Match<'a>> {
        Self::find_matches(text, extension, rules)
            .into_iter()
            .find(|m| m.range.contains_inclusive(offset))
    }

    /// Matches lying entirely inside `range`
    pub fn matches_in_range<'a>(
        text: &str,
        extension: &str,
        range: TextRange,
        rules: &'a [LinkRule],
    ) -> Vec<Match<'a>> {
        Self::find_matches(text, extension, rules)
            .into_iter()
            .filter(|m| m.range.is_within(&range))
            .collect()
    }

    fn find_text<'a>(text: &str, rule: &'a LinkRule, pattern: &'a Pattern, out: &mut Vec<Match<'a>>) {
        if pattern.value.is_empty() {
            return;
        }

        let Some(needle) = compile(&regex::escape(&pattern.value), pattern.is_case_sensitive(), pattern)
        else {
            return;
        };

        // Restart one character past each hit so overlapping occurrences are kept
        let mut cursor = 0;
        while let Some(found) = needle.find_at(text, cursor) {
            if matches_context(text, pattern, found.start()) {
                out.push(Match {
                    rule,
                    pattern,
                    range: TextRange::new(found.start(), found.end()),
                    highlighted_text: found.as_str().to_string(),
                    full_match: None,
                    capture_groups: None,
                });
            }

            let step = text[found.start()..].chars().next().map_or(1, char::len_utf8);
            cursor = found.start() + step;
            if cursor > text.len() {
                break;
            }
        }
    }

    fn find_regex<'a>(text: &str, rule: &'a LinkRule, pattern: &'a Pattern, out: &mut Vec<Match<'a>>) {
        let Some(regex) = compile(&pattern.value, pattern.is_case_sensitive(), pattern) else {
            return;
        };

        for caps in regex.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            if !matches_context(text, pattern, whole.start()) {
                continue;
            }

            let (range, highlighted_text) = highlight(&caps, pattern.highlight_group)
                .unwrap_or_else(|| {
                    (TextRange::new(whole.start(), whole.end()), whole.as_str().to_string())
                });

            out.push(Match {
                rule,
                pattern,
                range,
                highlighted_text,
                full_match: Some(whole.as_str().to_string()),
                capture_groups: Some(
                    caps.iter()
                        .map(|group| group.map(|g| g.as_str().to_string()))
                        .collect(),
                ),
            });
        }
    }

    fn find_line<'a>(text: &str, rule: &'a LinkRule, pattern: &'a Pattern, out: &mut Vec<Match<'a>>) {
        let value = pattern.value.as_str();
        if value.is_empty() {
            return;
        }

        for line in text.split('\n') {
            let Some(value_offset) = line.find(value) else {
                continue;
            };

            // A line that repeats earlier in the document maps onto its first
            // occurrence, so duplicate lines report the same range.
            let Some(line_start) = text.find(line) else {
                continue;
            };

            let start = line_start + value_offset;
            let end = start + value.len();
            if matches_context(text, pattern, start) {
                out.push(Match {
                    rule,
                    pattern,
                    range: TextRange::new(start, end),
                    highlighted_text: value.to_string(),
                    full_match: None,
                    capture_groups: None,
                });
            }
        }
    }
}

fn compile(source: &str, case_sensitive: bool, pattern: &Pattern) -> Option<Regex> {
    match RegexBuilder::new(source)
        .case_insensitive(!case_sensitive)
        .build()
    {
        Ok(regex) => Some(regex),
        Err(e) => {
            log::warn!("Skipping invalid {:?} pattern {:?}: {}", pattern.kind, pattern.value, e);
            None
        }
    }
}

/// Range and text of the highlight group, located by the first occurrence
/// of the group's text inside the whole match.
fn highlight(caps: &Captures<'_>, group: Option<usize>) -> Option<(TextRange, String)> {
    let index = group.filter(|&g| g > 0)?;
    let whole = caps.get(0)?;
    let group_text = caps.get(index)?.as_str();
    if group_text.is_empty() {
        return None;
    }

    let start = whole.start() + whole.as_str().find(group_text)?;
    Some((TextRange::new(start, start + group_text.len()), group_text.to_string()))
}

/// Verbatim `before`/`after` check around the pattern value placed at
/// `start`. The `after` text is read at `start + value.len()` for every
/// kind, so for regex patterns it follows the source length rather than the
/// matched text. Empty context strings impose nothing.
fn matches_context(text: &str, pattern: &Pattern, start: usize) -> bool {
    let Some(context) = &pattern.context else {
        return true;
    };
    let bytes = text.as_bytes();

    if let Some(before) = context.before.as_deref().filter(|b| !b.is_empty())
        && !bytes[..start].ends_with(before.as_bytes())
    {
        return false;
    }

    if let Some(after) = context.after.as_deref().filter(|a| !a.is_empty()) {
        let follows = bytes
            .get(start + pattern.value.len()..)
            .is_some_and(|rest| rest.starts_with(after.as_bytes()));
        if !follows {
            return false;
        }
    }

    true
}
