//! Cheap single-line comment detection.
//!
//! Not a lexer: it only looks at the current line, and it knows `//`, `/* */`
//! and quote characters.

/// Whether byte `index` of `line` sits inside a comment.
///
/// Accepts when the nearest preceding `//` is not inside an open string
/// literal, or when the nearest preceding `/*` on the line is not closed
/// before `index`.
pub fn is_in_comment(line: &str, index: usize) -> bool {
    let Some(before) = line.get(..index) else {
        return false;
    };

    if let Some(slashes) = before.rfind("//")
        && !has_unclosed_string(&line[slashes + 2..index])
    {
        return true;
    }

    if let Some(open) = before.rfind("/*") {
        let body_start = open + 2;
        match line[body_start..].find("*/") {
            None => return true,
            Some(close) if close > index - body_start => return true,
            Some(_) => {}
        }
    }

    false
}

/// Whether `text` ends inside a quoted string. Backslash escapes the next
/// character; a quote of one kind is literal inside the other kind.
pub fn has_unclosed_string(text: &str) -> bool {
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;

    for ch in text.chars() {
        if escaped {
            escaped = false;
            continue;
        }

        match ch {
            '\\' => escaped = true,
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            _ => {}
        }
    }

    in_single || in_double
}
