//! Lenient fixes for hand-edited JSON rule files.
//!
//! Only structural noise is repaired: comments, trailing commas and missing
//! closing brackets. The output is always handed back to a JSON parser;
//! nothing here ever evaluates the input.

/// Repair common hand-editing mistakes in JSON text.
///
/// String literals are tracked (with backslash escapes) so `//` inside a URL
/// value is never mistaken for a comment.
///
/// # Example
/// ```
/// use linkweave_core::repair_json;
///
/// let fixed = repair_json(r#"{"a": [1, 2,], /* note */ "b": "http://x"  // tail"#);
/// assert_eq!(fixed, r#"{"a": [1, 2],  "b": "http://x"}"#);
/// ```
pub fn repair_json(input: &str) -> String {
    let stripped = strip_comments(input);
    let trimmed = remove_trailing_commas(&stripped);
    close_brackets(&trimmed)
}

fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match (c, chars.peek()) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                // keep the newline so line structure survives
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
            }
            _ => out.push(c),
        }
    }

    out
}

fn remove_trailing_commas(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            out.push(c);
            continue;
        }

        if c == '"' {
            in_string = true;
        } else if c == ',' {
            let next = chars[i + 1..].iter().find(|n| !n.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                continue;
            }
        }
        out.push(c);
    }

    out
}

fn close_brackets(input: &str) -> String {
    let mut open = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in input.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => open.push('}'),
            '[' => open.push(']'),
            '}' | ']' => {
                open.pop();
            }
            _ => {}
        }
    }

    let mut out = input.trim_end().to_string();
    while let Some(closer) = open.pop() {
        out.push(closer);
    }
    out
}
