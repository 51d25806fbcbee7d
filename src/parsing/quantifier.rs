//! Applying repeats to expressions, including the merge optimization for
//! nested quantifiers

use crate::language::{Expression, Quantifier};

/// Apply a repeat to an expression. An already-quantified expression first
/// gets a chance to merge the two suffixes into one; failing that, the whole
/// text is wrapped in a non-capturing group (unless it is self-contained)
/// and the new suffix appended.
pub fn quantify(expression: Expression, repeat: &Quantifier) -> Expression {
    let suffix = repeat.suffix();
    if suffix.is_empty() {
        // `1 of x` is just x
        return expression;
    }

    if let Some(previous) = &expression.quantifier {
        if let Some(merged) = merge(previous, &suffix) {
            let stripped = &expression.text[..expression.text.len() - previous.len()];
            let text = format!("{}{}", stripped, merged);
            return Expression {
                text,
                grouped: expression.grouped,
                quantifier: Some(merged),
            };
        }
    }

    let text = if expression.grouped || is_self_contained(&expression.text) {
        format!("{}{}", expression.text, suffix)
    } else {
        format!("(?:{}){}", expression.text, suffix)
    };
    Expression {
        text,
        grouped: false,
        quantifier: Some(suffix),
    }
}

// The recognized adjacent-quantifier pairs. This table is deliberately
// closed: anything unlisted takes the group-and-suffix path, even when a
// clever merge would exist.
fn merge(inner: &str, outer: &str) -> Option<String> {
    match (inner, outer) {
        ("++", "?+") | ("?+", "++") => Some("*+".to_string()),
        ("+", "?") | ("?", "+") => Some("*".to_string()),
        ("+?", "??") | ("??", "+?") => Some("*?".to_string()),
        _ => multiply(inner, outer),
    }
}

// Exact counts compose by multiplication: three of (two of x) is six of x.
fn multiply(inner: &str, outer: &str) -> Option<String> {
    let inner = exact_count(inner)?;
    let outer = exact_count(outer)?;
    Some(format!("{{{}}}", inner.checked_mul(outer)?))
}

fn exact_count(suffix: &str) -> Option<u64> {
    suffix
        .strip_prefix('{')?
        .strip_suffix('}')?
        .parse()
        .ok()
}

/// Whether a fragment repeats correctly without being wrapped in a group: a
/// single character, a single complete escape sequence, one bracket
/// expression, or one parenthesized group.
pub(crate) fn is_self_contained(text: &str) -> bool {
    let mut chars = text.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return false,
    };
    if chars
        .next()
        .is_none()
    {
        return true;
    }
    match first {
        '\\' => is_single_escape(text),
        '[' => closes_at_end(text, '[', ']'),
        '(' => closes_at_end(text, '(', ')'),
        _ => false,
    }
}

fn is_single_escape(text: &str) -> bool {
    let rest = &text[1..];
    if rest.chars().count() == 1 {
        return true;
    }
    let hex = |s: &str| {
        s.chars()
            .all(|c| c.is_ascii_hexdigit())
    };
    if let Some(digits) = rest.strip_prefix('x') {
        return digits.len() == 2 && hex(digits);
    }
    if let Some(digits) = rest.strip_prefix('u') {
        return digits.len() == 4 && hex(digits);
    }
    if let Some(digits) = rest.strip_prefix('U') {
        return digits.len() == 8 && hex(digits);
    }
    // \p{...}, \P{...}, \N{...}
    if rest.starts_with("p{") || rest.starts_with("P{") || rest.starts_with("N{") {
        return rest.ends_with('}') && rest.matches('}').count() == 1;
    }
    false
}

// One balanced open..close spanning the whole text. Escaped characters never
// count, and parens inside a bracket expression are literal.
fn closes_at_end(text: &str, open: char, close: char) -> bool {
    let mut depth = 0;
    let mut in_class = false;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '[' if open == '[' => depth += 1,
            ']' if open == '[' => {
                depth -= 1;
                if depth == 0 {
                    return i == text.len() - close.len_utf8();
                }
            }
            '[' if open == '(' => in_class = true,
            ']' if open == '(' => in_class = false,
            '(' if open == '(' && !in_class => depth += 1,
            ')' if open == '(' && !in_class => {
                depth -= 1;
                if depth == 0 {
                    return i == text.len() - close.len_utf8();
                }
            }
            _ => {}
        }
    }
    false
}
