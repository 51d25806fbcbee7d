//! Compiling character-class items into bracket-expression fragments

use std::collections::HashSet;

use crate::language::{CharClass, Value};
use crate::parsing::scope::ScopeStack;
use crate::parsing::tokenizer::escape_literal;
use crate::problem::CompileError;

/// One whitespace-separated item of a class definition, as lexed by the
/// tokenizer's class mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassItem {
    pub text: String,
    pub lineno: usize,
}

#[derive(Debug, PartialEq, Eq)]
enum ItemKind {
    Single,
    CodePoint,
    Escape,
    NamedChar,
    Property,
    Range,
    Include,
    Operator,
}

// Classification never fails; items that fit no kind are rejected when
// compiled. Operators must come before bare includes: `not` and `and` are
// also well-formed names.
fn classify(text: &str) -> ItemKind {
    if text.contains("..") {
        return ItemKind::Range;
    }
    if text == "not:" || text == "not" || text == "and" {
        return ItemKind::Operator;
    }
    if text
        .chars()
        .count()
        == 1
    {
        return ItemKind::Single;
    }
    if text.starts_with("U+") {
        return ItemKind::CodePoint;
    }
    if text.starts_with('/') {
        return ItemKind::Property;
    }
    if text.starts_with(':') {
        return ItemKind::NamedChar;
    }
    if text.starts_with('\\') {
        return ItemKind::Escape;
    }
    if let Some(name) = text.strip_prefix('+') {
        if is_name(name) {
            return ItemKind::Include;
        }
    }
    if is_name(text) {
        return ItemKind::Include;
    }
    ItemKind::Single // len > 1, not a keyword: rejected in compile()
}

// Alphabetic is a property; Script=Latin selects by property value.
fn is_property_name(text: &str) -> bool {
    let (name, value) = match text.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (text, None),
    };
    if !is_name(name) {
        return false;
    }
    match value {
        Some(value) => !value.is_empty()
            && value
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_'),
        None => true,
    }
}

fn is_name(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_') && !text.ends_with('_')
}

/// The include names an item list references, gathered syntactically so the
/// owning construct can run its used-check before resolution.
pub fn include_names(items: &[ClassItem]) -> Vec<String> {
    items
        .iter()
        .filter(|item| classify(&item.text) == ItemKind::Include)
        .map(|item| {
            item.text
                .strip_prefix('+')
                .unwrap_or(&item.text)
                .to_string()
        })
        .collect()
}

/// Compile an ordered item list against the active scope into a finished
/// class.
pub(crate) fn compile(
    items: &[ClassItem],
    scopes: &ScopeStack,
    lineno: usize,
) -> Result<CharClass, CompileError> {
    let mut seen = HashSet::new();
    for item in items {
        if !seen.insert(item.text.as_str()) {
            return Err(CompileError::DuplicateClassItem(
                item.lineno,
                item.text
                    .clone(),
            ));
        }
    }

    // a lone include is an alias for the referenced class, unchanged
    if items.len() == 1 && classify(&items[0].text) == ItemKind::Include {
        let name = items[0]
            .text
            .strip_prefix('+')
            .unwrap_or(&items[0].text);
        return resolve_include(name, scopes, lineno).map(|class| class.clone());
    }

    let mut need_brackets = items.len() > 1;
    let mut set_operation = false;
    let mut value = String::new();

    for (i, item) in items
        .iter()
        .enumerate()
    {
        let fragment = match classify(&item.text) {
            ItemKind::Single => {
                let c = first_char(&item.text);
                if item
                    .text
                    .chars()
                    .count()
                    > 1
                {
                    return Err(CompileError::InvalidClassKeyword(
                        item.lineno,
                        item.text
                            .clone(),
                    ));
                }
                let fragment = escape_single(c);
                test_fragment(&item.text, &fragment, true, item.lineno)?;
                fragment
            }
            ItemKind::CodePoint => {
                let fragment = compile_codepoint(&item.text, item.lineno)?;
                test_fragment(&item.text, &fragment, true, item.lineno)?;
                fragment
            }
            ItemKind::Escape => {
                let fragment = compile_escape(&item.text, item.lineno)?;
                test_fragment(&item.text, &fragment, true, item.lineno)?;
                fragment
            }
            ItemKind::NamedChar => compile_named(&item.text, item.lineno)?,
            ItemKind::Property => {
                let name = &item.text[1..];
                if !is_property_name(name) {
                    return Err(CompileError::InvalidClassKeyword(
                        item.lineno,
                        item.text
                            .clone(),
                    ));
                }
                let fragment = format!("\\p{{{}}}", name);
                test_fragment(&item.text, &fragment, false, item.lineno)?;
                fragment
            }
            ItemKind::Range => {
                need_brackets = true;
                compile_range(&item.text, item.lineno)?
            }
            ItemKind::Include => {
                let name = item
                    .text
                    .strip_prefix('+')
                    .unwrap_or(&item.text);
                let class = resolve_include(name, scopes, item.lineno)?;
                if class.rebracket {
                    need_brackets = true;
                }
                class
                    .subvalue
                    .clone()
            }
            ItemKind::Operator => {
                set_operation = true;
                compile_operator(&item.text, i, items.len(), item.lineno)?
            }
        };
        value.push_str(&fragment);
    }

    // ^\p{Something} on its own is better written \P{Something}
    if items.len() == 2 && value.starts_with("^\\p{") {
        value = value.replacen("^\\p{", "\\P{", 1);
        need_brackets = false;
        set_operation = false;
    }

    let mut subvalue = value.clone();
    if need_brackets {
        value = format!("[{}]", value);
    }
    if set_operation {
        subvalue = value.clone();
    }
    if value
        .chars()
        .count()
        == 1
    {
        value = escape_literal(&value);
    }

    Ok(CharClass {
        value,
        subvalue,
        set_op: set_operation,
        rebracket: need_brackets && !set_operation,
    })
}

fn first_char(text: &str) -> char {
    text.chars()
        .next()
        .unwrap_or('\0')
}

// Characters that cannot appear bare inside a bracket expression.
fn escape_single(c: char) -> String {
    match c {
        '[' | ']' | '^' | '-' | '\\' => format!("\\{}", c),
        _ => c.to_string(),
    }
}

fn resolve_include<'s>(
    name: &str,
    scopes: &'s ScopeStack,
    lineno: usize,
) -> Result<&'s CharClass, CompileError> {
    let variable = scopes
        .lookup(name)
        .ok_or_else(|| CompileError::CannotIncludeUndefined(lineno, name.to_string()))?;
    match &variable.value {
        Value::Class(class) => Ok(class),
        Value::Pattern(_) => Err(CompileError::NotACharClass(lineno, name.to_string())),
    }
}

fn compile_codepoint(text: &str, lineno: usize) -> Result<String, CompileError> {
    let digits = &text[2..];
    if digits.is_empty()
        || !digits
            .chars()
            .all(|c| c.is_ascii_hexdigit())
    {
        return Err(CompileError::BadCodePoint(lineno, text.to_string()));
    }
    if digits.len() > 8 {
        return Err(CompileError::CodePointOutOfRange(lineno, text.to_string()));
    }
    if digits.len() <= 4 {
        Ok(format!("\\u{:0>4}", digits))
    } else {
        Ok(format!("\\U{:0>8}", digits))
    }
}

const SIMPLE_ESCAPES: &str = "tnrfva\\dDsSwW";

fn compile_escape(text: &str, lineno: usize) -> Result<String, CompileError> {
    let rest = &text[1..];
    let simple = rest
        .chars()
        .count()
        == 1
        && SIMPLE_ESCAPES.contains(first_char(rest));
    let hex = |digits: &str, n: usize| {
        digits.len() == n
            && digits
                .chars()
                .all(|c| c.is_ascii_hexdigit())
    };
    let coded = match first_char(rest) {
        'x' => hex(&rest[1..], 2),
        'u' => hex(&rest[1..], 4),
        'U' => hex(&rest[1..], 8),
        _ => false,
    };
    if simple || coded {
        Ok(text.to_string())
    } else {
        Err(CompileError::BadEscape(lineno, text.to_string()))
    }
}

fn compile_named(text: &str, lineno: usize) -> Result<String, CompileError> {
    let name = &text[1..];
    if name.is_empty()
        || !name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_' || c == '-')
    {
        return Err(CompileError::CharNameNotUppercase(lineno));
    }
    Ok(format!("\\N{{{}}}", name.replace('_', " ")))
}

fn compile_range(text: &str, lineno: usize) -> Result<String, CompileError> {
    let (from, to) = text
        .split_once("..")
        .ok_or_else(|| CompileError::InvalidCharRange(lineno, text.to_string()))?;
    let (from_value, from_testable) = range_endpoint(from, text, lineno)?;
    let (to_value, to_testable) = range_endpoint(to, text, lineno)?;
    let fragment = format!("{}-{}", from_value, to_value);
    if from_testable && to_testable {
        test_fragment(text, &fragment, true, lineno)?;
    }
    Ok(fragment)
}

// Endpoints must be single characters: a literal, a code point, or a named
// character. Includes and properties cannot bound a range. The second value
// reports whether the endpoint is expressible to the validation engine.
fn range_endpoint(
    text: &str,
    whole: &str,
    lineno: usize,
) -> Result<(String, bool), CompileError> {
    if text
        .chars()
        .count()
        == 1
    {
        return Ok((escape_single(first_char(text)), true));
    }
    if text.starts_with("U+") {
        return Ok((compile_codepoint(text, lineno)?, true));
    }
    if text.starts_with(':') {
        return Ok((compile_named(text, lineno)?, false));
    }
    Err(CompileError::InvalidCharRange(lineno, whole.to_string()))
}

fn compile_operator(
    op: &str,
    position: usize,
    total: usize,
    lineno: usize,
) -> Result<String, CompileError> {
    let is_first = position == 0;
    let is_last = position == total - 1;
    let (valid, translation) = match op {
        "not:" => (is_first && !is_last, "^"),
        "not" => (!is_first && !is_last, "--"),
        "and" => (!is_first && !is_last, "&&"),
        _ => (false, ""),
    };
    if valid {
        Ok(translation.to_string())
    } else {
        Err(CompileError::OperatorMisuse(lineno, op.to_string()))
    }
}

// Sanity-check a fragment against the validation engine. Named characters
// never get here: the engine has no \N syntax, though the target dialect
// does.
fn test_fragment(
    item: &str,
    fragment: &str,
    wrap: bool,
    lineno: usize,
) -> Result<(), CompileError> {
    let test = if wrap {
        format!("[{}]", fragment)
    } else {
        fragment.to_string()
    };
    match regex::Regex::new(&test) {
        Ok(_) => Ok(()),
        Err(error) => Err(CompileError::RejectedFragment(
            lineno,
            item.to_string(),
            fragment.to_string(),
            error.to_string(),
        )),
    }
}
