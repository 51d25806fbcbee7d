//! The indentation-aware tokenizer
//!
//! Tokens are produced on demand. Most come straight from the source text;
//! INDENT, DEDENT, and GLOBALMARK are synthesized from the whitespace run
//! that ends a physical line, and a `:` introducer switches to an exclusive
//! mode that lexes the remainder of the line as character-class items.

use std::collections::VecDeque;

use crate::language::{Token, TokenKind};
use crate::problem::CompileError;

macro_rules! regex {
    ($pattern:expr) => {{
        use std::sync::OnceLock;
        static REGEX: OnceLock<regex::Regex> = OnceLock::new();
        REGEX.get_or_init(|| regex::Regex::new($pattern).unwrap_or_else(|e| panic!("{}", e)))
    }};
}

const GLOBALMARK: &str = "*)";

/// Split the source into lines and enforce the blank first/last line the
/// notation requires.
pub fn sanitize(source: &str) -> Result<Vec<String>, CompileError> {
    let lines: Vec<String> = source
        .split('\n')
        .map(|line| {
            line.strip_suffix('\r')
                .unwrap_or(line)
                .to_string()
        })
        .collect();
    let first = &lines[0];
    if !first
        .trim()
        .is_empty()
    {
        return Err(CompileError::FirstLineNotBlank(1, first.clone()));
    }
    let last = &lines[lines.len() - 1];
    if !last
        .trim()
        .is_empty()
    {
        return Err(CompileError::LastLineNotBlank(lines.len(), last.clone()));
    }
    Ok(lines)
}

pub(crate) struct Tokenizer<'i> {
    lines: &'i [String],
    source: String,
    pos: usize,
    lineno: usize,
    line_start: usize,
    indent_stack: Vec<usize>,
    indent_char: Option<char>,
    pending: VecDeque<Token>,
    unwound: bool,
}

impl<'i> Tokenizer<'i> {
    pub(crate) fn new(lines: &'i [String]) -> Tokenizer<'i> {
        Tokenizer {
            lines,
            source: lines.join("\n"),
            pos: 0,
            lineno: 1,
            line_start: 0,
            indent_stack: vec![0],
            indent_char: None,
            pending: VecDeque::new(),
            unwound: false,
        }
    }

    pub(crate) fn line(&self, lineno: usize) -> &str {
        self.lines
            .get(lineno - 1)
            .map(|line| line.as_str())
            .unwrap_or("")
    }

    pub(crate) fn next_token(&mut self) -> Result<Token, CompileError> {
        if let Some(token) = self
            .pending
            .pop_front()
        {
            return Ok(token);
        }
        if self.pos
            >= self
                .source
                .len()
        {
            return Ok(self.wind_down());
        }
        self.scan()
    }

    // At end of input: close every scope still open, then report EOF
    // (repeatedly, if asked again).
    fn wind_down(&mut self) -> Token {
        let lineno = self
            .lines
            .len();
        if !self.unwound {
            self.unwound = true;
            for _ in 1..self
                .indent_stack
                .len()
            {
                self.pending
                    .push_back(self.synthetic(TokenKind::Dedent, lineno));
            }
            self.indent_stack
                .truncate(1);
        }
        self.pending
            .pop_front()
            .unwrap_or_else(|| self.synthetic(TokenKind::End, lineno))
    }

    fn synthetic(&self, kind: TokenKind, lineno: usize) -> Token {
        Token {
            kind,
            text: String::new(),
            lineno,
            column: 0,
        }
    }

    fn token(&self, kind: TokenKind, start: usize, text: &str) -> Token {
        Token {
            kind,
            text: text.to_string(),
            lineno: self.lineno,
            column: start - self.line_start + 1,
        }
    }

    fn rest_of_line(&self) -> &str {
        let rest = &self.source[self.pos..];
        rest.split('\n')
            .next()
            .unwrap_or(rest)
    }

    fn scan(&mut self) -> Result<Token, CompileError> {
        let c = self.source[self.pos..]
            .chars()
            .next()
            .unwrap_or('\0');
        match c {
            ' ' | '\t' => self.whitespace(),
            '\n' => self.linemark(self.pos),
            '=' => Ok(self.equals(self.pos)),
            ':' => self.class_mode(),
            '\'' | '"' => self.string(c),
            '0'..='9' => self.number(),
            'A'..='Z' | 'a'..='z' | '_' => self.word(),
            '.' => Ok(self.fixed(
                if self.source[self.pos..].starts_with("..") {
                    (TokenKind::DotDot, 2)
                } else {
                    (TokenKind::Dot, 1)
                },
            )),
            '<' => Ok(self.angle()),
            '?' => Ok(self.fixed((TokenKind::Question, 1))),
            '/' => Ok(self.fixed((TokenKind::Slash, 1))),
            '(' => Ok(self.fixed((TokenKind::LParen, 1))),
            ')' => Ok(self.fixed((TokenKind::RParen, 1))),
            '[' => Ok(self.fixed((TokenKind::LBracket, 1))),
            ']' => Ok(self.fixed((TokenKind::RBracket, 1))),
            '@' => Ok(self.fixed((TokenKind::At, 1))),
            '&' => Ok(self.fixed((TokenKind::Amp, 1))),
            '|' => Ok(self.fixed((TokenKind::Bar, 1))),
            '!' => Ok(self.fixed((TokenKind::Bang, 1))),
            '>' => Ok(self.fixed((TokenKind::Greater, 1))),
            '-' => Ok(self.fixed((TokenKind::Minus, 1))),
            '+' => Ok(self.fixed((TokenKind::Plus, 1))),
            _ => Err(CompileError::UnsupportedSyntax(
                self.lineno,
                self.rest_of_line()
                    .to_string(),
            )),
        }
    }

    fn fixed(&mut self, (kind, width): (TokenKind, usize)) -> Token {
        let start = self.pos;
        self.pos += width;
        self.token(kind, start, &self.source[start..self.pos])
    }

    fn angle(&mut self) -> Token {
        let rest = &self.source[self.pos..];
        if rest.starts_with("<@>") {
            self.fixed((TokenKind::LookMark, 3))
        } else if rest.starts_with("<<|") {
            self.fixed((TokenKind::AltMark, 3))
        } else if rest.starts_with("<<") {
            self.fixed((TokenKind::Backtrack, 2))
        } else {
            self.fixed((TokenKind::Less, 1))
        }
    }

    // An inline run of blanks. It may turn out to be the spacing around an
    // equals sign, a line break (handled by linemark), or plain whitespace,
    // which gets its own token because the grammar is whitespace-sensitive.
    fn whitespace(&mut self) -> Result<Token, CompileError> {
        let start = self.pos;
        let mut end = start;
        for (i, c) in self.source[start..].char_indices() {
            if c == ' ' || c == '\t' {
                end = start + i + 1;
            } else {
                break;
            }
        }
        let following = &self.source[end..];
        if following.starts_with('=') {
            self.pos = end;
            return Ok(self.equals(start));
        }
        if following.starts_with('\n') {
            return self.linemark(start);
        }
        if following.starts_with(GLOBALMARK) {
            // the global mark only makes sense at the start of a line
            return Err(CompileError::GlobalMarkSyntax(
                self.lineno,
                self.line(self.lineno)
                    .to_string(),
            ));
        }
        self.pos = end;
        Ok(self.token(TokenKind::Whitespace, start, &self.source[start..end]))
    }

    fn equals(&mut self, start: usize) -> Token {
        self.pos += 1; // the = itself
        while self.source[self.pos..].starts_with(' ')
            || self.source[self.pos..].starts_with('\t')
        {
            self.pos += 1;
        }
        self.token(TokenKind::Equals, start, &self.source[start..self.pos])
    }

    // A line break plus everything blank after it, collapsed into a single
    // NEWLINE. The whitespace after the last newline of the run is the new
    // line's indentation; comparing its depth to the stack synthesizes
    // INDENT/DEDENT, and a leading global mark becomes its own token.
    fn linemark(&mut self, start: usize) -> Result<Token, CompileError> {
        let mut end = start;
        for (i, c) in self.source[start..].char_indices() {
            if c == ' ' || c == '\t' || c == '\n' {
                end = start + i + c.len_utf8();
            } else {
                break;
            }
        }
        while self.source[end..].starts_with(GLOBALMARK) {
            end += GLOBALMARK.len();
            while self.source[end..].starts_with(' ') || self.source[end..].starts_with('\t') {
                end += 1;
            }
        }
        let text = self.source[start..end].to_string();
        self.pos = end;

        let newlines = text
            .matches('\n')
            .count();
        let start_line = self.lineno;
        self.lineno += newlines;
        let last_newline = start
            + text
                .rfind('\n')
                .unwrap_or(0);
        self.line_start = last_newline + 1;
        let indentation = self.source[self.line_start..end].to_string();

        let newline = Token {
            kind: TokenKind::Newline,
            text,
            lineno: start_line,
            column: 0,
        };

        let marks = indentation
            .matches(GLOBALMARK)
            .count();
        if end
            == self
                .source
                .len()
            && marks == 0
        {
            // trailing blankness before end of input; EOF handles the rest
            return Ok(newline);
        }

        let mut indentation = indentation;
        if marks > 0 {
            if marks != 1 {
                return Err(CompileError::GlobalMarkSyntax(self.lineno, indentation));
            }
            if !indentation.starts_with(GLOBALMARK) {
                return Err(CompileError::GlobalMarkNotAtLineStart(self.lineno));
            }
            if indentation.len() == GLOBALMARK.len() {
                return Err(CompileError::GlobalMarkNeedsIndentation(self.lineno));
            }
            let spaces = indentation.contains(' ');
            indentation = indentation.replace(GLOBALMARK, if spaces { "  " } else { "" });
        }

        if indentation.contains(' ') && indentation.contains('\t') {
            return Err(CompileError::MixedIndentation(self.lineno));
        }
        if !indentation.is_empty() {
            let this_char = if indentation.contains('\t') { '\t' } else { ' ' };
            match self.indent_char {
                Some(established) if established != this_char => {
                    return Err(CompileError::InconsistentIndentChar(self.lineno));
                }
                None => self.indent_char = Some(this_char),
                _ => {}
            }
        }

        let depth = indentation.len();
        let previous = *self
            .indent_stack
            .last()
            .unwrap_or(&0);
        if depth > previous {
            self.pending
                .push_back(self.synthetic(TokenKind::Indent, self.lineno));
            self.indent_stack
                .push(depth);
        } else if depth < previous {
            while depth
                < *self
                    .indent_stack
                    .last()
                    .unwrap_or(&0)
            {
                self.pending
                    .push_back(self.synthetic(TokenKind::Dedent, self.lineno));
                self.indent_stack
                    .pop();
            }
            if depth
                != *self
                    .indent_stack
                    .last()
                    .unwrap_or(&0)
            {
                return Err(CompileError::IndentationError(self.lineno));
            }
        }
        if marks > 0 {
            self.pending
                .push_back(self.synthetic(TokenKind::GlobalMark, self.lineno));
        }
        Ok(newline)
    }

    // A `:` switches to class mode for the rest of the line: the remainder
    // is lexed into CLASSITEM tokens right away, one per blank-separated
    // item. The mode ends at the line break.
    fn class_mode(&mut self) -> Result<Token, CompileError> {
        let start = self.pos;
        let rest = &self.source[self.pos + 1..];
        let rest = rest
            .split('\n')
            .next()
            .unwrap_or(rest);
        if rest.is_empty() {
            return Err(CompileError::EmptyCharClass(self.lineno));
        }
        if !rest.starts_with(' ') {
            return Err(CompileError::SpaceAfterColonRequired(self.lineno));
        }

        let mut items = Vec::new();
        let mut offset = 0;
        for piece in rest.split(' ') {
            if !piece.is_empty() {
                items.push(self.token(
                    TokenKind::ClassItem,
                    start + 1 + offset,
                    piece,
                ));
            }
            offset += piece.len() + 1;
        }
        if items.is_empty() {
            return Err(CompileError::EmptyCharClass(self.lineno));
        }
        self.pending
            .extend(items);
        self.pos = start + 1 + rest.len();
        Ok(self.token(TokenKind::Colon, start, ":"))
    }

    fn string(&mut self, quote: char) -> Result<Token, CompileError> {
        let start = self.pos;
        let mut escaped = false;
        let mut close = None;
        for (i, c) in self.source[start + 1..].char_indices() {
            if c == '\n' {
                // strings never span lines, even behind a backslash
                break;
            }
            if escaped {
                escaped = false;
                continue;
            }
            match c {
                '\\' => escaped = true,
                _ if c == quote => {
                    close = Some(start + 1 + i);
                    break;
                }
                _ => {}
            }
        }
        let close = match close {
            Some(close) => close,
            None => {
                return Err(CompileError::MissingClosingQuote(
                    self.lineno,
                    self.rest_of_line()
                        .trim_end()
                        .to_string(),
                ));
            }
        };
        let inner = &self.source[start + 1..close];
        self.pos = close + quote.len_utf8();

        let unquoted = unescape_quotes(inner, quote);
        let value = restore_escapes(&escape_literal(&unquoted));
        Ok(self.token(TokenKind::Str, start, &value))
    }

    fn number(&mut self) -> Result<Token, CompileError> {
        let start = self.pos;
        let mut end = start;
        for (i, c) in self.source[start..].char_indices() {
            if c.is_ascii_digit() {
                end = start + i + 1;
            } else {
                break;
            }
        }
        if self.source[end..]
            .chars()
            .next()
            .map(|c| c.is_ascii_alphabetic() || c == '_')
            .unwrap_or(false)
        {
            // 101dalmatians is a name, and not a legal one
            let word_end = word_end(&self.source, start);
            return Err(CompileError::IllegalNameStart(
                self.lineno,
                self.source[start..word_end].to_string(),
            ));
        }
        self.pos = end;
        Ok(self.token(TokenKind::Number, start, &self.source[start..end]))
    }

    fn word(&mut self) -> Result<Token, CompileError> {
        let start = self.pos;
        let end = word_end(&self.source, start);
        let name = &self.source[start..end];
        if name == "_" {
            self.pos = end;
            return Ok(self.token(TokenKind::Underscore, start, name));
        }
        if name.starts_with('_') {
            return Err(CompileError::IllegalNameStart(
                self.lineno,
                name.to_string(),
            ));
        }
        if name.ends_with('_') {
            return Err(CompileError::IllegalNameEnd(self.lineno, name.to_string()));
        }
        self.pos = end;
        Ok(self.token(TokenKind::VarName, start, name))
    }
}

fn word_end(source: &str, start: usize) -> usize {
    let mut end = start;
    for (i, c) in source[start..].char_indices() {
        if c.is_ascii_alphanumeric() || c == '_' {
            end = start + i + 1;
        } else {
            break;
        }
    }
    end
}

fn unescape_quotes(text: &str, quote: char) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text
        .chars()
        .peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek() == Some(&quote) {
            result.push(
                chars
                    .next()
                    .unwrap_or(quote),
            );
        } else {
            result.push(c);
        }
    }
    result
}

/// Escape the characters that are special to the regex dialect, leaving
/// everything else readable.
pub(crate) fn escape_literal(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        if "\\.^$*+?{}[]()|".contains(c) {
            result.push('\\');
        }
        result.push(c);
    }
    result
}

// Escaping above doubles any backslash the user typed. For escape sequences
// the dialect understands, that mangles intent, so put those back to their
// single-escaped form.
fn restore_escapes(text: &str) -> String {
    let mut result = text.to_string();
    for sequence in ["t", "n", "r", "f", "v", "a"] {
        result = result.replace(
            &format!("\\\\{}", sequence),
            &format!("\\{}", sequence),
        );
    }
    regex!(r"\\\\x([0-9A-Fa-f]{2})")
        .replace_all(&result, "\\x$1")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(lines: &[String]) -> Result<Vec<Token>, CompileError> {
        let mut tokenizer = Tokenizer::new(lines);
        let mut tokens = Vec::new();
        loop {
            let token = tokenizer.next_token()?;
            let done = token.kind == TokenKind::End;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        let lines = sanitize(source).unwrap();
        tokenize(&lines)
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    fn failure(source: &str) -> CompileError {
        let lines = sanitize(source).unwrap();
        tokenize(&lines).unwrap_err()
    }

    #[test]
    fn check_indent_dedent_pairing() {
        use TokenKind::*;
        assert_eq!(
            kinds("\nx\n    y = 'z'\n"),
            vec![
                Newline, VarName, Newline, Indent, VarName, Equals, Str, Newline, Dedent, End
            ]
        );
    }

    #[test]
    fn check_dedent_must_return_to_known_level() {
        let source = "\nx\n        a = 'a'\n    b = 'b'\n";
        assert_eq!(failure(source), CompileError::IndentationError(4));
    }

    #[test]
    fn check_mixed_indentation_rejected() {
        assert_eq!(
            failure("\n \tx\n"),
            CompileError::MixedIndentation(2)
        );
    }

    #[test]
    fn check_inconsistent_indent_char_rejected() {
        let source = "\nx\n    a = 'a'\n\tb = 'b'\n";
        assert_eq!(failure(source), CompileError::InconsistentIndentChar(4));
    }

    #[test]
    fn check_globalmark_lexing() {
        use TokenKind::*;
        assert_eq!(
            kinds("\nx\n*)  g = 'g'\n"),
            vec![
                Newline, VarName, Newline, Indent, GlobalMark, VarName, Equals, Str, Newline,
                Dedent, End
            ]
        );
    }

    #[test]
    fn check_globalmark_requires_indentation() {
        assert_eq!(
            failure("\nx\n*)g = 'g'\n"),
            CompileError::GlobalMarkNeedsIndentation(3)
        );
    }

    #[test]
    fn check_string_escaping() {
        let lines = sanitize("\n'O RLY?'\n").unwrap();
        let tokens = tokenize(&lines).unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Str);
        assert_eq!(tokens[1].text, "O RLY\\?");
    }

    #[test]
    fn check_escaped_quote_and_restored_escape() {
        let lines = sanitize("\n'it\\'s\\tme'\n").unwrap();
        let tokens = tokenize(&lines).unwrap();
        assert_eq!(tokens[1].text, "it's\\tme");
    }

    #[test]
    fn check_missing_closing_quote() {
        assert_eq!(
            failure("\nquotes = \"'\n"),
            CompileError::MissingClosingQuote(2, "\"'".to_string())
        );
        assert_eq!(
            failure("\nmcd = 'McDonald\\'s\n"),
            CompileError::MissingClosingQuote(2, "'McDonald\\'s".to_string())
        );
    }

    #[test]
    fn check_class_mode_items() {
        let lines = sanitize("\nx: a A..Z +digit not\n").unwrap();
        let tokens = tokenize(&lines).unwrap();
        let items: Vec<&str> = tokens
            .iter()
            .filter(|token| token.kind == TokenKind::ClassItem)
            .map(|token| token.text.as_str())
            .collect();
        assert_eq!(items, vec!["a", "A..Z", "+digit", "not"]);
    }

    #[test]
    fn check_class_mode_requires_space() {
        assert_eq!(
            failure("\nx:abc\n"),
            CompileError::SpaceAfterColonRequired(2)
        );
    }

    #[test]
    fn check_number_starting_name_rejected() {
        assert_eq!(
            failure("\n101dalmatians\n"),
            CompileError::IllegalNameStart(2, "101dalmatians".to_string())
        );
    }

    #[test]
    fn check_unsupported_syntax() {
        assert_eq!(
            failure("\n`@#$%\n"),
            CompileError::UnsupportedSyntax(2, "`@#$%".to_string())
        );
    }
}
