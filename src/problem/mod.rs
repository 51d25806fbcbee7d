// Program wide top-level error handling

use std::{fmt, path::Path};

/// A failure reading source before compilation even starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingError<'i> {
    pub problem: String,
    pub details: String,
    pub filename: &'i Path,
}

impl<'i> fmt::Display for LoadingError<'i> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.problem, self.details)
    }
}

/// Everything that can go wrong while compiling oprex source. The first
/// variant field is the 1-based source line the failure is reported against;
/// 0 means the failure has no line of its own (end of input).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    FirstLineNotBlank(usize, String),
    LastLineNotBlank(usize, String),
    MixedIndentation(usize),
    InconsistentIndentChar(usize),
    IndentationError(usize),
    GlobalMarkSyntax(usize, String),
    GlobalMarkNotAtLineStart(usize),
    GlobalMarkNeedsIndentation(usize),
    MissingClosingQuote(usize, String),
    BadEscape(usize, String),
    UnsupportedSyntax(usize, String),
    IllegalNameStart(usize, String),
    IllegalNameEnd(usize, String),
    UnexpectedToken(usize, &'static str, String, usize),
    UnexpectedEndOfInput,
    NotDefined(usize, String),
    AlreadyDefined(usize, String, usize),
    BuiltinRedefined(usize, String),
    UnusedVariable(usize, String, &'static str),
    SpaceAfterColonRequired(usize),
    EmptyCharClass(usize),
    DuplicateClassItem(usize, String),
    InvalidClassKeyword(usize, String),
    InvalidCharRange(usize, String),
    BadCodePoint(usize, String),
    CodePointOutOfRange(usize, String),
    CharNameNotUppercase(usize),
    OperatorMisuse(usize, String),
    NotACharClass(usize, String),
    CannotIncludeUndefined(usize, String),
    RejectedFragment(usize, String, String, String),
    ExpectedOf(usize, String),
    RepeatMinZero(usize),
    RepeatMaxNotGreater(usize),
    UnknownFlag(usize, String),
    GlobalFlagScoped(usize, String),
    InvalidBackreference(usize, String),
    InvalidSubroutineCall(usize, String),
}

impl CompileError {
    pub fn lineno(&self) -> Option<usize> {
        let lineno = match self {
            CompileError::FirstLineNotBlank(lineno, _) => *lineno,
            CompileError::LastLineNotBlank(lineno, _) => *lineno,
            CompileError::MixedIndentation(lineno) => *lineno,
            CompileError::InconsistentIndentChar(lineno) => *lineno,
            CompileError::IndentationError(lineno) => *lineno,
            CompileError::GlobalMarkSyntax(lineno, _) => *lineno,
            CompileError::GlobalMarkNotAtLineStart(lineno) => *lineno,
            CompileError::GlobalMarkNeedsIndentation(lineno) => *lineno,
            CompileError::MissingClosingQuote(lineno, _) => *lineno,
            CompileError::BadEscape(lineno, _) => *lineno,
            CompileError::UnsupportedSyntax(lineno, _) => *lineno,
            CompileError::IllegalNameStart(lineno, _) => *lineno,
            CompileError::IllegalNameEnd(lineno, _) => *lineno,
            CompileError::UnexpectedToken(lineno, _, _, _) => *lineno,
            CompileError::UnexpectedEndOfInput => 0,
            CompileError::NotDefined(lineno, _) => *lineno,
            CompileError::AlreadyDefined(lineno, _, _) => *lineno,
            CompileError::BuiltinRedefined(lineno, _) => *lineno,
            CompileError::UnusedVariable(lineno, _, _) => *lineno,
            CompileError::SpaceAfterColonRequired(lineno) => *lineno,
            CompileError::EmptyCharClass(lineno) => *lineno,
            CompileError::DuplicateClassItem(lineno, _) => *lineno,
            CompileError::InvalidClassKeyword(lineno, _) => *lineno,
            CompileError::InvalidCharRange(lineno, _) => *lineno,
            CompileError::BadCodePoint(lineno, _) => *lineno,
            CompileError::CodePointOutOfRange(lineno, _) => *lineno,
            CompileError::CharNameNotUppercase(lineno) => *lineno,
            CompileError::OperatorMisuse(lineno, _) => *lineno,
            CompileError::NotACharClass(lineno, _) => *lineno,
            CompileError::CannotIncludeUndefined(lineno, _) => *lineno,
            CompileError::RejectedFragment(lineno, _, _, _) => *lineno,
            CompileError::ExpectedOf(lineno, _) => *lineno,
            CompileError::RepeatMinZero(lineno) => *lineno,
            CompileError::RepeatMaxNotGreater(lineno) => *lineno,
            CompileError::UnknownFlag(lineno, _) => *lineno,
            CompileError::GlobalFlagScoped(lineno, _) => *lineno,
            CompileError::InvalidBackreference(lineno, _) => *lineno,
            CompileError::InvalidSubroutineCall(lineno, _) => *lineno,
        };
        if lineno == 0 {
            None
        } else {
            Some(lineno)
        }
    }

    pub fn message(&self) -> String {
        match self {
            CompileError::FirstLineNotBlank(_, line) => {
                format!("First line must be blank, not: {}", line)
            }
            CompileError::LastLineNotBlank(_, line) => {
                format!("Last line must be blank, not: {}", line)
            }
            CompileError::MixedIndentation(_) => {
                "Cannot mix space and tab for indentation".to_string()
            }
            CompileError::InconsistentIndentChar(_) => {
                "Inconsistent indentation character".to_string()
            }
            CompileError::IndentationError(_) => "Indentation error".to_string(),
            CompileError::GlobalMarkSyntax(_, text) => format!("Syntax error: {}", text),
            CompileError::GlobalMarkNotAtLineStart(_) => {
                "The GLOBALMARK *) must be put at the line's beginning".to_string()
            }
            CompileError::GlobalMarkNeedsIndentation(_) => {
                "Indentation required after GLOBALMARK *)".to_string()
            }
            CompileError::MissingClosingQuote(_, text) => {
                format!("Missing closing quote: {}", text)
            }
            CompileError::BadEscape(_, text) => format!("Bad escape sequence: {}", text),
            CompileError::UnsupportedSyntax(_, text) => format!("Unsupported syntax: {}", text),
            CompileError::IllegalNameStart(_, name) => {
                format!("Illegal variable name (must start with a letter): {}", name)
            }
            CompileError::IllegalNameEnd(_, name) => {
                format!("Illegal variable name (must not end with underscore): {}", name)
            }
            CompileError::UnexpectedToken(_, kind, line, column) => {
                if *column == 0 {
                    format!("Unexpected {}", kind)
                } else {
                    let pointer = " ".repeat(column - 1);
                    format!("Unexpected {}\n{}\n{}^", kind, line, pointer)
                }
            }
            CompileError::UnexpectedEndOfInput => "Unexpected end of input".to_string(),
            CompileError::NotDefined(_, name) => format!("Variable '{}' is not defined", name),
            CompileError::AlreadyDefined(_, name, original) => format!(
                "Variable '{}' already defined (previous definition at line {})",
                name, original
            ),
            CompileError::BuiltinRedefined(_, name) => {
                format!("'{}' is a built-in variable and cannot be redefined", name)
            }
            CompileError::UnusedVariable(_, name, context) => {
                format!("'{}' is defined but not used (by its parent {})", name, context)
            }
            CompileError::SpaceAfterColonRequired(_) => {
                "Character class definition requires space after the : (colon)".to_string()
            }
            CompileError::EmptyCharClass(_) => "Empty character class is not allowed".to_string(),
            CompileError::DuplicateClassItem(_, item) => {
                format!("Duplicate item in character class definition: {}", item)
            }
            CompileError::InvalidClassKeyword(_, item) => {
                format!("Not a valid character class keyword: {}", item)
            }
            CompileError::InvalidCharRange(_, item) => {
                format!("Invalid character range: {}", item)
            }
            CompileError::BadCodePoint(_, item) => {
                format!("Syntax error {} should be U+hexadecimal", item)
            }
            CompileError::CodePointOutOfRange(_, item) => {
                format!("Syntax error {} out of range", item)
            }
            CompileError::CharNameNotUppercase(_) => {
                "Character name must be in uppercase".to_string()
            }
            CompileError::OperatorMisuse(_, op) => {
                format!("Incorrect use of '{}' operator", op)
            }
            CompileError::NotACharClass(_, name) => {
                format!("Cannot include '{}': not a character class", name)
            }
            CompileError::CannotIncludeUndefined(_, name) => {
                format!("Cannot include '{}': not defined", name)
            }
            CompileError::RejectedFragment(_, item, fragment, error) => format!(
                "{} compiles to {} which is rejected by the regex engine with error message: {}",
                item, fragment, error
            ),
            CompileError::ExpectedOf(_, found) => {
                format!("Expected 'of' but instead got: {}", found)
            }
            CompileError::RepeatMinZero(_) => {
                "Minimum repeat is 1 (to allow zero quantity, put it inside optional expression)"
                    .to_string()
            }
            CompileError::RepeatMaxNotGreater(_) => {
                "Repeat max must be greater than min".to_string()
            }
            CompileError::UnknownFlag(_, name) => format!("Unknown flag '{}'", name),
            CompileError::GlobalFlagScoped(_, name) => {
                format!("'{}' is a global flag and cannot be scoped", name)
            }
            CompileError::InvalidBackreference(_, name) => {
                format!("Invalid backreference: '{}' is not a capturing group", name)
            }
            CompileError::InvalidSubroutineCall(_, name) => {
                format!("Invalid subroutine call: '{}' is not a capturing group", name)
            }
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lineno() {
            Some(lineno) => write!(f, "Line {}: {}", lineno, self.message()),
            None => write!(f, "{}", self.message()),
        }
    }
}

impl std::error::Error for CompileError {}
