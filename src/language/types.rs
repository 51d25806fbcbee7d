//! Types flowing through the oprex compilation pipeline

/// The token kinds produced by the tokenizer. INDENT, DEDENT, and GLOBALMARK
/// are synthetic: they are derived from the indentation of a line rather than
/// from characters of their own.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Newline,
    Indent,
    Dedent,
    GlobalMark,
    Whitespace,
    Number,
    DotDot,
    Dot,
    Underscore,
    Question,
    Equals,
    Colon,
    Slash,
    VarName,
    Str,
    ClassItem,
    LParen,
    RParen,
    LBracket,
    RBracket,
    At,
    Amp,
    Bar,
    Bang,
    Less,
    Greater,
    Backtrack,
    AltMark,
    LookMark,
    Minus,
    Plus,
    End,
}

impl TokenKind {
    /// The name used when reporting an unexpected token.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Newline => "NEWLINE",
            TokenKind::Indent => "INDENT",
            TokenKind::Dedent => "DEDENT",
            TokenKind::GlobalMark => "GLOBALMARK",
            TokenKind::Whitespace => "WHITESPACE",
            TokenKind::Number => "NUMBER",
            TokenKind::DotDot => "DOTDOT",
            TokenKind::Dot => "DOT",
            TokenKind::Underscore => "UNDERSCORE",
            TokenKind::Question => "QUESTION",
            TokenKind::Equals => "EQUALS",
            TokenKind::Colon => "COLON",
            TokenKind::Slash => "SLASH",
            TokenKind::VarName => "VARNAME",
            TokenKind::Str => "STRING",
            TokenKind::ClassItem => "CLASSITEM",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::LBracket => "LBRACKET",
            TokenKind::RBracket => "RBRACKET",
            TokenKind::At => "ATSIGN",
            TokenKind::Amp => "AMPERSAND",
            TokenKind::Bar => "BAR",
            TokenKind::Bang => "BANG",
            TokenKind::Less => "LESSTHAN",
            TokenKind::Greater => "GREATERTHAN",
            TokenKind::Backtrack => "BACKTRACK",
            TokenKind::AltMark => "ALTMARK",
            TokenKind::LookMark => "LOOKMARK",
            TokenKind::Minus => "MINUS",
            TokenKind::Plus => "PLUS",
            TokenKind::End => "EOF",
        }
    }
}

/// A lexed token. `column` is 1-based; synthetic tokens carry column 0 since
/// there is no character to point at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub lineno: usize,
    pub column: usize,
}

/// A compiled regex fragment. `grouped` records that the text is already
/// wrapped in a group of its own, so a quantifier or another wrap never needs
/// to add one. `quantifier` is the suffix most recently applied, kept so that
/// quantifying an already-quantified fragment can merge the two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    pub text: String,
    pub grouped: bool,
    pub quantifier: Option<String>,
}

impl Expression {
    pub fn new(text: String) -> Expression {
        Expression {
            text,
            grouped: false,
            quantifier: None,
        }
    }

    pub fn grouped(text: String) -> Expression {
        Expression {
            text,
            grouped: true,
            quantifier: None,
        }
    }
}

/// A compiled character class. `value` is always immediately embeddable: a
/// single escaped character or a complete bracket expression. `subvalue` is
/// the form spliced into another class that includes this one, and
/// `rebracket` tells that including class it must add brackets of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharClass {
    pub value: String,
    pub subvalue: String,
    pub set_op: bool,
    pub rebracket: bool,
}

/// What a variable holds: an ordinary regex fragment, or a character class
/// (which other classes may include).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Pattern(Expression),
    Class(CharClass),
}

impl Value {
    /// View this value as a plain expression, for concatenation and
    /// quantification.
    pub fn to_expression(&self) -> Expression {
        match self {
            Value::Pattern(expression) => expression.clone(),
            Value::Class(class) => Expression::new(class.value.clone()),
        }
    }
}

/// A name bound in some scope. `lineno == 0` marks a built-in. Variables are
/// never mutated once created; redefinition is always an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub value: Value,
    pub lineno: usize,
}

/// One target of an assignment, as written on its left-hand side. `[name]`
/// declares a capturing group, `@name` an atomic wrap, `@[name]` both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDeclaration {
    pub name: String,
    pub lineno: usize,
    pub capturing: bool,
    pub atomic: bool,
}

/// An assignment, possibly chained (`a = b = 'x'`). Declarations are listed
/// innermost first, the order in which they get defined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub declarations: Vec<VariableDeclaration>,
    pub value: Value,
    pub lineno: usize,
}

/// One cell of a lookup chain. The three kinds share a shape but resolve
/// differently, so they are a proper sum rather than a flag on one struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Variable {
        name: String,
        lineno: usize,
        optional: bool,
    },
    Backreference {
        name: String,
        lineno: usize,
        optional: bool,
    },
    SubroutineCall {
        name: String,
        lineno: usize,
        optional: bool,
    },
}

impl Lookup {
    pub fn name(&self) -> &str {
        match self {
            Lookup::Variable { name, .. } => name,
            Lookup::Backreference { name, .. } => name,
            Lookup::SubroutineCall { name, .. } => name,
        }
    }
}

/// Backtracking behavior of a repeat. Greedy ranges are the suffix-free
/// form, so they carry `None` here.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Greediness {
    None,
    Possessive,
    Lazy,
}

/// A parsed repeat, ready to be applied to an expression. `base` is the bare
/// regex repetition (`{2,5}`, `+`, `?`, ...) before the greediness modifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quantifier {
    pub base: String,
    pub greediness: Greediness,
}

impl Quantifier {
    /// An exact repeat count. `1 of` repeats once, which needs no suffix at
    /// all.
    pub fn exact(count: u64) -> Quantifier {
        let base = if count == 1 {
            String::new()
        } else {
            format!("{{{}}}", count)
        };
        Quantifier {
            base,
            greediness: Greediness::None,
        }
    }

    /// A ranged repeat, collapsed to the idiomatic shorthand where one
    /// exists.
    pub fn ranged(min: u64, max: Option<u64>, greediness: Greediness) -> Quantifier {
        let base = match max {
            Some(1) if min == 0 => "?".to_string(),
            Some(max) => format!("{{{},{}}}", min, max),
            None if min == 0 => "*".to_string(),
            None if min == 1 => "+".to_string(),
            None => format!("{{{},}}", min),
        };
        Quantifier { base, greediness }
    }

    /// The `?` suffix applied to optional lookup cells and `? of` repeats.
    pub fn optional() -> Quantifier {
        Quantifier {
            base: "?".to_string(),
            greediness: Greediness::Possessive,
        }
    }

    /// The complete suffix to append to a fragment.
    pub fn suffix(&self) -> String {
        let modifier = match self.greediness {
            Greediness::None => "",
            Greediness::Possessive => "+",
            Greediness::Lazy => "?",
        };
        if self.base.is_empty() {
            String::new()
        } else {
            format!("{}{}", self.base, modifier)
        }
    }
}
