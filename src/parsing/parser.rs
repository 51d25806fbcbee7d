//! Recursive-descent parser for oprex source
//!
//! The grammar is realized as `read_*` methods pulling tokens on demand.
//! Scope manipulation happens inline, as each construct is recognized: a
//! construct's nested definition block is parsed (and its names bound)
//! before the construct's own references are resolved, which is what lets a
//! lookup line refer to names defined in the block beneath it.

use std::collections::{HashSet, VecDeque};

use crate::language::{
    Assignment, CharClass, Expression, Lookup, Quantifier, Token, TokenKind, Value, Variable,
    VariableDeclaration,
};
use crate::parsing::charclass::{self, ClassItem};
use crate::parsing::flags::{self, Flagset};
use crate::parsing::quantifier::quantify;
use crate::parsing::scope::{ScopeKind, ScopeStack};
use crate::parsing::tokenizer::{sanitize, Tokenizer};
use crate::problem::CompileError;

/// Compile oprex source text into a regex pattern string.
pub fn parse(source: &str) -> Result<String, CompileError> {
    let lines = sanitize(source)?;
    let mut parser = Parser::new(Tokenizer::new(&lines));
    parser.parse_pattern()
}

// A branch or assertion payload, parsed but not yet resolved. Constructs
// that own a definition block parse their payloads first and resolve them
// only once the block's names are bound.
enum Piece {
    Literal(Expression),
    Chain(Vec<Lookup>),
    Class(Vec<ClassItem>, usize),
    Quantified(Quantifier, Box<Piece>),
}

// A lookaround assertion: behind or ahead, positive or negative.
struct Assertion {
    behind: bool,
    negative: bool,
    payload: Piece,
}

struct Parser<'i> {
    tokens: Tokenizer<'i>,
    peeked: VecDeque<Token>,
    scopes: ScopeStack,
    named_groups: HashSet<String>,
    backreferences: Vec<(String, usize)>,
    subroutine_calls: Vec<(String, usize)>,
}

impl<'i> Parser<'i> {
    fn new(tokens: Tokenizer<'i>) -> Parser<'i> {
        Parser {
            tokens,
            peeked: VecDeque::new(),
            scopes: ScopeStack::new(),
            named_groups: HashSet::new(),
            backreferences: Vec::new(),
            subroutine_calls: Vec::new(),
        }
    }

    fn peek_at(&mut self, n: usize) -> Result<&Token, CompileError> {
        while self
            .peeked
            .len()
            <= n
        {
            let token = self
                .tokens
                .next_token()?;
            self.peeked
                .push_back(token);
        }
        Ok(&self.peeked[n])
    }

    fn peek_kind(&mut self) -> Result<TokenKind, CompileError> {
        Ok(self
            .peek_at(0)?
            .kind)
    }

    fn advance(&mut self) -> Result<Token, CompileError> {
        match self
            .peeked
            .pop_front()
        {
            Some(token) => Ok(token),
            None => self
                .tokens
                .next_token(),
        }
    }

    fn eat(&mut self, kind: TokenKind) -> Result<bool, CompileError> {
        if self.peek_kind()? == kind {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, CompileError> {
        let token = self.advance()?;
        if token.kind == kind {
            Ok(token)
        } else {
            Err(self.unexpected(&token))
        }
    }

    fn unexpected(&self, token: &Token) -> CompileError {
        if token.kind == TokenKind::End {
            return CompileError::UnexpectedEndOfInput;
        }
        CompileError::UnexpectedToken(
            token.lineno,
            token
                .kind
                .name(),
            self.tokens
                .line(token.lineno)
                .to_string(),
            token.column,
        )
    }

    fn fail_here(&mut self) -> CompileError {
        match self.advance() {
            Ok(token) => self.unexpected(&token),
            Err(error) => error,
        }
    }

    // oprex := NEWLINE [INDENT] [flags NEWLINE] expression [DEDENT]
    fn parse_pattern(&mut self) -> Result<String, CompileError> {
        match self.peek_kind()? {
            TokenKind::End => return Ok(String::new()),
            TokenKind::Whitespace => {
                self.advance()?;
                self.expect(TokenKind::End)?;
                return Ok(String::new());
            }
            TokenKind::Newline => {
                self.advance()?;
            }
            _ => return Err(self.fail_here()),
        }
        if self.peek_kind()? == TokenKind::End {
            return Ok(String::new());
        }
        let indented = self.eat(TokenKind::Indent)?;

        let mut global_flags = None;
        if self.peek_kind()? == TokenKind::LParen {
            let set = self.read_flagset(true)?;
            for variable in flags::rebound_builtins(&set) {
                self.scopes
                    .override_builtin(variable);
            }
            self.expect(TokenKind::Newline)?;
            global_flags = Some(set);
        }
        // the expression may sit in a block of its own beneath a flags line
        let block_indented = global_flags.is_some() && self.eat(TokenKind::Indent)?;

        let expression = self.read_expression()?;
        if block_indented {
            self.expect(TokenKind::Dedent)?;
        }
        if indented {
            self.expect(TokenKind::Dedent)?;
        }
        let token = self.advance()?;
        if token.kind != TokenKind::End {
            return Err(self.unexpected(&token));
        }

        self.validate()?;
        Ok(format!(
            "{}{}",
            flags::prefix(global_flags.as_ref()),
            expression.text
        ))
    }

    // Every recorded backreference and subroutine call must target a name
    // that was declared capturing somewhere. Forward references are fine,
    // which is why this runs only after the whole source is parsed.
    fn validate(&self) -> Result<(), CompileError> {
        for (name, lineno) in &self.backreferences {
            if !self
                .named_groups
                .contains(name)
            {
                return Err(CompileError::InvalidBackreference(*lineno, name.clone()));
            }
        }
        for (name, lineno) in &self.subroutine_calls {
            if !self
                .named_groups
                .contains(name)
            {
                return Err(CompileError::InvalidSubroutineCall(*lineno, name.clone()));
            }
        }
        Ok(())
    }

    fn read_expression(&mut self) -> Result<Expression, CompileError> {
        match self.peek_kind()? {
            TokenKind::Number | TokenKind::Question => self.read_quantified(),
            TokenKind::VarName | TokenKind::Slash => self.read_lookup_expression(),
            TokenKind::Str | TokenKind::Dot | TokenKind::Underscore => {
                self.read_literal_expression()
            }
            TokenKind::LParen => self.read_flagged_expression(),
            TokenKind::AltMark => self.read_alternation(),
            TokenKind::LookMark => self.read_lookaround(),
            _ => Err(self.fail_here()),
        }
    }

    // expression := repeat 'of' (charclass | expression)
    fn read_quantified(&mut self) -> Result<Expression, CompileError> {
        let repeat = self.read_repeat()?;
        match self.peek_kind()? {
            TokenKind::Colon => {
                let class = self.read_class_construct()?;
                Ok(quantify(Expression::new(class.value), &repeat))
            }
            TokenKind::Whitespace => {
                self.advance()?;
                let expression = self.read_expression()?;
                Ok(quantify(expression, &repeat))
            }
            _ => Err(self.fail_here()),
        }
    }

    // The repeat forms:
    //     N of        N.. of       N..M of         exact / possessive
    //     N.. <<- of  N..M <<- of                  greedy
    //     N <<+.. of  N <<+..M of                  lazy
    //     ? of                                     optional
    fn read_repeat(&mut self) -> Result<Quantifier, CompileError> {
        use crate::language::Greediness;

        let first = self.advance()?;
        if first.kind == TokenKind::Question {
            self.expect(TokenKind::Whitespace)?;
            self.expect_of()?;
            return Ok(Quantifier::optional());
        }
        let lineno = first.lineno;
        let min = parse_count(&first)?;

        match self.peek_kind()? {
            TokenKind::DotDot => {
                self.advance()?;
                let max = if self.peek_kind()? == TokenKind::Number {
                    let token = self.advance()?;
                    Some(parse_count(&token)?)
                } else {
                    None
                };
                self.expect(TokenKind::Whitespace)?;
                let greediness = if self.eat(TokenKind::Backtrack)? {
                    self.expect(TokenKind::Minus)?;
                    self.expect(TokenKind::Whitespace)?;
                    Greediness::None
                } else {
                    Greediness::Possessive
                };
                self.expect_of()?;
                if let Some(max) = max {
                    if max <= min {
                        return Err(CompileError::RepeatMaxNotGreater(lineno));
                    }
                }
                Ok(Quantifier::ranged(min, max, greediness))
            }
            TokenKind::Whitespace => {
                self.advance()?;
                if self.eat(TokenKind::Backtrack)? {
                    self.expect(TokenKind::Plus)?;
                    self.expect(TokenKind::DotDot)?;
                    let max = if self.peek_kind()? == TokenKind::Number {
                        let token = self.advance()?;
                        Some(parse_count(&token)?)
                    } else {
                        None
                    };
                    self.expect(TokenKind::Whitespace)?;
                    self.expect_of()?;
                    if let Some(max) = max {
                        if max <= min {
                            return Err(CompileError::RepeatMaxNotGreater(lineno));
                        }
                    }
                    Ok(Quantifier::ranged(min, max, Greediness::Lazy))
                } else {
                    self.expect_of()?;
                    if min == 0 {
                        return Err(CompileError::RepeatMinZero(lineno));
                    }
                    Ok(Quantifier::exact(min))
                }
            }
            _ => Err(self.fail_here()),
        }
    }

    // 'of' is not a reserved word; it just has to be the name here. This way
    // a variable may still be called 'of'.
    fn expect_of(&mut self) -> Result<(), CompileError> {
        let token = self.expect(TokenKind::VarName)?;
        if token.text != "of" {
            return Err(CompileError::ExpectedOf(token.lineno, token.text));
        }
        Ok(())
    }

    // expression := lookup NEWLINE [INDENT definitions DEDENT]
    fn read_lookup_expression(&mut self) -> Result<Expression, CompileError> {
        let chain = self.read_chain()?;
        self.expect(TokenKind::Newline)?;
        let has_block = self.peek_kind()? == TokenKind::Indent;
        if has_block {
            self.advance()?;
            self.scopes
                .push(ScopeKind::Block);
            self.read_definitions()?;
            self.expect(TokenKind::Dedent)?;
        }
        let (expression, referenced) = self.resolve_chain(&chain)?;
        if has_block {
            self.scopes
                .pop_checked(&referenced, "expression")?;
        }
        Ok(expression)
    }

    // lookup := VARNAME | '/' cell... where cell := [= or &] VARNAME [?] '/'
    fn read_chain(&mut self) -> Result<Vec<Lookup>, CompileError> {
        if self.peek_kind()? == TokenKind::VarName {
            let token = self.advance()?;
            return Ok(vec![Lookup::Variable {
                name: token.text,
                lineno: token.lineno,
                optional: false,
            }]);
        }
        self.expect(TokenKind::Slash)?;
        let mut cells = Vec::new();
        loop {
            let cell = match self.peek_kind()? {
                TokenKind::Equals => {
                    self.advance()?;
                    let name = self.expect(TokenKind::VarName)?;
                    let optional = self.eat(TokenKind::Question)?;
                    Lookup::Backreference {
                        name: name.text,
                        lineno: name.lineno,
                        optional,
                    }
                }
                TokenKind::Amp => {
                    self.advance()?;
                    let name = self.expect(TokenKind::VarName)?;
                    let optional = self.eat(TokenKind::Question)?;
                    Lookup::SubroutineCall {
                        name: name.text,
                        lineno: name.lineno,
                        optional,
                    }
                }
                TokenKind::VarName => {
                    let name = self.advance()?;
                    let optional = self.eat(TokenKind::Question)?;
                    Lookup::Variable {
                        name: name.text,
                        lineno: name.lineno,
                        optional,
                    }
                }
                _ => return Err(self.fail_here()),
            };
            cells.push(cell);
            self.expect(TokenKind::Slash)?;
            match self.peek_kind()? {
                TokenKind::VarName | TokenKind::Equals | TokenKind::Amp => {}
                _ => break,
            }
        }
        Ok(cells)
    }

    // Turn a chain into pattern text against the current scope. A bare
    // single-variable lookup hands back the variable's value as-is, keeping
    // its metadata so a repeat applied to it can merge.
    fn resolve_chain(
        &mut self,
        cells: &[Lookup],
    ) -> Result<(Expression, HashSet<String>), CompileError> {
        let mut referenced = HashSet::new();
        for cell in cells {
            referenced.insert(
                cell.name()
                    .to_string(),
            );
        }

        if let [Lookup::Variable {
            name,
            lineno,
            optional: false,
        }] = cells
        {
            let variable = self
                .scopes
                .lookup(name)
                .ok_or_else(|| CompileError::NotDefined(*lineno, name.clone()))?;
            return Ok((
                variable
                    .value
                    .to_expression(),
                referenced,
            ));
        }

        let mut text = String::new();
        for cell in cells {
            let part = match cell {
                Lookup::Variable {
                    name,
                    lineno,
                    optional,
                } => {
                    let variable = self
                        .scopes
                        .lookup(name)
                        .ok_or_else(|| CompileError::NotDefined(*lineno, name.clone()))?;
                    let expression = variable
                        .value
                        .to_expression();
                    self.cell_text(expression, *optional)
                }
                Lookup::Backreference {
                    name,
                    lineno,
                    optional,
                } => {
                    self.backreferences
                        .push((name.clone(), *lineno));
                    let expression = Expression::grouped(format!("(?P={})", name));
                    self.cell_text(expression, *optional)
                }
                Lookup::SubroutineCall {
                    name,
                    lineno,
                    optional,
                } => {
                    self.subroutine_calls
                        .push((name.clone(), *lineno));
                    let expression = Expression::grouped(format!("(?&{})", name));
                    self.cell_text(expression, *optional)
                }
            };
            text.push_str(&part);
        }
        Ok((Expression::new(text), referenced))
    }

    fn cell_text(&self, expression: Expression, optional: bool) -> String {
        if optional {
            quantify(expression, &Quantifier::optional()).text
        } else {
            expression.text
        }
    }

    // expression := STRING with optional boundary anchors, ended by NEWLINE
    fn read_literal_expression(&mut self) -> Result<Expression, CompileError> {
        let expression = self.read_inline_literal()?;
        self.expect(TokenKind::Newline)?;
        Ok(expression)
    }

    fn read_inline_literal(&mut self) -> Result<Expression, CompileError> {
        let mut text = String::new();
        text.push_str(self.read_anchor()?);
        let string = self.expect(TokenKind::Str)?;
        text.push_str(&string.text);
        text.push_str(self.read_anchor()?);
        Ok(Expression::new(text))
    }

    fn read_anchor(&mut self) -> Result<&'static str, CompileError> {
        if self.eat(TokenKind::Dot)? {
            Ok("\\b")
        } else if self.eat(TokenKind::Underscore)? {
            Ok("\\B")
        } else {
            Ok("")
        }
    }

    // expression := '(' flags ')' NEWLINE INDENT expression DEDENT
    //
    // The flag scope exists only to hold the built-ins the flagset rebinds;
    // it pops without a used-check as soon as the construct ends.
    fn read_flagged_expression(&mut self) -> Result<Expression, CompileError> {
        let set = self.read_flagset(false)?;
        self.expect(TokenKind::Newline)?;
        self.expect(TokenKind::Indent)?;
        self.scopes
            .push(ScopeKind::Flag);
        for variable in flags::rebound_builtins(&set) {
            self.scopes
                .override_builtin(variable);
        }
        let inner = self.read_expression()?;
        self.expect(TokenKind::Dedent)?;
        self.scopes
            .pop_unchecked();
        Ok(Expression::grouped(flags::inline_group(&set, &inner.text)))
    }

    fn read_flagset(&mut self, global: bool) -> Result<Flagset, CompileError> {
        self.expect(TokenKind::LParen)?;
        let mut set = Flagset::default();
        loop {
            match self.peek_kind()? {
                TokenKind::RParen => {
                    let close = self.advance()?;
                    if set
                        .turn_on
                        .is_empty()
                        && set
                            .turn_off
                            .is_empty()
                    {
                        return Err(self.unexpected(&close));
                    }
                    return Ok(set);
                }
                TokenKind::Whitespace => {
                    self.advance()?;
                }
                TokenKind::Minus => {
                    self.advance()?;
                    let flag = self.read_flag(global)?;
                    set.turn_off
                        .push(flag);
                }
                TokenKind::VarName => {
                    let flag = self.read_flag(global)?;
                    set.turn_on
                        .push(flag);
                }
                _ => return Err(self.fail_here()),
            }
        }
    }

    fn read_flag(&mut self, global: bool) -> Result<&'static flags::Flag, CompileError> {
        let token = self.expect(TokenKind::VarName)?;
        let flag = flags::by_name(&token.text)
            .ok_or_else(|| CompileError::UnknownFlag(token.lineno, token.text.clone()))?;
        if !global && flag.global_only {
            return Err(CompileError::GlobalFlagScoped(token.lineno, token.text));
        }
        Ok(flag)
    }

    // expression := '<<|' NEWLINE INDENT ('|' branch NEWLINE)... definitions DEDENT
    fn read_alternation(&mut self) -> Result<Expression, CompileError> {
        self.expect(TokenKind::AltMark)?;
        self.expect(TokenKind::Newline)?;
        self.expect(TokenKind::Indent)?;
        self.scopes
            .push(ScopeKind::Block);

        let mut branches = Vec::new();
        while self.eat(TokenKind::Bar)? {
            let piece = self.read_piece()?;
            self.expect(TokenKind::Newline)?;
            branches.push(piece);
        }
        if branches.is_empty() {
            return Err(self.fail_here());
        }
        self.read_definitions()?;
        self.expect(TokenKind::Dedent)?;

        let mut referenced = HashSet::new();
        let mut texts = Vec::new();
        for piece in &branches {
            let expression = self.resolve_piece(piece, &mut referenced)?;
            texts.push(expression.text);
        }
        self.scopes
            .pop_checked(&referenced, "expression")?;
        Ok(Expression::grouped(format!("(?:{})", texts.join("|"))))
    }

    // expression := '<@>' NEWLINE INDENT assertion... definitions DEDENT
    // assertion  := '<' ['!'] payload '|' NEWLINE     (behind)
    //             | '|' ['!'] payload '>' NEWLINE     (ahead)
    fn read_lookaround(&mut self) -> Result<Expression, CompileError> {
        self.expect(TokenKind::LookMark)?;
        self.expect(TokenKind::Newline)?;
        self.expect(TokenKind::Indent)?;
        self.scopes
            .push(ScopeKind::Block);

        let mut assertions = Vec::new();
        loop {
            match self.peek_kind()? {
                TokenKind::Less => {
                    self.advance()?;
                    let negative = self.eat(TokenKind::Bang)?;
                    let payload = self.read_piece()?;
                    self.expect(TokenKind::Bar)?;
                    self.expect(TokenKind::Newline)?;
                    assertions.push(Assertion {
                        behind: true,
                        negative,
                        payload,
                    });
                }
                TokenKind::Bar => {
                    self.advance()?;
                    let negative = self.eat(TokenKind::Bang)?;
                    let payload = self.read_piece()?;
                    self.expect(TokenKind::Greater)?;
                    self.expect(TokenKind::Newline)?;
                    assertions.push(Assertion {
                        behind: false,
                        negative,
                        payload,
                    });
                }
                _ => break,
            }
        }
        if assertions.is_empty() {
            return Err(self.fail_here());
        }
        self.read_definitions()?;
        self.expect(TokenKind::Dedent)?;

        let mut referenced = HashSet::new();
        let mut text = String::new();
        for assertion in &assertions {
            let inner = self.resolve_piece(&assertion.payload, &mut referenced)?;
            let opener = match (assertion.behind, assertion.negative) {
                (true, false) => "(?<=",
                (true, true) => "(?<!",
                (false, false) => "(?=",
                (false, true) => "(?!",
            };
            text.push_str(opener);
            text.push_str(&inner.text);
            text.push(')');
        }
        self.scopes
            .pop_checked(&referenced, "expression")?;
        Ok(Expression::new(text))
    }

    // A single-line payload inside an alternation branch or a lookaround
    // assertion. Resolution is deferred until the owning construct's
    // definition block has been parsed.
    fn read_piece(&mut self) -> Result<Piece, CompileError> {
        match self.peek_kind()? {
            TokenKind::Str | TokenKind::Dot | TokenKind::Underscore => {
                Ok(Piece::Literal(self.read_inline_literal()?))
            }
            TokenKind::VarName | TokenKind::Slash => Ok(Piece::Chain(self.read_chain()?)),
            TokenKind::Colon => {
                let (items, lineno) = self.read_class_items()?;
                Ok(Piece::Class(items, lineno))
            }
            TokenKind::Number | TokenKind::Question => {
                let repeat = self.read_repeat()?;
                match self.peek_kind()? {
                    TokenKind::Colon => {
                        let (items, lineno) = self.read_class_items()?;
                        Ok(Piece::Quantified(
                            repeat,
                            Box::new(Piece::Class(items, lineno)),
                        ))
                    }
                    TokenKind::Whitespace => {
                        self.advance()?;
                        Ok(Piece::Quantified(repeat, Box::new(self.read_piece()?)))
                    }
                    _ => Err(self.fail_here()),
                }
            }
            _ => Err(self.fail_here()),
        }
    }

    fn resolve_piece(
        &mut self,
        piece: &Piece,
        referenced: &mut HashSet<String>,
    ) -> Result<Expression, CompileError> {
        match piece {
            Piece::Literal(expression) => Ok(expression.clone()),
            Piece::Chain(cells) => {
                let (expression, names) = self.resolve_chain(cells)?;
                referenced.extend(names);
                Ok(expression)
            }
            Piece::Class(items, lineno) => {
                referenced.extend(charclass::include_names(items));
                let class = charclass::compile(items, &self.scopes, *lineno)?;
                Ok(Expression::new(class.value))
            }
            Piece::Quantified(repeat, inner) => {
                let expression = self.resolve_piece(inner, referenced)?;
                Ok(quantify(expression, repeat))
            }
        }
    }

    // charclass := ':' items NEWLINE [INDENT definitions DEDENT]
    //
    // The definition block defines the classes the item list includes, so
    // the used-check runs against the include names and compilation happens
    // while the block's scope is still open.
    fn read_class_construct(&mut self) -> Result<CharClass, CompileError> {
        let (items, lineno) = self.read_class_items()?;
        self.expect(TokenKind::Newline)?;
        let has_block = self.peek_kind()? == TokenKind::Indent;
        if has_block {
            self.advance()?;
            self.scopes
                .push(ScopeKind::Block);
            self.read_definitions()?;
            self.expect(TokenKind::Dedent)?;
            let included: HashSet<String> = charclass::include_names(&items)
                .into_iter()
                .collect();
            self.scopes
                .check_used(&included, "character class definition")?;
        }
        let class = charclass::compile(&items, &self.scopes, lineno)?;
        if has_block {
            self.scopes
                .pop_unchecked();
        }
        Ok(class)
    }

    fn read_class_items(&mut self) -> Result<(Vec<ClassItem>, usize), CompileError> {
        let colon = self.expect(TokenKind::Colon)?;
        let mut items = Vec::new();
        while self.peek_kind()? == TokenKind::ClassItem {
            let token = self.advance()?;
            items.push(ClassItem {
                text: token.text,
                lineno: token.lineno,
            });
        }
        Ok((items, colon.lineno))
    }

    // definitions := (assignment | GLOBALMARK assignment)...
    fn read_definitions(&mut self) -> Result<(), CompileError> {
        loop {
            match self.peek_kind()? {
                TokenKind::VarName | TokenKind::LBracket | TokenKind::At => {
                    self.read_definition(false)?;
                }
                TokenKind::GlobalMark => {
                    self.advance()?;
                    self.read_definition(true)?;
                }
                _ => return Ok(()),
            }
        }
    }

    fn read_definition(&mut self, global: bool) -> Result<(), CompileError> {
        let assignment = self.read_assignment()?;
        for declaration in &assignment.declarations {
            let value = self.declared_value(declaration, &assignment.value);
            if declaration.capturing {
                self.named_groups
                    .insert(
                        declaration
                            .name
                            .clone(),
                    );
            }
            let variable = Variable {
                name: declaration
                    .name
                    .clone(),
                value,
                lineno: declaration.lineno,
            };
            self.scopes
                .define(variable, global, declaration.lineno)?;
        }
        Ok(())
    }

    // The markers on a declaration wrap its value: atomic innermost, then
    // the capturing group carrying the declared name.
    fn declared_value(&self, declaration: &VariableDeclaration, base: &Value) -> Value {
        if !declaration.capturing && !declaration.atomic {
            return base.clone();
        }
        let mut expression = base.to_expression();
        if declaration.atomic {
            expression = Expression::grouped(format!("(?>{})", expression.text));
        }
        if declaration.capturing {
            expression = Expression::grouped(format!(
                "(?<{}>{})",
                declaration.name, expression.text
            ));
        }
        Value::Pattern(expression)
    }

    // assignment := declaration '=' (assignment | expression)
    //             | declaration ':' charclass
    fn read_assignment(&mut self) -> Result<Assignment, CompileError> {
        let declaration = self.read_declaration()?;
        let lineno = declaration.lineno;
        match self.peek_kind()? {
            TokenKind::Colon => {
                let class = self.read_class_construct()?;
                Ok(Assignment {
                    declarations: vec![declaration],
                    value: Value::Class(class),
                    lineno,
                })
            }
            TokenKind::Equals => {
                self.advance()?;
                let chained = match self.peek_kind()? {
                    TokenKind::LBracket | TokenKind::At => true,
                    TokenKind::VarName => matches!(
                        self.peek_at(1)?
                            .kind,
                        TokenKind::Equals | TokenKind::Colon
                    ),
                    _ => false,
                };
                if chained {
                    let mut assignment = self.read_assignment()?;
                    assignment
                        .declarations
                        .push(declaration);
                    Ok(assignment)
                } else {
                    let expression = self.read_expression()?;
                    Ok(Assignment {
                        declarations: vec![declaration],
                        value: Value::Pattern(expression),
                        lineno,
                    })
                }
            }
            _ => Err(self.fail_here()),
        }
    }

    fn read_declaration(&mut self) -> Result<VariableDeclaration, CompileError> {
        let atomic = self.eat(TokenKind::At)?;
        if self.eat(TokenKind::LBracket)? {
            let name = self.expect(TokenKind::VarName)?;
            self.expect(TokenKind::RBracket)?;
            return Ok(VariableDeclaration {
                name: name.text,
                lineno: name.lineno,
                capturing: true,
                atomic,
            });
        }
        let name = self.expect(TokenKind::VarName)?;
        Ok(VariableDeclaration {
            name: name.text,
            lineno: name.lineno,
            capturing: false,
            atomic,
        })
    }
}

fn parse_count(token: &Token) -> Result<u64, CompileError> {
    token
        .text
        .parse()
        .map_err(|_| CompileError::UnsupportedSyntax(token.lineno, token.text.clone()))
}
