use std::collections::{HashMap, HashSet};

use crate::{
    environment::prelude::{
        Declared, SemanticError, SemanticErrorType, Symbol, SymbolTable, ValueType, GLOBAL_SCOPE
    },
    lexer::prelude::{tokenize, Lexed, Token, TokenKind},
    utils::prelude::{Location, Problem},
};
use super::ast::{Expression, Identifier, InfixOperator, Program, ReturnType};
use super::error::{parse_error, ParseError, ParseErrorType, ParseWarning, Problems};

pub trait Parse
    where Self: Sized,
{
    fn parse(
        parser: &mut Parser,
        precedence: Option<Precedence>
    ) -> Result<Self, ParseError>;
}

pub trait InfixParse
    where Self: Sized,
{
    fn parse(
        parser: &mut Parser,
        left: Expression,
        precedence: Option<Precedence>
    ) -> Result<Self, ParseError>;
}

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub enum Precedence {
    Lowest,
    Or,
    And,
    Relational,
    Sum,
    Product,
    Prefix
}

impl From<TokenKind> for Precedence {
    fn from(value: TokenKind) -> Self {
        match InfixOperator::from_token(value) {
            Some(operator) => operator.precedence(),
            None => Self::Lowest
        }
    }
}

/// Statements and expressions nested deeper than this are rejected instead
/// of exhausting the native stack.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Header of a top-level function, collected before parsing so calls may
/// precede the definition.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSignature {
    pub name: String,
    pub arity: usize,
    pub return_type: ReturnType,
    pub location: Location,
}

#[derive(Debug)]
pub struct Parsed {
    pub program: Program,
    pub symbols: SymbolTable,
    pub errors: Vec<Problem>,
    pub warnings: Vec<ParseWarning>,
}

/// Saved parser position for speculative parsing.
#[derive(Debug, Clone, Copy)]
pub struct Checkpoint {
    cursor: usize,
    problems: (usize, usize),
}

pub struct Parser {
    tokens: Vec<Token>,
    cursor: usize,
    eof: Token,

    pub problems: Problems,
    pub symbols: SymbolTable,

    functions: HashMap<String, FunctionSignature>,
    defined: HashSet<String>,
    loop_depth: usize,
    block_depth: usize,
    function: Option<String>,
    nesting: usize,
}

impl Parser {
    pub fn new(lexed: Lexed) -> Self {
        let mut problems = Problems::default();

        for error in lexed.errors {
            problems.error(error);
        }

        // invalid tokens already produced a lexical error
        let tokens = lexed.tokens.into_iter()
            .filter(|token| !token.is(TokenKind::Invalid))
            .collect::<Vec<Token>>();

        let eof = match tokens.last() {
            Some(last) if last.is(TokenKind::Eof) => last.clone(),
            Some(last) => Token::placeholder(TokenKind::Eof, last),
            None => Token {
                kind: TokenKind::Eof,
                lexeme: String::new(),
                value: None,
                line: 1,
                column: 1,
                offset: 0,
            }
        };

        let functions = prescan(&tokens);

        Self {
            tokens,
            cursor: 0,
            eof,

            problems,
            symbols: SymbolTable::new(),

            functions,
            defined: HashSet::new(),
            loop_depth: 0,
            block_depth: 0,
            function: None,
            nesting: 0,
        }
    }

    pub fn parse(mut self) -> Parsed {
        let program = match Program::parse(&mut self, None) {
            Ok(program) => program,
            Err(err) => {
                let location = err.location;
                self.problems.error(err);

                Program { statements: vec![], location }
            }
        };

        if let Some(global) = self.symbols.scope(GLOBAL_SCOPE) {
            let unused = unused_warnings(global.unused());

            for warning in unused {
                self.problems.warning(warning);
            }
        }

        self.problems.sort();

        let errors = self.problems.take_errors();
        let warnings = self.problems.take_warnings();

        log::debug!(
            "parsed {} statement(s) with {} error(s) and {} warning(s)",
            program.statements.len(), errors.len(), warnings.len()
        );

        Parsed {
            program,
            symbols: self.symbols,
            errors,
            warnings,
        }
    }

    pub fn current(&self) -> &Token {
        self.tokens.get(self.cursor).unwrap_or(&self.eof)
    }

    pub fn peek(&self, distance: usize) -> &Token {
        self.tokens.get(self.cursor + distance).unwrap_or(&self.eof)
    }

    pub fn check(&self, kind: TokenKind) -> bool {
        self.current().is(kind)
    }

    pub fn current_precedence(&self) -> Precedence {
        Precedence::from(self.current().kind)
    }

    /// Consumes the current token. End of input is never consumed.
    pub fn advance(&mut self) -> Token {
        let token = self.current().clone();

        if !token.is(TokenKind::Eof) {
            self.cursor += 1;
        }

        token
    }

    pub fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        match self.check(kind) {
            true => Some(self.advance()),
            false => None
        }
    }

    pub fn expect_one(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        match self.eat(kind) {
            Some(token) => Ok(token),
            None => parse_error(
                ParseErrorType::UnexpectedToken {
                    expected: format!("`{}`", kind.as_literal()),
                    found: self.current().to_string(),
                },
                self.current().location()
            )
        }
    }

    /// Like `expect_one`, but a missing token is recorded and a zero-width
    /// placeholder is returned without consuming anything.
    pub fn expect_or_insert(&mut self, kind: TokenKind) -> Token {
        match self.expect_one(kind) {
            Ok(token) => token,
            Err(err) => {
                self.problems.error(err);

                Token::placeholder(kind, self.current())
            }
        }
    }

    pub fn expect_ident(&mut self) -> Result<Identifier, ParseError> {
        match self.eat(TokenKind::Ident) {
            Some(token) => Ok(Identifier {
                location: token.location(),
                value: token.lexeme,
            }),
            None => parse_error(
                ParseErrorType::UnexpectedToken {
                    expected: "identifier".to_string(),
                    found: self.current().to_string(),
                },
                self.current().location()
            )
        }
    }

    /// Parses `int`, `double`, `string` or `bool`, optionally followed by `[]`.
    pub fn parse_type(&mut self) -> Result<ValueType, ParseError> {
        let value_type = match type_of(self.current().kind) {
            Some(value_type) => value_type,
            None => return parse_error(
                ParseErrorType::UnexpectedToken {
                    expected: "a type".to_string(),
                    found: self.current().to_string(),
                },
                self.current().location()
            )
        };
        self.advance();

        if self.check(TokenKind::LBracket) && self.peek(1).is(TokenKind::RBracket) {
            self.advance();
            self.advance();

            return Ok(ValueType::array_of(value_type));
        }

        Ok(value_type)
    }

    /// True when the upcoming tokens open a function declaration.
    pub fn is_function_start(&self) -> bool {
        match self.current().kind {
            TokenKind::Func => true,
            TokenKind::Void => self.peek(1).is(TokenKind::Ident) && self.peek(2).is(TokenKind::LParen),
            kind if kind.is_variable_type() => {
                let offset = match self.peek(1).is(TokenKind::LBracket) && self.peek(2).is(TokenKind::RBracket) {
                    true => 3,
                    false => 1
                };

                self.peek(offset).is(TokenKind::Ident) && self.peek(offset + 1).is(TokenKind::LParen)
            },
            _ => false
        }
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            cursor: self.cursor,
            problems: self.problems.mark(),
        }
    }

    /// Returns to `checkpoint`, dropping anything reported since.
    pub fn rewind(&mut self, checkpoint: Checkpoint) {
        self.cursor = checkpoint.cursor;
        self.problems.truncate(checkpoint.problems);
    }

    /// Skips to the next `;` (consumed), `}` or end of input.
    pub fn synchronize(&mut self) {
        loop {
            match self.current().kind {
                TokenKind::Semicolon => {
                    self.advance();
                    break;
                },
                TokenKind::RBrace | TokenKind::Eof => break,
                _ => {
                    self.advance();
                }
            }
        }
    }

    pub fn error(&mut self, error: impl Into<Problem>) {
        self.problems.error(error)
    }

    pub fn semantic_error(&mut self, error: SemanticErrorType, location: Location) {
        self.problems.error(SemanticError::new(error, location))
    }

    pub fn warning(&mut self, warning: ParseWarning) {
        self.problems.warning(warning)
    }

    /// Runs `parse` inside a fresh block scope, popping it on every path.
    pub fn scoped<R>(&mut self, name: &str, parse: impl FnOnce(&mut Self) -> R) -> R {
        self.symbols.enter_scope(name);
        let result = parse(self);
        self.close_scope();

        result
    }

    /// Like `scoped`, but the scope hangs off the global scope.
    pub fn function_scoped<R>(&mut self, name: &str, parse: impl FnOnce(&mut Self) -> R) -> R {
        self.symbols.enter_function_scope(name);
        let result = parse(self);
        self.close_scope();

        result
    }

    fn close_scope(&mut self) {
        match self.symbols.exit_scope() {
            Ok(scope) => {
                for warning in unused_warnings(scope.unused()) {
                    self.problems.warning(warning);
                }
            },
            Err(err) => log::error!("{err}")
        }
    }

    /// Runs one level of recursive descent, failing once the input nests
    /// past `MAX_NESTING_DEPTH`.
    pub fn nested<R>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<R, ParseError>
    ) -> Result<R, ParseError> {
        if self.nesting >= MAX_NESTING_DEPTH {
            return parse_error(
                ParseErrorType::NestingTooDeep { limit: MAX_NESTING_DEPTH },
                self.current().location()
            );
        }

        self.nesting += 1;
        let result = parse(self);
        self.nesting -= 1;

        result
    }

    pub fn in_loop<R>(&mut self, parse: impl FnOnce(&mut Self) -> R) -> R {
        self.loop_depth += 1;
        let result = parse(self);
        self.loop_depth -= 1;

        result
    }

    pub fn in_block<R>(&mut self, parse: impl FnOnce(&mut Self) -> R) -> R {
        self.block_depth += 1;
        let result = parse(self);
        self.block_depth -= 1;

        result
    }

    /// Parses a function body with fresh loop and block context.
    pub fn in_function<R>(&mut self, name: &str, parse: impl FnOnce(&mut Self) -> R) -> R {
        let enclosing = (
            self.function.replace(name.to_string()),
            std::mem::take(&mut self.loop_depth),
            std::mem::take(&mut self.block_depth),
        );

        let result = parse(self);

        (self.function, self.loop_depth, self.block_depth) = enclosing;

        result
    }

    pub fn in_loop_body(&self) -> bool {
        self.loop_depth > 0
    }

    pub fn in_function_body(&self) -> bool {
        self.function.is_some()
    }

    pub fn at_top_level(&self) -> bool {
        self.block_depth == 0 && self.function.is_none()
    }

    pub fn declare(&mut self, name: &Identifier, value_type: ValueType) {
        match self.symbols.declare(&name.value, value_type, name.location) {
            Ok(Declared::Fresh) => {},
            Ok(Declared::Shadowing(outer)) => self.warning(ParseWarning::ShadowedVariable {
                name: name.value.clone(),
                location: name.location,
                outer,
            }),
            Err(err) => self.error(err)
        }
    }

    /// Records a read of `name`, reporting it when it is not declared.
    pub fn resolve(&mut self, name: &Identifier) {
        if !self.symbols.mark_used(&name.value) {
            self.undeclared(name);
        }
    }

    /// Checks that `name` can be assigned without counting it as a read.
    pub fn resolve_target(&mut self, name: &Identifier) {
        if self.symbols.lookup(&name.value).is_none() {
            self.undeclared(name);
        }
    }

    fn undeclared(&mut self, name: &Identifier) {
        self.semantic_error(
            SemanticErrorType::UndeclaredVariable { name: name.value.clone() },
            name.location
        );
    }

    pub fn signature(&self, name: &str) -> Option<&FunctionSignature> {
        self.functions.get(name)
    }

    /// Marks a top-level function as defined; false if it already was.
    pub fn define_function(&mut self, name: &str) -> bool {
        self.defined.insert(name.to_string())
    }
}

pub fn type_of(kind: TokenKind) -> Option<ValueType> {
    Some(match kind {
        TokenKind::IntType => ValueType::Integer,
        TokenKind::DoubleType => ValueType::Double,
        TokenKind::StringType => ValueType::String,
        TokenKind::BoolType => ValueType::Boolean,
        _ => return None
    })
}

fn unused_warnings(symbols: Vec<&Symbol>) -> Vec<ParseWarning> {
    symbols.into_iter()
        .filter(|symbol| !symbol.name.starts_with('_'))
        .map(|symbol| ParseWarning::UnusedVariable {
            name: symbol.name.clone(),
            location: symbol.location,
        })
        .collect()
}

/// Collects the signatures of functions declared outside any braces.
fn prescan(tokens: &[Token]) -> HashMap<String, FunctionSignature> {
    let mut functions = HashMap::new();
    let mut depth = 0usize;

    for idx in 0..tokens.len() {
        match tokens[idx].kind {
            TokenKind::LBrace => depth += 1,
            TokenKind::RBrace => depth = depth.saturating_sub(1),
            _ if depth == 0 => {
                if let Some(signature) = signature_at(tokens, idx) {
                    functions.entry(signature.name.clone()).or_insert(signature);
                }
            },
            _ => {}
        }
    }

    functions
}

fn signature_at(tokens: &[Token], start: usize) -> Option<FunctionSignature> {
    let kind_at = |idx: usize| tokens.get(idx).map(|token| token.kind);

    let (return_type, name_idx) = match tokens[start].kind {
        TokenKind::Func => (ReturnType::Dynamic, start + 1),
        TokenKind::Void => (ReturnType::Void, start + 1),
        kind => {
            let value_type = type_of(kind)?;

            match (kind_at(start + 1), kind_at(start + 2)) {
                (Some(TokenKind::LBracket), Some(TokenKind::RBracket)) => {
                    (ReturnType::Value(ValueType::array_of(value_type)), start + 3)
                },
                _ => (ReturnType::Value(value_type), start + 1)
            }
        }
    };

    let name = tokens.get(name_idx).filter(|token| token.is(TokenKind::Ident))?;

    if kind_at(name_idx + 1) != Some(TokenKind::LParen) {
        return None;
    }

    // count top-level commas up to the matching `)`
    let mut depth = 0usize;
    let mut commas = 0;
    let mut empty = true;

    for token in &tokens[name_idx + 2..] {
        match token.kind {
            TokenKind::RParen if depth == 0 => break,
            TokenKind::LParen | TokenKind::LBracket => depth += 1,
            TokenKind::RParen | TokenKind::RBracket => depth = depth.saturating_sub(1),
            TokenKind::Comma if depth == 0 => commas += 1,
            TokenKind::LBrace | TokenKind::Semicolon | TokenKind::Eof => break,
            _ => {}
        }

        empty = false;
    }

    Some(FunctionSignature {
        name: name.lexeme.clone(),
        arity: if empty { 0 } else { commas + 1 },
        return_type,
        location: name.location(),
    })
}

pub fn parse_tokens(lexed: Lexed) -> Parsed {
    Parser::new(lexed).parse()
}

pub fn parse_program(src: &str) -> Parsed {
    parse_tokens(tokenize(src))
}
