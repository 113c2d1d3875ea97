use std::fmt::Display;

use crate::utils::prelude::{Location, SrcSpan};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    Int,
    Double,
    String,

    Ident,

    // Type keywords
    IntType,
    DoubleType,
    StringType,
    BoolType,
    Void,

    // Keywords
    Func,
    If,
    Else,
    While,
    For,
    Break,
    Continue,
    Return,
    Print,
    True,
    False,

    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    // Assignment
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    PercentAssign,

    // Relational
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,

    // Logical
    And,
    Or,
    Bang,

    Increment,
    Decrement,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,

    Eof,
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCategory {
    Literal,
    Identifier,
    Keyword,
    Operator,
    Punctuation,
    EndOfInput,
    Invalid,
}

impl TokenKind {
    pub fn category(&self) -> TokenCategory {
        match self {
            Self::Int | Self::Double | Self::String => TokenCategory::Literal,
            Self::Ident => TokenCategory::Identifier,
            kind if kind.is_reserved_word() => TokenCategory::Keyword,
            kind if kind.is_operator() => TokenCategory::Operator,
            Self::Eof => TokenCategory::EndOfInput,
            Self::Invalid => TokenCategory::Invalid,
            _ => TokenCategory::Punctuation,
        }
    }

    pub fn is_reserved_word(&self) -> bool {
        matches!(self,
            Self::IntType
            | Self::DoubleType
            | Self::StringType
            | Self::BoolType
            | Self::Void
            | Self::Func
            | Self::If
            | Self::Else
            | Self::While
            | Self::For
            | Self::Break
            | Self::Continue
            | Self::Return
            | Self::Print
            | Self::True
            | Self::False
        )
    }

    pub fn is_variable_type(&self) -> bool {
        matches!(self, Self::IntType | Self::DoubleType | Self::StringType | Self::BoolType)
    }

    pub fn is_operator(&self) -> bool {
        matches!(self,
            Self::Plus
            | Self::Minus
            | Self::Star
            | Self::Slash
            | Self::Percent
            | Self::Assign
            | Self::PlusAssign
            | Self::MinusAssign
            | Self::StarAssign
            | Self::SlashAssign
            | Self::PercentAssign
            | Self::Equal
            | Self::NotEqual
            | Self::LessThan
            | Self::LessThanOrEqual
            | Self::GreaterThan
            | Self::GreaterThanOrEqual
            | Self::And
            | Self::Or
            | Self::Bang
            | Self::Increment
            | Self::Decrement
        )
    }

    pub fn is_compound_assignment(&self) -> bool {
        matches!(self,
            Self::PlusAssign
            | Self::MinusAssign
            | Self::StarAssign
            | Self::SlashAssign
            | Self::PercentAssign
        )
    }

    pub fn as_literal(&self) -> &'static str {
        match self {
            Self::Int => "integer literal",
            Self::Double => "double literal",
            Self::String => "string literal",
            Self::Ident => "identifier",
            Self::IntType => "int",
            Self::DoubleType => "double",
            Self::StringType => "string",
            Self::BoolType => "bool",
            Self::Void => "void",
            Self::Func => "func",
            Self::If => "if",
            Self::Else => "else",
            Self::While => "while",
            Self::For => "for",
            Self::Break => "break",
            Self::Continue => "continue",
            Self::Return => "return",
            Self::Print => "print",
            Self::True => "true",
            Self::False => "false",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::Assign => "=",
            Self::PlusAssign => "+=",
            Self::MinusAssign => "-=",
            Self::StarAssign => "*=",
            Self::SlashAssign => "/=",
            Self::PercentAssign => "%=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::And => "&&",
            Self::Or => "||",
            Self::Bang => "!",
            Self::Increment => "++",
            Self::Decrement => "--",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::Comma => ",",
            Self::Semicolon => ";",
            Self::Eof => "end of input",
            Self::Invalid => "invalid token",
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_literal())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    Int(i64),
    Double(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub value: Option<TokenValue>,
    pub line: u32,
    pub column: u32,
    pub offset: u32,
}

impl Token {
    pub fn location(&self) -> Location {
        let end = self.offset + self.lexeme.len().max(1) as u32;

        Location::new(self.line, self.column, SrcSpan::from(self.offset, end))
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// A zero-width token standing in for one the parser expected but did
    /// not find.
    pub fn placeholder(kind: TokenKind, at: &Token) -> Self {
        Self {
            kind,
            lexeme: String::new(),
            value: None,
            line: at.line,
            column: at.column,
            offset: at.offset,
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "end of input"),
            _ => write!(f, "`{}`", self.lexeme),
        }
    }
}
