use std::fmt::Display;

use thiserror::Error;

use crate::{
    environment::prelude::{SemanticError, SemanticErrorType},
    lexer::prelude::{LexicalError, LexicalErrorType},
    parser::prelude::{ParseError, ParseErrorType},
};
use super::src_span::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Lexical,
    Syntactic,
    Semantic,
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Lexical => "lexical",
            Self::Syntactic => "syntactic",
            Self::Semantic => "semantic",
        };

        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProblemKind {
    #[error(transparent)]
    Lexical(LexicalErrorType),
    #[error(transparent)]
    Syntactic(ParseErrorType),
    #[error(transparent)]
    Semantic(SemanticErrorType),
}

impl ProblemKind {
    pub fn category(&self) -> Category {
        match self {
            Self::Lexical(_) => Category::Lexical,
            Self::Syntactic(_) => Category::Syntactic,
            Self::Semantic(_) => Category::Semantic,
        }
    }

    pub fn hints(&self) -> Vec<String> {
        match self {
            Self::Lexical(error) => error.hints(),
            Self::Syntactic(error) => error.hints(),
            Self::Semantic(error) => error.hints(),
        }
    }
}

/// The error record every phase appends to its list.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("at line {}, column {}: {} error - {}", .location.line, .location.column, .kind.category(), .kind)]
pub struct Problem {
    pub kind: ProblemKind,
    pub location: Location,
}

impl Problem {
    pub fn category(&self) -> Category {
        self.kind.category()
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    pub fn line(&self) -> u32 {
        self.location.line
    }

    pub fn column(&self) -> u32 {
        self.location.column
    }

    pub fn semantic(&self) -> Option<&SemanticErrorType> {
        match &self.kind {
            ProblemKind::Semantic(error) => Some(error),
            _ => None,
        }
    }
}

impl From<LexicalError> for Problem {
    fn from(value: LexicalError) -> Self {
        Self { kind: ProblemKind::Lexical(value.error), location: value.location }
    }
}

impl From<ParseError> for Problem {
    fn from(value: ParseError) -> Self {
        Self { kind: ProblemKind::Syntactic(value.error), location: value.location }
    }
}

impl From<SemanticError> for Problem {
    fn from(value: SemanticError) -> Self {
        Self { kind: ProblemKind::Semantic(value.error), location: value.location }
    }
}
