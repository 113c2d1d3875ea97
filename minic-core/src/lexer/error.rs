use thiserror::Error;

use crate::utils::prelude::Location;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexicalErrorType {
    #[error("invalid character `{ch}`")]
    InvalidCharacter { ch: char },
    #[error("malformed numeric literal `{lexeme}`")]
    MalformedNumber { lexeme: String },
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("invalid identifier `{lexeme}`")]
    InvalidIdentifier { lexeme: String },
    #[error("unary `+` is not supported")]
    UnaryPlus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexicalError {
    pub error: LexicalErrorType,
    pub location: Location
}

impl LexicalErrorType {
    pub fn hints(&self) -> Vec<String> {
        match self {
            Self::InvalidCharacter { .. } => vec![],
            Self::MalformedNumber { .. } => {
                vec!["integer literals must fit in a signed 64-bit integer".to_string()]
            },
            Self::UnterminatedString => {
                vec!["strings must be closed with `\"` on the same line".to_string()]
            },
            Self::InvalidIdentifier { .. } => {
                vec!["identifiers must start with a letter or `_`".to_string()]
            },
            Self::UnaryPlus => vec!["remove the leading `+`".to_string()],
        }
    }
}

impl LexicalError {
    pub fn details(&self) -> (String, Vec<String>) {
        (self.error.to_string(), self.error.hints())
    }
}
