use thiserror::Error;

use crate::utils::prelude::{Location, Problem};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorType {
    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
    },
    #[error("expected an expression, found {found}")]
    ExpectedExpression {
        found: String,
    },
    #[error("expected a variable name after `{operator}`, found {found}")]
    InvalidIncrementTarget {
        operator: String,
        found: String,
    },
    #[error("unmatched `}}`")]
    UnmatchedBrace,
    #[error("nesting exceeds the limit of {limit} levels")]
    NestingTooDeep {
        limit: usize,
    },
}

impl ParseErrorType {
    pub fn hints(&self) -> Vec<String> {
        match self {
            Self::UnexpectedToken { expected, .. } if expected == "`;`" => {
                vec!["statements end with `;`".to_string()]
            },
            Self::InvalidIncrementTarget { .. } => {
                vec!["only variables can be incremented or decremented".to_string()]
            },
            Self::NestingTooDeep { .. } => {
                vec!["move the inner part into a variable or a function".to_string()]
            },
            _ => vec![]
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub error: ParseErrorType,
    pub location: Location,
}

impl ParseError {
    pub fn details(&self) -> (String, Vec<String>) {
        (self.error.to_string(), self.error.hints())
    }
}

pub fn parse_error<T>(error: ParseErrorType, location: Location) -> Result<T, ParseError> {
    Err(ParseError { error, location })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// A declaration hides a variable of an enclosing scope.
    ShadowedVariable {
        name: String,
        location: Location,
        outer: Location,
    },
    UnusedVariable {
        name: String,
        location: Location,
    },
    /// Statements following `return`, `break` or `continue` in a block.
    UnreachableCode {
        location: Location,
    },
}

impl ParseWarning {
    pub fn location(&self) -> Location {
        match self {
            Self::ShadowedVariable { location, .. }
            | Self::UnusedVariable { location, .. }
            | Self::UnreachableCode { location } => *location
        }
    }
}

/// Errors and warnings gathered while parsing a program.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Problems {
    errors: Vec<Problem>,
    warnings: Vec<ParseWarning>,
}

impl Problems {
    pub fn error(&mut self, error: impl Into<Problem>) {
        self.errors.push(error.into())
    }

    pub fn errors(&self) -> &[Problem] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<Problem> {
        std::mem::take(&mut self.errors)
    }

    pub fn warning(&mut self, warning: ParseWarning) {
        self.warnings.push(warning)
    }

    pub fn take_warnings(&mut self) -> Vec<ParseWarning> {
        std::mem::take(&mut self.warnings)
    }

    /// Current lengths, used to undo a speculative parse.
    pub fn mark(&self) -> (usize, usize) {
        (self.errors.len(), self.warnings.len())
    }

    pub fn truncate(&mut self, (errors, warnings): (usize, usize)) {
        self.errors.truncate(errors);
        self.warnings.truncate(warnings);
    }

    pub fn sort(&mut self) {
        self.errors.sort_by_key(|e| e.location.offset());
        self.warnings.sort_by_key(|w| w.location().offset());
    }
}
