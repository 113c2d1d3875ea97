use thiserror::Error;

use crate::utils::prelude::Location;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SemanticErrorType {
    /// A name declared twice in the same scope. `previous` points at the
    /// first declaration.
    #[error("`{name}` is already declared in this scope")]
    DuplicateDeclaration {
        name: String,
        previous: Location,
    },
    #[error("use of undeclared variable `{name}`")]
    UndeclaredVariable {
        name: String,
    },
    #[error("call to undefined function `{name}`")]
    UndefinedFunction {
        name: String,
    },
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: String,
        found: String,
    },
    #[error("variable `{name}` is used before it is initialized")]
    UninitializedUse {
        name: String,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("arithmetic overflow")]
    Overflow,
    #[error("loop exceeded the limit of {limit} iterations")]
    LoopLimitExceeded {
        limit: usize,
    },
    #[error("index {index} is out of bounds for length {length}")]
    IndexOutOfBounds {
        index: i64,
        length: usize,
    },
    #[error("function `{name}` takes {expected} argument(s) but {found} were supplied")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("maximum call depth of {limit} exceeded")]
    RecursionLimit {
        limit: usize,
    },
    #[error("invalid argument to `{name}`: {reason}")]
    InvalidArgument {
        name: String,
        reason: String,
    },
    #[error("function `{name}` did not return a value")]
    MissingReturnValue {
        name: String,
    },
    #[error("`{keyword}` outside of a loop")]
    OutsideLoop {
        keyword: &'static str,
    },
    #[error("`return` outside of a function")]
    ReturnOutsideFunction,
    #[error("function `{name}` must be declared at the top level")]
    NestedFunction {
        name: String,
    },
}

impl SemanticErrorType {
    pub fn hints(&self) -> Vec<String> {
        match self {
            Self::DuplicateDeclaration { .. } => {
                vec!["declare the variable in a nested block to shadow it".to_string()]
            },
            Self::UninitializedUse { name } => {
                vec![format!("assign a value to `{name}` before reading it")]
            },
            Self::LoopLimitExceeded { .. } => {
                vec!["the loop was abandoned, check its condition".to_string()]
            },
            Self::NestedFunction { .. } => {
                vec!["move the function out of the enclosing block".to_string()]
            },
            _ => vec![]
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SemanticError {
    pub error: SemanticErrorType,
    pub location: Location,
}

impl SemanticError {
    pub fn new(error: SemanticErrorType, location: Location) -> Self {
        Self { error, location }
    }

    pub fn details(&self) -> (String, Vec<String>) {
        (self.error.to_string(), self.error.hints())
    }
}

/// Misuse of the scope stack. These are programming errors in the caller,
/// never problems in the analysed program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("the global scope cannot be exited")]
    GlobalScope,
    #[error("scope #{id} is not open")]
    UnknownScope {
        id: usize,
    },
}
