pub mod error;
pub mod parser;
pub mod ast;
pub mod statement;
pub mod expression;

pub mod prelude {
    pub use super::{
        error::*,
        parser::*,
        ast::*,
        statement::*,
        expression::*
    };
}

#[cfg(test)]
mod tests;
