pub mod lexer;
pub mod parser;
pub mod environment;
pub mod eval;
pub mod driver;
pub mod utils;
