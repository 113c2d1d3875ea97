pub mod error;
pub mod symbol_table;
pub mod value;

pub mod prelude {
    pub use super::{
        error::*,
        symbol_table::*,
        value::*
    };
}

#[cfg(test)]
mod tests;
