pub mod builtins;
pub mod operators;
pub mod evaluator;

pub mod prelude {
    pub use super::{
        builtins::Builtin,
        evaluator::*
    };
}
