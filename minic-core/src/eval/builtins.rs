use crate::environment::prelude::{SemanticErrorType, Value};

/// Functions callable from any program without a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Len,
    Abs,
    Sqrt,
    Pow,
    Min,
    Max,
    Str,
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "len" => Self::Len,
            "abs" => Self::Abs,
            "sqrt" => Self::Sqrt,
            "pow" => Self::Pow,
            "min" => Self::Min,
            "max" => Self::Max,
            "str" => Self::Str,
            _ => return None
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Len => "len",
            Self::Abs => "abs",
            Self::Sqrt => "sqrt",
            Self::Pow => "pow",
            Self::Min => "min",
            Self::Max => "max",
            Self::Str => "str",
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            Self::Pow | Self::Min | Self::Max => 2,
            _ => 1,
        }
    }

    fn expects(&self) -> &'static str {
        match self {
            Self::Len => "array or string",
            Self::Str => "value",
            _ => "number",
        }
    }

    pub fn call(&self, arguments: Vec<Value>) -> Result<Value, SemanticErrorType> {
        if arguments.len() != self.arity() {
            return Err(SemanticErrorType::ArityMismatch {
                name: self.name().to_string(),
                expected: self.arity(),
                found: arguments.len(),
            });
        }

        match (self, arguments.as_slice()) {
            (Self::Len, [Value::Array(items)]) => Ok(Value::Integer(items.len() as i64)),
            (Self::Len, [Value::String(value)]) => Ok(Value::Integer(value.chars().count() as i64)),

            (Self::Abs, [Value::Integer(value)]) => value.checked_abs()
                .map(Value::Integer)
                .ok_or(SemanticErrorType::Overflow),
            (Self::Abs, [Value::Double(value)]) => Ok(Value::Double(value.abs())),

            (Self::Sqrt, [value]) => match number(value) {
                Some(value) if value < 0.0 => Err(SemanticErrorType::InvalidArgument {
                    name: self.name().to_string(),
                    reason: "the argument is negative".to_string(),
                }),
                Some(value) => Ok(Value::Double(value.sqrt())),
                None => Err(self.mismatch(&arguments)),
            },

            (Self::Pow, [Value::Integer(base), Value::Integer(exponent)]) if *exponent >= 0 => {
                u32::try_from(*exponent).ok()
                    .and_then(|exponent| base.checked_pow(exponent))
                    .map(Value::Integer)
                    .ok_or(SemanticErrorType::Overflow)
            },
            (Self::Pow, [base, exponent]) => match (number(base), number(exponent)) {
                (Some(base), Some(exponent)) => finite(self, base.powf(exponent)),
                _ => Err(self.mismatch(&arguments)),
            },

            (Self::Min, [Value::Integer(left), Value::Integer(right)]) => Ok(Value::Integer(*left.min(right))),
            (Self::Max, [Value::Integer(left), Value::Integer(right)]) => Ok(Value::Integer(*left.max(right))),
            (Self::Min | Self::Max, [left, right]) => match (number(left), number(right)) {
                (Some(left), Some(right)) if *self == Self::Min => Ok(Value::Double(left.min(right))),
                (Some(left), Some(right)) => Ok(Value::Double(left.max(right))),
                _ => Err(self.mismatch(&arguments)),
            },

            (Self::Str, [value]) => Ok(Value::String(value.to_string())),

            _ => Err(self.mismatch(&arguments)),
        }
    }

    fn mismatch(&self, arguments: &[Value]) -> SemanticErrorType {
        let found = arguments.iter()
            .map(|argument| argument.type_name())
            .collect::<Vec<String>>();

        SemanticErrorType::TypeMismatch {
            expected: self.expects().to_string(),
            found: found.join(", "),
        }
    }
}

/// Arity of the built-in called `name`, if there is one.
pub fn arity(name: &str) -> Option<usize> {
    Builtin::from_name(name).map(|builtin| builtin.arity())
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Integer(value) => Some(*value as f64),
        Value::Double(value) => Some(*value),
        _ => None
    }
}

fn finite(builtin: &Builtin, value: f64) -> Result<Value, SemanticErrorType> {
    if value.is_nan() {
        return Err(SemanticErrorType::InvalidArgument {
            name: builtin.name().to_string(),
            reason: "the result is not a number".to_string(),
        });
    }

    match value.is_finite() {
        true => Ok(Value::Double(value)),
        false => Err(SemanticErrorType::Overflow)
    }
}
