use crate::{
    environment::prelude::{SemanticErrorType, Value, EPSILON},
    parser::prelude::InfixOperator,
};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Number {
    Int(i64),
    Double(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Self::Int(value) => value as f64,
            Self::Double(value) => value,
        }
    }
}

fn mismatch(expected: &str, found: &Value) -> SemanticErrorType {
    SemanticErrorType::TypeMismatch {
        expected: expected.to_string(),
        found: found.type_name(),
    }
}

fn not_arithmetic(operator: InfixOperator) -> SemanticErrorType {
    SemanticErrorType::TypeMismatch {
        expected: "arithmetic operator".to_string(),
        found: format!("`{operator}`"),
    }
}

/// Operand of `+ - * / %`. Booleans are not arithmetic.
fn arithmetic_operand(value: &Value) -> Result<Number, SemanticErrorType> {
    match value {
        Value::Integer(value) => Ok(Number::Int(*value)),
        Value::Double(value) => Ok(Number::Double(*value)),
        value => Err(mismatch("number", value)),
    }
}

/// Operand of a relational operator, where `true` and `false` count as 1 and 0.
fn relational_operand(value: &Value) -> Result<Number, SemanticErrorType> {
    match value {
        Value::Integer(value) => Ok(Number::Int(*value)),
        Value::Double(value) => Ok(Number::Double(*value)),
        Value::Boolean(value) => Ok(Number::Int(*value as i64)),
        value => Err(mismatch("number", value)),
    }
}

/// Applies a binary operator to two evaluated operands. `&&` and `||` take
/// both sides as already evaluated.
pub fn binary(operator: InfixOperator, left: &Value, right: &Value) -> Result<Value, SemanticErrorType> {
    match operator {
        InfixOperator::And => Ok(Value::Boolean(left.is_truthy() && right.is_truthy())),
        InfixOperator::Or => Ok(Value::Boolean(left.is_truthy() || right.is_truthy())),
        operator if operator.is_relational() => compare(operator, left, right),
        operator => arithmetic(operator, left, right),
    }
}

pub fn arithmetic(operator: InfixOperator, left: &Value, right: &Value) -> Result<Value, SemanticErrorType> {
    if let (Value::String(left), Value::String(right)) = (left, right) {
        return match operator {
            InfixOperator::Add => Ok(Value::String(format!("{left}{right}"))),
            _ => Err(SemanticErrorType::TypeMismatch {
                expected: "number".to_string(),
                found: "string".to_string(),
            })
        };
    }

    let (left, right) = (arithmetic_operand(left)?, arithmetic_operand(right)?);

    match (left, right) {
        (Number::Int(left), Number::Int(right)) => integer(operator, left, right).map(Value::Integer),
        (left, right) => double(operator, left.as_f64(), right.as_f64()).map(Value::Double),
    }
}

fn integer(operator: InfixOperator, left: i64, right: i64) -> Result<i64, SemanticErrorType> {
    let result = match operator {
        InfixOperator::Add => left.checked_add(right),
        InfixOperator::Subtract => left.checked_sub(right),
        InfixOperator::Multiply => left.checked_mul(right),
        InfixOperator::Divide | InfixOperator::Modulo if right == 0 => {
            return Err(SemanticErrorType::DivisionByZero)
        },
        // i64::MIN / -1 is the only overflowing case
        InfixOperator::Divide => left.checked_div(right),
        InfixOperator::Modulo => left.checked_rem(right),
        operator => return Err(not_arithmetic(operator))
    };

    result.ok_or(SemanticErrorType::Overflow)
}

fn double(operator: InfixOperator, left: f64, right: f64) -> Result<f64, SemanticErrorType> {
    let result = match operator {
        InfixOperator::Add => left + right,
        InfixOperator::Subtract => left - right,
        InfixOperator::Multiply => left * right,
        InfixOperator::Divide | InfixOperator::Modulo if right.abs() < EPSILON => {
            return Err(SemanticErrorType::DivisionByZero)
        },
        InfixOperator::Divide => left / right,
        InfixOperator::Modulo => left % right,
        operator => return Err(not_arithmetic(operator))
    };

    match result.is_finite() {
        true => Ok(result),
        false => Err(SemanticErrorType::Overflow)
    }
}

/// `target[index]` on an array or a string, cloning only the selected
/// element. Strings yield one-character strings.
pub fn element(target: &Value, index: i64) -> Result<Value, SemanticErrorType> {
    let out_of_bounds = |length: usize| SemanticErrorType::IndexOutOfBounds { index, length };
    let position = usize::try_from(index).ok();

    match target {
        Value::Array(items) => position
            .and_then(|position| items.get(position))
            .cloned()
            .ok_or_else(|| out_of_bounds(items.len())),
        Value::String(value) => position
            .and_then(|position| value.chars().nth(position))
            .map(|ch| Value::String(ch.to_string()))
            .ok_or_else(|| out_of_bounds(value.chars().count())),
        value => Err(mismatch("array or string", value)),
    }
}

/// Relational operators. Doubles are equal within `EPSILON`; strict
/// comparisons exclude that band and the inclusive ones accept it.
pub fn compare(operator: InfixOperator, left: &Value, right: &Value) -> Result<Value, SemanticErrorType> {
    let (left, right) = (relational_operand(left)?, relational_operand(right)?);

    let result = match (left, right) {
        (Number::Int(left), Number::Int(right)) => match operator {
            InfixOperator::Equal => left == right,
            InfixOperator::NotEqual => left != right,
            InfixOperator::LessThan => left < right,
            InfixOperator::LessThanOrEqual => left <= right,
            InfixOperator::GreaterThan => left > right,
            _ => left >= right,
        },
        (left, right) => {
            let (left, right) = (left.as_f64(), right.as_f64());
            let close = (left - right).abs() < EPSILON;

            match operator {
                InfixOperator::Equal => close,
                InfixOperator::NotEqual => !close,
                InfixOperator::LessThan => left < right && !close,
                InfixOperator::LessThanOrEqual => left < right || close,
                InfixOperator::GreaterThan => left > right && !close,
                _ => left > right || close,
            }
        }
    };

    Ok(Value::Boolean(result))
}

pub fn negate(value: &Value) -> Result<Value, SemanticErrorType> {
    match arithmetic_operand(value)? {
        Number::Int(value) => value.checked_neg()
            .map(Value::Integer)
            .ok_or(SemanticErrorType::Overflow),
        Number::Double(value) => Ok(Value::Double(-value)),
    }
}

/// `x++` / `x--` on a number.
pub fn step(value: &Value, delta: i64) -> Result<Value, SemanticErrorType> {
    match arithmetic_operand(value)? {
        Number::Int(value) => value.checked_add(delta)
            .map(Value::Integer)
            .ok_or(SemanticErrorType::Overflow),
        Number::Double(value) => Ok(Value::Double(value + delta as f64)),
    }
}
