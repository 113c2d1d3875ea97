use std::fmt::Display;

/// Tolerance used for double equality and for deciding whether a number
/// counts as zero.
pub const EPSILON: f64 = 1e-10;

pub const TRUE: Value = Value::Boolean(true);
pub const FALSE: Value = Value::Boolean(false);

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Double(f64),
    String(String),
    Boolean(bool),
    Array(Vec<Value>),
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(value) => write!(f, "{value}"),
            // keep a fractional part so doubles never print like ints
            Value::Double(value) if value.is_finite() && value.fract() == 0.0 => write!(f, "{value:.1}"),
            Value::Double(value) => write!(f, "{value}"),
            Value::String(value) => write!(f, "{value}"),
            Value::Boolean(value) => write!(f, "{value}"),
            Value::Array(items) => {
                let items = items.iter()
                    .map(|item| item.to_string())
                    .collect::<Vec<String>>();

                write!(f, "[{}]", items.join(", "))
            }
        }
    }
}

impl Value {
    /// Human readable name of the runtime category, used in type errors.
    pub fn type_name(&self) -> String {
        match self {
            Self::Integer(_) => ValueType::Integer.to_string(),
            Self::Double(_) => ValueType::Double.to_string(),
            Self::String(_) => ValueType::String.to_string(),
            Self::Boolean(_) => ValueType::Boolean.to_string(),
            Self::Array(items) => match items.first() {
                Some(item) => format!("{}[]", item.type_name()),
                None => "array".to_string(),
            }
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer(_) | Self::Double(_) | Self::Boolean(_))
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Boolean(value) => *value,
            Self::Integer(value) => *value != 0,
            Self::Double(value) => value.abs() > EPSILON,
            Self::String(value) => !value.is_empty(),
            Self::Array(items) => !items.is_empty(),
        }
    }

    /// Converts the value into the runtime category of `target`, or `None`
    /// when `target` does not accept it.
    ///
    /// Doubles truncate toward zero when narrowed to int; a double outside
    /// the int range does not coerce.
    pub fn coerce_to(&self, target: &ValueType) -> Option<Value> {
        let value = match (self, target) {
            (Self::Integer(value), ValueType::Integer) => Self::Integer(*value),
            (Self::Integer(value), ValueType::Double) => Self::Double(*value as f64),
            (Self::Integer(value), ValueType::Boolean) => Self::Boolean(*value != 0),

            (Self::Double(value), ValueType::Integer) => Self::Integer(truncate(*value)?),
            (Self::Double(value), ValueType::Double) => Self::Double(*value),
            (Self::Double(value), ValueType::Boolean) => Self::Boolean(value.abs() > EPSILON),

            (Self::Boolean(value), ValueType::Integer) => Self::Integer(*value as i64),
            (Self::Boolean(value), ValueType::Double) => Self::Double(if *value { 1.0 } else { 0.0 }),
            (Self::Boolean(value), ValueType::Boolean) => Self::Boolean(*value),

            (Self::String(value), ValueType::String) => Self::String(value.clone()),

            (Self::Array(items), ValueType::Array(element)) => Self::Array(
                items.iter()
                    .map(|item| item.coerce_to(element))
                    .collect::<Option<Vec<Value>>>()?
            ),

            _ => return None
        };

        Some(value)
    }
}

fn truncate(value: f64) -> Option<i64> {
    let truncated = value.trunc();

    // 2^63 is the first double past i64::MAX
    if truncated.is_finite() && truncated >= i64::MIN as f64 && truncated < 9_223_372_036_854_775_808.0 {
        Some(truncated as i64)
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    Integer,
    Double,
    String,
    Boolean,
    Array(Box<ValueType>),
}

impl ValueType {
    pub fn array_of(element: ValueType) -> Self {
        Self::Array(Box::new(element))
    }

    pub fn element(&self) -> Option<&ValueType> {
        match self {
            Self::Array(element) => Some(element),
            _ => None
        }
    }
}

impl Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer => write!(f, "int"),
            Self::Double => write!(f, "double"),
            Self::String => write!(f, "string"),
            Self::Boolean => write!(f, "bool"),
            Self::Array(element) => write!(f, "{element}[]"),
        }
    }
}
