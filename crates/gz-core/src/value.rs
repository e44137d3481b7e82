use serde::{Deserialize, Serialize};

/// A compile-time constant as resolved by the host type checker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstValue {
    Bool(bool),
    Int(i64),
    /// Unsigned constants that do not fit an `i64`.
    Uint(u64),
    Float(f64),
    String(String),
    Complex(f64, f64),
}

impl ConstValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConstValue::Int(value) => Some(*value),
            ConstValue::Uint(value) => i64::try_from(*value).ok(),
            _ => None,
        }
    }
}
