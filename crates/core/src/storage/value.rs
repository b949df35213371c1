/// A value bound to a parameterized store query.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Int(i64),
    Real(f64),
    Text(String),
    Null,
}

impl SqlValue {
    /// Returns true when the value equals the zero value of its type.
    ///
    /// `0`, `0.0`, the empty string and `NULL` are all zero.
    pub fn is_zero(&self) -> bool {
        match self {
            SqlValue::Int(v) => *v == 0,
            SqlValue::Real(v) => *v == 0.0,
            SqlValue::Text(v) => v.is_empty(),
            SqlValue::Null => true,
        }
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Real(value)
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_values() {
        assert!(SqlValue::Int(0).is_zero());
        assert!(SqlValue::Real(0.0).is_zero());
        assert!(SqlValue::Text(String::new()).is_zero());
        assert!(SqlValue::Null.is_zero());
    }

    #[test]
    fn test_non_zero_values() {
        assert!(!SqlValue::Int(-3).is_zero());
        assert!(!SqlValue::Real(0.25).is_zero());
        assert!(!SqlValue::from("EURUSD").is_zero());
    }
}
