use std::fmt;

/// A literal as it is embedded in an insert statement.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Value {
    NULL,
    Int(i64),
    Str(String),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::NULL)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NULL => f.write_str("NULL"),
            Self::Int(v) => write!(f, "{v}"),
            // Generated strings never carry quotes, no escaping.
            Self::Str(v) => write!(f, "'{v}'"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_literal_rendering() {
        assert_eq!("NULL", Value::NULL.to_string());
        assert_eq!("42", Value::Int(42).to_string());
        assert_eq!("-7", Value::Int(-7).to_string());
        assert_eq!("'abc'", Value::Str("abc".into()).to_string());
        assert_eq!("''", Value::Str(String::new()).to_string());
    }

    #[test]
    fn test_is_null() {
        assert!(Value::NULL.is_null());
        assert!(!Value::Int(0).is_null());
        assert!(!Value::Str("NULL".into()).is_null());
    }
}
