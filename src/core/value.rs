use rusqlite::types::ValueRef;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A single cell as SQLite stores it. The variant follows the storage class of
/// the value, not the declared type of its column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Renders the value as an SQL literal that reads back with the same
    /// storage class.
    #[must_use]
    pub fn to_sql_literal(&self) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Real(r) if r.is_nan() => "NULL".to_string(),
            Self::Real(r) if r.is_infinite() => {
                if r.is_sign_positive() { "9e999" } else { "-9e999" }.to_string()
            }
            // Debug keeps the fractional part, so 30.0 stays a REAL
            Self::Real(r) => format!("{r:?}"),
            Self::Text(s) => quote_text(s),
            Self::Blob(b) => blob_literal(b),
        }
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Self::Null,
            ValueRef::Integer(i) => Self::Integer(i),
            ValueRef::Real(r) => Self::Real(r),
            ValueRef::Text(t) => match std::str::from_utf8(t) {
                Ok(s) => Self::Text(s.to_owned()),
                Err(e) => {
                    warn!(
                        valid_up_to = e.valid_up_to(),
                        bytes = t.len(),
                        "text value is not valid UTF-8, invalid bytes replaced"
                    );
                    Self::Text(String::from_utf8_lossy(t).into_owned())
                }
            },
            ValueRef::Blob(b) => Self::Blob(b.to_vec()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(r: f64) -> Self {
        Self::Real(r)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Real(r) => write!(f, "{r}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Blob(b) => write!(f, "\\x{}", hex::encode(b)),
        }
    }
}

/// Escape single quotes in SQL strings
#[must_use]
pub fn escape_sql_string(s: &str) -> String {
    s.replace('\'', "''")
}

/// Wraps `s` in single quotes, doubling every embedded quote.
#[must_use]
pub fn quote_text(s: &str) -> String {
    format!("'{}'", escape_sql_string(s))
}

#[must_use]
pub fn blob_literal(bytes: &[u8]) -> String {
    format!("X'{}'", hex::encode_upper(bytes))
}
