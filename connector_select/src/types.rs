//! Values, column descriptions and bind parameters shared by all drivers.

use std::fmt;

use chrono::NaiveDateTime;

use crate::api::LargeObject;

const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

// -2^63 is exact in f64, 2^63 is the first float past i64::MAX
const I64_MIN: f64 = i64::MIN as f64;

/// A single value, detached from the driver that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Timestamp(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            Value::Float(v) if v.fract() == 0.0 && (I64_MIN..-I64_MIN).contains(v) => {
                Some(*v as i64)
            }
            Value::Text(v) => v.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Timestamps, or text in one of the ISO-8601-like layouts SQLite stores them as.
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Timestamp(v) => Some(*v),
            Value::Text(v) => TIMESTAMP_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(v, f).ok()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
            Value::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            Value::Timestamp(v) => write!(f, "{v}"),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Integer(v) => serde_json::Value::from(v),
            Value::Float(v) => serde_json::Value::from(v),
            Value::Text(v) => serde_json::Value::String(v),
            Value::Bytes(v) => serde_json::Value::from(v),
            Value::Timestamp(v) => serde_json::Value::String(v.to_string()),
        }
    }
}

macro_rules! impl_value_from {
    ($($native: ty => $variant: ident,)+) => {
        $(
            impl From<$native> for Value {
                fn from(v: $native) -> Self {
                    Value::$variant(v.into())
                }
            }
        )+
    };
}

impl_value_from!(
    i32 => Integer,
    i64 => Integer,
    u32 => Integer,
    f32 => Float,
    f64 => Float,
    String => Text,
    &str => Text,
    Vec<u8> => Bytes,
    NaiveDateTime => Timestamp,
);

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Type of a result column, as reported by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    Text,
    Bytes,
    Timestamp,
    Clob,
    Blob,
    Other(String),
}

impl ColumnType {
    /// Large objects must be read through their handle before the row is returned.
    pub fn is_lob(&self) -> bool {
        matches!(self, ColumnType::Clob | ColumnType::Blob)
    }
}

/// Description of a single result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub ty: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Column {
            name: name.into(),
            ty,
        }
    }
}

/// A cell as handed out by a driver cursor.
pub enum RawValue {
    Value(Value),
    Lob(Box<dyn LargeObject>),
}

impl fmt::Debug for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Value(v) => f.debug_tuple("Value").field(v).finish(),
            RawValue::Lob(_) => f.write_str("Lob(..)"),
        }
    }
}

impl From<Value> for RawValue {
    fn from(v: Value) -> Self {
        RawValue::Value(v)
    }
}

/// Bind variables substituted into a statement at execution time.
#[derive(Debug, Clone, PartialEq)]
pub enum Binds {
    Positional(Vec<Value>),
    Named(Vec<(String, Value)>),
}

impl Binds {
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Binds::Positional(values.into_iter().map(Into::into).collect())
    }

    pub fn named<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Binds::Named(
            values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Binds::Positional(v) => v.is_empty(),
            Binds::Named(v) => v.is_empty(),
        }
    }
}
