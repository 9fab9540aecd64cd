//! Dynamic SQL values exchanged between entities and the store.

use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};

use crate::error::{MapperError, MapperResult};

/// Core value types for SQLite operations
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    Boolean(bool),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Name of the variant, used in conversion errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
            Value::Blob(_) => "blob",
            Value::Boolean(_) => "boolean",
        }
    }

    pub(crate) fn from_value_ref(value: ValueRef<'_>) -> MapperResult<Self> {
        Ok(match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Real(f),
            ValueRef::Text(bytes) => Value::Text(
                std::str::from_utf8(bytes)
                    .map_err(|e| MapperError::sql_build(format!("invalid utf-8 in text column: {e}")))?
                    .to_string(),
            ),
            ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
        })
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
            Value::Integer(i) => ToSqlOutput::Owned(rusqlite::types::Value::Integer(*i)),
            Value::Real(f) => ToSqlOutput::Owned(rusqlite::types::Value::Real(*f)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b.as_slice())),
            Value::Boolean(b) => ToSqlOutput::Owned(rusqlite::types::Value::Integer(i64::from(*b))),
        })
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Integer(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Real(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Lowers a field to a [`Value`] without consuming it.
pub trait ToValue {
    fn to_value(&self) -> Value;
}

impl<T: Clone + Into<Value>> ToValue for T {
    fn to_value(&self) -> Value {
        self.clone().into()
    }
}

/// Converts a store value into a field's declared type.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> MapperResult<Self>;
}

fn mismatch<T>(target: &str, value: &Value) -> MapperResult<T> {
    Err(MapperError::sql_build(format!(
        "cannot convert {} value to {target}",
        value.kind()
    )))
}

macro_rules! impl_from_value_int {
    ($($t:ty),*) => {
        $(
            impl FromValue for $t {
                fn from_value(value: Value) -> MapperResult<Self> {
                    match value {
                        Value::Integer(i) => <$t>::try_from(i).map_err(|e| {
                            MapperError::sql_build(format!(
                                "integer {i} out of range for {}: {e}",
                                stringify!($t)
                            ))
                        }),
                        Value::Boolean(b) => Ok(<$t>::from(b)),
                        other => mismatch(stringify!($t), &other),
                    }
                }
            }
        )*
    };
}

impl_from_value_int!(i8, i16, i32, i64, u8, u16, u32);

/// Largest integer magnitude an `f64` holds exactly.
const F64_EXACT_INT: u64 = 1 << 53;

impl FromValue for f64 {
    fn from_value(value: Value) -> MapperResult<Self> {
        match value {
            Value::Real(f) => Ok(f),
            Value::Integer(i) if i.unsigned_abs() <= F64_EXACT_INT => Ok(i as f64),
            Value::Integer(i) => Err(MapperError::sql_build(format!(
                "integer {i} cannot be represented exactly as f64"
            ))),
            other => mismatch("f64", &other),
        }
    }
}

/// Rounds to the nearest `f32`; values outside the `f32` range are rejected.
impl FromValue for f32 {
    fn from_value(value: Value) -> MapperResult<Self> {
        let f = f64::from_value(value)?;
        if f.is_finite() && f.abs() > f64::from(f32::MAX) {
            return Err(MapperError::sql_build(format!("real {f} out of range for f32")));
        }
        Ok(f as f32)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> MapperResult<Self> {
        match value {
            Value::Boolean(b) => Ok(b),
            Value::Integer(i) => Ok(i != 0),
            other => mismatch("bool", &other),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> MapperResult<Self> {
        match value {
            Value::Text(s) => Ok(s),
            other => mismatch("String", &other),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> MapperResult<Self> {
        match value {
            Value::Blob(b) => Ok(b),
            Value::Text(s) => Ok(s.into_bytes()),
            other => mismatch("Vec<u8>", &other),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> MapperResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> MapperResult<Self> {
        Ok(value)
    }
}
