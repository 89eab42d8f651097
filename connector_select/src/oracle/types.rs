use ::oracle::sql_type::{OracleType, ToSql};
use ::oracle::SqlValue;

use crate::api::BufferedLob;
use crate::errors::ConnectorError;
use crate::types::{ColumnType, RawValue, Value};

pub fn ty_to_column(ty: &OracleType) -> ColumnType {
    match ty {
        // NUMBER(p, 0) fits into i64 up to 18 digits
        OracleType::Number(precision, 0) if (1..=18).contains(precision) => ColumnType::Integer,
        OracleType::Int64 | OracleType::UInt64 => ColumnType::Integer,
        OracleType::Number(_, _)
        | OracleType::Float(_)
        | OracleType::BinaryFloat
        | OracleType::BinaryDouble => ColumnType::Float,

        OracleType::Varchar2(_)
        | OracleType::NVarchar2(_)
        | OracleType::Char(_)
        | OracleType::NChar(_)
        | OracleType::Long
        | OracleType::Rowid => ColumnType::Text,

        OracleType::Date
        | OracleType::Timestamp(_)
        | OracleType::TimestampTZ(_)
        | OracleType::TimestampLTZ(_) => ColumnType::Timestamp,

        OracleType::Raw(_) | OracleType::LongRaw => ColumnType::Bytes,

        OracleType::CLOB | OracleType::NCLOB => ColumnType::Clob,
        OracleType::BLOB | OracleType::BFILE => ColumnType::Blob,

        other => ColumnType::Other(other.to_string()),
    }
}

/// Read a cell. Large objects are fetched by the driver and handed out as [BufferedLob]s.
pub fn raw_value(value: &SqlValue, ty: &ColumnType) -> Result<RawValue, ConnectorError> {
    if value.is_null()? {
        return Ok(RawValue::Value(Value::Null));
    }

    Ok(match ty {
        ColumnType::Integer => RawValue::Value(Value::Integer(value.get()?)),
        ColumnType::Float => RawValue::Value(Value::Float(value.get()?)),
        ColumnType::Timestamp => RawValue::Value(Value::Timestamp(value.get()?)),
        ColumnType::Bytes => RawValue::Value(Value::Bytes(value.get()?)),
        ColumnType::Clob => RawValue::Lob(Box::new(BufferedLob::new(Value::Text(value.get()?)))),
        ColumnType::Blob => RawValue::Lob(Box::new(BufferedLob::new(Value::Bytes(value.get()?)))),
        ColumnType::Text | ColumnType::Other(_) => RawValue::Value(Value::Text(value.get()?)),
    })
}

pub fn to_sql(value: &Value) -> Box<dyn ToSql> {
    match value {
        Value::Null => Box::new(None::<String>),
        Value::Integer(v) => Box::new(*v),
        Value::Float(v) => Box::new(*v),
        Value::Text(v) => Box::new(v.clone()),
        Value::Bytes(v) => Box::new(v.clone()),
        Value::Timestamp(v) => Box::new(*v),
    }
}
