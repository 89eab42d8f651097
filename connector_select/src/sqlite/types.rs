use rusqlite::types::{ToSql, ToSqlOutput};

use crate::types::{ColumnType, Value};

/// Column type from the declared type of a column.
///
/// Expression columns have no declared type and are reported as [ColumnType::Other].
pub fn decl_ty_to_column(decl_ty: Option<&str>) -> ColumnType {
    // SQLite does not enforce declared types, it only derives a column affinity from them.
    // See: https://sqlite.org/datatype3.html#determination_of_column_affinity
    let Some(decl_ty) = decl_ty else {
        return ColumnType::Other(String::new());
    };
    let ty = decl_ty.to_ascii_uppercase();

    if ty.contains("INT") {
        return ColumnType::Integer;
    }

    // CLOB columns have TEXT affinity, but are exposed as large objects
    if ty.contains("CLOB") {
        return ColumnType::Clob;
    }

    if ty.contains("CHAR") || ty.contains("TEXT") {
        return ColumnType::Text;
    }

    if ty.contains("BLOB") {
        return ColumnType::Blob;
    }

    if ty.contains("REAL") || ty.contains("FLOA") || ty.contains("DOUB") {
        return ColumnType::Float;
    }

    if ty.contains("DATE") || ty.contains("TIME") {
        return ColumnType::Timestamp;
    }

    ColumnType::Other(ty)
}

pub fn value_from_sqlite(value: rusqlite::types::Value, ty: &ColumnType) -> Value {
    use rusqlite::types::Value as V;

    match value {
        V::Null => Value::Null,
        V::Integer(v) => Value::Integer(v),
        V::Real(v) => Value::Float(v),
        V::Text(v) => {
            let text = Value::Text(v);
            match (ty, text.as_timestamp()) {
                (ColumnType::Timestamp, Some(ts)) => Value::Timestamp(ts),
                _ => text,
            }
        }
        V::Blob(v) => Value::Bytes(v),
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
            Value::Integer(v) => ToSqlOutput::from(*v),
            Value::Float(v) => ToSqlOutput::from(*v),
            Value::Text(v) => ToSqlOutput::from(v.as_str()),
            Value::Bytes(v) => ToSqlOutput::from(v.as_slice()),
            Value::Timestamp(v) => return v.to_sql(),
        })
    }
}
