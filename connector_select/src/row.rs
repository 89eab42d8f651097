//! Converting raw driver rows into [Row]s.

use std::collections::HashMap;
use std::ops::Index;
use std::str::FromStr;
use std::sync::Arc;

use itertools::Itertools;

use crate::api::LargeObject;
use crate::errors::ConnectorError;
use crate::types::{Column, RawValue, Value};

/// Shape of the rows returned by a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowType {
    /// [Row::Map], keyed by lower-cased column name.
    #[default]
    Dict,
    /// [Row::Record], an ordered record with lower-cased field names.
    Record,
}

impl RowType {
    pub fn factory(self, columns: &[Column]) -> RowFactory {
        let fields: Arc<[String]> = columns.iter().map(|c| c.name.to_lowercase()).collect();
        RowFactory {
            row_type: self,
            fields,
        }
    }
}

impl FromStr for RowType {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dict" => Ok(RowType::Dict),
            "namedtuple" | "record" => Ok(RowType::Record),
            _ => Err(ConnectorError::InvalidArgument(format!(
                "unknown row type `{s}`, expected `dict` or `namedtuple`"
            ))),
        }
    }
}

/// Builds rows of one shape for one result.
///
/// Field names are computed once and shared by all records.
#[derive(Debug, Clone)]
pub struct RowFactory {
    row_type: RowType,
    fields: Arc<[String]>,
}

impl RowFactory {
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn create_row(&self, raw: Vec<RawValue>) -> Result<Row, ConnectorError> {
        if raw.len() != self.fields.len() {
            return Err(ConnectorError::DataSchemaMismatch(format!(
                "row has {} values, but the result has {} columns",
                raw.len(),
                self.fields.len()
            )));
        }

        let values = raw.into_iter().map(read_value).collect::<Result<Vec<_>, _>>()?;

        Ok(match self.row_type {
            RowType::Dict => Row::Map(self.fields.iter().cloned().zip(values).collect()),
            RowType::Record => Row::Record(Record {
                fields: self.fields.clone(),
                values,
            }),
        })
    }
}

fn read_value(raw: RawValue) -> Result<Value, ConnectorError> {
    match raw {
        RawValue::Value(v) => Ok(v),
        RawValue::Lob(lob) => read_lob(lob),
    }
}

/// Read the whole large object and release its handle.
/// Failing to release is not an error, the content was already read.
fn read_lob(mut lob: Box<dyn LargeObject>) -> Result<Value, ConnectorError> {
    let value = lob.read_all();
    if let Err(e) = lob.close() {
        log::debug!("ignoring failure to close large object: {e}");
    }
    value
}

/// A materialized result row.
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    Map(HashMap<String, Value>),
    Record(Record),
}

impl Row {
    /// Value of a column, looked up case-insensitively.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let name = name.to_lowercase();
        match self {
            Row::Map(map) => map.get(&name),
            Row::Record(record) => record.get(&name),
        }
    }

    /// Value at a column position. Maps are unordered, so this only works for records.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        match self {
            Row::Map(_) => None,
            Row::Record(record) => record.values.get(index),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Row::Map(map) => map.len(),
            Row::Record(record) => record.values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_map(self) -> HashMap<String, Value> {
        match self {
            Row::Map(map) => map,
            Row::Record(record) => record.into_map(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let object: serde_json::Map<String, serde_json::Value> = match self {
            Row::Map(map) => map
                .iter()
                .sorted_by(|a, b| a.0.cmp(b.0))
                .map(|(k, v)| (k.clone(), v.clone().into()))
                .collect(),
            Row::Record(record) => record
                .fields
                .iter()
                .zip(&record.values)
                .map(|(k, v)| (k.clone(), v.clone().into()))
                .collect(),
        };
        serde_json::Value::Object(object)
    }
}

/// Ordered values with named fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    fields: Arc<[String]>,
    values: Vec<Value>,
}

impl Record {
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Value of a field, looked up case-insensitively.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let name = name.to_lowercase();
        let position = self.fields.iter().position(|f| *f == name)?;
        self.values.get(position)
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn into_map(self) -> HashMap<String, Value> {
        self.fields.iter().cloned().zip_eq(self.values).collect()
    }
}

impl Index<usize> for Record {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        &self.values[index]
    }
}
