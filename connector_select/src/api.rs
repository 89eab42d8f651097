//! Interface that a database client driver has to provide.
//!
//! The important traits are:
//! - [Driver], which opens a [Connection] from [ConnectParams],
//! - [Connection], which opens a [Cursor] and is closed explicitly,
//! - [Cursor], which executes a statement and yields raw rows,
//! - [LargeObject], a handle to a LOB cell that has to be read before it is released.
//!
//! Both [Connection::close] and [Cursor::close] take `self`, so each handle can
//! only be closed once.

use crate::errors::ConnectorError;
use crate::params::ConnectParams;
use crate::types::{Binds, Column, RawValue, Value};

/// Opens connections to a data store.
pub trait Driver {
    type Connection: Connection;

    fn connect(&self, params: &ConnectParams) -> Result<Self::Connection, ConnectorError>;
}

/// An open connection to a data store.
pub trait Connection {
    type Cursor: Cursor;

    /// Make `schema` the default schema for unqualified names in this session.
    fn set_schema(&mut self, schema: &str) -> Result<(), ConnectorError>;

    fn cursor(&mut self) -> Result<Self::Cursor, ConnectorError>;

    fn close(self) -> Result<(), ConnectorError>;
}

/// Executes a statement and reads its result, one row at a time.
pub trait Cursor {
    fn execute(&mut self, sql: &str, binds: Option<&Binds>) -> Result<(), ConnectorError>;

    /// Columns of the result of the last executed statement.
    fn columns(&self) -> &[Column];

    /// Next row of the result, or `None` when the result is exhausted.
    fn next_row(&mut self) -> Result<Option<Vec<RawValue>>, ConnectorError>;

    fn close(self) -> Result<(), ConnectorError>;
}

/// Handle to a large-object cell.
///
/// The content can be read only once. The handle is released with [LargeObject::close].
pub trait LargeObject {
    fn read_all(&mut self) -> Result<Value, ConnectorError>;

    fn close(self: Box<Self>) -> Result<(), ConnectorError>;
}

/// A large object whose content the driver has already fetched.
pub struct BufferedLob {
    content: Option<Value>,
}

impl BufferedLob {
    pub fn new(content: Value) -> Self {
        BufferedLob {
            content: Some(content),
        }
    }
}

impl LargeObject for BufferedLob {
    fn read_all(&mut self) -> Result<Value, ConnectorError> {
        self.content
            .take()
            .ok_or_else(|| ConnectorError::LargeObject("content was already read".into()))
    }

    fn close(self: Box<Self>) -> Result<(), ConnectorError> {
        Ok(())
    }
}
