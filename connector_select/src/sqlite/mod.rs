//! Provides `connector_select` traits for [rusqlite crate](https://docs.rs/rusqlite).
//!
//! [ConnectParams::host] is the path of the database file, or `:memory:`.
//! SQLite has no users or session schemas, so the credentials and the schema are ignored.

mod query;
mod types;

use std::rc::Rc;

use crate::api::{Connection, Driver};
use crate::errors::ConnectorError;
use crate::params::ConnectParams;

#[doc(hidden)]
pub use query::SQLiteCursor;

/// Opens [SQLiteConnection]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct SQLiteDriver;

impl Driver for SQLiteDriver {
    type Connection = SQLiteConnection;

    fn connect(&self, params: &ConnectParams) -> Result<SQLiteConnection, ConnectorError> {
        log::debug!("opening sqlite database {}", params.host);
        let inner = rusqlite::Connection::open(&params.host)?;
        Ok(SQLiteConnection::new(inner))
    }
}

pub struct SQLiteConnection {
    inner: Rc<rusqlite::Connection>,
}

impl SQLiteConnection {
    pub fn new(inner: rusqlite::Connection) -> Self {
        SQLiteConnection {
            inner: Rc::new(inner),
        }
    }
}

impl Connection for SQLiteConnection {
    type Cursor = SQLiteCursor;

    fn set_schema(&mut self, schema: &str) -> Result<(), ConnectorError> {
        log::debug!("sqlite has no session schema, ignoring schema {schema}");
        Ok(())
    }

    fn cursor(&mut self) -> Result<SQLiteCursor, ConnectorError> {
        Ok(SQLiteCursor::new(self.inner.clone()))
    }

    fn close(self) -> Result<(), ConnectorError> {
        let conn = Rc::try_unwrap(self.inner)
            .map_err(|_| ConnectorError::Close("a cursor is still open".into()))?;
        conn.close().map_err(|(_, e)| ConnectorError::SQLite(e))
    }
}
