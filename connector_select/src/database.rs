//! Query execution: a connection per call, closed on every exit path.

use crate::api::{Connection, Cursor, Driver};
use crate::batch_iter::BatchIter;
use crate::errors::ConnectorError;
use crate::params::ConnectParams;
use crate::row::{Row, RowFactory, RowType};
use crate::types::Binds;

/// Anything that can run a query and return materialized rows.
pub trait Select {
    fn select(
        &self,
        sql: &str,
        binds: Option<&Binds>,
        fetch: usize,
        row_type: RowType,
    ) -> Result<Vec<Row>, ConnectorError>;
}

/// A database, reached through a driver with fixed connection parameters.
///
/// Every call opens its own connection, so nothing is shared between calls.
pub struct Database<D: Driver> {
    driver: D,
    params: ConnectParams,
}

impl<D: Driver> Database<D> {
    pub fn new(driver: D, params: ConnectParams) -> Self {
        Database { driver, params }
    }

    pub fn params(&self) -> &ConnectParams {
        &self.params
    }

    /// Execute `sql` and return all of its rows as maps.
    pub fn select_all(&self, sql: &str) -> Result<Vec<Row>, ConnectorError> {
        self.select(sql, None, 0, RowType::Dict)
    }

    /// Execute `sql` and return its rows in batches of `fetch_size`.
    ///
    /// The connection stays open until the returned iterator is exhausted,
    /// closed or dropped. Once at least `max_rows` rows were returned, no more
    /// batches are fetched. The last batch is not truncated, so up to
    /// `fetch_size - 1` rows over `max_rows` can be returned.
    pub fn select_iter(
        &self,
        sql: &str,
        binds: Option<&Binds>,
        fetch_size: usize,
        max_rows: Option<usize>,
    ) -> Result<BatchIter<D::Connection>, ConnectorError> {
        if fetch_size == 0 {
            return Err(ConnectorError::InvalidArgument(
                "fetch_size must be greater than zero".into(),
            ));
        }

        let (conn, cursor, factory) = self.start(sql, binds, RowType::Dict)?;
        Ok(BatchIter::new(conn, cursor, factory, fetch_size, max_rows))
    }

    fn connect(&self) -> Result<D::Connection, ConnectorError> {
        let mut conn = self.driver.connect(&self.params)?;

        if let Some(schema) = &self.params.schema {
            if let Err(e) = conn.set_schema(schema) {
                close_quietly(None, conn);
                return Err(e);
            }
        }
        Ok(conn)
    }

    /// Connect, open a cursor and execute. On failure everything opened so far is closed.
    #[allow(clippy::type_complexity)]
    fn start(
        &self,
        sql: &str,
        binds: Option<&Binds>,
        row_type: RowType,
    ) -> Result<
        (
            D::Connection,
            <D::Connection as Connection>::Cursor,
            RowFactory,
        ),
        ConnectorError,
    > {
        log::debug!("query: {sql}");

        let mut conn = self.connect()?;

        let mut cursor = match conn.cursor() {
            Ok(cursor) => cursor,
            Err(e) => {
                close_quietly(None, conn);
                return Err(e);
            }
        };

        let binds = binds.filter(|b| !b.is_empty());
        if let Err(e) = cursor.execute(sql, binds) {
            close_quietly(Some(cursor), conn);
            return Err(e);
        }

        let factory = row_type.factory(cursor.columns());
        Ok((conn, cursor, factory))
    }
}

impl<D: Driver> Select for Database<D> {
    /// Execute `sql` and return at most `fetch` rows, or all rows if `fetch` is zero.
    fn select(
        &self,
        sql: &str,
        binds: Option<&Binds>,
        fetch: usize,
        row_type: RowType,
    ) -> Result<Vec<Row>, ConnectorError> {
        let (conn, mut cursor, factory) = self.start(sql, binds, row_type)?;

        let limit = if fetch > 0 { Some(fetch) } else { None };
        let rows = fetch_rows(&mut cursor, &factory, limit);

        match rows {
            Ok(rows) => {
                close(cursor, conn)?;
                log::debug!("fetched {} rows", rows.len());
                Ok(rows)
            }
            Err(e) => {
                close_quietly(Some(cursor), conn);
                Err(e)
            }
        }
    }
}

/// Read up to `limit` rows, or until the result is exhausted.
pub(crate) fn fetch_rows<C: Cursor>(
    cursor: &mut C,
    factory: &RowFactory,
    limit: Option<usize>,
) -> Result<Vec<Row>, ConnectorError> {
    let mut rows = Vec::with_capacity(limit.unwrap_or(0).min(1024));
    while limit.map_or(true, |l| rows.len() < l) {
        let Some(raw) = cursor.next_row()? else {
            break;
        };
        rows.push(factory.create_row(raw)?);
    }
    Ok(rows)
}

/// Close cursor, then connection. Both are closed even if closing the cursor fails.
pub(crate) fn close<C: Connection>(cursor: C::Cursor, conn: C) -> Result<(), ConnectorError> {
    let cursor_res = cursor.close();
    let conn_res = conn.close();
    log::debug!("closed cursor and connection");
    cursor_res.and(conn_res)
}

/// Close after another error, which takes precedence over close failures.
pub(crate) fn close_quietly<C: Connection>(cursor: Option<C::Cursor>, conn: C) {
    if let Some(cursor) = cursor {
        if let Err(e) = cursor.close() {
            log::warn!("failed to close cursor: {e}");
        }
    }
    if let Err(e) = conn.close() {
        log::warn!("failed to close connection: {e}");
    }
}
