use crate::api::Connection;
use crate::database::{close, close_quietly, fetch_rows};
use crate::errors::ConnectorError;
use crate::row::{Row, RowFactory};

/// The iterator that returns rows in batches of `fetch_size`, created by
/// [crate::Database::select_iter].
///
/// Owns the connection and the cursor of the query. They are closed when the
/// result is exhausted, when a fetch fails, when [BatchIter::close] is called
/// or when the iterator is dropped, whichever comes first.
pub struct BatchIter<C: Connection> {
    open: Option<(C, C::Cursor)>,
    factory: RowFactory,
    fetch_size: usize,
    max_rows: Option<usize>,
    row_count: usize,
}

impl<C: Connection> BatchIter<C> {
    pub(crate) fn new(
        conn: C,
        cursor: C::Cursor,
        factory: RowFactory,
        fetch_size: usize,
        max_rows: Option<usize>,
    ) -> Self {
        BatchIter {
            open: Some((conn, cursor)),
            factory,
            fetch_size,
            max_rows,
            row_count: 0,
        }
    }

    /// Lower-cased names of the result columns.
    pub fn fields(&self) -> &[String] {
        self.factory.fields()
    }

    /// Number of rows returned so far.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn is_closed(&self) -> bool {
        self.open.is_none()
    }

    /// Stop reading and release the cursor and the connection.
    /// Does nothing if they were already released.
    pub fn close(&mut self) -> Result<(), ConnectorError> {
        match self.open.take() {
            Some((conn, cursor)) => close(cursor, conn),
            None => Ok(()),
        }
    }

    fn fetch_batch(&mut self) -> Result<Option<Vec<Row>>, ConnectorError> {
        let Some((_, cursor)) = self.open.as_mut() else {
            return Ok(None);
        };

        if let Some(max_rows) = self.max_rows {
            if self.row_count >= max_rows {
                log::debug!("reached max_rows={max_rows} after {} rows", self.row_count);
                return Ok(None);
            }
        }

        let batch = fetch_rows(cursor, &self.factory, Some(self.fetch_size))?;
        if batch.is_empty() {
            return Ok(None);
        }
        self.row_count += batch.len();
        log::debug!("fetched batch of {} rows", batch.len());
        Ok(Some(batch))
    }
}

impl<C: Connection> Iterator for BatchIter<C> {
    type Item = Result<Vec<Row>, ConnectorError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.fetch_batch() {
            Ok(Some(batch)) => Some(Ok(batch)),
            Ok(None) => self.close().err().map(Err),
            Err(e) => {
                if let Some((conn, cursor)) = self.open.take() {
                    close_quietly(Some(cursor), conn);
                }
                Some(Err(e))
            }
        }
    }
}

impl<C: Connection> Drop for BatchIter<C> {
    fn drop(&mut self) {
        if let Some((conn, cursor)) = self.open.take() {
            log::debug!("batch iterator dropped before exhaustion");
            close_quietly(Some(cursor), conn);
        }
    }
}
