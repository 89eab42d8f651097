use std::collections::VecDeque;
use std::rc::Rc;

use itertools::Itertools;
use rusqlite::ToSql;

use crate::api::{BufferedLob, Cursor};
use crate::errors::ConnectorError;
use crate::types::{Binds, Column, RawValue};

use super::types;

/// Cursor over the result of a statement.
///
/// SQLite statements borrow their connection, so the whole result is read
/// into a buffer on [Cursor::execute] and handed out row by row.
pub struct SQLiteCursor {
    conn: Rc<rusqlite::Connection>,
    columns: Vec<Column>,
    rows: VecDeque<Vec<rusqlite::types::Value>>,
}

impl SQLiteCursor {
    pub(super) fn new(conn: Rc<rusqlite::Connection>) -> Self {
        SQLiteCursor {
            conn,
            columns: Vec::new(),
            rows: VecDeque::new(),
        }
    }
}

impl Cursor for SQLiteCursor {
    fn execute(&mut self, sql: &str, binds: Option<&Binds>) -> Result<(), ConnectorError> {
        let mut stmt = self.conn.prepare(sql)?;

        let columns = stmt
            .columns()
            .iter()
            .map(|c| Column::new(c.name(), types::decl_ty_to_column(c.decl_type())))
            .collect_vec();
        let column_count = columns.len();

        let mut rows_iter = match binds {
            None => stmt.query([])?,
            Some(Binds::Positional(values)) => stmt.query(rusqlite::params_from_iter(values))?,
            Some(Binds::Named(values)) => {
                let names = values
                    .iter()
                    .map(|(name, _)| {
                        if name.starts_with([':', '@', '$']) {
                            name.clone()
                        } else {
                            format!(":{name}")
                        }
                    })
                    .collect_vec();
                let params = names
                    .iter()
                    .zip_eq(values)
                    .map(|(name, (_, value))| (name.as_str(), value as &dyn ToSql))
                    .collect_vec();
                stmt.query(params.as_slice())?
            }
        };

        // read all of the rows into a buffer
        let mut rows = VecDeque::new();
        while let Some(row_ref) = rows_iter.next()? {
            let mut row = Vec::with_capacity(column_count);
            for col_index in 0..column_count {
                row.push(row_ref.get::<_, rusqlite::types::Value>(col_index)?);
            }
            rows.push_back(row);
        }
        log::debug!("buffered {} rows", rows.len());

        self.columns = columns;
        self.rows = rows;
        Ok(())
    }

    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<Vec<RawValue>>, ConnectorError> {
        let Some(row) = self.rows.pop_front() else {
            return Ok(None);
        };

        let row = row
            .into_iter()
            .zip_eq(&self.columns)
            .map(|(value, column)| {
                let value = types::value_from_sqlite(value, &column.ty);
                if column.ty.is_lob() && !value.is_null() {
                    RawValue::Lob(Box::new(BufferedLob::new(value)))
                } else {
                    RawValue::Value(value)
                }
            })
            .collect();
        Ok(Some(row))
    }

    fn close(self) -> Result<(), ConnectorError> {
        Ok(())
    }
}
