use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use ::oracle::sql_type::ToSql;
use ::oracle::{ResultSet, Row};
use itertools::Itertools;
use owning_ref::OwningHandle;

use crate::api::Cursor;
use crate::errors::ConnectorError;
use crate::types::{Binds, Column, RawValue};

use super::types;

/// A result set that borrows the connection kept alive by its [OwningHandle].
pub struct ResultHandle(ResultSet<'static, Row>);

impl Deref for ResultHandle {
    type Target = ResultSet<'static, Row>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for ResultHandle {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

type Rows = OwningHandle<Rc<::oracle::Connection>, ResultHandle>;

/// Cursor over a result set, which is fetched lazily from the server.
pub struct OracleCursor {
    conn: Rc<::oracle::Connection>,
    columns: Vec<Column>,
    rows: Option<Rows>,
}

impl OracleCursor {
    pub(super) fn new(conn: Rc<::oracle::Connection>) -> Self {
        OracleCursor {
            conn,
            columns: Vec::new(),
            rows: None,
        }
    }
}

impl Cursor for OracleCursor {
    fn execute(&mut self, sql: &str, binds: Option<&Binds>) -> Result<(), ConnectorError> {
        // release the previous result before starting a new one
        self.rows = None;

        let boxed = match binds {
            None => Vec::new(),
            Some(Binds::Positional(values)) => values.iter().map(types::to_sql).collect_vec(),
            Some(Binds::Named(values)) => {
                values.iter().map(|(_, v)| types::to_sql(v)).collect_vec()
            }
        };

        // the handle owns a clone of the connection, which outlives the result set
        let rows: Rows = OwningHandle::try_new(
            self.conn.clone(),
            |conn: *const ::oracle::Connection| -> Result<ResultHandle, ConnectorError> {
                let conn: &'static ::oracle::Connection = unsafe { &*conn };
                let rows = match binds {
                    Some(Binds::Named(values)) => {
                        let params: Vec<(&str, &dyn ToSql)> = values
                            .iter()
                            .zip_eq(&boxed)
                            .map(|((name, _), v)| (name.trim_start_matches(':'), &**v))
                            .collect();
                        conn.query_named(sql, &params)?
                    }
                    _ => {
                        let params: Vec<&dyn ToSql> = boxed.iter().map(|v| &**v).collect();
                        conn.query(sql, &params)?
                    }
                };
                Ok(ResultHandle(rows))
            },
        )?;

        self.columns = rows
            .column_info()
            .iter()
            .map(|c| Column::new(c.name(), types::ty_to_column(c.oracle_type())))
            .collect();
        self.rows = Some(rows);
        Ok(())
    }

    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<Vec<RawValue>>, ConnectorError> {
        let Some(rows) = self.rows.as_mut() else {
            return Ok(None);
        };
        let Some(row) = (**rows).next() else {
            return Ok(None);
        };
        let row = row?;

        row.sql_values()
            .iter()
            .zip_eq(&self.columns)
            .map(|(value, column)| types::raw_value(value, &column.ty))
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    fn close(self) -> Result<(), ConnectorError> {
        // dropping the result set releases its statement and its connection clone
        drop(self.rows);
        Ok(())
    }
}
