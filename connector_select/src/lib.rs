//! A thin client over relational database drivers: run SQL and get the rows back
//! as maps or records.
//!
//! The interface a driver implements is described in [api] module.
//!
//! Capabilities:
//! - **Select**: execute a query with optional bind variables and fetch all or the first N rows,
//! - **Batches**: fetch a large result in batches, over a connection that lives as long as the iterator,
//! - **Large objects**: CLOB and BLOB cells are read into memory before the row is returned,
//! - **SQL lists**: render values as a list for an `IN` clause,
//! - **Process monitor**: poll PeopleSoft Process Scheduler instances until they complete.
//!
//! Every call opens its own connection and closes it before returning, also when it fails.
//!
//! Example for SQLite:
//! ```
//! use connector_select::{ConnectParams, Database, RowType, Select, Value};
//! use connector_select::sqlite::SQLiteDriver;
//!
//! # fn main() -> Result<(), connector_select::ConnectorError> {
//! let db = Database::new(SQLiteDriver, ConnectParams::new(":memory:", "", ""));
//!
//! let rows = db.select("SELECT 1 AS A, 'x' AS b", None, 0, RowType::Dict)?;
//! assert_eq!(rows[0].get("a"), Some(&Value::Integer(1)));
//!
//! // batches of 100 rows, the connection is closed once they are exhausted
//! for batch in db.select_iter("SELECT 1 AS a", None, 100, None)? {
//!     let batch = batch?;
//!     assert_eq!(batch.len(), 1);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
mod batch_iter;
mod database;
mod errors;
mod format;
pub mod monitor;
mod params;
mod row;
pub mod types;

#[cfg(feature = "src_oracle")]
pub mod oracle;
#[cfg(feature = "src_sqlite")]
pub mod sqlite;

pub use batch_iter::BatchIter;
pub use database::{Database, Select};
pub use errors::*;
pub use format::{format_list, SqlLiteral, MAX_LIST_ITEMS};
pub use monitor::{process_monitor, ProcessMonitor};
pub use params::ConnectParams;
pub use row::{Record, Row, RowFactory, RowType};
pub use types::{Binds, Value};
