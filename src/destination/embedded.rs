//! Embedded DuckDB destination
//!
//! One root database is opened per run. Every pipeline gets its own
//! connection cloned from the root, and blocking calls run on the blocking
//! thread pool.

use super::ddl::Dialect;
use super::{Destination, DestinationFactory};
use crate::error::{Error, Result};
use crate::schema::TableSchema;
use arrow::array::{Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use duckdb::types::Value;
use duckdb::{appender_params_from_iter, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// One private DuckDB connection
pub struct DuckDbDestination {
    conn: Option<Arc<Mutex<Connection>>>,
}

impl std::fmt::Debug for DuckDbDestination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuckDbDestination")
            .field("open", &self.conn.is_some())
            .finish()
    }
}

impl DuckDbDestination {
    /// Wrap an open connection
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Some(Arc::new(Mutex::new(conn))),
        }
    }

    /// Run `f` against the connection on the blocking pool
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = self
            .conn
            .clone()
            .ok_or_else(|| Error::destination("DuckDB connection already closed"))?;

        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| Error::destination("DuckDB connection lock poisoned"))?;
            f(&guard)
        })
        .await
        .map_err(|e| Error::destination(format!("DuckDB task failed: {e}")))?
    }
}

/// Convert every row of a batch into DuckDB values
pub fn batch_rows(batch: &RecordBatch) -> Result<Vec<Vec<Value>>> {
    let mut rows: Vec<Vec<Value>> = (0..batch.num_rows())
        .map(|_| Vec::with_capacity(batch.num_columns()))
        .collect();

    for (index, column) in batch.columns().iter().enumerate() {
        let field = batch.schema().field(index).clone();
        match field.data_type() {
            DataType::Int64 => {
                let arr = downcast::<Int64Array>(column.as_ref(), field.name())?;
                for (row, slot) in rows.iter_mut().enumerate() {
                    slot.push(if arr.is_null(row) {
                        Value::Null
                    } else {
                        Value::BigInt(arr.value(row))
                    });
                }
            }
            DataType::Float64 => {
                let arr = downcast::<Float64Array>(column.as_ref(), field.name())?;
                for (row, slot) in rows.iter_mut().enumerate() {
                    slot.push(if arr.is_null(row) {
                        Value::Null
                    } else {
                        Value::Double(arr.value(row))
                    });
                }
            }
            DataType::Utf8 => {
                let arr = downcast::<StringArray>(column.as_ref(), field.name())?;
                for (row, slot) in rows.iter_mut().enumerate() {
                    slot.push(if arr.is_null(row) {
                        Value::Null
                    } else {
                        Value::Text(arr.value(row).to_string())
                    });
                }
            }
            other => {
                return Err(Error::destination(format!(
                    "Unsupported column type {other} for '{}'",
                    field.name()
                )))
            }
        }
    }

    Ok(rows)
}

fn downcast<'a, A: 'static>(array: &'a dyn Array, name: &str) -> Result<&'a A> {
    array
        .as_any()
        .downcast_ref::<A>()
        .ok_or_else(|| Error::destination(format!("Column '{name}' has an unexpected layout")))
}

#[async_trait]
impl Destination for DuckDbDestination {
    fn kind(&self) -> &'static str {
        "duckdb"
    }

    async fn ping(&mut self) -> Result<()> {
        let value: i64 = self
            .with_conn(|conn| Ok(conn.query_row("SELECT 1", [], |row| row.get(0))?))
            .await?;
        if value == 1 {
            Ok(())
        } else {
            Err(Error::destination(format!("Unexpected ping response: {value}")))
        }
    }

    async fn recreate_table(&mut self, table: &str, schema: &TableSchema) -> Result<()> {
        let dialect = Dialect::DuckDb;
        let sql = format!(
            "{};\n{};",
            dialect.drop_table(table),
            dialect.create_table(table, schema)
        );
        debug!(sql = %sql, "DuckDB statement");
        self.with_conn(move |conn| Ok(conn.execute_batch(&sql)?))
            .await
    }

    async fn insert_batch(&mut self, table: &str, batch: &RecordBatch) -> Result<u64> {
        if batch.num_rows() == 0 {
            return Ok(0);
        }

        let rows = batch_rows(batch)?;
        let count = rows.len() as u64;
        let table_name = table.to_string();

        self.with_conn(move |conn| {
            let mut appender = conn.appender(&table_name)?;
            for row in rows {
                appender.append_row(appender_params_from_iter(row))?;
            }
            appender.flush()?;
            Ok(())
        })
        .await?;

        info!(table = %table, rows = count, "Inserted into DuckDB");
        Ok(count)
    }

    async fn close(&mut self) -> Result<()> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };
        let conn = Arc::try_unwrap(conn)
            .map_err(|_| Error::destination("DuckDB connection still in use"))?
            .into_inner()
            .map_err(|_| Error::destination("DuckDB connection lock poisoned"))?;
        conn.close().map_err(|(_, e)| Error::DuckDb(e))
    }
}

/// Hands out connections cloned from one root database
pub struct DuckDbFactory {
    root: Mutex<Connection>,
}

impl std::fmt::Debug for DuckDbFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuckDbFactory").finish_non_exhaustive()
    }
}

impl DuckDbFactory {
    /// Open a database file, or an in-memory database when `path` is `None`
    pub fn open(path: Option<&Path>) -> Result<Self> {
        let root = match path {
            Some(path) => Connection::open(path)?,
            None => Connection::open_in_memory()?,
        };
        Ok(Self {
            root: Mutex::new(root),
        })
    }

    /// Fresh connection to the same database
    pub fn clone_connection(&self) -> Result<Connection> {
        let root = self
            .root
            .lock()
            .map_err(|_| Error::destination("DuckDB root lock poisoned"))?;
        Ok(root.try_clone()?)
    }
}

#[async_trait]
impl DestinationFactory for DuckDbFactory {
    async fn connect(&self) -> Result<Box<dyn Destination>> {
        Ok(Box::new(DuckDbDestination::new(self.clone_connection()?)))
    }
}
