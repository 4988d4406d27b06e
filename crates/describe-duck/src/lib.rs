//! DuckDB store and statistics engine for describe runs

use std::path::Path;

use describe_engine::{BoxError, QueryRows, QueryStore};
use describe_model::ColumnDef;
use duckdb::Connection;
use thiserror::Error;
use tracing::debug;

mod stats;
mod value;

pub use stats::{DuckStats, QUANTILE_POINTS};
pub use value::to_json;

#[derive(Debug, Error)]
pub enum DuckError {
    #[error("Database error: {0}")]
    Database(#[from] duckdb::Error),

    #[error("Table '{0}' not found in database")]
    TableNotFound(String),

    #[error("Unexpected result from {query}: {detail}")]
    UnexpectedResult { query: String, detail: String },
}

/// Session settings applied when a store is opened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSettings {
    /// DuckDB memory limit, e.g. `4GB`.
    pub memory_limit: Option<String>,
    pub threads: Option<u32>,
}

pub struct DuckStore {
    conn: Connection,
}

impl DuckStore {
    pub fn open<P: AsRef<Path>>(path: P, settings: &StoreSettings) -> Result<Self, DuckError> {
        debug!(path = %path.as_ref().display(), "opening database");
        Self::from_connection(Connection::open(path)?, settings)
    }

    pub fn open_in_memory(settings: &StoreSettings) -> Result<Self, DuckError> {
        Self::from_connection(Connection::open_in_memory()?, settings)
    }

    pub fn from_connection(conn: Connection, settings: &StoreSettings) -> Result<Self, DuckError> {
        if let Some(limit) = &settings.memory_limit {
            conn.execute_batch(&format!("SET memory_limit = '{}'", limit.replace('\'', "''")))?;
        }
        if let Some(threads) = settings.threads {
            conn.execute_batch(&format!("SET threads = {threads}"))?;
        }

        // table-mode array fields are extracted with arrayJoin
        conn.execute_batch("CREATE OR REPLACE TEMP MACRO arrayJoin(a) AS unnest(a);")?;

        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Columns of `table` (optionally `schema.table`) in ordinal order.
    pub fn table_columns(&self, table: &str) -> Result<Vec<ColumnDef>, DuckError> {
        let (schema, name) = split_table(table);
        let mut stmt = self.conn.prepare(
            "SELECT column_name, data_type
             FROM information_schema.columns
             WHERE table_name = ? AND table_schema = coalesce(nullif(?, ''), current_schema())
             ORDER BY ordinal_position",
        )?;

        let columns = stmt
            .query_map(duckdb::params![name, schema.unwrap_or("")], |row| {
                Ok(ColumnDef::new(
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        if columns.is_empty() {
            return Err(DuckError::TableNotFound(table.to_string()));
        }
        Ok(columns)
    }

    pub fn column_comment(&self, table: &str, field: &str) -> Result<Option<String>, DuckError> {
        let (schema, name) = split_table(table);
        let mut stmt = self.conn.prepare(
            "SELECT comment
             FROM duckdb_columns()
             WHERE table_name = ? AND column_name = ? AND schema_name = coalesce(nullif(?, ''), current_schema())",
        )?;

        let mut rows = stmt.query(duckdb::params![name, field, schema.unwrap_or("")])?;
        let comment = match rows.next()? {
            Some(row) => row.get::<_, Option<String>>(0)?,
            None => None,
        };
        Ok(comment.filter(|c| !c.trim().is_empty()))
    }

    /// Column names and types a query would return.
    pub fn describe_query(&self, query: &str) -> Result<Vec<ColumnDef>, DuckError> {
        let mut stmt = self.conn.prepare(&format!("DESCRIBE {query}"))?;
        let columns = stmt
            .query_map([], |row| {
                Ok(ColumnDef::new(
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(columns)
    }

    /// Run a query and collect every row as JSON values.
    pub fn rows(&self, query: &str) -> Result<QueryRows, DuckError> {
        let mut stmt = self.conn.prepare(query)?;
        let mut result = Vec::new();
        {
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                let width = row.as_ref().column_count();
                let mut values = Vec::with_capacity(width);
                for i in 0..width {
                    values.push(to_json(row.get::<_, duckdb::types::Value>(i)?));
                }
                result.push(values);
            }
        }

        Ok(QueryRows {
            columns: stmt.column_names(),
            rows: result,
        })
    }
}

fn split_table(table: &str) -> (Option<&str>, &str) {
    match table.split_once('.') {
        Some((schema, name)) => (Some(schema), name),
        None => (None, table),
    }
}

impl QueryStore for DuckStore {
    fn schema(&self, table: &str) -> Result<Vec<ColumnDef>, BoxError> {
        Ok(self.table_columns(table)?)
    }

    fn comment(&self, table: &str, field: &str) -> Result<Option<String>, BoxError> {
        Ok(self.column_comment(table, field)?)
    }

    fn execute(&self, query: &str) -> Result<QueryRows, BoxError> {
        Ok(self.rows(query)?)
    }

    fn resolve_schema(&self, query: &str) -> Result<Vec<ColumnDef>, BoxError> {
        Ok(self.describe_query(query)?)
    }
}
