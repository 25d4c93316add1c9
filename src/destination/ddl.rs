//! Table DDL for each destination dialect

use crate::schema::{sanitize_identifier, ColumnType, TableSchema};

/// Column created when a schema has no columns
pub const PLACEHOLDER_COLUMN: &str = "_dummy";

/// SQL dialect of a destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    ClickHouse,
    DuckDb,
}

impl Dialect {
    /// Quote an identifier
    ///
    /// ClickHouse identifiers go through [`sanitize_identifier`], the same
    /// names the Arrow batch carries. DuckDB identifiers have embedded double
    /// quotes doubled.
    pub fn quote(self, ident: &str) -> String {
        match self {
            Dialect::ClickHouse => format!("`{}`", sanitize_identifier(ident)),
            Dialect::DuckDb => format!("\"{}\"", ident.replace('"', "\"\"")),
        }
    }

    /// Column type name
    pub fn column_type(self, column_type: ColumnType) -> &'static str {
        match (self, column_type) {
            (Dialect::ClickHouse, ColumnType::Int64) => "Nullable(Int64)",
            (Dialect::ClickHouse, ColumnType::Float64) => "Nullable(Float64)",
            (Dialect::ClickHouse, ColumnType::String) => "String",
            (Dialect::DuckDb, ColumnType::Int64) => "BIGINT",
            (Dialect::DuckDb, ColumnType::Float64) => "DOUBLE",
            (Dialect::DuckDb, ColumnType::String) => "VARCHAR",
        }
    }

    /// `DROP TABLE IF EXISTS`
    pub fn drop_table(self, table: &str) -> String {
        format!("DROP TABLE IF EXISTS {}", self.quote(table))
    }

    /// `CREATE TABLE` for a schema, with the placeholder column when it is empty
    pub fn create_table(self, table: &str, schema: &TableSchema) -> String {
        let columns = if schema.is_empty() {
            format!(
                "{} {}",
                self.quote(PLACEHOLDER_COLUMN),
                self.column_type(ColumnType::String)
            )
        } else {
            schema
                .columns
                .iter()
                .map(|c| format!("{} {}", self.quote(&c.name), self.column_type(c.column_type)))
                .collect::<Vec<_>>()
                .join(", ")
        };

        match self {
            Dialect::ClickHouse => format!(
                "CREATE TABLE {} ({columns}) ENGINE = MergeTree() ORDER BY tuple()",
                self.quote(table)
            ),
            Dialect::DuckDb => format!("CREATE TABLE {} ({columns})", self.quote(table)),
        }
    }
}
