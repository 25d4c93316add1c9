//! Column type inference over flat rows

use super::types::{Column, ColumnType, TableSchema};
use crate::flatten::{Cell, FlatRow, ID_COLUMN};
use std::collections::BTreeMap;

/// What has been observed for one column so far
#[derive(Debug, Clone, Copy, Default)]
struct ColumnStats {
    observed: Option<ColumnType>,
}

impl ColumnStats {
    fn observe(&mut self, cell: &Cell) {
        if cell.is_blank() {
            return;
        }
        let cell_type = infer_cell_type(cell);
        self.observed = Some(match self.observed {
            Some(current) => current.merge_with(cell_type),
            None => cell_type,
        });
    }

    fn column_type(self) -> ColumnType {
        self.observed.unwrap_or(ColumnType::String)
    }
}

/// Narrowest type able to hold a single non-blank cell
pub fn infer_cell_type(cell: &Cell) -> ColumnType {
    if cell.as_i64().is_some() {
        ColumnType::Int64
    } else if cell.as_f64().is_some() {
        ColumnType::Float64
    } else {
        ColumnType::String
    }
}

/// Accumulates per-column statistics across rows
///
/// Integer when every non-null value fits an i64, float when every non-null
/// value is a finite f64, string otherwise. Columns that are empty or hold
/// only nulls are strings. Booleans are strings.
#[derive(Debug, Clone, Default)]
pub struct SchemaInferrer {
    columns: BTreeMap<String, ColumnStats>,
    row_count: usize,
}

impl SchemaInferrer {
    /// Create an empty inferrer
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe one row
    pub fn observe(&mut self, row: &FlatRow) {
        self.row_count += 1;
        self.columns
            .entry(ID_COLUMN.to_string())
            .or_default()
            .observe(&Cell::Text(row.id().to_string()));
        for (name, cell) in row.fields() {
            self.columns.entry(name.to_string()).or_default().observe(cell);
        }
    }

    /// Rows observed so far
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Build the schema: `id` first, then the rest in lexical order
    pub fn finish(&self) -> TableSchema {
        let mut schema = TableSchema::new();
        if let Some(stats) = self.columns.get(ID_COLUMN) {
            schema.push(Column::new(ID_COLUMN, stats.column_type()));
        }
        for (name, stats) in &self.columns {
            if name != ID_COLUMN {
                schema.push(Column::new(name.clone(), stats.column_type()));
            }
        }
        schema
    }
}

/// Infer a table schema from rows
pub fn infer_schema(rows: &[FlatRow]) -> TableSchema {
    let mut inferrer = SchemaInferrer::new();
    for row in rows {
        inferrer.observe(row);
    }
    inferrer.finish()
}

/// Infer the type of a single column of cells
pub fn infer_column_type<'a>(cells: impl IntoIterator<Item = &'a Cell>) -> ColumnType {
    let mut stats = ColumnStats::default();
    for cell in cells {
        stats.observe(cell);
    }
    stats.column_type()
}
