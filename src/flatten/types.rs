//! Raw field values and flat cells

use crate::types::{JsonObject, JsonValue};
use serde_json::Number;
use std::collections::BTreeMap;

/// A raw property value, classified before flattening
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Null, boolean, number or string
    Scalar(JsonValue),
    /// Ordered sequence
    Sequence(Vec<JsonValue>),
    /// Nested mapping
    Mapping(JsonObject),
}

impl From<JsonValue> for FieldValue {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Array(items) => FieldValue::Sequence(items),
            JsonValue::Object(map) => FieldValue::Mapping(map),
            scalar => FieldValue::Scalar(scalar),
        }
    }
}

/// One flat, tabular cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
}

impl Cell {
    /// Build a cell from a scalar JSON value
    ///
    /// Non-scalar values are serialized to JSON text.
    pub fn from_json(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Cell::Null,
            JsonValue::Bool(b) => Cell::Bool(b),
            JsonValue::Number(n) => Cell::Number(n),
            JsonValue::String(s) => Cell::Text(s),
            complex => Cell::Text(complex.to_string()),
        }
    }

    /// Null, or text that is empty
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Value as a 64-bit integer, parsing text when needed
    ///
    /// Text counts only in canonical form, so `"02134"` and `"+1555"` are not
    /// integers.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Number(n) => n.as_i64(),
            Cell::Text(s) => s.parse::<i64>().ok().filter(|i| i.to_string() == *s),
            _ => None,
        }
    }

    /// Value as a finite 64-bit float, parsing text when needed
    ///
    /// Text must be a plain decimal numeral that an f64 holds without losing
    /// digits.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Cell::Number(n) => n.as_f64(),
            Cell::Text(s) if is_exact_decimal(s) => s.parse::<f64>().ok(),
            Cell::Text(_) => None,
            _ => None,
        }?;
        value.is_finite().then_some(value)
    }

    /// Textual rendering; `None` for null
    pub fn to_text(&self) -> Option<String> {
        match self {
            Cell::Null => None,
            Cell::Bool(b) => Some(b.to_string()),
            Cell::Number(n) => Some(n.to_string()),
            Cell::Text(s) => Some(s.clone()),
        }
    }
}

/// Significant digits an f64 always holds exactly
const F64_EXACT_DIGITS: usize = 15;

/// `-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?` with at most
/// [`F64_EXACT_DIGITS`] significant digits
fn is_exact_decimal(text: &str) -> bool {
    let unsigned = text.strip_prefix('-').unwrap_or(text);
    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(at) => (&unsigned[..at], Some(&unsigned[at + 1..])),
        None => (unsigned, None),
    };
    let (int, frac) = match mantissa.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (mantissa, None),
    };

    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int) || (int.len() > 1 && int.starts_with('0')) {
        return false;
    }
    if frac.is_some_and(|frac| !all_digits(frac)) {
        return false;
    }
    if let Some(exp) = exponent {
        if !all_digits(exp.strip_prefix(['+', '-']).unwrap_or(exp)) {
            return false;
        }
    }

    let digits: String = int.chars().chain(frac.unwrap_or("").chars()).collect();
    let significant = digits.trim_start_matches('0').trim_end_matches('0');
    significant.len() <= F64_EXACT_DIGITS
}

/// Column holding the record identifier
pub const ID_COLUMN: &str = "id";

/// One record rendered as column name to cell
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRow {
    id: String,
    fields: BTreeMap<String, Cell>,
}

impl FlatRow {
    /// Create a row holding only the identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Record identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Set a field; the identifier column cannot be overwritten
    pub fn insert(&mut self, column: impl Into<String>, cell: Cell) {
        let column = column.into();
        if column != ID_COLUMN {
            self.fields.insert(column, cell);
        }
    }

    /// Cell for a column, `None` if the row lacks it
    pub fn get(&self, column: &str) -> Option<Cell> {
        if column == ID_COLUMN {
            return Some(Cell::Text(self.id.clone()));
        }
        self.fields.get(column).cloned()
    }

    /// Borrowed cell for a non-identifier column
    pub fn field(&self, column: &str) -> Option<&Cell> {
        self.fields.get(column)
    }

    /// Column names, `id` first
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        std::iter::once(ID_COLUMN).chain(self.fields.keys().map(String::as_str))
    }

    /// Non-identifier fields
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of columns including `id`
    pub fn len(&self) -> usize {
        self.fields.len() + 1
    }

    /// Always false: a row holds at least its identifier
    pub fn is_empty(&self) -> bool {
        false
    }
}
