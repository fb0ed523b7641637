//! Column-oriented in-memory table with per-column type inference.

use std::collections::{HashMap, HashSet};

/// Values of one column. `None` marks a missing cell.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Integer(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl ColumnData {
    /// Picks the narrowest type every non-missing cell fits: integer, then float, then text.
    pub fn infer(cells: Vec<Option<String>>) -> Self {
        let present: Vec<&str> = cells.iter().flatten().map(String::as_str).collect();
        if present.is_empty() {
            return ColumnData::Text(cells);
        }

        if present.iter().all(|c| c.parse::<i64>().is_ok()) {
            return ColumnData::Integer(
                cells
                    .iter()
                    .map(|c| c.as_deref().and_then(|v| v.parse().ok()))
                    .collect(),
            );
        }

        if present.iter().all(|c| c.parse::<f64>().is_ok()) {
            return ColumnData::Float(
                cells
                    .iter()
                    .map(|c| c.as_deref().and_then(|v| v.parse().ok()))
                    .collect(),
            );
        }

        ColumnData::Text(cells)
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Integer(v) => v.len(),
            ColumnData::Float(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, ColumnData::Text(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnData::Integer(_) => "integer",
            ColumnData::Float(_) => "float",
            ColumnData::Text(_) => "text",
        }
    }

    /// Cell as a float; integers widen.
    pub fn f64_at(&self, row: usize) -> Option<f64> {
        match self {
            ColumnData::Integer(v) => v.get(row).copied().flatten().map(|x| x as f64),
            ColumnData::Float(v) => v.get(row).copied().flatten(),
            ColumnData::Text(_) => None,
        }
    }

    /// Cell rendered as text, whatever the column type.
    pub fn text_at(&self, row: usize) -> Option<String> {
        match self {
            ColumnData::Integer(v) => v.get(row).copied().flatten().map(|x| x.to_string()),
            ColumnData::Float(v) => v.get(row).copied().flatten().map(|x| x.to_string()),
            ColumnData::Text(v) => v.get(row).cloned().flatten(),
        }
    }

    fn truncate(&mut self, len: usize) {
        match self {
            ColumnData::Integer(v) => v.truncate(len),
            ColumnData::Float(v) => v.truncate(len),
            ColumnData::Text(v) => v.truncate(len),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

/// A table keyed by column header, columns kept in feed order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    /// Builds a table; all columns must share one length.
    pub fn new(columns: Vec<Column>) -> Option<Self> {
        let rows = columns.first().map_or(0, |c| c.data.len());
        if columns.iter().any(|c| c.data.len() != rows) {
            return None;
        }
        Some(Self { columns, rows })
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Adds a column, replacing any existing column with the same name in place.
    ///
    /// Returns `false` and leaves the table untouched if the length does not match.
    #[must_use]
    pub fn set_column(&mut self, column: Column) -> bool {
        if column.data.len() != self.rows && !self.columns.is_empty() {
            return false;
        }
        if self.columns.is_empty() {
            self.rows = column.data.len();
        }
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
        true
    }

    /// Renames mapped columns; unmapped columns keep their names.
    pub fn rename(mut self, map: &HashMap<&str, &str>) -> Self {
        for column in &mut self.columns {
            if let Some(new_name) = map.get(column.name.as_str()) {
                column.name = new_name.to_string();
            }
        }
        self
    }

    /// First column name that occurs more than once, if any.
    pub fn duplicate_column(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.columns
            .iter()
            .map(|c| c.name.as_str())
            .find(|name| !seen.insert(*name))
    }

    /// Keeps only the first `len` rows.
    pub fn truncate(mut self, len: usize) -> Self {
        if len < self.rows {
            for column in &mut self.columns {
                column.data.truncate(len);
            }
            self.rows = len;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<Option<String>> {
        values
            .iter()
            .map(|v| if v.is_empty() { None } else { Some(v.to_string()) })
            .collect()
    }

    #[test]
    fn test_infer_integer_with_missing() {
        let data = ColumnData::infer(cells(&["1", "", "-3"]));
        assert_eq!(data, ColumnData::Integer(vec![Some(1), None, Some(-3)]));
    }

    #[test]
    fn test_infer_float_when_any_decimal() {
        let data = ColumnData::infer(cells(&["1", "2.5"]));
        assert_eq!(data, ColumnData::Float(vec![Some(1.0), Some(2.5)]));
    }

    #[test]
    fn test_infer_text_fallback() {
        let data = ColumnData::infer(cells(&["Mitte", "3"]));
        assert!(matches!(data, ColumnData::Text(_)));
        assert_eq!(data.text_at(1).as_deref(), Some("3"));
    }

    #[test]
    fn test_all_missing_column_is_text() {
        let data = ColumnData::infer(cells(&["", ""]));
        assert_eq!(data.type_name(), "text");
    }

    #[test]
    fn test_new_rejects_ragged_columns() {
        let a = Column {
            name: "a".into(),
            data: ColumnData::Integer(vec![Some(1)]),
        };
        let b = Column {
            name: "b".into(),
            data: ColumnData::Integer(vec![Some(1), Some(2)]),
        };
        assert!(Table::new(vec![a, b]).is_none());
    }

    #[test]
    fn test_set_column_replaces_existing() {
        let mut table = Table::new(vec![Column {
            name: "x".into(),
            data: ColumnData::Integer(vec![Some(1), Some(2)]),
        }])
        .unwrap();
        assert!(table.set_column(Column {
            name: "x".into(),
            data: ColumnData::Integer(vec![Some(7), Some(8)]),
        }));
        assert_eq!(table.columns().len(), 1);
        assert_eq!(table.column("x").unwrap().data.f64_at(0), Some(7.0));

        assert!(!table.set_column(Column {
            name: "y".into(),
            data: ColumnData::Integer(vec![Some(1)]),
        }));
    }

    #[test]
    fn test_duplicate_column_after_rename() {
        let table = Table::new(vec![
            Column {
                name: "a".into(),
                data: ColumnData::Integer(vec![Some(1)]),
            },
            Column {
                name: "b".into(),
                data: ColumnData::Integer(vec![Some(2)]),
            },
        ])
        .unwrap();
        assert_eq!(table.duplicate_column(), None);

        let renamed = table.rename(&HashMap::from([("b", "a")]));
        assert_eq!(renamed.duplicate_column(), Some("a"));
    }

    #[test]
    fn test_truncate_drops_trailing_rows() {
        let table = Table::new(vec![Column {
            name: "x".into(),
            data: ColumnData::Text(cells(&["a", "b", "c"])),
        }])
        .unwrap()
        .truncate(1);
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.column("x").unwrap().data.len(), 1);
    }
}
