use serde_json::Value;

/// A single value in a flattened record.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Missing,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    /// Convert a scalar JSON value. Arrays are kept as their JSON text;
    /// objects never reach this point because the loader flattens them.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Missing,
            Value::Bool(b) => Cell::Bool(*b),
            Value::Number(num) => match num.as_i64() {
                Some(i) => Cell::Int(i),
                None => num.as_f64().map(Cell::Float).unwrap_or(Cell::Missing),
            },
            Value::String(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Numeric view of the cell. Booleans and text are not numbers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(i) => Some(*i as f64),
            Cell::Float(f) if f.is_finite() => Some(*f),
            _ => None,
        }
    }

    /// Integer view. Floats are accepted only when they hold a whole number.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Int(i) => Some(*i),
            // i64::MAX rounds up to 2^63 as f64, so the upper bound is exclusive.
            Cell::Float(f)
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 =>
            {
                Some(*f as i64)
            }
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Cell::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn display(&self) -> String {
        match self {
            Cell::Missing => "-".to_string(),
            Cell::Bool(b) => b.to_string(),
            Cell::Int(i) => i.to_string(),
            Cell::Float(f) => format!("{f:.6}"),
            Cell::Text(s) => s.clone(),
        }
    }

    /// Sort key used by table views: numbers first, everything else as NaN.
    pub fn sort_key(&self) -> f64 {
        match self {
            Cell::Bool(b) => f64::from(u8::from(*b)),
            other => other.as_f64().unwrap_or(f64::NAN),
        }
    }
}

/// Anything that can be shown as a table of named columns.
///
/// Every derived series implements this so the UI and the CSV exporter can
/// treat them uniformly.
pub trait TableSource {
    fn column_names(&self) -> Vec<String>;
    fn row_count(&self) -> usize;
    fn cell_text(&self, row: usize, col: usize) -> String;

    /// Numeric value for sorting; NaN when the cell is not numeric.
    fn sort_value(&self, row: usize, col: usize) -> f64 {
        self.cell_text(row, col).parse().unwrap_or(f64::NAN)
    }

    fn is_empty(&self) -> bool {
        self.row_count() == 0
    }
}

/// Flattened records: one row per run, one column per key seen in any record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>, // row-major: rows[row_idx][col_idx]
}

impl FlatTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record given as (column, cell) pairs. New columns are added in
    /// first-seen order and back-filled with `Missing` for earlier rows.
    pub fn push_record(&mut self, record: Vec<(String, Cell)>) {
        let mut row = vec![Cell::Missing; self.columns.len()];
        for (name, cell) in record {
            let idx = match self.column_index(&name) {
                Some(idx) => idx,
                None => {
                    self.columns.push(name);
                    for existing in &mut self.rows {
                        existing.push(Cell::Missing);
                    }
                    row.push(Cell::Missing);
                    self.columns.len() - 1
                }
            };
            row[idx] = cell;
        }
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&Cell::Missing)
    }

    /// Cell by column name; `Missing` when the column does not exist.
    pub fn get(&self, row: usize, column: &str) -> &Cell {
        match self.column_index(column) {
            Some(col) => self.cell(row, col),
            None => &Cell::Missing,
        }
    }

    /// A copy keeping only rows for which `keep` returns true. Columns are
    /// preserved even if they end up all-missing.
    pub fn filter_rows(&self, mut keep: impl FnMut(&FlatTable, usize) -> bool) -> FlatTable {
        let rows = (0..self.rows.len())
            .filter(|&i| keep(self, i))
            .map(|i| self.rows[i].clone())
            .collect();
        FlatTable { columns: self.columns.clone(), rows }
    }
}

impl TableSource for FlatTable {
    fn column_names(&self) -> Vec<String> {
        self.columns.clone()
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn cell_text(&self, row: usize, col: usize) -> String {
        self.cell(row, col).display()
    }

    fn sort_value(&self, row: usize, col: usize) -> f64 {
        self.cell(row, col).sort_key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rec(pairs: &[(&str, Cell)]) -> Vec<(String, Cell)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn union_of_columns_backfills_missing() {
        let mut t = FlatTable::new();
        t.push_record(rec(&[("pass", Cell::Int(1)), ("n", Cell::Int(4))]));
        t.push_record(rec(&[("pass", Cell::Int(2)), ("extra", Cell::Bool(true))]));

        assert_eq!(t.columns(), &["pass", "n", "extra"]);
        assert_eq!(t.len(), 2);
        assert_eq!(t.get(0, "extra"), &Cell::Missing);
        assert_eq!(t.get(1, "n"), &Cell::Missing);
        assert_eq!(t.get(1, "extra"), &Cell::Bool(true));
        assert_eq!(t.get(0, "nope"), &Cell::Missing);
    }

    #[test]
    fn cell_conversions() {
        assert_eq!(Cell::from_json(&json!(null)), Cell::Missing);
        assert_eq!(Cell::from_json(&json!(3)), Cell::Int(3));
        assert_eq!(Cell::from_json(&json!(0.25)), Cell::Float(0.25));
        assert_eq!(Cell::from_json(&json!([1, 2])), Cell::Text("[1,2]".into()));
        assert_eq!(Cell::Float(4.0).as_i64(), Some(4));
        assert_eq!(Cell::Float(4.5).as_i64(), None);
        assert_eq!(Cell::Float(1e19).as_i64(), None);
        assert_eq!(Cell::Float(f64::INFINITY).as_i64(), None);
        assert_eq!(Cell::from_json(&json!(18446744073709551615u64)).as_i64(), None);
        assert_eq!(Cell::Bool(true).as_f64(), None);
        assert!(Cell::Text("x".into()).sort_key().is_nan());
    }

    #[test]
    fn filter_keeps_columns() {
        let mut t = FlatTable::new();
        t.push_record(rec(&[("pass", Cell::Int(0))]));
        t.push_record(rec(&[("pass", Cell::Int(1))]));
        let kept = t.filter_rows(|t, r| t.get(r, "pass").as_i64() != Some(0));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept.columns(), t.columns());
        assert_eq!(kept.cell_text(0, 0), "1");
    }
}
