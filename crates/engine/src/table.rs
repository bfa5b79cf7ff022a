use crate::cell::CellValue;
use crate::columns;

/// A header row plus rows of cells, in load order.
///
/// Every row holds exactly one cell per column; short rows are padded with
/// `Empty` and long rows are cut at construction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Create an empty table. Column names are trimmed of surrounding whitespace.
    pub fn new<S: AsRef<str>>(columns: &[S]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.as_ref().trim().to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn from_rows<S: AsRef<str>>(columns: &[S], rows: Vec<Vec<CellValue>>) -> Self {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.columns.len(), CellValue::Empty);
        self.rows.push(row);
    }

    /// Exact (post-trim) column lookup.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Fuzzy column lookup, see [`columns::find_column`].
    pub fn find_column(&self, target: &str) -> Option<usize> {
        columns::find_column(&self.columns, target)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell at (row, col). Out-of-range positions read as `Empty`.
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        const EMPTY: &CellValue = &CellValue::Empty;
        self.rows.get(row).and_then(|r| r.get(col)).unwrap_or(EMPTY)
    }

    /// Overwrite a cell. Out-of-range positions are ignored.
    pub fn set_cell(&mut self, row: usize, col: usize, value: CellValue) {
        if let Some(slot) = self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            *slot = value;
        }
    }

    /// All cells of one column, top to bottom.
    pub fn column_values(&self, col: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows.iter().map(move |r| &r[col])
    }

    /// Apply `f` to every cell of one column in place.
    pub fn map_column(&mut self, col: usize, mut f: impl FnMut(&CellValue) -> CellValue) {
        if col >= self.columns.len() {
            return;
        }
        for row in &mut self.rows {
            row[col] = f(&row[col]);
        }
    }

    /// Keep only rows for which `keep(index, row)` is true, preserving order.
    pub fn retain_rows(&mut self, mut keep: impl FnMut(usize, &[CellValue]) -> bool) {
        let mut idx = 0;
        self.rows.retain(|row| {
            let kept = keep(idx, row);
            idx += 1;
            kept
        });
    }
}
