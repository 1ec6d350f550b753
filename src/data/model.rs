use std::fmt;

use crate::error::{DashboardError, Result};

// ---------------------------------------------------------------------------
// CellValue – a single cell of the record table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the dtypes of a loaded CSV.
/// Grouping and distinct counts key on it, so `CellValue` must be `Ord`.
#[derive(Debug, Clone)]
pub enum CellValue {
    /// Free text. Missing cells are normalised to `Text("")`.
    Text(String),
    Integer(i64),
    Float(f64),
    /// Dense integer code assigned by the encoder bank.
    Code(u32),
}

/// Tokens read as missing, as pandas does by default.
pub const NA_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// -- Manual Eq/Ord so we can put CellValue in BTreeMap/BTreeSet --
// Equality, hashing and ordering all compare floats bit-wise (`total_cmp`).

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                CellValue::Code(_) => 0,
                CellValue::Integer(_) | CellValue::Float(_) => 1,
                CellValue::Text(_) => 2,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (CellValue::Code(a), CellValue::Code(b)) => a.cmp(b),
            (CellValue::Integer(a), CellValue::Integer(b)) => a.cmp(b),
            (CellValue::Float(a), CellValue::Float(b)) => a.total_cmp(b),
            // Mixed numeric columns compare by value, integers first on ties.
            (CellValue::Integer(a), CellValue::Float(b)) => {
                (*a as f64).total_cmp(b).then(Ordering::Less)
            }
            (CellValue::Float(a), CellValue::Integer(b)) => {
                a.total_cmp(&(*b as f64)).then(Ordering::Greater)
            }
            (CellValue::Text(a), CellValue::Text(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Text(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Code(c) => c.hash(state),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            // Whole floats keep a fractional part so they read back as floats.
            CellValue::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 => {
                write!(f, "{v:.1}")
            }
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Code(c) => write!(f, "{c}"),
        }
    }
}

impl CellValue {
    /// The missing-value sentinel.
    pub fn empty() -> Self {
        CellValue::Text(String::new())
    }

    pub fn is_na_token(s: &str) -> bool {
        NA_TOKENS.contains(&s)
    }

    /// Type a single raw string: missing tokens become the sentinel, then
    /// integer, then finite float, then text. Non-finite floats stay text.
    pub fn parse(s: &str) -> Self {
        if Self::is_na_token(s) {
            return CellValue::empty();
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        match s.parse::<f64>() {
            Ok(f) if f.is_finite() => CellValue::Float(f),
            _ => CellValue::Text(s.to_string()),
        }
    }

    /// Numeric view of the cell. Codes are not magnitudes and yield `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_code(&self) -> Option<u32> {
        match self {
            CellValue::Code(c) => Some(*c),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded record table
// ---------------------------------------------------------------------------

/// Ordered rows sharing one column list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table, checking every row against the column count.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self> {
        let mut table = Table::new(columns);
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(DashboardError::RowWidth {
                row: self.rows.len(),
                got: row.len(),
                expected: self.columns.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| DashboardError::ColumnNotFound {
                column: name.to_string(),
            })
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Iterate the cells of one column in row order.
    pub fn column_values(&self, name: &str) -> Result<impl Iterator<Item = &CellValue> + '_> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(move |row| &row[idx]))
    }

    /// A copy holding the rows at `indices`, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }

    /// A copy of the first `n` rows.
    pub fn head(&self, n: usize) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Apply `f` to every cell of one column.
    pub(crate) fn map_column<F>(&mut self, name: &str, mut f: F) -> Result<()>
    where
        F: FnMut(&CellValue) -> Result<CellValue>,
    {
        let idx = self.column_index(name)?;
        for row in &mut self.rows {
            row[idx] = f(&row[idx])?;
        }
        Ok(())
    }

    /// Whether every non-missing cell of the column is a number and at
    /// least one is present.
    pub fn is_numeric_column(&self, name: &str) -> bool {
        let Ok(values) = self.column_values(name) else {
            return false;
        };
        let mut seen = false;
        for v in values {
            if v.is_empty() {
                continue;
            }
            if v.as_f64().is_none() {
                return false;
            }
            seen = true;
        }
        seen
    }
}
