use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::model::{CellValue, Table};
use crate::error::{DashboardError, Result};

// ---------------------------------------------------------------------------
// Per-column encoder
// ---------------------------------------------------------------------------

/// Bijection between the sorted distinct strings of one column and `0..k`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnEncoder {
    classes: Vec<String>,
    codes: HashMap<String, u32>,
}

impl ColumnEncoder {
    /// Build the encoder from the distinct string forms of `values`.
    fn fit<'a>(values: impl Iterator<Item = &'a CellValue>) -> Self {
        let distinct: BTreeSet<String> = values.map(|v| v.to_string()).collect();
        let classes: Vec<String> = distinct.into_iter().collect();
        let codes = classes
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i as u32))
            .collect();
        ColumnEncoder { classes, codes }
    }

    /// Sorted vocabulary; index `i` is the string for code `i`.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    fn code_of(&self, value: &str) -> Option<u32> {
        self.codes.get(value).copied()
    }

    fn class_of(&self, code: u32) -> Option<&str> {
        self.classes.get(code as usize).map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Encoder bank
// ---------------------------------------------------------------------------

/// Registry of per-column encoders. The single source of truth for
/// translating between raw strings and codes once a table is encoded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncoderBank {
    encoders: BTreeMap<String, ColumnEncoder>,
}

impl EncoderBank {
    /// Encode `columns` of `raw`, consuming it. Returns the registry and the
    /// encoded table, whose categorical columns hold only `CellValue::Code`.
    ///
    /// Codes follow the sorted order of each column's distinct string values,
    /// so the same input always yields the same assignment.
    pub fn fit(raw: Table, columns: &[&str]) -> Result<(EncoderBank, Table)> {
        let mut table = raw;
        let mut encoders = BTreeMap::new();

        for &col in columns {
            let encoder = ColumnEncoder::fit(table.column_values(col)?);
            table.map_column(col, |cell| {
                let code = encoder.code_of(&cell.to_string()).ok_or_else(|| {
                    DashboardError::UnknownValue {
                        column: col.to_string(),
                        value: cell.to_string(),
                    }
                })?;
                Ok(CellValue::Code(code))
            })?;
            log::debug!("Encoded column '{col}' with {} classes", encoder.len());
            encoders.insert(col.to_string(), encoder);
        }

        Ok((EncoderBank { encoders }, table))
    }

    pub fn is_categorical(&self, column: &str) -> bool {
        self.encoders.contains_key(column)
    }

    /// Names of the encoded columns, sorted.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.encoders.keys().map(String::as_str)
    }

    fn encoder(&self, column: &str) -> Result<&ColumnEncoder> {
        self.encoders
            .get(column)
            .ok_or_else(|| DashboardError::NotCategorical {
                column: column.to_string(),
            })
    }

    /// Sorted vocabulary of a categorical column.
    pub fn classes(&self, column: &str) -> Result<&[String]> {
        Ok(self.encoder(column)?.classes())
    }

    /// Code for a raw value. Unseen values are an error, never a default code.
    pub fn encode(&self, column: &str, value: &str) -> Result<u32> {
        self.encoder(column)?
            .code_of(value)
            .ok_or_else(|| DashboardError::UnknownValue {
                column: column.to_string(),
                value: value.to_string(),
            })
    }

    pub fn decode(&self, column: &str, code: u32) -> Result<&str> {
        let encoder = self.encoder(column)?;
        encoder
            .class_of(code)
            .ok_or_else(|| DashboardError::UnknownCode {
                column: column.to_string(),
                code,
                size: encoder.len(),
            })
    }

    /// Human-readable form of a cell: decoded for codes in categorical
    /// columns, the plain display form otherwise.
    pub fn display(&self, column: &str, cell: &CellValue) -> Result<String> {
        match (cell, self.encoders.contains_key(column)) {
            (CellValue::Code(code), true) => Ok(self.decode(column, *code)?.to_string()),
            _ => Ok(cell.to_string()),
        }
    }

    /// A copy of `table` with every categorical code replaced by its string.
    pub fn decode_table(&self, table: &Table) -> Result<Table> {
        let mut decoded = table.clone();
        for col in self.encoders.keys() {
            if !decoded.has_column(col) {
                continue;
            }
            decoded.map_column(col, |cell| Ok(CellValue::Text(self.display(col, cell)?)))?;
        }
        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_table() -> Table {
        let rows = [("B", "SE", 100), ("A", "MI", 200), ("B", "EN", 50), ("C", "SE", 75)];
        Table::from_rows(
            vec!["job_title".into(), "experience_level".into(), "salary".into()],
            rows.iter()
                .map(|(j, e, s)| {
                    vec![
                        CellValue::Text(j.to_string()),
                        CellValue::Text(e.to_string()),
                        CellValue::Integer(*s),
                    ]
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn codes_follow_sorted_order() {
        let (bank, table) = EncoderBank::fit(raw_table(), &["job_title"]).unwrap();
        assert_eq!(bank.classes("job_title").unwrap(), ["A", "B", "C"]);
        let codes: Vec<_> = table.column_values("job_title").unwrap().cloned().collect();
        assert_eq!(
            codes,
            [
                CellValue::Code(1),
                CellValue::Code(0),
                CellValue::Code(1),
                CellValue::Code(2)
            ]
        );
    }

    #[test]
    fn encoded_table_holds_no_raw_strings() {
        let (_, table) =
            EncoderBank::fit(raw_table(), &["job_title", "experience_level"]).unwrap();
        for col in ["job_title", "experience_level"] {
            assert!(table.column_values(col).unwrap().all(|c| c.as_code().is_some()));
        }
        // untouched column
        assert!(table.column_values("salary").unwrap().all(|c| c.as_f64().is_some()));
    }

    #[test]
    fn round_trip_every_class() {
        let (bank, _) = EncoderBank::fit(raw_table(), &["job_title", "experience_level"]).unwrap();
        for col in ["job_title", "experience_level"] {
            for value in bank.classes(col).unwrap() {
                let code = bank.encode(col, value).unwrap();
                assert_eq!(bank.decode(col, code).unwrap(), value);
            }
        }
    }

    #[test]
    fn fitting_is_deterministic() {
        let (a, ta) = EncoderBank::fit(raw_table(), &["job_title", "experience_level"]).unwrap();
        let (b, tb) = EncoderBank::fit(raw_table(), &["job_title", "experience_level"]).unwrap();
        assert_eq!(a, b);
        assert_eq!(ta, tb);
    }

    #[test]
    fn unseen_value_is_rejected() {
        let (bank, _) = EncoderBank::fit(raw_table(), &["job_title"]).unwrap();
        let err = bank.encode("job_title", "Z").unwrap_err();
        assert!(matches!(err, DashboardError::UnknownValue { .. }));
    }

    #[test]
    fn out_of_range_code_is_rejected() {
        let (bank, _) = EncoderBank::fit(raw_table(), &["job_title"]).unwrap();
        let err = bank.decode("job_title", 3).unwrap_err();
        assert!(matches!(
            err,
            DashboardError::UnknownCode { code: 3, size: 3, .. }
        ));
    }

    #[test]
    fn non_categorical_lookups_fail() {
        let (bank, _) = EncoderBank::fit(raw_table(), &["job_title"]).unwrap();
        assert!(matches!(
            bank.encode("salary", "100"),
            Err(DashboardError::NotCategorical { .. })
        ));
        assert!(matches!(
            EncoderBank::fit(raw_table(), &["nope"]),
            Err(DashboardError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn numeric_cells_encode_by_display_string() {
        let (bank, _) = EncoderBank::fit(raw_table(), &["salary"]).unwrap();
        assert_eq!(bank.classes("salary").unwrap(), ["100", "200", "50", "75"]);
    }

    #[test]
    fn numeric_looking_text_keeps_its_spelling() {
        let raw = Table::from_rows(
            vec!["job_title".into()],
            ["007", "Data Scientist", "1.50"]
                .iter()
                .map(|j| vec![CellValue::Text(j.to_string())])
                .collect(),
        )
        .unwrap();
        let (bank, _) = EncoderBank::fit(raw, &["job_title"]).unwrap();
        assert_eq!(bank.classes("job_title").unwrap(), ["007", "1.50", "Data Scientist"]);
        let code = bank.encode("job_title", "007").unwrap();
        assert_eq!(bank.decode("job_title", code).unwrap(), "007");
        assert!(bank.encode("job_title", "7").is_err());
    }

    #[test]
    fn decode_table_restores_strings() {
        let raw = raw_table();
        let (bank, encoded) = EncoderBank::fit(raw.clone(), &["job_title", "experience_level"]).unwrap();
        let decoded = bank.decode_table(&encoded).unwrap();
        assert_eq!(decoded, raw);
    }
}
