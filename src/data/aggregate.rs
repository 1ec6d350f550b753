//! Grouped statistics over the encoded table.
//!
//! `grouped_mean` is the one primitive behind bar/line charts and the
//! insight cards; `top_n_by_mean` is a view over its result.

use std::collections::{HashMap, HashSet};

use super::encoder::EncoderBank;
use super::model::{CellValue, Table};
use crate::error::{DashboardError, Result};

/// Mean of one group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMean {
    /// Raw group key as stored in the table (a code for categorical columns).
    pub key: CellValue,
    /// Decoded, human-readable label.
    pub label: String,
    pub mean: f64,
    /// Rows that contributed a numeric value.
    pub count: usize,
}

/// Result of [`grouped_mean`]: groups in first-encountered order.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedMean {
    pub group_column: String,
    pub value_column: String,
    pub groups: Vec<GroupMean>,
}

impl GroupedMean {
    pub fn get(&self, label: &str) -> Option<f64> {
        self.groups.iter().find(|g| g.label == label).map(|g| g.mean)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups ordered by mean, highest first. The sort is stable, so ties
    /// keep first-encountered order.
    pub fn descending(&self) -> Vec<&GroupMean> {
        let mut sorted: Vec<&GroupMean> = self.groups.iter().collect();
        sorted.sort_by(|a, b| b.mean.total_cmp(&a.mean));
        sorted
    }

    /// Groups ordered by their key (code order equals sorted label order).
    pub fn by_key(&self) -> Vec<&GroupMean> {
        let mut sorted: Vec<&GroupMean> = self.groups.iter().collect();
        sorted.sort_by(|a, b| a.key.cmp(&b.key));
        sorted
    }
}

/// Numeric value of a cell in a value column. Missing cells are skipped,
/// anything else non-numeric is an error.
fn numeric_cell(column: &str, cell: &CellValue) -> Result<Option<f64>> {
    if let Some(v) = cell.as_f64() {
        return Ok(Some(v));
    }
    if cell.is_empty() {
        return Ok(None);
    }
    Err(DashboardError::NotNumeric {
        column: column.to_string(),
    })
}

fn ensure_value_column(bank: &EncoderBank, column: &str) -> Result<()> {
    if bank.is_categorical(column) {
        return Err(DashboardError::NotNumeric {
            column: column.to_string(),
        });
    }
    Ok(())
}

/// Mean of `value_col` per distinct value of `group_col`.
pub fn grouped_mean(
    table: &Table,
    bank: &EncoderBank,
    group_col: &str,
    value_col: &str,
) -> Result<GroupedMean> {
    ensure_value_column(bank, value_col)?;
    let g_idx = table.column_index(group_col)?;
    let v_idx = table.column_index(value_col)?;

    // (key, sum, count) in first-encountered order
    let mut order: Vec<(CellValue, f64, usize)> = Vec::new();
    let mut position: HashMap<&CellValue, usize> = HashMap::new();

    for row in table.rows() {
        let Some(value) = numeric_cell(value_col, &row[v_idx])? else {
            continue;
        };
        let key = &row[g_idx];
        let slot = *position.entry(key).or_insert_with(|| {
            order.push((key.clone(), 0.0, 0));
            order.len() - 1
        });
        order[slot].1 += value;
        order[slot].2 += 1;
    }

    let groups = order
        .into_iter()
        .map(|(key, sum, count)| {
            Ok(GroupMean {
                label: bank.display(group_col, &key)?,
                key,
                mean: sum / count as f64,
                count,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(GroupedMean {
        group_column: group_col.to_string(),
        value_column: value_col.to_string(),
        groups,
    })
}

/// The `n` groups with the highest mean, highest first, labels decoded.
pub fn top_n_by_mean(
    table: &Table,
    bank: &EncoderBank,
    group_col: &str,
    value_col: &str,
    n: usize,
) -> Result<Vec<(String, f64)>> {
    let grouped = grouped_mean(table, bank, group_col, value_col)?;
    Ok(grouped
        .descending()
        .into_iter()
        .take(n)
        .map(|g| (g.label.clone(), g.mean))
        .collect())
}

/// Number of distinct cells in a column.
pub fn distinct_count(table: &Table, col: &str) -> Result<usize> {
    Ok(table.column_values(col)?.collect::<HashSet<_>>().len())
}

/// Occurrences per distinct value, most frequent first; ties keep
/// first-encountered order.
pub fn value_counts(table: &Table, bank: &EncoderBank, col: &str) -> Result<Vec<(String, usize)>> {
    let mut order: Vec<(&CellValue, usize)> = Vec::new();
    let mut position: HashMap<&CellValue, usize> = HashMap::new();
    for cell in table.column_values(col)? {
        let slot = *position.entry(cell).or_insert_with(|| {
            order.push((cell, 0));
            order.len() - 1
        });
        order[slot].1 += 1;
    }
    order.sort_by(|a, b| b.1.cmp(&a.1));
    order
        .into_iter()
        .map(|(cell, count)| Ok((bank.display(col, cell)?, count)))
        .collect()
}

/// All numeric values of a column, missing cells skipped.
pub fn numeric_values(table: &Table, bank: &EncoderBank, col: &str) -> Result<Vec<f64>> {
    ensure_value_column(bank, col)?;
    let mut out = Vec::with_capacity(table.len());
    for cell in table.column_values(col)? {
        if let Some(v) = numeric_cell(col, cell)? {
            out.push(v);
        }
    }
    Ok(out)
}

/// Mean of a numeric column, `None` when it has no values.
pub fn mean(table: &Table, bank: &EncoderBank, col: &str) -> Result<Option<f64>> {
    let values = numeric_values(table, bank, col)?;
    if values.is_empty() {
        return Ok(None);
    }
    Ok(Some(values.iter().sum::<f64>() / values.len() as f64))
}
