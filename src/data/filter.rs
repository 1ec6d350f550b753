use super::encoder::EncoderBank;
use super::model::{CellValue, Table};
use crate::error::Result;

// ---------------------------------------------------------------------------
// Filter spec: what the user picked per column
// ---------------------------------------------------------------------------

/// One drop-down selection. `All` places no constraint on the column.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Value(String),
}

/// Ordered (column, selection) pairs as chosen in the UI.
pub type FilterSpec = Vec<(String, Selection)>;

/// A resolved equality constraint against the encoded table.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub column: String,
    pub value: CellValue,
}

/// Resolve user selections into constraints on the encoded table.
///
/// Categorical columns go through the encoder bank, so an unseen value is an
/// `UnknownValue` error rather than an empty result. Other columns are typed
/// the same way the loader types cells.
pub fn resolve(spec: &[(String, Selection)], bank: &EncoderBank) -> Result<Vec<Constraint>> {
    let mut constraints = Vec::new();
    for (column, selection) in spec {
        let Selection::Value(raw) = selection else {
            continue;
        };
        let value = if bank.is_categorical(column) {
            CellValue::Code(bank.encode(column, raw)?)
        } else {
            CellValue::parse(raw)
        };
        constraints.push(Constraint {
            column: column.clone(),
            value,
        });
    }
    Ok(constraints)
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Rows of `table` satisfying every constraint, in source order.
///
/// An empty constraint list yields every row. The result is an independent
/// copy: mutating it never touches `table`.
pub fn filter(table: &Table, constraints: &[Constraint]) -> Result<Table> {
    filter_limited(table, constraints, None)
}

/// Like [`filter`], but stops after `limit` matching rows when given.
/// Meant for display truncation only.
pub fn filter_limited(
    table: &Table,
    constraints: &[Constraint],
    limit: Option<usize>,
) -> Result<Table> {
    Ok(table.select_rows(&matching_indices(table, constraints, limit)?))
}

/// Count the rows satisfying every constraint.
pub fn count_matching(table: &Table, constraints: &[Constraint]) -> Result<usize> {
    Ok(matching_indices(table, constraints, None)?.len())
}

fn matching_indices(
    table: &Table,
    constraints: &[Constraint],
    limit: Option<usize>,
) -> Result<Vec<usize>> {
    let resolved: Vec<(usize, &CellValue)> = constraints
        .iter()
        .map(|c| Ok((table.column_index(&c.column)?, &c.value)))
        .collect::<Result<_>>()?;

    let limit = limit.unwrap_or(usize::MAX);
    Ok(table
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| resolved.iter().all(|(idx, value)| &row[*idx] == *value))
        .map(|(i, _)| i)
        .take(limit)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashboardError;

    fn encoded() -> (EncoderBank, Table) {
        let rows = [
            ("A", "SE", 0, 100),
            ("A", "MI", 50, 200),
            ("B", "SE", 100, 50),
            ("B", "EN", 50, 75),
            ("A", "SE", 100, 300),
        ];
        let raw = Table::from_rows(
            vec![
                "job_title".into(),
                "experience_level".into(),
                "remote_ratio".into(),
                "salary_in_usd".into(),
            ],
            rows.iter()
                .map(|(j, e, r, s)| {
                    vec![
                        CellValue::Text(j.to_string()),
                        CellValue::Text(e.to_string()),
                        CellValue::Integer(*r),
                        CellValue::Integer(*s),
                    ]
                })
                .collect(),
        )
        .unwrap();
        EncoderBank::fit(raw, &["job_title", "experience_level"]).unwrap()
    }

    fn spec(pairs: &[(&str, &str)]) -> FilterSpec {
        pairs
            .iter()
            .map(|(c, v)| {
                let sel = if *v == "All" {
                    Selection::All
                } else {
                    Selection::Value(v.to_string())
                };
                (c.to_string(), sel)
            })
            .collect()
    }

    #[test]
    fn empty_constraints_return_the_whole_table() {
        let (_, table) = encoded();
        let out = filter(&table, &[]).unwrap();
        assert_eq!(out, table);
    }

    #[test]
    fn all_selection_is_no_constraint() {
        let (bank, _) = encoded();
        let constraints = resolve(&spec(&[("job_title", "All")]), &bank).unwrap();
        assert!(constraints.is_empty());
    }

    #[test]
    fn constraints_are_anded() {
        let (bank, table) = encoded();
        let constraints =
            resolve(&spec(&[("job_title", "A"), ("experience_level", "SE")]), &bank).unwrap();
        let out = filter(&table, &constraints).unwrap();
        let salaries: Vec<_> = out.column_values("salary_in_usd").unwrap().cloned().collect();
        assert_eq!(salaries, [CellValue::Integer(100), CellValue::Integer(300)]);
    }

    #[test]
    fn numeric_columns_filter_by_parsed_value() {
        let (bank, table) = encoded();
        let constraints = resolve(&spec(&[("remote_ratio", "50")]), &bank).unwrap();
        assert_eq!(count_matching(&table, &constraints).unwrap(), 2);
    }

    #[test]
    fn every_match_appears_exactly_once() {
        let (bank, table) = encoded();
        for job in ["All", "A", "B"] {
            for exp in ["All", "SE", "MI", "EN"] {
                let constraints =
                    resolve(&spec(&[("job_title", job), ("experience_level", exp)]), &bank)
                        .unwrap();
                let out = filter(&table, &constraints).unwrap();
                for row in out.rows() {
                    for c in &constraints {
                        let idx = table.column_index(&c.column).unwrap();
                        assert_eq!(row[idx], c.value);
                    }
                }
                let expected = table
                    .rows()
                    .iter()
                    .filter(|row| {
                        constraints
                            .iter()
                            .all(|c| row[table.column_index(&c.column).unwrap()] == c.value)
                    })
                    .count();
                assert_eq!(out.len(), expected);
            }
        }
    }

    #[test]
    fn limit_truncates_but_count_does_not() {
        let (bank, table) = encoded();
        let constraints = resolve(&spec(&[("job_title", "A")]), &bank).unwrap();
        assert_eq!(filter_limited(&table, &constraints, Some(2)).unwrap().len(), 2);
        assert_eq!(count_matching(&table, &constraints).unwrap(), 3);
    }

    #[test]
    fn filtered_copy_is_independent() {
        let (_, table) = encoded();
        let mut out = filter(&table, &[]).unwrap();
        out.push_row(table.rows()[0].clone()).unwrap();
        assert_eq!(out.len(), table.len() + 1);
        assert_eq!(table.len(), 5);
    }

    #[test]
    fn unknown_value_and_column_are_errors() {
        let (bank, table) = encoded();
        assert!(matches!(
            resolve(&spec(&[("job_title", "C")]), &bank),
            Err(DashboardError::UnknownValue { .. })
        ));
        let bogus = [Constraint {
            column: "nope".into(),
            value: CellValue::Integer(1),
        }];
        assert!(matches!(
            filter(&table, &bogus),
            Err(DashboardError::ColumnNotFound { .. })
        ));
    }
}
