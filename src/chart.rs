//! Chart requests and the plot-ready data behind them.
//!
//! The UI never branches on chart-type strings: it picks a [`ChartKind`],
//! the request is validated against the kind's column arity, and only then
//! is the matching builder run.

use std::fmt;

use crate::data::aggregate::{self, GroupedMean};
use crate::data::encoder::EncoderBank;
use crate::data::model::Table;
use crate::error::{DashboardError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChartKind {
    #[default]
    Histogram,
    Boxplot,
    Line,
    Bar,
    Pie,
}

/// How many columns a chart kind takes, and which of them must be numeric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// One numeric column.
    OneNumeric,
    /// A grouping column followed by a numeric value column.
    GroupAndValue,
    /// One or more columns of any type.
    AtLeastOne,
}

impl ChartKind {
    pub const ALL: [ChartKind; 5] = [
        ChartKind::Histogram,
        ChartKind::Boxplot,
        ChartKind::Line,
        ChartKind::Bar,
        ChartKind::Pie,
    ];

    pub fn arity(self) -> Arity {
        match self {
            ChartKind::Histogram => Arity::OneNumeric,
            ChartKind::Boxplot | ChartKind::Line | ChartKind::Bar => Arity::GroupAndValue,
            ChartKind::Pie => Arity::AtLeastOne,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Histogram => "Histogram",
            ChartKind::Boxplot => "Boxplot",
            ChartKind::Line => "Line",
            ChartKind::Bar => "Bar",
            ChartKind::Pie => "Pie",
        }
    }

    fn expected(self) -> &'static str {
        match self.arity() {
            Arity::OneNumeric => "exactly 1 numeric column",
            Arity::GroupAndValue => "exactly 2 columns (group, value)",
            Arity::AtLeastOne => "at least 1 column",
        }
    }

    /// Whether `column` may be offered as a choice for this kind.
    pub fn offers_column(self, table: &Table, bank: &EncoderBank, column: &str) -> bool {
        match self.arity() {
            Arity::OneNumeric => !bank.is_categorical(column) && table.is_numeric_column(column),
            Arity::GroupAndValue | Arity::AtLeastOne => table.has_column(column),
        }
    }

    /// Columns pre-selected when switching to this kind.
    pub fn default_columns(self) -> &'static [&'static str] {
        match self {
            ChartKind::Histogram => &["salary_in_usd"],
            ChartKind::Boxplot | ChartKind::Line | ChartKind::Bar => {
                &["job_title", "salary_in_usd"]
            }
            ChartKind::Pie => &["job_title"],
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A chart kind with its selected columns, in selection order.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRequest {
    pub kind: ChartKind,
    pub columns: Vec<String>,
}

impl ChartRequest {
    pub fn new(kind: ChartKind, columns: Vec<String>) -> Self {
        ChartRequest { kind, columns }
    }

    /// Check the selection against the kind's arity before any data is built.
    pub fn validate(&self, table: &Table, bank: &EncoderBank) -> Result<()> {
        if self.columns.is_empty() {
            return Err(DashboardError::EmptySelection {
                what: format!("select at least one column for the {} chart", self.kind),
            });
        }
        if table.is_empty() {
            return Err(DashboardError::EmptySelection {
                what: "no rows to chart".to_string(),
            });
        }
        for col in &self.columns {
            table.column_index(col)?;
        }

        let arity_ok = match self.kind.arity() {
            Arity::OneNumeric => self.columns.len() == 1,
            Arity::GroupAndValue => self.columns.len() == 2,
            Arity::AtLeastOne => true,
        };
        if !arity_ok {
            return Err(DashboardError::ChartSelection {
                kind: self.kind,
                expected: self.kind.expected(),
                got: self.columns.len(),
            });
        }

        let numeric = match self.kind.arity() {
            Arity::OneNumeric => Some(&self.columns[0]),
            Arity::GroupAndValue => Some(&self.columns[1]),
            Arity::AtLeastOne => None,
        };
        if let Some(col) = numeric {
            if bank.is_categorical(col) || !table.is_numeric_column(col) {
                return Err(DashboardError::NotNumeric { column: col.clone() });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Chart data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Five-number summary of one group.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub label: String,
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieSeries {
    pub column: String,
    /// (label, count), most frequent first.
    pub slices: Vec<(String, usize)>,
}

impl PieSeries {
    pub fn total(&self) -> usize {
        self.slices.iter().map(|(_, c)| c).sum()
    }
}

/// Plot-ready data for one validated request.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    Histogram {
        column: String,
        bins: Vec<HistogramBin>,
    },
    Boxplot {
        group_column: String,
        value_column: String,
        boxes: Vec<BoxSummary>,
    },
    /// Grouped means ordered by group key.
    Line(GroupedMean),
    /// Grouped means ordered by mean, highest first.
    Bar(GroupedMean),
    Pie(Vec<PieSeries>),
}

impl ChartData {
    pub fn title(&self) -> String {
        match self {
            ChartData::Histogram { column, .. } => format!("Histogram of {column}"),
            ChartData::Boxplot {
                group_column,
                value_column,
                ..
            } => format!("Boxplot: {value_column} by {group_column}"),
            ChartData::Line(g) => format!("{} over {}", g.value_column, g.group_column),
            ChartData::Bar(g) => {
                format!("Bar Chart: Avg. {} by {}", g.value_column, g.group_column)
            }
            ChartData::Pie(series) => {
                let cols: Vec<&str> = series.iter().map(|s| s.column.as_str()).collect();
                format!("Pie of {}", cols.join(", "))
            }
        }
    }
}

/// Validate `request` and build its data from `table`.
pub fn build(request: &ChartRequest, table: &Table, bank: &EncoderBank) -> Result<ChartData> {
    request.validate(table, bank)?;
    let cols = &request.columns;
    log::debug!("Building {} chart for {:?}", request.kind, cols);

    let data = match request.kind {
        ChartKind::Histogram => {
            let values = aggregate::numeric_values(table, bank, &cols[0])?;
            ChartData::Histogram {
                column: cols[0].clone(),
                bins: histogram(&values),
            }
        }
        ChartKind::Boxplot => ChartData::Boxplot {
            group_column: cols[0].clone(),
            value_column: cols[1].clone(),
            boxes: boxplot(table, bank, &cols[0], &cols[1])?,
        },
        ChartKind::Line => {
            let mut grouped = aggregate::grouped_mean(table, bank, &cols[0], &cols[1])?;
            grouped.groups = grouped.by_key().into_iter().cloned().collect();
            ChartData::Line(grouped)
        }
        ChartKind::Bar => {
            let mut grouped = aggregate::grouped_mean(table, bank, &cols[0], &cols[1])?;
            grouped.groups = grouped.descending().into_iter().cloned().collect();
            ChartData::Bar(grouped)
        }
        ChartKind::Pie => ChartData::Pie(
            cols.iter()
                .map(|col| {
                    Ok(PieSeries {
                        column: col.clone(),
                        slices: aggregate::value_counts(table, bank, col)?,
                    })
                })
                .collect::<Result<_>>()?,
        ),
    };
    Ok(data)
}

/// Equal-width bins, Sturges' rule for the bin count.
fn histogram(values: &[f64]) -> Vec<HistogramBin> {
    if values.is_empty() {
        return Vec::new();
    }
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let n_bins = ((values.len() as f64).log2().ceil() as usize + 1).max(1);
    let range = max - min;
    if range.abs() < f64::EPSILON {
        return vec![HistogramBin {
            start: min,
            end: max,
            count: values.len(),
        }];
    }
    let width = range / n_bins as f64;
    let mut bins: Vec<HistogramBin> = (0..n_bins)
        .map(|i| HistogramBin {
            start: min + width * i as f64,
            end: min + width * (i + 1) as f64,
            count: 0,
        })
        .collect();
    for &v in values {
        let idx = (((v - min) / width) as usize).min(n_bins - 1);
        bins[idx].count += 1;
    }
    bins
}

/// Linear-interpolated quantile of an ascending, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Quartiles per group, whiskers at the furthest points within 1.5 IQR.
/// Groups are ordered by key.
fn boxplot(
    table: &Table,
    bank: &EncoderBank,
    group_col: &str,
    value_col: &str,
) -> Result<Vec<BoxSummary>> {
    let grouped = aggregate::grouped_mean(table, bank, group_col, value_col)?;
    let g_idx = table.column_index(group_col)?;
    let v_idx = table.column_index(value_col)?;

    let mut boxes = Vec::with_capacity(grouped.len());
    for group in grouped.by_key() {
        let mut values: Vec<f64> = table
            .rows()
            .iter()
            .filter(|row| row[g_idx] == group.key)
            .filter_map(|row| row[v_idx].as_f64())
            .collect();
        values.sort_by(f64::total_cmp);

        let q1 = quantile(&values, 0.25);
        let median = quantile(&values, 0.5);
        let q3 = quantile(&values, 0.75);
        let iqr = q3 - q1;
        let lower_fence = q1 - 1.5 * iqr;
        let upper_fence = q3 + 1.5 * iqr;
        let lower_whisker = values
            .iter()
            .cloned()
            .find(|&v| v >= lower_fence)
            .unwrap_or(q1);
        let upper_whisker = values
            .iter()
            .rev()
            .cloned()
            .find(|&v| v <= upper_fence)
            .unwrap_or(q3);

        boxes.push(BoxSummary {
            label: group.label.clone(),
            lower_whisker,
            q1,
            median,
            q3,
            upper_whisker,
        });
    }
    Ok(boxes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn encoded() -> (EncoderBank, Table) {
        let rows = [("B", 10), ("A", 100), ("A", 200), ("B", 30), ("C", 5)];
        let raw = Table::from_rows(
            vec!["job_title".into(), "salary_in_usd".into()],
            rows.iter()
                .map(|(j, s)| vec![CellValue::Text(j.to_string()), CellValue::Integer(*s)])
                .collect(),
        )
        .unwrap();
        EncoderBank::fit(raw, &["job_title"]).unwrap()
    }

    fn request(kind: ChartKind, cols: &[&str]) -> ChartRequest {
        ChartRequest::new(kind, cols.iter().map(|c| c.to_string()).collect())
    }

    #[test]
    fn empty_selection_is_rejected() {
        let (bank, table) = encoded();
        let err = build(&request(ChartKind::Bar, &[]), &table, &bank).unwrap_err();
        assert!(matches!(err, DashboardError::EmptySelection { .. }));
    }

    #[test]
    fn arity_is_checked_per_kind() {
        let (bank, table) = encoded();
        let err = build(&request(ChartKind::Line, &["job_title"]), &table, &bank).unwrap_err();
        assert!(matches!(
            err,
            DashboardError::ChartSelection {
                kind: ChartKind::Line,
                got: 1,
                ..
            }
        ));
        let err = build(
            &request(ChartKind::Histogram, &["salary_in_usd", "job_title"]),
            &table,
            &bank,
        )
        .unwrap_err();
        assert!(matches!(err, DashboardError::ChartSelection { .. }));
    }

    #[test]
    fn histogram_needs_numeric_column() {
        let (bank, table) = encoded();
        let err = build(&request(ChartKind::Histogram, &["job_title"]), &table, &bank).unwrap_err();
        assert!(matches!(err, DashboardError::NotNumeric { .. }));
        assert!(!ChartKind::Histogram.offers_column(&table, &bank, "job_title"));
        assert!(ChartKind::Histogram.offers_column(&table, &bank, "salary_in_usd"));
    }

    #[test]
    fn bar_uses_grouped_mean_descending() {
        let (bank, table) = encoded();
        let data = build(
            &request(ChartKind::Bar, &["job_title", "salary_in_usd"]),
            &table,
            &bank,
        )
        .unwrap();
        let ChartData::Bar(grouped) = data else {
            panic!("expected bar data");
        };
        let bars: Vec<_> = grouped.groups.iter().map(|g| (g.label.as_str(), g.mean)).collect();
        assert_eq!(bars, [("A", 150.0), ("B", 20.0), ("C", 5.0)]);
    }

    #[test]
    fn line_orders_by_group_key() {
        let (bank, table) = encoded();
        let data = build(
            &request(ChartKind::Line, &["job_title", "salary_in_usd"]),
            &table,
            &bank,
        )
        .unwrap();
        let ChartData::Line(grouped) = data else {
            panic!("expected line data");
        };
        let labels: Vec<_> = grouped.groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, ["A", "B", "C"]);
    }

    #[test]
    fn histogram_bins_cover_all_values() {
        let values: Vec<f64> = (0..100).map(f64::from).collect();
        let bins = histogram(&values);
        assert_eq!(bins.len(), 8);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 100);
        assert_eq!(bins[0].start, 0.0);
        assert!((bins[7].end - 99.0).abs() < 1e-9);
    }

    #[test]
    fn boxplot_quartiles() {
        let (bank, table) = encoded();
        let data = build(
            &request(ChartKind::Boxplot, &["job_title", "salary_in_usd"]),
            &table,
            &bank,
        )
        .unwrap();
        let ChartData::Boxplot { boxes, .. } = data else {
            panic!("expected boxplot data");
        };
        assert_eq!(boxes.len(), 3);
        assert_eq!(boxes[0].label, "A");
        assert_eq!(boxes[0].median, 150.0);
        assert_eq!(boxes[0].lower_whisker, 100.0);
        assert_eq!(boxes[0].upper_whisker, 200.0);
    }

    #[test]
    fn pie_has_one_series_per_column() {
        let (bank, table) = encoded();
        let data = build(
            &request(ChartKind::Pie, &["job_title", "salary_in_usd"]),
            &table,
            &bank,
        )
        .unwrap();
        let ChartData::Pie(series) = data else {
            panic!("expected pie data");
        };
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].slices[0], ("B".to_string(), 2));
        assert_eq!(series[0].total(), 5);
    }
}
