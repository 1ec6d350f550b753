use std::path::Path;

use crate::chart::{self, ChartData, ChartRequest};
use crate::config::DashboardConfig;
use crate::data::aggregate::{self, GroupedMean};
use crate::data::encoder::EncoderBank;
use crate::data::export::export_csv;
use crate::data::filter::{self, Selection};
use crate::data::loader::load_file_with_text;
use crate::data::model::{CellValue, Table};
use crate::error::Result;
use crate::insights::Insights;
use crate::ml::features::{CATEGORICAL_COLUMNS, DEFAULT_REMOTE_RATIOS, PredictionRequest};
use crate::ml::{Prediction, SalaryModel};

// ---------------------------------------------------------------------------
// Dashboard – the core every page reads from
// ---------------------------------------------------------------------------

/// Owns the encoded table, the encoder bank, the trained model and the
/// precomputed insights for one dataset. Built in one go and never mutated,
/// so every page sees a consistent snapshot.
#[derive(Debug, Clone)]
pub struct Dashboard {
    table: Table,
    bank: EncoderBank,
    model: SalaryModel,
    insights: Insights,
}

/// A capped page of rows plus the uncapped match count.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    /// Decoded, display-ready rows.
    pub table: Table,
    pub total_matches: usize,
}

impl Dashboard {
    /// Load `config.data_path` and build everything from it.
    pub fn load(config: &DashboardConfig) -> Result<Self> {
        Self::load_path(&config.data_path, config)
    }

    pub fn load_path(path: &Path, config: &DashboardConfig) -> Result<Self> {
        let raw = load_file_with_text(path, &CATEGORICAL_COLUMNS)?;
        log::info!(
            "Loaded {} rows with columns {:?} from {}",
            raw.len(),
            raw.columns(),
            path.display()
        );
        Self::from_table(raw, config)
    }

    /// Encode `raw`, train the model and precompute insights.
    pub fn from_table(raw: Table, config: &DashboardConfig) -> Result<Self> {
        let (bank, table) = EncoderBank::fit(raw, &CATEGORICAL_COLUMNS)?;
        let model = SalaryModel::fit(&table, &config.model)?;
        let insights = Insights::compute(&table, &bank, config.insight_top_n)?;
        Ok(Dashboard {
            table,
            bank,
            model,
            insights,
        })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn bank(&self) -> &EncoderBank {
        &self.bank
    }

    pub fn model(&self) -> &SalaryModel {
        &self.model
    }

    pub fn insights(&self) -> &Insights {
        &self.insights
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Rows matching `spec`, still encoded. Never truncated.
    pub fn filter(&self, spec: &[(String, Selection)]) -> Result<Table> {
        let constraints = filter::resolve(spec, &self.bank)?;
        filter::filter(&self.table, &constraints)
    }

    /// Display page for the table view: at most `cap` decoded rows.
    pub fn view(&self, spec: &[(String, Selection)], cap: usize) -> Result<TableView> {
        let constraints = filter::resolve(spec, &self.bank)?;
        let page = filter::filter_limited(&self.table, &constraints, Some(cap))?;
        log::debug!("Filter {spec:?} -> {} shown", page.len());
        Ok(TableView {
            table: self.bank.decode_table(&page)?,
            total_matches: filter::count_matching(&self.table, &constraints)?,
        })
    }

    /// Write every row matching `spec`, decoded, to a CSV file.
    pub fn export(&self, spec: &[(String, Selection)], path: &Path) -> Result<usize> {
        let rows = self.filter(spec)?;
        export_csv(&rows, &self.bank, path)?;
        Ok(rows.len())
    }

    pub fn predict(&self, request: &PredictionRequest) -> Result<Prediction> {
        let features = request.to_feature_vector(&self.bank)?;
        self.model.predict(&features)
    }

    pub fn chart(&self, request: &ChartRequest) -> Result<ChartData> {
        chart::build(request, &self.table, &self.bank)
    }

    pub fn grouped_mean(&self, group_col: &str, value_col: &str) -> Result<GroupedMean> {
        aggregate::grouped_mean(&self.table, &self.bank, group_col, value_col)
    }

    pub fn top_n_by_mean(
        &self,
        group_col: &str,
        value_col: &str,
        n: usize,
    ) -> Result<Vec<(String, f64)>> {
        aggregate::top_n_by_mean(&self.table, &self.bank, group_col, value_col, n)
    }

    pub fn distinct_count(&self, col: &str) -> Result<usize> {
        aggregate::distinct_count(&self.table, col)
    }

    /// Drop-down choices for a filter column: the vocabulary of categorical
    /// columns, the sorted distinct values otherwise.
    pub fn choices(&self, column: &str) -> Result<Vec<String>> {
        if self.bank.is_categorical(column) {
            return Ok(self.bank.classes(column)?.to_vec());
        }
        let mut distinct: Vec<&CellValue> = self.table.column_values(column)?.collect();
        distinct.sort();
        distinct.dedup();
        Ok(distinct.into_iter().map(|c| c.to_string()).collect())
    }

    /// Remote ratios present in the data, falling back to 0/50/100.
    pub fn remote_ratio_choices(&self) -> Vec<i64> {
        let mut ratios: Vec<i64> = self
            .table
            .column_values("remote_ratio")
            .map(|values| values.filter_map(|c| c.as_f64()).map(|v| v as i64).collect())
            .unwrap_or_default();
        ratios.sort_unstable();
        ratios.dedup();
        if ratios.is_empty() {
            DEFAULT_REMOTE_RATIOS.to_vec()
        } else {
            ratios
        }
    }

    /// A request pre-filled with the first choice of every field.
    pub fn default_request(&self) -> PredictionRequest {
        let mut request = PredictionRequest::default();
        for col in CATEGORICAL_COLUMNS {
            let first = self
                .bank
                .classes(col)
                .ok()
                .and_then(|c| c.first().cloned())
                .unwrap_or_default();
            request.set_categorical(col, first);
        }
        request.remote_ratio = self.remote_ratio_choices()[0];
        request
    }
}
