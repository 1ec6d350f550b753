use std::path::Path;

use crate::chart::{ChartData, ChartKind, ChartRequest};
use crate::config::DashboardConfig;
use crate::dashboard::{Dashboard, TableView};
use crate::data::filter::Selection;
use crate::error::DashboardError;
use crate::ml::features::PredictionRequest;
use crate::ml::Prediction;

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    ViewData,
    Charts,
    Insights,
    Predictor,
    Exit,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::ViewData,
        Page::Charts,
        Page::Insights,
        Page::Predictor,
        Page::Exit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Page::ViewData => "View Data",
            Page::Charts => "Graphs & Trends",
            Page::Insights => "Insights",
            Page::Predictor => "Salary Predictor",
            Page::Exit => "Exit",
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Core data for the loaded dataset.
    pub dashboard: Dashboard,

    pub config: DashboardConfig,

    pub page: Page,

    /// One drop-down per configured filter column, in display order.
    pub filters: Vec<(String, Selection)>,

    /// Current capped table page (cached).
    pub view: TableView,

    pub chart_kind: ChartKind,

    /// Selected chart columns, in selection order.
    pub chart_columns: Vec<String>,

    /// Last successfully built chart.
    pub chart: Option<ChartData>,

    /// Predictor page inputs.
    pub request: PredictionRequest,

    pub prediction: Option<Prediction>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    pub quit_requested: bool,
}

impl AppState {
    pub fn new(dashboard: Dashboard, config: DashboardConfig) -> Self {
        let mut state = AppState {
            view: TableView {
                table: Default::default(),
                total_matches: 0,
            },
            filters: Vec::new(),
            request: dashboard.default_request(),
            dashboard,
            config,
            page: Page::default(),
            chart_kind: ChartKind::default(),
            chart_columns: Vec::new(),
            chart: None,
            prediction: None,
            status_message: None,
            quit_requested: false,
        };
        state.reset_selections();
        state
    }

    /// Swap in a newly built dashboard and reset every page.
    pub fn set_dataset(&mut self, dashboard: Dashboard) {
        self.request = dashboard.default_request();
        self.dashboard = dashboard;
        self.chart = None;
        self.prediction = None;
        self.status_message = None;
        self.reset_selections();
    }

    fn reset_selections(&mut self) {
        let table = self.dashboard.table();
        self.filters = self
            .config
            .filter_columns
            .iter()
            .filter(|c| table.has_column(c))
            .map(|c| (c.clone(), Selection::All))
            .collect();
        self.set_chart_kind(self.chart_kind);
        self.refilter();
    }

    /// Load another file. The current dataset stays if anything fails.
    pub fn open_path(&mut self, path: &Path) {
        match Dashboard::load_path(path, &self.config) {
            Ok(dashboard) => self.set_dataset(dashboard),
            Err(e) => {
                log::error!("Failed to load file: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    fn report(&mut self, err: DashboardError) {
        if err.is_recoverable() {
            log::warn!("{err}");
        } else {
            log::error!("{err}");
        }
        self.status_message = Some(err.to_string());
    }

    // -- table view ---------------------------------------------------------

    pub fn set_filter(&mut self, column: &str, selection: Selection) {
        if let Some((_, slot)) = self.filters.iter_mut().find(|(c, _)| c == column) {
            *slot = selection;
        }
        self.refilter();
    }

    /// Recompute the cached table page after a filter change.
    pub fn refilter(&mut self) {
        match self
            .dashboard
            .view(&self.filters, self.config.display_row_cap)
        {
            Ok(view) => {
                self.view = view;
                self.status_message = None;
            }
            Err(e) => self.report(e),
        }
    }

    /// Export every row matching the current filters.
    pub fn export_to(&mut self, path: &Path) {
        match self.dashboard.export(&self.filters, path) {
            Ok(n) => self.status_message = Some(format!("Exported {n} rows to {}", path.display())),
            Err(e) => self.report(e),
        }
    }

    // -- charts -------------------------------------------------------------

    /// Switch chart kind and pre-select its default columns where offered.
    pub fn set_chart_kind(&mut self, kind: ChartKind) {
        self.chart_kind = kind;
        let offered = self.chart_column_options();
        self.chart_columns = kind
            .default_columns()
            .iter()
            .filter(|c| offered.iter().any(|o| o == *c))
            .map(|c| c.to_string())
            .collect();
    }

    /// Columns the current chart kind can take.
    pub fn chart_column_options(&self) -> Vec<String> {
        let table = self.dashboard.table();
        let bank = self.dashboard.bank();
        table
            .columns()
            .iter()
            .filter(|c| self.chart_kind.offers_column(table, bank, c))
            .cloned()
            .collect()
    }

    pub fn toggle_chart_column(&mut self, column: &str) {
        if let Some(pos) = self.chart_columns.iter().position(|c| c == column) {
            self.chart_columns.remove(pos);
        } else {
            self.chart_columns.push(column.to_string());
        }
    }

    pub fn render_chart(&mut self) {
        let request = ChartRequest::new(self.chart_kind, self.chart_columns.clone());
        match self.dashboard.chart(&request) {
            Ok(data) => {
                self.chart = Some(data);
                self.status_message = None;
            }
            Err(e) => self.report(e),
        }
    }

    // -- predictor ----------------------------------------------------------

    pub fn predict(&mut self) {
        match self.dashboard.predict(&self.request) {
            Ok(p) => {
                self.prediction = Some(p);
                self.status_message = None;
            }
            Err(e) => {
                self.prediction = None;
                self.report(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::tests::{config, sample_table};

    fn state() -> AppState {
        let config = config();
        let dash = Dashboard::from_table(sample_table(), &config).unwrap();
        AppState::new(dash, config)
    }

    #[test]
    fn starts_unfiltered() {
        let s = state();
        assert_eq!(s.filters.len(), 2);
        assert_eq!(s.view.total_matches, 48);
        assert_eq!(s.chart_columns, ["salary_in_usd"]);
    }

    #[test]
    fn filter_change_refreshes_view() {
        let mut s = state();
        s.set_filter("job_title", Selection::Value("ML Engineer".into()));
        assert_eq!(s.view.total_matches, 12);
        s.set_filter("job_title", Selection::All);
        assert_eq!(s.view.total_matches, 48);
    }

    #[test]
    fn bad_filter_keeps_previous_view() {
        let mut s = state();
        s.set_filter("job_title", Selection::Value("Astronaut".into()));
        assert_eq!(s.view.total_matches, 48);
        assert!(s.status_message.unwrap().contains("Astronaut"));
    }

    #[test]
    fn chart_kind_switch_preselects_columns() {
        let mut s = state();
        s.set_chart_kind(ChartKind::Bar);
        assert_eq!(s.chart_columns, ["job_title", "salary_in_usd"]);
        s.render_chart();
        assert!(matches!(s.chart, Some(ChartData::Bar(_))));
        assert!(!s.chart_column_options().is_empty());
    }

    #[test]
    fn empty_chart_selection_prompts_user() {
        let mut s = state();
        s.set_chart_kind(ChartKind::Pie);
        s.toggle_chart_column("job_title");
        assert!(s.chart_columns.is_empty());
        s.render_chart();
        assert!(s.chart.is_none());
        assert!(s.status_message.unwrap().starts_with("nothing selected"));
    }

    #[test]
    fn predictor_reports_unknown_values() {
        let mut s = state();
        s.predict();
        assert!(s.prediction.is_some());
        s.request.job_title = "Astronaut".into();
        s.predict();
        assert!(s.prediction.is_none());
        assert!(s.status_message.is_some());
    }
}
