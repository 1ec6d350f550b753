//! Salary analytics dashboard: load a tabular salary dataset, encode its
//! categorical columns, browse and filter it, chart it, summarise it and
//! predict salaries with a random-forest regressor.

pub mod app;
pub mod chart;
pub mod color;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod insights;
pub mod ml;
pub mod state;
pub mod ui;

pub use config::DashboardConfig;
pub use dashboard::Dashboard;
pub use error::{DashboardError, Result};
