use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};
use crate::ml::forest::ForestParams;

/// Runtime settings. Every field has a default, so a config file only needs
/// the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Dataset loaded at startup.
    pub data_path: PathBuf,
    pub model: ForestParams,
    /// Rows shown in the table view. Export is never truncated.
    pub display_row_cap: usize,
    /// Entries per "top N" insight card.
    pub insight_top_n: usize,
    /// Columns offered as drop-down filters on the table view.
    pub filter_columns: Vec<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("salaries.csv"),
            model: ForestParams::default(),
            display_row_cap: 500,
            insight_top_n: 5,
            filter_columns: vec!["job_title".to_string(), "experience_level".to_string()],
        }
    }
}

impl DashboardConfig {
    /// Read a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_err = |message: String| DashboardError::Config {
            path: path.to_path_buf(),
            message,
        };
        let text = std::fs::read_to_string(path).map_err(|e| config_err(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| config_err(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"display_row_cap": 50, "model": {{"seed": 7}}}}"#).unwrap();
        let config = DashboardConfig::from_file(file.path()).unwrap();
        assert_eq!(config.display_row_cap, 50);
        assert_eq!(config.model.seed, 7);
        assert_eq!(config.model.n_estimators, 50);
        assert_eq!(config.data_path, PathBuf::from("salaries.csv"));
        assert_eq!(config.insight_top_n, 5);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            DashboardConfig::from_file(file.path()),
            Err(DashboardError::Config { .. })
        ));
    }
}
