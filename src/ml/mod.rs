/// Salary prediction: feature schema and the random forest behind it.
///
/// Architecture:
/// ```text
///   encoded Table ──► SalaryModel::fit ──► RandomForest (frozen)
///                                              │
///   PredictionRequest ──► EncoderBank ──► FeatureVector ──► Prediction
/// ```
pub mod features;
pub mod forest;

use crate::data::model::Table;
use crate::error::{DashboardError, Result};

use features::{FEATURE_COLUMNS, FeatureVector, TARGET_COLUMN};
use forest::{ForestParams, RandomForest};

/// Point estimate plus the spread of the individual tree estimates.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Mean of the per-tree estimates.
    pub value: f64,
    /// 10th percentile of the per-tree estimates.
    pub low: f64,
    /// 90th percentile of the per-tree estimates.
    pub high: f64,
}

/// Random forest trained once on the encoded table. Never refit.
#[derive(Debug, Clone)]
pub struct SalaryModel {
    schema: Vec<String>,
    forest: RandomForest,
    trained_rows: usize,
}

impl SalaryModel {
    /// Train on [`FEATURE_COLUMNS`] against [`TARGET_COLUMN`].
    ///
    /// Rows with a non-numeric feature or target (the missing sentinel, for
    /// instance) cannot be fed to the trees and are skipped.
    pub fn fit(table: &Table, params: &ForestParams) -> Result<Self> {
        let feature_idx = FEATURE_COLUMNS
            .iter()
            .map(|c| table.column_index(c))
            .collect::<Result<Vec<_>>>()?;
        let target_idx = table.column_index(TARGET_COLUMN)?;

        let mut x = Vec::with_capacity(table.len());
        let mut y = Vec::with_capacity(table.len());
        let mut skipped = 0usize;

        for row in table.rows() {
            let features: Option<Vec<f64>> = feature_idx
                .iter()
                .map(|&i| row[i].as_code().map(f64::from).or_else(|| row[i].as_f64()))
                .collect();
            match (features, row[target_idx].as_f64()) {
                (Some(f), Some(t)) => {
                    x.push(f);
                    y.push(t);
                }
                _ => skipped += 1,
            }
        }

        if skipped > 0 {
            log::warn!("Skipped {skipped} rows with missing or non-numeric model inputs");
        }
        if x.is_empty() {
            return Err(DashboardError::Training(format!(
                "no usable rows among {}",
                table.len()
            )));
        }

        let started = std::time::Instant::now();
        let forest = RandomForest::fit(&x, &y, params);
        log::info!(
            "Trained {} trees on {} rows in {:.2?}",
            forest.trees().len(),
            x.len(),
            started.elapsed()
        );

        Ok(SalaryModel {
            schema: FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
            forest,
            trained_rows: x.len(),
        })
    }

    pub fn schema(&self) -> &[String] {
        &self.schema
    }

    pub fn trained_rows(&self) -> usize {
        self.trained_rows
    }

    /// Estimate a salary. Pure function of the trained forest and input.
    pub fn predict(&self, features: &FeatureVector) -> Result<Prediction> {
        features.check_schema(&self.schema)?;
        let mut each = self.forest.predict_each(&features.values());
        let value = each.iter().sum::<f64>() / each.len() as f64;
        each.sort_by(f64::total_cmp);
        Ok(Prediction {
            value,
            low: percentile(&each, 0.10),
            high: percentile(&each, 0.90),
        })
    }
}

/// Linear-interpolated percentile of an ascending, non-empty slice.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::encoder::EncoderBank;
    use crate::data::model::CellValue;
    use crate::ml::features::{CATEGORICAL_COLUMNS, PredictionRequest};

    fn encoded(n: usize) -> (EncoderBank, Table) {
        let mut columns: Vec<String> = FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect();
        columns.push(TARGET_COLUMN.to_string());
        let jobs = ["Data Scientist", "ML Engineer", "Analyst"];
        let levels = ["EN", "MI", "SE"];
        let rows = (0..n)
            .map(|i| {
                let job = jobs[i % 3];
                let level = levels[(i / 3) % 3];
                let salary = 50_000 + 30_000 * (i % 3) as i64 + 20_000 * ((i / 3) % 3) as i64;
                vec![
                    CellValue::Text(job.into()),
                    CellValue::Text(level.into()),
                    CellValue::Text(["S", "M", "L"][i % 2].into()),
                    CellValue::Text("FT".into()),
                    CellValue::Integer([0, 50, 100][i % 3]),
                    CellValue::Text("US".into()),
                    CellValue::Text("US".into()),
                    CellValue::Integer(salary),
                ]
            })
            .collect();
        let raw = Table::from_rows(columns, rows).unwrap();
        EncoderBank::fit(raw, &CATEGORICAL_COLUMNS).unwrap()
    }

    fn request() -> PredictionRequest {
        PredictionRequest {
            job_title: "ML Engineer".into(),
            experience_level: "SE".into(),
            company_size: "M".into(),
            employment_type: "FT".into(),
            remote_ratio: 50,
            employee_residence: "US".into(),
            company_location: "US".into(),
        }
    }

    fn small_params() -> ForestParams {
        ForestParams {
            n_estimators: 8,
            ..ForestParams::default()
        }
    }

    #[test]
    fn prediction_is_deterministic_across_fits() {
        let (bank, table) = encoded(90);
        let fv = request().to_feature_vector(&bank).unwrap();
        let a = SalaryModel::fit(&table, &small_params()).unwrap();
        let b = SalaryModel::fit(&table, &small_params()).unwrap();
        assert_eq!(a.predict(&fv).unwrap(), b.predict(&fv).unwrap());
    }

    #[test]
    fn prediction_tracks_training_signal() {
        let (bank, table) = encoded(90);
        let model = SalaryModel::fit(&table, &small_params()).unwrap();
        let fv = request().to_feature_vector(&bank).unwrap();
        let p = model.predict(&fv).unwrap();
        // ML Engineer (+30k) at SE (+40k)
        assert!((p.value - 120_000.0).abs() < 15_000.0, "got {}", p.value);
        assert!(p.low <= p.value && p.value <= p.high);
    }

    #[test]
    fn short_vector_is_invalid() {
        let (_, table) = encoded(30);
        let model = SalaryModel::fit(&table, &small_params()).unwrap();
        let err = model
            .predict(&FeatureVector::from_values(&[0.0; 6]))
            .unwrap_err();
        assert!(matches!(err, DashboardError::InvalidFeatureVector { .. }));
    }

    #[test]
    fn unseen_category_is_rejected_before_predicting() {
        let (bank, _) = encoded(30);
        let mut req = request();
        req.job_title = "Astronaut".into();
        assert!(matches!(
            req.to_feature_vector(&bank),
            Err(DashboardError::UnknownValue { .. })
        ));
    }

    #[test]
    fn rows_without_target_are_skipped() {
        let (_, mut table) = encoded(9);
        table
            .map_column(TARGET_COLUMN, |_| Ok(CellValue::empty()))
            .unwrap();
        assert!(matches!(
            SalaryModel::fit(&table, &small_params()),
            Err(DashboardError::Training(_))
        ));
    }

    #[test]
    fn missing_feature_column_is_an_error() {
        let raw = Table::from_rows(vec!["job_title".into()], vec![]).unwrap();
        assert!(matches!(
            SalaryModel::fit(&raw, &small_params()),
            Err(DashboardError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn percentile_interpolates() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&v, 0.0), 1.0);
        assert_eq!(percentile(&v, 0.5), 3.0);
        assert_eq!(percentile(&v, 1.0), 5.0);
        assert!((percentile(&v, 0.1) - 1.4).abs() < 1e-12);
    }
}
