use crate::data::encoder::EncoderBank;
use crate::error::{DashboardError, Result};

/// Columns consumed by the salary model, in training order.
pub const FEATURE_COLUMNS: [&str; 7] = [
    "job_title",
    "experience_level",
    "company_size",
    "employment_type",
    "remote_ratio",
    "employee_residence",
    "company_location",
];

/// Feature columns that go through the encoder bank.
pub const CATEGORICAL_COLUMNS: [&str; 6] = [
    "job_title",
    "experience_level",
    "company_size",
    "employment_type",
    "employee_residence",
    "company_location",
];

pub const TARGET_COLUMN: &str = "salary_in_usd";

/// Remote ratio choices offered when the dataset has none.
pub const DEFAULT_REMOTE_RATIOS: [i64; 3] = [0, 50, 100];

/// Named, ordered feature values for one prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    fields: Vec<(String, f64)>,
}

impl FeatureVector {
    pub fn new(fields: Vec<(String, f64)>) -> Self {
        FeatureVector { fields }
    }

    /// Pair `values` with the standard feature names in order. Extra names
    /// or values beyond the shorter side are dropped, so a short slice yields
    /// a short vector.
    pub fn from_values(values: &[f64]) -> Self {
        FeatureVector {
            fields: FEATURE_COLUMNS
                .iter()
                .zip(values)
                .map(|(name, v)| (name.to_string(), *v))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn values(&self) -> Vec<f64> {
        self.fields.iter().map(|(_, v)| *v).collect()
    }

    /// Check length and field order against a trained schema.
    pub fn check_schema(&self, schema: &[String]) -> Result<()> {
        if self.fields.len() != schema.len() {
            return Err(DashboardError::InvalidFeatureVector {
                reason: format!("expected {} fields, got {}", schema.len(), self.fields.len()),
            });
        }
        for (pos, (got, want)) in self.names().zip(schema).enumerate() {
            if got != want {
                return Err(DashboardError::InvalidFeatureVector {
                    reason: format!("field {pos} is '{got}', expected '{want}'"),
                });
            }
        }
        Ok(())
    }
}

/// Raw user selections from the predictor page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PredictionRequest {
    pub job_title: String,
    pub experience_level: String,
    pub company_size: String,
    pub employment_type: String,
    pub remote_ratio: i64,
    pub employee_residence: String,
    pub company_location: String,
}

impl PredictionRequest {
    /// Raw string for a categorical feature column.
    pub fn categorical(&self, column: &str) -> Option<&str> {
        let value = match column {
            "job_title" => &self.job_title,
            "experience_level" => &self.experience_level,
            "company_size" => &self.company_size,
            "employment_type" => &self.employment_type,
            "employee_residence" => &self.employee_residence,
            "company_location" => &self.company_location,
            _ => return None,
        };
        Some(value.as_str())
    }

    pub fn set_categorical(&mut self, column: &str, value: String) {
        let slot = match column {
            "job_title" => &mut self.job_title,
            "experience_level" => &mut self.experience_level,
            "company_size" => &mut self.company_size,
            "employment_type" => &mut self.employment_type,
            "employee_residence" => &mut self.employee_residence,
            "company_location" => &mut self.company_location,
            _ => return,
        };
        *slot = value;
    }

    /// Encode through the bank in training order. Values outside the
    /// trained vocabulary are rejected.
    pub fn to_feature_vector(&self, bank: &EncoderBank) -> Result<FeatureVector> {
        let fields = FEATURE_COLUMNS
            .iter()
            .map(|&col| {
                let value = match self.categorical(col) {
                    Some(raw) => bank.encode(col, raw)? as f64,
                    None => self.remote_ratio as f64,
                };
                Ok((col.to_string(), value))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(FeatureVector { fields })
    }
}
