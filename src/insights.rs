use crate::data::aggregate;
use crate::data::encoder::EncoderBank;
use crate::data::model::Table;
use crate::error::Result;
use crate::ml::features::TARGET_COLUMN;

pub const ROLE_COLUMN: &str = "job_title";
pub const COUNTRY_COLUMN: &str = "employee_residence";

/// Summary statistics shown as cards, computed once per dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Insights {
    pub top_roles: Vec<(String, f64)>,
    pub top_countries: Vec<(String, f64)>,
    pub distinct_roles: usize,
    pub distinct_countries: usize,
    pub rows: usize,
    pub mean_salary: Option<f64>,
}

impl Insights {
    pub fn compute(table: &Table, bank: &EncoderBank, top_n: usize) -> Result<Self> {
        Ok(Insights {
            top_roles: aggregate::top_n_by_mean(table, bank, ROLE_COLUMN, TARGET_COLUMN, top_n)?,
            top_countries: aggregate::top_n_by_mean(
                table,
                bank,
                COUNTRY_COLUMN,
                TARGET_COLUMN,
                top_n,
            )?,
            distinct_roles: aggregate::distinct_count(table, ROLE_COLUMN)?,
            distinct_countries: aggregate::distinct_count(table, COUNTRY_COLUMN)?,
            rows: table.len(),
            mean_salary: aggregate::mean(table, bank, TARGET_COLUMN)?,
        })
    }
}

/// Whole dollars with thousands separators, e.g. `$123,456`.
pub fn format_usd(value: f64) -> String {
    let whole = value.trunc() as i64;
    let digits = whole.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if whole < 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}
