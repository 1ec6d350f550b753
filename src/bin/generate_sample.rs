use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Array, ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Write a synthetic data science salaries dataset.
#[derive(Debug, Parser)]
#[command(name = "generate_sample", about)]
struct Cli {
    /// Output file; `.parquet` / `.pq` writes Parquet, anything else CSV.
    #[arg(default_value = "salaries.csv")]
    output: PathBuf,

    /// Number of rows.
    #[arg(long, default_value_t = 2000)]
    rows: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

const EXPERIENCE: [(&str, f64); 4] = [("EN", 0.6), ("MI", 0.85), ("SE", 1.15), ("EX", 1.6)];
const EMPLOYMENT: [&str; 4] = ["FT", "PT", "CT", "FL"];
const JOBS: [(&str, f64); 10] = [
    ("Data Scientist", 120_000.0),
    ("Data Engineer", 115_000.0),
    ("Data Analyst", 85_000.0),
    ("Machine Learning Engineer", 140_000.0),
    ("Research Scientist", 135_000.0),
    ("Analytics Engineer", 125_000.0),
    ("Data Architect", 150_000.0),
    ("Applied Scientist", 160_000.0),
    ("BI Developer", 80_000.0),
    ("Head of Data", 180_000.0),
];
const COUNTRIES: [(&str, f64); 8] = [
    ("US", 1.0),
    ("CA", 0.85),
    ("GB", 0.75),
    ("DE", 0.72),
    ("FR", 0.65),
    ("ES", 0.55),
    ("IN", 0.3),
    ("BR", 0.35),
];
const COMPANY_SIZE: [(&str, f64); 3] = [("S", 0.85), ("M", 1.0), ("L", 1.08)];
const REMOTE: [i64; 3] = [0, 50, 100];
const CURRENCIES: [(&str, &str, f64); 8] = [
    ("US", "USD", 1.0),
    ("CA", "CAD", 1.35),
    ("GB", "GBP", 0.79),
    ("DE", "EUR", 0.92),
    ("FR", "EUR", 0.92),
    ("ES", "EUR", 0.92),
    ("IN", "INR", 83.0),
    ("BR", "BRL", 5.0),
];

const COLUMNS: [&str; 11] = [
    "work_year",
    "experience_level",
    "employment_type",
    "job_title",
    "salary",
    "salary_currency",
    "salary_in_usd",
    "employee_residence",
    "remote_ratio",
    "company_location",
    "company_size",
];

struct Record {
    work_year: i64,
    experience_level: &'static str,
    employment_type: &'static str,
    job_title: &'static str,
    salary: i64,
    salary_currency: &'static str,
    salary_in_usd: i64,
    employee_residence: &'static str,
    remote_ratio: i64,
    company_location: &'static str,
    company_size: &'static str,
}

/// Standard normal sample (Box-Muller).
fn gauss(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-15);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

fn generate(rows: usize, seed: u64) -> Vec<Record> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut records = Vec::with_capacity(rows);

    for _ in 0..rows {
        let &(experience_level, exp_factor) = EXPERIENCE.choose(&mut rng).unwrap_or(&EXPERIENCE[0]);
        let &(job_title, base) = JOBS.choose(&mut rng).unwrap_or(&JOBS[0]);
        let &(employee_residence, country_factor) =
            COUNTRIES.choose(&mut rng).unwrap_or(&COUNTRIES[0]);
        // Most people work for a company in their own country.
        let company_location = if rng.gen_bool(0.85) {
            employee_residence
        } else {
            COUNTRIES.choose(&mut rng).unwrap_or(&COUNTRIES[0]).0
        };
        let &(company_size, size_factor) =
            COMPANY_SIZE.choose(&mut rng).unwrap_or(&COMPANY_SIZE[1]);
        let employment_type = if rng.gen_bool(0.9) {
            EMPLOYMENT[0]
        } else {
            EMPLOYMENT[rng.gen_range(1..EMPLOYMENT.len())]
        };
        let remote_ratio = *REMOTE.choose(&mut rng).unwrap_or(&0);
        let work_year = rng.gen_range(2020..=2024);

        let noise = (1.0 + 0.12 * gauss(&mut rng)).max(0.4);
        let usd = base * exp_factor * country_factor * size_factor * noise;
        let salary_in_usd = (usd / 100.0).round() as i64 * 100;

        let (currency, rate) = CURRENCIES
            .iter()
            .find(|(country, _, _)| *country == employee_residence)
            .map(|&(_, currency, rate)| (currency, rate))
            .unwrap_or(("USD", 1.0));

        records.push(Record {
            work_year,
            experience_level,
            employment_type,
            job_title,
            salary: (salary_in_usd as f64 * rate).round() as i64,
            salary_currency: currency,
            salary_in_usd,
            employee_residence,
            remote_ratio,
            company_location,
            company_size,
        });
    }
    records
}

fn write_csv(records: &[Record], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(COLUMNS)?;
    for r in records {
        writer.write_record([
            r.work_year.to_string(),
            r.experience_level.to_string(),
            r.employment_type.to_string(),
            r.job_title.to_string(),
            r.salary.to_string(),
            r.salary_currency.to_string(),
            r.salary_in_usd.to_string(),
            r.employee_residence.to_string(),
            r.remote_ratio.to_string(),
            r.company_location.to_string(),
            r.company_size.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(records: &[Record], path: &Path) -> Result<()> {
    let ints = |f: fn(&Record) -> i64| -> ArrayRef {
        Arc::new(Int64Array::from(records.iter().map(f).collect::<Vec<_>>()))
    };
    let strs = |f: fn(&Record) -> &'static str| -> ArrayRef {
        Arc::new(StringArray::from(records.iter().map(f).collect::<Vec<_>>()))
    };

    let columns: Vec<ArrayRef> = vec![
        ints(|r| r.work_year),
        strs(|r| r.experience_level),
        strs(|r| r.employment_type),
        strs(|r| r.job_title),
        ints(|r| r.salary),
        strs(|r| r.salary_currency),
        ints(|r| r.salary_in_usd),
        strs(|r| r.employee_residence),
        ints(|r| r.remote_ratio),
        strs(|r| r.company_location),
        strs(|r| r.company_size),
    ];
    let fields: Vec<Field> = COLUMNS
        .iter()
        .zip(&columns)
        .map(|(name, array)| Field::new(*name, array.data_type().clone(), false))
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let batch = RecordBatch::try_new(schema.clone(), columns)?;
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let records = generate(cli.rows, cli.seed);
    let parquet = matches!(
        cli.output.extension().and_then(|e| e.to_str()),
        Some("parquet") | Some("pq")
    );
    if parquet {
        write_parquet(&records, &cli.output)?;
    } else {
        write_csv(&records, &cli.output)?;
    }

    println!(
        "Wrote {} salary records to {}",
        records.len(),
        cli.output.display()
    );
    Ok(())
}
