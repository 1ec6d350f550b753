use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::Parser;
use eframe::egui;

use salary_dashboard::app::SalaryDashboardApp;
use salary_dashboard::state::AppState;
use salary_dashboard::{Dashboard, DashboardConfig};

/// Data science salary analytics dashboard.
#[derive(Debug, Parser)]
#[command(name = "salary-dashboard", version, about)]
struct Cli {
    /// Dataset to load (.csv, .json, .parquet). Overrides the config file.
    #[arg(long, value_name = "PATH")]
    data: Option<PathBuf>,

    /// JSON config file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Random seed for the salary model.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of trees in the salary model.
    #[arg(long)]
    trees: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => DashboardConfig::from_file(path)?,
        None => DashboardConfig::default(),
    };
    if let Some(data) = cli.data {
        config.data_path = data;
    }
    if let Some(seed) = cli.seed {
        config.model.seed = seed;
    }
    if let Some(trees) = cli.trees {
        config.model.n_estimators = trees;
    }

    let dashboard = Dashboard::load(&config)
        .with_context(|| format!("starting dashboard from {}", config.data_path.display()))?;
    let state = AppState::new(dashboard, config);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Data Science Salary Analytics Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(SalaryDashboardApp::new(state)))),
    )
    .map_err(|e| anyhow!("{e}"))
}
