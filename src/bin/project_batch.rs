//! Project every portfolio document in a directory
//!
//! Outputs one summary row per portfolio for side-by-side comparison

use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use networth_projection::{
    portfolio::load_portfolio,
    projection::Settings,
    Portfolio, Scenario, ScenarioRunner, TypeRegistry,
};

#[derive(Debug, Parser)]
#[command(name = "project_batch", about = "Project all portfolio documents in a directory")]
struct Args {
    /// Directory of .json / .csv portfolio documents
    dir: PathBuf,

    /// Summary CSV to write
    #[arg(long, default_value = "batch_projection_output.csv")]
    output: PathBuf,

    #[arg(long, default_value_t = 10)]
    horizon: u32,

    #[arg(long, default_value_t = 4.0)]
    inflation: f64,

    /// Directory with registry CSV files (built-in defaults otherwise)
    #[arg(long)]
    registry: Option<PathBuf>,
}

/// Summary of one portfolio's projection
#[derive(Debug, Serialize)]
struct SummaryRow {
    portfolio: String,
    net_worth: f64,
    final_pessimistic: f64,
    final_base: f64,
    final_optimistic: f64,
    final_base_real: f64,
    growth_rate: Option<f64>,
    volatility: f64,
    max_drawdown: f64,
    risk_score: u8,
    debt_to_assets: Option<f64>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let start = Instant::now();
    let settings = Settings {
        horizon_years: args.horizon,
        inflation: args.inflation,
        ..Default::default()
    };
    settings.validate()?;

    let registry = match &args.registry {
        Some(dir) => TypeRegistry::from_csv_path(dir)?,
        None => TypeRegistry::default_registry(),
    };
    let runner = ScenarioRunner::with_registry(registry);

    println!("Loading portfolios from {}...", args.dir.display());
    let mut names = Vec::new();
    let mut portfolios: Vec<Portfolio> = Vec::new();
    let mut paths: Vec<PathBuf> = std::fs::read_dir(&args.dir)
        .with_context(|| format!("reading {}", args.dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| matches!(p.extension().and_then(|e| e.to_str()), Some("json") | Some("csv")))
        .collect();
    paths.sort();

    for path in paths {
        let doc = load_portfolio(&path).with_context(|| format!("loading {}", path.display()))?;
        names.push(path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default());
        portfolios.push(doc.portfolio);
    }
    println!("Loaded {} portfolios in {:?}", portfolios.len(), start.elapsed());

    println!("Running projections...");
    let proj_start = Instant::now();
    let outcomes = runner.run_batch(&portfolios, &settings);
    println!("Projections complete in {:?}", proj_start.elapsed());

    let mut writer = csv::Writer::from_writer(
        File::create(&args.output).with_context(|| format!("creating {}", args.output.display()))?,
    );
    for ((name, portfolio), outcome) in names.iter().zip(&portfolios).zip(&outcomes) {
        let base = outcome.projections.summary(Scenario::Base);
        writer.serialize(SummaryRow {
            portfolio: name.clone(),
            net_worth: portfolio.net_worth(),
            final_pessimistic: outcome.metrics.final_pessimistic,
            final_base: outcome.metrics.final_base,
            final_optimistic: outcome.metrics.final_optimistic,
            final_base_real: base.final_real,
            growth_rate: outcome.metrics.growth_rate,
            volatility: outcome.metrics.volatility,
            max_drawdown: outcome.metrics.max_drawdown,
            risk_score: outcome.metrics.risk_score,
            debt_to_assets: outcome.metrics.debt_to_assets_ratio,
        })?;
    }
    writer.flush()?;

    let stats = runner.engine().cache_stats();
    println!("Output written to {}", args.output.display());
    println!(
        "Cache: {} entries, {} hits, {} misses",
        stats.entries, stats.hits, stats.misses
    );
    println!("\nTotal time: {:?}", start.elapsed());

    Ok(())
}
