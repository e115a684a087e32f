//! Net-worth projection CLI
//!
//! Command-line interface for projecting a portfolio document

use std::fs::File;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use networth_projection::{
    amortization::AmortizationCalculator,
    assumptions::TypeRegistry,
    portfolio::{load_portfolio, validation, Liability, LiabilityType, PortfolioDocument},
    projection::{ProjectionEngine, Settings, MAX_HORIZON_YEARS},
    report,
    Scenario, ScenarioRunner,
};

#[derive(Debug, Parser)]
#[command(name = "networth", version, about = "Project net worth under three return scenarios")]
struct Cli {
    /// Directory with asset_types.csv and liability_types.csv (built-in defaults otherwise)
    #[arg(long, global = true)]
    registry: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, clap::Args)]
struct SettingsArgs {
    /// Years to project (overrides the document)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=MAX_HORIZON_YEARS as i64))]
    horizon: Option<u32>,

    /// Annual inflation in percent (overrides the document)
    #[arg(long)]
    inflation: Option<f64>,

    /// Print nominal values instead of inflation-adjusted ones
    #[arg(long)]
    nominal: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Project a portfolio and print scenario summaries and metrics
    Project {
        /// Portfolio document (.json or .csv)
        portfolio: PathBuf,

        #[command(flatten)]
        settings: SettingsArgs,

        /// Write the full yearly table as CSV
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print per-asset projections across all scenarios
    Detail {
        portfolio: PathBuf,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Print the yearly amortization schedule of a loan
    Schedule {
        #[arg(long, default_value = "mortgage")]
        kind: LiabilityType,

        #[arg(long)]
        principal: f64,

        /// Annual rate in percent (registry default for the loan type otherwise)
        #[arg(long)]
        rate: Option<f64>,

        /// Term in years (registry default for the loan type otherwise)
        #[arg(long)]
        term: Option<u32>,
    },
}

fn resolve_settings(doc: &PortfolioDocument, args: &SettingsArgs) -> Result<Settings> {
    let mut settings = doc.settings.unwrap_or_default();
    if let Some(horizon) = args.horizon {
        settings.horizon_years = horizon;
    }
    if let Some(inflation) = args.inflation {
        settings.inflation = inflation;
    }
    if args.nominal {
        settings.show_real_values = false;
    }
    settings.validate()?;
    Ok(settings)
}

fn load_registry(path: Option<&PathBuf>) -> Result<TypeRegistry> {
    match path {
        Some(dir) => TypeRegistry::from_csv_path(dir)
            .with_context(|| format!("loading registry from {}", dir.display())),
        None => Ok(TypeRegistry::default_registry()),
    }
}

fn load_document(path: &PathBuf, registry: &TypeRegistry) -> Result<PortfolioDocument> {
    let doc = load_portfolio(path).with_context(|| format!("loading portfolio {}", path.display()))?;
    validation::validate_against_registry(&doc.portfolio, registry)?;
    info!(
        "Loaded {} assets and {} liabilities from {}",
        doc.portfolio.assets().len(),
        doc.portfolio.liabilities().len(),
        path.display()
    );
    Ok(doc)
}

fn run_project(registry: TypeRegistry, path: &PathBuf, args: &SettingsArgs, output: Option<&PathBuf>) -> Result<()> {
    let doc = load_document(path, &registry)?;
    let settings = resolve_settings(&doc, args)?;
    let portfolio = &doc.portfolio;

    let runner = ScenarioRunner::with_registry(registry);
    let outcome = runner.run(portfolio, &settings);

    println!("Portfolio: {}", path.display());
    println!("  Assets:      {:>16.2}", portfolio.total_value());
    println!("  Liabilities: {:>16.2}", portfolio.total_liabilities());
    println!("  Net worth:   {:>16.2}", portfolio.net_worth());
    println!(
        "  Horizon: {} years, inflation {:.2}%",
        settings.horizon_years, settings.inflation
    );
    println!();

    let value_label = if settings.show_real_values { "Real" } else { "Nominal" };
    println!(
        "{:>5} {:>18} {:>18} {:>18}",
        "Year",
        format!("Pessimistic ({value_label})"),
        "Base",
        "Optimistic"
    );
    println!("{}", "-".repeat(62));

    let projections = &outcome.projections;
    for year in 0..=settings.horizon_years as usize {
        let value = |scenario: Scenario| {
            let point = &projections.get(scenario)[year];
            if settings.show_real_values { point.real } else { point.net_worth }
        };
        println!(
            "{:>5} {:>18.2} {:>18.2} {:>18.2}",
            year,
            value(Scenario::Pessimistic),
            value(Scenario::Base),
            value(Scenario::Optimistic)
        );
    }

    println!("\nSummary:");
    for scenario in Scenario::ALL {
        let summary = projections.summary(scenario);
        println!(
            "  {:<12} final net worth {:>16.2}  real {:>16.2}  growth {:>16.2}",
            scenario.as_str(),
            summary.final_net_worth,
            summary.final_real,
            summary.total_growth
        );
    }

    let metrics = &outcome.metrics;
    println!("\nMetrics:");
    match metrics.growth_rate {
        Some(rate) => println!("  Growth rate:    {rate:.2}% per year"),
        None => println!("  Growth rate:    undefined (net worth not positive)"),
    }
    println!("  Volatility:     {:.2}%", metrics.volatility);
    println!("  Max drawdown:   {:.2}%", metrics.max_drawdown);
    println!("  Risk score:     {}/10", metrics.risk_score);
    if let Some(ratio) = metrics.debt_to_assets_ratio {
        println!("  Debt/assets:    {ratio:.2}%");
    }

    if let Some(output) = output {
        let rows = report::report_rows(projections, report::current_year());
        let file = File::create(output).with_context(|| format!("creating {}", output.display()))?;
        report::write_csv(file, &rows)?;
        println!("\nFull results written to: {}", output.display());
    }

    Ok(())
}

fn run_detail(registry: TypeRegistry, path: &PathBuf, args: &SettingsArgs) -> Result<()> {
    let doc = load_document(path, &registry)?;
    let settings = resolve_settings(&doc, args)?;

    let engine = ProjectionEngine::new(registry);
    let rates = engine.rate_table(settings.inflation);
    let detailed = engine.calculate_detailed_projections(&doc.portfolio, &rates, &settings);

    for series in detailed.assets.values() {
        println!("\n{} ({}, {})", series.name, series.asset_id, series.asset_type);
        println!("{:>5} {:>16} {:>16} {:>16}", "Year", "Pessimistic", "Base", "Optimistic");
        for point in &series.points {
            println!(
                "{:>5} {:>16.2} {:>16.2} {:>16.2}",
                point.year, point.pessimistic, point.base, point.optimistic
            );
        }
    }

    if !doc.portfolio.liabilities().is_empty() {
        println!("\nLiabilities (all scenarios)");
        println!("{:>5} {:>16}", "Year", "Outstanding");
        for point in &detailed.liabilities {
            println!("{:>5} {:>16.2}", point.year, point.total);
        }
    }

    Ok(())
}

fn run_schedule(registry: TypeRegistry, kind: LiabilityType, principal: f64, rate: Option<f64>, term: Option<u32>) -> Result<()> {
    let mut loan = Liability::with_defaults("schedule", kind, principal, &registry);
    let rate = rate.unwrap_or(loan.rate());
    let term = term.unwrap_or(loan.term_years());
    loan.set_terms(principal, rate, term);
    if let Err(e) = validation::validate_liability(&loan) {
        bail!("invalid loan: {e}");
    }

    let totals = AmortizationCalculator::calculate_total_payments(&loan);
    println!(
        "{} of {:.2} at {:.2}% over {} years",
        kind,
        loan.principal(),
        loan.rate(),
        loan.term_years()
    );
    println!("  Monthly payment: {:.2}", loan.monthly_payment());
    println!("  Total paid:      {:.2}", totals.total_payments);
    println!(
        "  Total interest:  {:.2} ({:.1}% of principal)",
        totals.total_interest, totals.interest_rate
    );
    println!();
    println!(
        "{:>4} {:>16} {:>14} {:>14} {:>14} {:>16}",
        "Year", "Opening", "Payments", "Interest", "Principal", "Closing"
    );
    for row in AmortizationCalculator::yearly_schedule(&loan) {
        println!(
            "{:>4} {:>16.2} {:>14.2} {:>14.2} {:>14.2} {:>16.2}",
            row.year, row.opening_balance, row.payments, row.interest, row.principal_repaid, row.closing_balance
        );
    }

    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let registry = load_registry(cli.registry.as_ref())?;

    match &cli.command {
        Command::Project { portfolio, settings, output } => {
            run_project(registry, portfolio, settings, output.as_ref())
        }
        Command::Detail { portfolio, settings } => run_detail(registry, portfolio, settings),
        Command::Schedule { kind, principal, rate, term } => {
            run_schedule(registry, *kind, *principal, *rate, *term)
        }
    }
}
