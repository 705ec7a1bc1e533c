use analytics::{Insights, OrderFilter, SalesAnalyzer};
use anyhow::{Context, bail};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use cleaner::{Cleaner, canonical};
use configuration::{AnalysisSettings, Config, OutputFormat, load_config};
use core_types::{Fulfilment, OrderTable};
use serde::Serialize;
use std::path::{Path, PathBuf};

mod logging;
mod render;

/// The main entry point for the sales KPI tool.
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("failed to load configuration")?;
    let _guard = logging::init(&config.logging).context("failed to initialise logging")?;

    match cli.command {
        Commands::Clean(args) => handle_clean(args, &config),
        Commands::Report(args) => handle_report(args, &config),
        Commands::Summary(args) => handle_summary(args, &config),
        Commands::Insights(args) => handle_insights(args, &config),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Cleans marketplace order exports and computes sales KPIs.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults to ./config.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalise a raw order export into the canonical CSV.
    Clean(CleanArgs),
    /// Compute every KPI and print the full report.
    Report(AnalyzeArgs),
    /// Print the headline figures only.
    Summary(AnalyzeArgs),
    /// Derive business insights and recommendations.
    Insights(AnalyzeArgs),
}

#[derive(Args)]
struct CleanArgs {
    /// The raw export to clean.
    #[arg(long)]
    input: PathBuf,

    /// Where to write the canonical CSV.
    #[arg(long)]
    output: PathBuf,
}

#[derive(Args)]
struct SourceArgs {
    /// Dataset to analyse. Falls back to `dataset.path` from the configuration.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Treat the input as a raw export and clean it in memory first.
    #[arg(long)]
    raw: bool,
}

#[derive(Args)]
struct FilterArgs {
    /// Only orders placed on or after this date (YYYY-MM-DD).
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Only orders placed on or before this date (YYYY-MM-DD).
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Restrict to a shipping state. Repeatable.
    #[arg(long = "state")]
    states: Vec<String>,

    /// Restrict to a product category. Repeatable.
    #[arg(long = "category")]
    categories: Vec<String>,

    /// Restrict to an order status. Repeatable.
    #[arg(long = "status")]
    statuses: Vec<String>,

    /// Only business (true) or only consumer (false) orders.
    #[arg(long)]
    b2b: Option<bool>,

    /// Restrict to one fulfilment channel ("Amazon" or "Merchant").
    #[arg(long, value_parser = parse_fulfilment)]
    fulfilment: Option<Fulfilment>,
}

impl From<FilterArgs> for OrderFilter {
    fn from(args: FilterArgs) -> Self {
        OrderFilter {
            from: args.from,
            to: args.to,
            states: args.states,
            categories: args.categories,
            statuses: args.statuses,
            b2b: args.b2b,
            fulfilment: args.fulfilment,
        }
    }
}

#[derive(Args)]
struct AnalyzeArgs {
    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    filter: FilterArgs,

    /// Output format. Overrides `output.format` from the configuration.
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Rows shown per ranking. Overrides `analysis.top_n`.
    #[arg(long)]
    top: Option<usize>,
}

fn parse_fulfilment(raw: &str) -> Result<Fulfilment, String> {
    Fulfilment::parse(raw).ok_or_else(|| format!("unknown fulfilment channel '{raw}'"))
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn handle_clean(args: CleanArgs, config: &Config) -> anyhow::Result<()> {
    let cleaner = Cleaner::new(&config.cleaning);
    let output = cleaner
        .clean_path(&args.input)
        .with_context(|| format!("failed to clean {}", args.input.display()))?;

    canonical::write_path(&output.table, &args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    tracing::info!(
        input = %args.input.display(),
        output = %args.output.display(),
        rows = output.table.len(),
        "Cleaned dataset written"
    );
    render::print_cleaning_summary(&output.summary);
    Ok(())
}

fn handle_report(args: AnalyzeArgs, config: &Config) -> anyhow::Result<()> {
    let (table, format, top_n) = prepare(args, config)?;
    let settings = AnalysisSettings {
        top_n,
        ..config.analysis.clone()
    };
    let analyzer = SalesAnalyzer::new(&table, &settings);
    let report = analyzer.generate_report();

    match format {
        OutputFormat::Table => render::print_report(&report, top_n),
        OutputFormat::Json => print_json(&report)?,
    }
    Ok(())
}

fn handle_summary(args: AnalyzeArgs, config: &Config) -> anyhow::Result<()> {
    let (table, format, top_n) = prepare(args, config)?;
    let analyzer = SalesAnalyzer::new(&table, &config.analysis);
    let summary = analyzer.summary();

    match format {
        OutputFormat::Table => {
            render::print_summary(&summary);
            render::print_category_performance(&analyzer.category_performance(), top_n);
        }
        OutputFormat::Json => print_json(&summary)?,
    }
    Ok(())
}

fn handle_insights(args: AnalyzeArgs, config: &Config) -> anyhow::Result<()> {
    let (table, format, _) = prepare(args, config)?;
    let analyzer = SalesAnalyzer::new(&table, &config.analysis);
    let insights = Insights::derive(&analyzer, &config.insights);

    match format {
        OutputFormat::Table => render::print_insights(&insights),
        OutputFormat::Json => print_json(&insights)?,
    }
    Ok(())
}

/// Loads the dataset, applies the filter and resolves output options.
fn prepare(args: AnalyzeArgs, config: &Config) -> anyhow::Result<(OrderTable, OutputFormat, usize)> {
    let path = args.source.input.unwrap_or_else(|| config.dataset.path.clone());
    let raw = args.source.raw || config.dataset.raw;
    let table = load_table(&path, raw, config)?;

    let table = OrderFilter::from(args.filter).apply(&table)?;

    let format = args.format.unwrap_or(config.output.format);
    let top_n = args.top.unwrap_or(config.analysis.top_n);
    if top_n == 0 {
        bail!("--top must be at least 1");
    }
    Ok((table, format, top_n))
}

fn load_table(path: &Path, raw: bool, config: &Config) -> anyhow::Result<OrderTable> {
    if !path.exists() {
        bail!("dataset not found: {}", path.display());
    }

    let table = if raw {
        let output = Cleaner::new(&config.cleaning)
            .clean_path(path)
            .with_context(|| format!("failed to clean {}", path.display()))?;
        if output.summary.rows_rejected() > 0 {
            tracing::warn!(
                rejected = output.summary.rows_rejected(),
                "Some raw rows could not be cleaned and were skipped"
            );
        }
        output.table
    } else {
        canonical::read_path(path)
            .with_context(|| format!("failed to read cleaned dataset {}", path.display()))?
    };

    tracing::info!(path = %path.display(), rows = table.len(), "Dataset loaded");
    Ok(table)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
