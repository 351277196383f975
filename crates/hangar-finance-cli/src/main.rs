mod commands;
mod input;
mod logging;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::finance::{ModelArgs, SnapshotArgs};
use commands::pricing::{DefaultsArgs, PricingArgs};
use commands::scenarios::SensitivityArgs;
use commands::solvers::{IrrArgs, PaybackArgs};

/// Business plans for solar-canopy construction projects
#[derive(Parser)]
#[command(
    name = "hpv",
    version,
    about = "Business plans for solar-canopy (hangar photovoltaïque) projects",
    long_about = "Runs the 20-year business plan of a solar canopy (revenue, loan \
                  schedule, tax with loss carry-forward, DSCR), its IRR and payback \
                  solvers, and the construction tariff-grid lookup."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log debug events to stderr (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the raw business plan (no validation)
    Model(ModelArgs),
    /// Validate inputs, compute the business plan and report warnings
    Analyze(ModelArgs),
    /// Internal rate of return of a cash-flow series (%)
    Irr(IrrArgs),
    /// Payback horizon of a cumulative revenue series (years)
    Payback(PaybackArgs),
    /// Look up a construction tariff in the tariff grid
    Pricing(PricingArgs),
    /// Pre-fill a finance state for a building configuration
    Defaults(DefaultsArgs),
    /// Compute the business plan and freeze it as an audit snapshot
    Snapshot(SnapshotArgs),
    /// Two-way sensitivity of a KPI to two inputs
    Sensitivity(SensitivityArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Model(args) => commands::finance::run_model(args),
        Commands::Analyze(args) => commands::finance::run_analyze(args),
        Commands::Irr(args) => commands::solvers::run_irr(args),
        Commands::Payback(args) => commands::solvers::run_payback(args),
        Commands::Pricing(args) => commands::pricing::run_pricing(args),
        Commands::Defaults(args) => commands::pricing::run_defaults(args),
        Commands::Snapshot(args) => commands::finance::run_snapshot(args),
        Commands::Sensitivity(args) => commands::scenarios::run_sensitivity(args),
        Commands::Version => {
            println!("hpv {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!("command failed: {e}");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
