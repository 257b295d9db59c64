mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::compare::{CompareArgs, SchemeArgs};
use commands::config::ShowConfigArgs;
use commands::guarantee::GuaranteeArgs;
use commands::totals::TotalsArgs;

/// Tax scheme comparison for guard-service tenders
#[derive(Parser)]
#[command(
    name = "tcalc",
    version,
    about = "Tax scheme comparison for guard-service tenders",
    long_about = "Evaluates a staffing and expense configuration for a security \
                  services contract under five tax/payroll structuring schemes \
                  with decimal precision, and ranks them by profitability."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate every scheme and print the ranked comparison matrix
    Compare(CompareArgs),
    /// Evaluate a single scheme
    Scheme(SchemeArgs),
    /// Aggregate staffing and expense rows into base totals
    Totals(TotalsArgs),
    /// Print the resolved constants and the layer they came from
    Config(ShowConfigArgs),
    /// List the scheme catalog
    Schemes,
    /// Bank guarantee cost for a bid or contract
    Guarantee(GuaranteeArgs),
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

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Compare(args) => commands::compare::run_compare(args),
        Commands::Scheme(args) => commands::compare::run_scheme(args),
        Commands::Totals(args) => commands::totals::run_totals(args),
        Commands::Config(args) => commands::config::run_config(args),
        Commands::Schemes => commands::catalog::run_schemes(),
        Commands::Guarantee(args) => commands::guarantee::run_guarantee(args),
        Commands::Version => {
            println!("tcalc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
