mod commands;
mod input;
mod output;
mod telemetry;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::billing::{ApportionArgs, LateFeeArgs};
use commands::portfolio::{CashFlowArgs, VacancyArgs, YieldArgs};
use commands::tax::{TaxArgs, TaxMonthlyArgs};

/// Rental portfolio finance calculations
#[derive(Parser)]
#[command(
    name = "rfa",
    version,
    about = "Rental portfolio finance calculations",
    long_about = "A CLI for landlords and property managers working with decimal-exact money. \
                  Computes rental income tax, late-payment fees, shared expense splits, \
                  vacancy, portfolio yield and cash-flow projections."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// TOML file with tax table, delinquency terms and forecast settings
    #[arg(long, env = "RFA_CONFIG", global = true)]
    config: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Monthly income tax owed on rental receipts
    Tax(TaxArgs),
    /// Income tax computed separately for each calendar month
    TaxMonthly(TaxMonthlyArgs),
    /// Penalty and interest on a late rent payment
    LateFee(LateFeeArgs),
    /// Split a shared building expense across units
    Apportion(ApportionArgs),
    /// Physical and financial vacancy of a portfolio
    Vacancy(VacancyArgs),
    /// Gross annual rental yield of a portfolio
    Yield(YieldArgs),
    /// Realized history plus a forecast from active contracts
    CashFlow(CashFlowArgs),
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

    if let Err(e) = telemetry::init(cli.verbose) {
        eprintln!("{}: {}", "warning".yellow().bold(), e);
    }

    let result = run(cli.command, cli.config.as_deref());

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}

/// Dispatch a subcommand, loading the engine configuration only when the
/// command needs it.
fn run(
    command: Commands,
    config_path: Option<&str>,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let config = || input::config::load_config(config_path);
    match command {
        Commands::Tax(args) => commands::tax::run_tax(args, &config()?),
        Commands::TaxMonthly(args) => commands::tax::run_tax_monthly(args, &config()?),
        Commands::LateFee(args) => commands::billing::run_late_fee(args, &config()?),
        Commands::Apportion(args) => commands::billing::run_apportion(args),
        Commands::Vacancy(args) => commands::portfolio::run_vacancy(args, &config()?),
        Commands::Yield(args) => commands::portfolio::run_yield(args),
        Commands::CashFlow(args) => commands::portfolio::run_cash_flow(args, &config()?),
        Commands::Version => Ok(serde_json::json!({
            "name": "rfa",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    }
}
