mod commands;
mod config;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::analysis::{AnalyzeArgs, MetricsArgs};
use commands::loan::{AmortizeArgs, PaymentArgs};
use commands::sensitivity::SensitivityArgs;
use commands::verdict::VerdictArgs;

/// Rental property deal analysis
#[derive(Parser)]
#[command(
    name = "dealcalc",
    version,
    about = "Rental property deal analysis",
    long_about = "Analyze a buy-and-hold rental purchase with decimal precision: \
                  mortgage payment, cash flow, NOI, cap rate, cash-on-cash return, \
                  a 0-100 deal score, red flags, green lights and a buy/pass verdict."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log filter written to stderr (e.g. "debug", "deal_calc_core=trace")
    #[arg(long, env = "DEALCALC_LOG", default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Full analysis: metrics, score breakdown, flags and verdict
    Analyze(AnalyzeArgs),
    /// Calculated metrics only
    Metrics(MetricsArgs),
    /// Monthly principal and interest payment for a loan
    Payment(PaymentArgs),
    /// Year-by-year amortization schedule for a loan
    Amortize(AmortizeArgs),
    /// Classify a deal score into a verdict
    Verdict(VerdictArgs),
    /// Print the user-facing copy for every verdict
    Copy,
    /// Two-way sensitivity grid over deal inputs
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

fn init_tracing(filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Analyze(args) => commands::analysis::run_analyze(args),
        Commands::Metrics(args) => commands::analysis::run_metrics(args),
        Commands::Payment(args) => commands::loan::run_payment(args),
        Commands::Amortize(args) => commands::loan::run_amortize(args),
        Commands::Verdict(args) => commands::verdict::run_verdict(args),
        Commands::Copy => commands::verdict::run_copy(),
        Commands::Sensitivity(args) => commands::sensitivity::run_sensitivity(args),
        Commands::Version => {
            println!("dealcalc {}", env!("CARGO_PKG_VERSION"));
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
