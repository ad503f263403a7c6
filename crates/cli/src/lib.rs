//! kvcheck CLI -- check and summarise replicated key-value store logs.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use kvcheck_parser::{Dialect, DialectMode};

pub mod report;
pub mod run;

#[derive(Debug, Parser)]
#[command(
    name = "kvcheck",
    about = "Consistency oracle and load-test statistics for key-value store logs"
)]
pub struct App {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Pass a message log through the single-pass consistency checker
    Check(CheckArgs),
    /// Print request/response statistics of a message log
    Stats(StatsArgs),
    /// Summarise a transaction-record log and run the consistency oracle
    Analyze(AnalyzeArgs),
    /// Correlate a message log into operations and run the consistency oracle
    Oracle(OracleArgs),
    /// Generate synthetic client histories
    Generate(GenerateArgs),
    /// Print the JSON Schema of the `analyze --json` report to stdout
    Schema,
}

#[derive(Debug, Parser)]
pub struct CheckArgs {
    /// Message dialect of the log
    #[arg(long, value_enum, default_value_t = DialectArg::Auto)]
    pub dialect: DialectArg,
    /// Also require the version of every read to match the write it observed
    #[arg(long)]
    pub match_version: bool,
    /// Log file to read, `-` or nothing for stdin
    pub input: Option<PathBuf>,
}

#[derive(Debug, Parser)]
pub struct StatsArgs {
    /// Message dialect of the log
    #[arg(long, value_enum, default_value_t = DialectArg::Auto)]
    pub dialect: DialectArg,
    /// Output the report as JSON
    #[arg(long)]
    pub json: bool,
    /// Log file to read, `-` or nothing for stdin
    pub input: Option<PathBuf>,
}

#[derive(Debug, Parser)]
pub struct AnalyzeArgs {
    /// Also require the version of every read to match the write it observed
    #[arg(long)]
    pub match_version: bool,
    /// Print the latency percentiles of reads and writes
    #[arg(long)]
    pub percentiles: bool,
    /// List every consistency violation found
    #[arg(long)]
    pub verbose: bool,
    /// Output the report as JSON
    #[arg(long)]
    pub json: bool,
    /// Log file to read, `-` or nothing for stdin
    pub input: Option<PathBuf>,
}

#[derive(Debug, Parser)]
pub struct OracleArgs {
    /// Message dialect of the log
    #[arg(long, value_enum, default_value_t = DialectArg::Auto)]
    pub dialect: DialectArg,
    /// Also require the version of every read to match the write it observed
    #[arg(long)]
    pub match_version: bool,
    /// Output the report as JSON
    #[arg(long)]
    pub json: bool,
    /// Log file to read, `-` or nothing for stdin
    pub input: Option<PathBuf>,
}

#[derive(Debug, Parser)]
pub struct GenerateArgs {
    /// Number of histories to generate
    #[arg(long)]
    pub n_hist: u64,
    /// Number of clients
    #[arg(long)]
    pub n_client: u64,
    /// Number of keys
    #[arg(long)]
    pub n_key: u64,
    /// Number of operations per client
    #[arg(long)]
    pub n_op: u64,
    /// Probability that an operation is a write
    #[arg(long, default_value_t = 0.5, value_parser = parse_ratio)]
    pub write_ratio: f64,
    /// Probability that a read returns a superseded value
    #[arg(long, default_value_t = 0.0, value_parser = parse_ratio)]
    pub stale_ratio: f64,
    /// Seed for reproducible histories
    #[arg(long)]
    pub seed: Option<u64>,
    /// Log format written next to each history's JSON file
    #[arg(long, value_enum, default_value_t = FormatArg::Records)]
    pub format: FormatArg,
    /// Output directory for generated history files
    #[arg(long)]
    pub output_dir: PathBuf,
}

/// A probability in `[0, 1]`.
fn parse_ratio(text: &str) -> Result<f64, String> {
    let ratio: f64 = text.parse().map_err(|e: std::num::ParseFloatError| e.to_string())?;
    if (0.0..=1.0).contains(&ratio) {
        Ok(ratio)
    } else {
        Err(format!("{ratio} is not in 0..=1"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DialectArg {
    /// Detect from the first message line
    Auto,
    /// `id:`, `demuxKey:1` ...
    Numeric,
    /// `Id:`, `DemuxKey:clientReadRequest` ...
    Named,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Records,
    Numeric,
    Named,
}

impl From<DialectArg> for DialectMode {
    fn from(dialect: DialectArg) -> Self {
        match dialect {
            DialectArg::Auto => Self::Auto,
            DialectArg::Numeric => Self::Fixed(Dialect::NUMERIC),
            DialectArg::Named => Self::Fixed(Dialect::NAMED),
        }
    }
}
