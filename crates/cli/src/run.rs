//! The subcommands, over any line source and any output sink.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use kvcheck_core::consistency::streaming::StreamingChecker;
use kvcheck_core::history::correlate::{Anomaly, Correlation, Correlator};
use kvcheck_core::history::write_history::WriteHistory;
use kvcheck_core::stats::AnnotationCounts;
use kvcheck_core::{check, CheckOptions, Verdict};
use kvcheck_parser::{Dialect, DialectMode, Line, MessageReader, ParseError, Policy, RecordReader};
use kvcheck_testgen::{generate_mult_histories, GenParams};

use crate::report::{AnalysisReport, MessageReport, OracleReport};
use crate::{FormatArg, GenerateArgs};

/// A failure that aborts a subcommand.
#[derive(Debug, derive_more::From)]
pub enum CliError {
    Io(io::Error),
    Parse(ParseError),
    Json(serde_json::Error),
}

impl core::fmt::Display for CliError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Parse(e) => write!(f, "{e}"),
            Self::Json(e) => write!(f, "JSON error: {e}"),
        }
    }
}

impl std::error::Error for CliError {}

/// Open the log at `path`, or stdin for `None` and `-`.
///
/// # Errors
///
/// When the file cannot be opened.
pub fn open_input(path: Option<&Path>) -> io::Result<Box<dyn BufRead>> {
    match path {
        Some(path) if path != Path::new("-") => Ok(Box::new(BufReader::new(File::open(path)?))),
        _ => Ok(Box::new(io::stdin().lock())),
    }
}

/// Echo a message log, printing a diagnostic after each offending read, and
/// end with the verdict line. Message lines themselves are not echoed.
///
/// # Errors
///
/// Only I/O errors; unparsable lines are passed through.
pub fn check_messages<R: BufRead, W: Write>(
    input: R,
    out: &mut W,
    mode: DialectMode,
    match_version: bool,
) -> Result<Verdict, CliError> {
    let mut reader = MessageReader::new(mode, Policy::BestEffort);
    let mut checker = StreamingChecker::new(match_version);
    for line in input.lines() {
        let line = line?;
        match reader.read(&line)? {
            Line::Event(event) => {
                if let Some(diagnostic) = checker.observe(&event) {
                    writeln!(out, "{diagnostic}")?;
                }
            }
            _ => writeln!(out, "{line}")?,
        }
    }
    tracing::debug!(counts = ?checker.counts(), "streaming check finished");

    let verdict = checker.verdict();
    writeln!(out, "{}", verdict.checker_line())?;
    Ok(verdict)
}

struct MessageRun {
    correlation: Correlation,
    annotations: AnnotationCounts,
}

/// Correlate a message log. With `echo`, every line that is not a client
/// message is copied to `out`, and anomalies are reported where they occur.
fn correlate<R: BufRead, W: Write>(
    input: R,
    out: &mut W,
    mode: DialectMode,
    policy: Policy,
    echo: bool,
) -> Result<MessageRun, CliError> {
    let mut reader = MessageReader::new(mode, policy);
    let mut correlator = Correlator::new();
    let mut annotations = AnnotationCounts::default();
    for line in input.lines() {
        let line = line?;
        match reader.read(&line)? {
            Line::Event(event) => {
                let Some(anomaly) = correlator.observe(&event) else {
                    continue;
                };
                if echo {
                    writeln!(out, "{anomaly}")?;
                    if matches!(anomaly, Anomaly::UnexpectedMessage { .. }) {
                        writeln!(out, "{line}")?;
                    }
                }
                continue;
            }
            Line::Annotation(annotation) => annotations.observe(&annotation),
            Line::Monitor(_) => annotations.monitor_lines += 1,
            Line::Blank | Line::Record(_) | Line::Passthrough(_) => {}
        }
        if echo {
            writeln!(out, "{line}")?;
        }
    }
    Ok(MessageRun {
        correlation: correlator.finish(),
        annotations,
    })
}

/// Request/response statistics of a message log. Every line must be a
/// client message in the log's dialect, a blank line, an annotation or a
/// monitor line.
///
/// # Errors
///
/// The first line that is none of those, or an I/O error.
pub fn message_stats<R: BufRead, W: Write>(
    input: R,
    out: &mut W,
    mode: DialectMode,
    json: bool,
) -> Result<MessageReport, CliError> {
    let run = correlate(input, out, mode, Policy::Strict, !json)?;
    let report = MessageReport::new(&run.correlation, run.annotations);
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        write!(out, "{}", report.stats)?;
    }
    Ok(report)
}

/// Statistics of a transaction-record log followed by the batch oracle's
/// verdict.
///
/// # Errors
///
/// A malformed record line, or an I/O error.
pub fn analyze_records<R: BufRead, W: Write>(
    input: R,
    out: &mut W,
    options: CheckOptions,
    percentiles: bool,
    verbose: bool,
    json: bool,
) -> Result<AnalysisReport, CliError> {
    let mut reader = RecordReader::new();
    let mut operations = Vec::new();
    let mut annotations = AnnotationCounts::default();
    for line in input.lines() {
        match reader.read(&line?)? {
            Line::Record(op) => operations.push(op),
            Line::Annotation(annotation) => annotations.observe(&annotation),
            Line::Monitor(_) => annotations.monitor_lines += 1,
            Line::Blank | Line::Event(_) | Line::Passthrough(_) => {}
        }
    }
    tracing::debug!(operations = operations.len(), "records parsed");

    let report = AnalysisReport::new(&operations, annotations, options);
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        return Ok(report);
    }

    write!(out, "{}", report.operations)?;
    if percentiles {
        if let Some(summary) = &report.read_latency {
            writeln!(out, "Read latency percentiles (ms): {summary}")?;
        }
        if let Some(summary) = &report.write_latency {
            writeln!(out, "Write latency percentiles (ms): {summary}")?;
        }
    }
    writeln!(out)?;
    if verbose {
        for violation in &report.consistency.violations {
            writeln!(out, "{violation}")?;
        }
    }
    write!(out, "{}", report.consistency)?;
    Ok(report)
}

/// Correlate a message log into operations and run the batch oracle over
/// them.
///
/// # Errors
///
/// Only I/O errors; unparsable lines are skipped.
pub fn oracle_messages<R: BufRead, W: Write>(
    input: R,
    out: &mut W,
    mode: DialectMode,
    options: CheckOptions,
    json: bool,
) -> Result<OracleReport, CliError> {
    let run = correlate(input, out, mode, Policy::BestEffort, false)?;
    let operations = &run.correlation.operations;
    let history = WriteHistory::from_operations(operations);
    let report = OracleReport {
        messages: MessageReport::new(&run.correlation, run.annotations),
        operations: operations.len(),
        consistency: check(operations, &history, options),
    };

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        write!(out, "{}", report.messages.stats)?;
        for anomaly in &report.messages.anomalies {
            writeln!(out, "{anomaly}")?;
        }
        writeln!(out)?;
        write!(out, "{}", report.consistency)?;
    }
    Ok(report)
}

/// Write `<id>.json` and a `<id>.log` in the requested format for every
/// generated history. Returns the number of histories written.
///
/// # Errors
///
/// When the directory or a file cannot be written.
pub fn generate(args: &GenerateArgs) -> Result<usize, CliError> {
    fs::create_dir_all(&args.output_dir)?;

    let params = GenParams {
        id: 0,
        n_client: args.n_client,
        n_key: args.n_key,
        n_op: args.n_op,
        write_ratio: args.write_ratio,
        stale_ratio: args.stale_ratio,
        seed: args.seed,
    };
    let histories = generate_mult_histories(args.n_hist, &params);

    for history in &histories {
        let path = args.output_dir.join(format!("{}.json", history.get_id()));
        serde_json::to_writer_pretty(File::create(&path)?, history)?;

        let log = match args.format {
            FormatArg::Records => history.to_records(),
            FormatArg::Numeric => history.to_messages(&Dialect::NUMERIC),
            FormatArg::Named => history.to_messages(&Dialect::NAMED),
        };
        let path = args.output_dir.join(format!("{}.log", history.get_id()));
        fs::write(&path, log)?;
        tracing::debug!(path = %path.display(), "history written");
    }
    Ok(histories.len())
}
