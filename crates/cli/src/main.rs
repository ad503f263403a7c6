use std::io::{self, Write};
use std::process;

use clap::Parser;
use kvcheck_cli::report::AnalysisReport;
use kvcheck_cli::run::{self, CliError};
use kvcheck_cli::{App, Command};
use kvcheck_core::CheckOptions;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let app = App::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let result = match &app.command {
        Command::Check(args) => run::open_input(args.input.as_deref())
            .map_err(CliError::from)
            .and_then(|input| {
                run::check_messages(input, &mut out, args.dialect.into(), args.match_version)
            })
            .map(drop),
        Command::Stats(args) => run::open_input(args.input.as_deref())
            .map_err(CliError::from)
            .and_then(|input| run::message_stats(input, &mut out, args.dialect.into(), args.json))
            .map(drop),
        Command::Analyze(args) => run::open_input(args.input.as_deref())
            .map_err(CliError::from)
            .and_then(|input| {
                run::analyze_records(
                    input,
                    &mut out,
                    CheckOptions {
                        match_version: args.match_version,
                    },
                    args.percentiles,
                    args.verbose,
                    args.json,
                )
            })
            .map(drop),
        Command::Oracle(args) => run::open_input(args.input.as_deref())
            .map_err(CliError::from)
            .and_then(|input| {
                run::oracle_messages(
                    input,
                    &mut out,
                    args.dialect.into(),
                    CheckOptions {
                        match_version: args.match_version,
                    },
                    args.json,
                )
            })
            .map(drop),
        Command::Generate(args) => run::generate(args).and_then(|count| {
            writeln!(
                out,
                "Generated {count} histories to {}",
                args.output_dir.display()
            )
            .map_err(CliError::from)
        }),
        Command::Schema => schema(&mut out),
    };

    if let Err(e) = result.and_then(|()| out.flush().map_err(CliError::from)) {
        eprintln!("{e}");
        process::exit(1);
    }
}

fn schema(out: &mut impl Write) -> Result<(), CliError> {
    let schema = schemars::schema_for!(AnalysisReport);
    writeln!(out, "{}", serde_json::to_string_pretty(&schema)?)?;
    Ok(())
}
