use std::io::Cursor;

use kvcheck_cli::run::{self, CliError};
use clap::Parser;
use kvcheck_cli::{App, Command, FormatArg, GenerateArgs};
use kvcheck_core::{CheckOptions, Verdict};
use kvcheck_parser::{Dialect, DialectMode};

fn output(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap()
}

const NUMERIC_LOG: &str = "\
100 sent {id:1 src:1 dest:0 demuxKey:2 key:[1] value:[10] ok:true}
Partition created
200 received {id:1 src:0 dest:1 demuxKey:4 key:[1] value:[10] ok:true}
300 sent {id:2 src:1 dest:0 demuxKey:1 key:[1] value:[] ok:true}
350 received {id:2 src:0 dest:1 demuxKey:3 key:[1] value:[10] ok:true}
400 sent {id:3 src:1 dest:0 demuxKey:1 key:[2] value:[] ok:true}
450 received {id:3 src:0 dest:1 demuxKey:3 key:[2] value:[4] ok:true}
";

#[test]
fn check_echoes_other_lines_and_reports_unwritten_reads() {
    let mut out = Vec::new();
    let verdict = run::check_messages(
        Cursor::new(NUMERIC_LOG),
        &mut out,
        DialectMode::Auto,
        false,
    )
    .unwrap();
    assert_eq!(verdict, Verdict::Neither);
    assert_eq!(
        output(out),
        "Partition created\n\
         ERROR: Non-error value returned for un-written key\n\
         All consistency tests failed!\n"
    );
}

#[test]
fn check_passes_latest_value_reads() {
    let log: String = NUMERIC_LOG.lines().take(5).map(|l| format!("{l}\n")).collect();
    let mut out = Vec::new();
    let verdict =
        run::check_messages(Cursor::new(log), &mut out, DialectMode::Auto, false).unwrap();
    assert_eq!(verdict, Verdict::Strong);
    assert!(output(out).ends_with("Strong consistency test passed\n"));
}

#[test]
fn stats_prints_report() {
    let log = "\
1000 sent {Id:1 Src:1 Dest:0 DemuxKey:clientReadRequest Key:[1] Value:[] Ok:true}
1500 received {Id:1 Src:0 Dest:1 DemuxKey:clientReadResponse Key:[1] Value:[] Ok:false}
2000 sent {Id:1 Src:1 Dest:0 DemuxKey:clientReadResponse Key:[1] Value:[] Ok:true}
";
    let mut out = Vec::new();
    let report = run::message_stats(
        Cursor::new(log),
        &mut out,
        DialectMode::Fixed(Dialect::NAMED),
        false,
    )
    .unwrap();
    assert_eq!(report.anomalies.len(), 1);
    assert_eq!(
        output(out),
        "Unexpected response before corresponding request 1\n\
         Time taken (milliseconds): 2.0\n\
         2 reads and 0 writes responded to\n\
         ERROR: Number of read responses does not match number of requests\n\
         1 responses to reads were errors (50.0%)\n\
         Mean read response time (microseconds): 500.0\n"
    );
}

#[test]
fn stats_rejects_malformed_line_with_its_number() {
    let log = "\
1000 sent {Id:1 Src:1 Dest:0 DemuxKey:clientReadRequest Key:[1] Value:[] Ok:true}
Node 2 recovered
1500 received {Id:1 Src:0 Dest:1 DemuxKey:clientReadResponse Key:[1]}
";
    let mut out = Vec::new();
    let err = run::message_stats(Cursor::new(log), &mut out, DialectMode::Auto, false)
        .unwrap_err();
    let CliError::Parse(err) = err else {
        panic!("expected a parse error, got {err}");
    };
    assert_eq!(err.line, 3);
}

#[test]
fn stats_json_has_no_echo() {
    let mut out = Vec::new();
    run::message_stats(Cursor::new(NUMERIC_LOG), &mut out, DialectMode::Auto, true).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(json["stats"]["read_responses"], 2);
    assert_eq!(json["annotations"]["partitions_created"], 1);
}

const RECORD_LOG: &str = "\
0 2000 write [1] [1] 1 success
2500 4000 write [1] [2] 2 success
Node 1 failed while in mode 0
5000 6000 read [1] [1] 1 true
";

#[test]
fn analyze_prints_stats_and_verdict() {
    let mut out = Vec::new();
    let report = run::analyze_records(
        Cursor::new(RECORD_LOG),
        &mut out,
        CheckOptions::default(),
        true,
        false,
        false,
    )
    .unwrap();
    assert_eq!(report.annotations.node_failures, 1);
    assert_eq!(
        output(out),
        "Total time taken (milliseconds): 6\n\
         1 reads and 2 writes processed\n\
         Average read response time (ms): 1\n\
         Average write response time (ms): 1\n\
         1 (100%) reads were successful\n\
         2 (100%) writes were successful\n\
         0 writes have unknown response\n\
         Read latency percentiles (ms): 10th 1.00 50th 1.00 90th 1.00 95th 1.00 99th 1.00\n\
         Write latency percentiles (ms): 10th 1.50 50th 2.00 90th 2.00 95th 2.00 99th 2.00\n\
         \n\
         Output appears to be eventually consistent.\n"
    );
}

#[test]
fn analyze_rejects_malformed_record() {
    let mut out = Vec::new();
    let result = run::analyze_records(
        Cursor::new("0 10 write [1] [1] success\n"),
        &mut out,
        CheckOptions::default(),
        false,
        false,
        false,
    );
    assert!(matches!(result, Err(CliError::Parse(err)) if err.line == 1));
}

#[test]
fn analyze_json_round_trips_through_serde_json() {
    let mut out = Vec::new();
    run::analyze_records(
        Cursor::new(RECORD_LOG),
        &mut out,
        CheckOptions::default(),
        false,
        false,
        true,
    )
    .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(json["consistency"]["verdict"], "Eventual");
    assert_eq!(json["operations"]["writes"], 2);
}

#[test]
fn oracle_over_message_log() {
    let mut out = Vec::new();
    let report = run::oracle_messages(
        Cursor::new(NUMERIC_LOG),
        &mut out,
        DialectMode::Auto,
        CheckOptions::default(),
        false,
    )
    .unwrap();
    assert_eq!(report.operations, 3);
    assert_eq!(report.consistency.verdict, Verdict::Neither);
    assert!(output(out).ends_with(
        "\nOutput appears to be neither strongly consistent nor eventually consistent.\n"
    ));
}

#[test]
fn generate_writes_history_and_log_files() {
    let dir = std::env::temp_dir().join(format!("kvcheck-generate-{}", std::process::id()));
    let args = GenerateArgs {
        n_hist: 2,
        n_client: 2,
        n_key: 2,
        n_op: 5,
        write_ratio: 0.5,
        stale_ratio: 0.0,
        seed: Some(3),
        format: FormatArg::Records,
        output_dir: dir.clone(),
    };
    assert_eq!(run::generate(&args).unwrap(), 2);

    let log = std::fs::read_to_string(dir.join("1.log")).unwrap();
    let mut out = Vec::new();
    let report = run::analyze_records(
        Cursor::new(log),
        &mut out,
        CheckOptions::default(),
        false,
        false,
        false,
    )
    .unwrap();
    assert_eq!(report.operations.reads + report.operations.writes, 2 + 2 * 5);
    assert_eq!(report.consistency.verdict, Verdict::Strong);
    assert!(dir.join("0.json").exists());
    std::fs::remove_dir_all(dir).unwrap();
}

#[test]
fn generate_rejects_ratios_outside_unit_interval() {
    let parse = |ratio: &str| {
        App::try_parse_from([
            "kvcheck",
            "generate",
            "--n-hist",
            "1",
            "--n-client",
            "1",
            "--n-key",
            "1",
            "--n-op",
            "3",
            "--output-dir",
            "out",
            "--write-ratio",
            ratio,
        ])
    };
    for ratio in ["NaN", "inf", "-0.1", "1.5", "half"] {
        assert!(parse(ratio).is_err(), "{ratio}");
    }
    let Command::Generate(args) = parse("0.25").unwrap().command else {
        panic!("expected the generate command");
    };
    assert!((args.write_ratio - 0.25).abs() < f64::EPSILON);
    assert!(args.stale_ratio.abs() < f64::EPSILON);
}

#[test]
fn stats_reports_unexpected_message_then_the_line() {
    let line = "1000 sent {Id:4 Src:1 Dest:0 DemuxKey:heartbeat Key:[1] Value:[] Ok:true}";
    let mut out = Vec::new();
    let report = run::message_stats(
        Cursor::new(format!("{line}\n")),
        &mut out,
        DialectMode::Auto,
        false,
    )
    .unwrap();
    assert_eq!(report.anomalies.len(), 1);
    assert!(output(out).starts_with(&format!("Unexpected output:\n{line}\nTime taken")));
}
