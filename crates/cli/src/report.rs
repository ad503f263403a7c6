//! JSON report shapes of the subcommands.

use kvcheck_core::consistency::report::ConsistencyReport;
use kvcheck_core::history::correlate::{Anomaly, Correlation};
use kvcheck_core::history::types::Operation;
use kvcheck_core::history::write_history::WriteHistory;
use kvcheck_core::stats::{AnnotationCounts, LatencySummary, MessageStats, OperationStats};
use kvcheck_core::{check, CheckOptions};
use schemars::JsonSchema;
use serde::Serialize;

/// Report of `kvcheck analyze`.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct AnalysisReport {
    pub operations: OperationStats,
    pub read_latency: Option<LatencySummary>,
    pub write_latency: Option<LatencySummary>,
    pub annotations: AnnotationCounts,
    pub consistency: ConsistencyReport,
}

impl AnalysisReport {
    #[must_use]
    pub fn new(operations: &[Operation], annotations: AnnotationCounts, options: CheckOptions) -> Self {
        let stats = OperationStats::from_operations(operations);
        let history = WriteHistory::from_operations(operations);
        Self {
            read_latency: stats.read_latency(),
            write_latency: stats.write_latency(),
            operations: stats,
            annotations,
            consistency: check(operations, &history, options),
        }
    }
}

/// Report of `kvcheck stats`.
#[derive(Debug, Clone, Serialize)]
pub struct MessageReport {
    pub stats: MessageStats,
    pub read_latency: Option<LatencySummary>,
    pub write_latency: Option<LatencySummary>,
    pub annotations: AnnotationCounts,
    pub anomalies: Vec<Anomaly>,
    /// Requests that never got a response.
    pub unanswered: usize,
}

impl MessageReport {
    #[must_use]
    pub fn new(correlation: &Correlation, annotations: AnnotationCounts) -> Self {
        Self {
            stats: correlation.stats.clone(),
            read_latency: correlation.stats.read_latency(),
            write_latency: correlation.stats.write_latency(),
            annotations,
            anomalies: correlation.anomalies.clone(),
            unanswered: correlation.unanswered,
        }
    }
}

/// Report of `kvcheck oracle`.
#[derive(Debug, Clone, Serialize)]
pub struct OracleReport {
    #[serde(flatten)]
    pub messages: MessageReport,
    /// Operations correlated from the log, including unanswered requests.
    pub operations: usize,
    pub consistency: ConsistencyReport,
}
