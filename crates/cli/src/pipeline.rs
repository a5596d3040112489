//! One ETL run: extract every source, merge, transform, load.
//!
//! Sources and the warehouse come in as trait objects so the run can be
//! driven against fixtures or a recording sink. Nothing here raises: every
//! problem ends up as a [`Diagnostic`] and the run resolves to one [`Outcome`].

use serde::Serialize;

use ordermart_config::PipelineOptions;
use ordermart_engine::{merge, summarize, transform, DeliverySummary, StarSchema};
use ordermart_io::{extract, Extraction, LoadReport, OrderSource, SourceError, Warehouse};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Fact table written. Dimension or verification problems may still be
    /// listed as diagnostics.
    Success,
    /// Warehouse unreachable or fact write failed.
    Failed,
    /// No source produced rows; transform and load were skipped.
    NoData,
    /// A source query failed under `strict_sources`.
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Extract,
    Merge,
    Transform,
    Load,
}

#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub level: Level,
    pub stage: Stage,
    pub message: String,
}

/// Rows contributed by one source.
#[derive(Debug, Clone, Serialize)]
pub struct SourceCount {
    pub source: String,
    pub rows: usize,
    /// Rows dropped by the reader for lacking a usable order id.
    pub skipped: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Row counts of the star schema handed to the loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StarCounts {
    pub fact: usize,
    pub dim_date: Option<usize>,
    pub dim_employee: Option<usize>,
    pub dim_customer: Option<usize>,
}

impl StarCounts {
    fn of(star: &StarSchema) -> Self {
        Self {
            fact: star.fact.len(),
            dim_date: star.dim_date.as_ref().map(Vec::len),
            dim_employee: star.dim_employee.as_ref().map(Vec::len),
            dim_customer: star.dim_customer.as_ref().map(Vec::len),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub outcome: Outcome,
    pub sources: Vec<SourceCount>,
    pub merged_rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub star: Option<StarCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<DeliverySummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load: Option<LoadReport>,
    pub diagnostics: Vec<Diagnostic>,
    /// The transformed bundle, kept for callers that export it.
    #[serde(skip)]
    pub schema: Option<StarSchema>,
}

impl PipelineReport {
    fn new() -> Self {
        Self {
            outcome: Outcome::Failed,
            sources: Vec::new(),
            merged_rows: 0,
            star: None,
            summary: None,
            load: None,
            diagnostics: Vec::new(),
            schema: None,
        }
    }

    fn diagnose(&mut self, level: Level, stage: Stage, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic { level, stage, message: message.into() });
    }

    fn finish(mut self, outcome: Outcome) -> Self {
        tracing::info!(outcome = ?outcome, diagnostics = self.diagnostics.len(), "pipeline finished");
        self.outcome = outcome;
        self
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Run the full pipeline once. Sources are extracted in order.
pub fn run_pipeline(
    sources: &[&dyn OrderSource],
    warehouse: &mut dyn Warehouse,
    options: &PipelineOptions,
) -> PipelineReport {
    let mut report = PipelineReport::new();

    // Extract
    let mut sets = Vec::with_capacity(sources.len());
    for source in sources {
        let Extraction { rows, error } = extract(*source);
        report.sources.push(SourceCount {
            source: rows.source.clone(),
            rows: rows.len(),
            skipped: rows.skipped,
            error: error.as_ref().map(ToString::to_string),
        });

        if rows.skipped > 0 {
            report.diagnose(
                Level::Warn,
                Stage::Extract,
                format!("{}: {} row(s) without a usable order id skipped", rows.source, rows.skipped),
            );
        }

        if let Some(err) = error {
            let query_failed = matches!(err, SourceError::QueryFailed { .. });
            let level = if query_failed { Level::Error } else { Level::Warn };
            report.diagnose(level, Stage::Extract, err.to_string());

            if query_failed && options.strict_sources {
                tracing::error!(source = source.tag(), "source query failed with strict_sources set, aborting");
                report.diagnose(Level::Error, Stage::Extract, "aborted: strict_sources is set");
                return report.finish(Outcome::Aborted);
            }
        }
        sets.push(rows);
    }

    // Merge
    let merged = merge(sets);
    report.merged_rows = merged.len();
    if merged.is_empty() {
        report.diagnose(Level::Error, Stage::Merge, "no rows extracted from any source");
        return report.finish(Outcome::NoData);
    }
    let duplicates = merged.duplicate_order_ids();
    if !duplicates.is_empty() {
        tracing::warn!(count = duplicates.len(), "order ids present more than once across sources");
        report.diagnose(
            Level::Warn,
            Stage::Merge,
            format!("{} order id(s) appear more than once; rows kept as-is", duplicates.len()),
        );
    }

    // Transform
    let star = transform(&merged);
    if star.dim_date.is_none() {
        report.diagnose(Level::Warn, Stage::Transform, "no parseable date; date dimension skipped");
    }
    report.star = Some(StarCounts::of(&star));
    report.summary = Some(summarize(&star.fact));

    // Load
    let load = warehouse.load(&star);
    for table in &load.tables {
        if let Some(err) = &table.error {
            report.diagnose(Level::Warn, Stage::Load, format!("{}: {err}", table.table));
        } else if !table.is_verified() {
            report.diagnose(
                Level::Warn,
                Stage::Load,
                format!(
                    "{}: wrote {:?} rows, counted {:?}",
                    table.table, table.rows_written, table.rows_verified
                ),
            );
        }
    }

    let outcome = if load.success {
        Outcome::Success
    } else {
        let message = load.error.clone().unwrap_or_else(|| "warehouse load failed".to_string());
        report.diagnose(Level::Error, Stage::Load, message);
        Outcome::Failed
    };

    report.load = Some(load);
    report.schema = Some(star);
    report.finish(outcome)
}
