use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::config::EvalConfig;
use crate::model::{AggregateStatistic, AmbiguousMatch, EvaluationRecord, MatchOutcome, PairFailure};
use crate::util::{now_utc_string, percent, today_iso_date};

/// Everything a run left out, counted by cause, plus candidates that were
/// scored against more than one groundtruth.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Exclusions {
    pub unmatched_groundtruth: Vec<PathBuf>,
    pub unmatched_candidates: Vec<PathBuf>,
    pub ambiguous: Vec<AmbiguousMatch>,
    pub shared_candidates: Vec<PathBuf>,
    /// Failed pairs per error kind.
    pub failed_pairs: BTreeMap<&'static str, usize>,
    /// Invalid metric results (empty reference) per metric label.
    pub invalid_results: BTreeMap<&'static str, usize>,
    /// Metric failures (e.g. missing stopwords) per metric label.
    pub metric_failures: BTreeMap<&'static str, usize>,
    pub skipped_items: usize,
}

impl Exclusions {
    pub fn collect(
        matching: MatchOutcome,
        records: &[EvaluationRecord],
        failures: &[PairFailure],
    ) -> Self {
        let mut exclusions = Self {
            unmatched_groundtruth: matching.unmatched_groundtruth,
            unmatched_candidates: matching.unmatched_candidates,
            ambiguous: matching.ambiguous,
            shared_candidates: matching.shared_candidates,
            ..Self::default()
        };
        for failure in failures {
            *exclusions.failed_pairs.entry(failure.kind).or_default() += 1;
        }
        for record in records {
            exclusions.skipped_items += record.skipped_items;
            for result in record.results.iter().filter(|result| !result.valid) {
                *exclusions
                    .invalid_results
                    .entry(result.metric.label())
                    .or_default() += 1;
            }
            for failure in &record.metric_failures {
                *exclusions
                    .metric_failures
                    .entry(failure.metric.label())
                    .or_default() += 1;
            }
        }
        exclusions
    }

    fn is_empty(&self) -> bool {
        self.unmatched_groundtruth.is_empty()
            && self.unmatched_candidates.is_empty()
            && self.ambiguous.is_empty()
            && self.shared_candidates.is_empty()
            && self.failed_pairs.is_empty()
            && self.invalid_results.is_empty()
            && self.metric_failures.is_empty()
            && self.skipped_items == 0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub generated_at: String,
    pub date: String,
    pub config: EvalConfig,
    pub pairs_total: usize,
    pub pairs_evaluated: usize,
    pub statistics: Vec<AggregateStatistic>,
    pub exclusions: Exclusions,
    pub records: Vec<EvaluationRecord>,
    pub failures: Vec<PairFailure>,
}

impl EvaluationReport {
    pub fn new(
        config: EvalConfig,
        statistics: Vec<AggregateStatistic>,
        exclusions: Exclusions,
        records: Vec<EvaluationRecord>,
        failures: Vec<PairFailure>,
    ) -> Self {
        Self {
            generated_at: now_utc_string(),
            date: today_iso_date(),
            config,
            pairs_total: records.len() + failures.len(),
            pairs_evaluated: records.len(),
            statistics,
            exclusions,
            records,
            failures,
        }
    }
}

pub fn write_text_report<W: Write>(
    output: &mut W,
    report: &EvaluationReport,
    verbose: bool,
) -> io::Result<()> {
    let config = &report.config;
    writeln!(output, "digital-eval report {}", report.date)?;
    writeln!(output, "groundtruth: {}", config.groundtruth_root.display())?;
    writeln!(output, "candidates:  {}", config.candidate_root.display())?;
    writeln!(
        output,
        "pairs: {} evaluated, {} excluded, normalization {}, {}",
        report.pairs_evaluated,
        report.pairs_total - report.pairs_evaluated,
        config.metric_set.form().as_str(),
        config.metric_set.calculation().as_str()
    )?;

    if verbose {
        writeln!(output)?;
        for record in &report.records {
            write_record_line(output, &config.groundtruth_root, record)?;
        }
        for failure in &report.failures {
            writeln!(
                output,
                "{}  excluded ({}): {}",
                relative(&config.groundtruth_root, &failure.groundtruth),
                failure.kind,
                failure.reason
            )?;
        }
    }

    writeln!(output)?;
    let label_width = report
        .statistics
        .iter()
        .map(|statistic| statistic.metric.label().len() + 1 + statistic.group.len())
        .max()
        .unwrap_or(0);
    for statistic in &report.statistics {
        write_statistic(output, statistic, label_width)?;
    }

    let exclusions = &report.exclusions;
    if exclusions.is_empty() {
        return Ok(());
    }
    writeln!(output)?;
    writeln!(output, "exclusions")?;
    write_count(output, "unmatched groundtruth", exclusions.unmatched_groundtruth.len())?;
    write_count(output, "unmatched candidates", exclusions.unmatched_candidates.len())?;
    write_count(output, "ambiguous matches", exclusions.ambiguous.len())?;
    write_count(
        output,
        "candidates paired more than once",
        exclusions.shared_candidates.len(),
    )?;
    for (kind, count) in &exclusions.failed_pairs {
        writeln!(output, "  failed pairs ({kind}): {count}")?;
    }
    for (metric, count) in &exclusions.invalid_results {
        writeln!(output, "  invalid {metric} results (empty reference): {count}")?;
    }
    for (metric, count) in &exclusions.metric_failures {
        writeln!(output, "  failed {metric} results: {count}")?;
    }
    write_count(output, "items without usable geometry", exclusions.skipped_items)?;

    if verbose {
        for path in &exclusions.unmatched_groundtruth {
            writeln!(output, "  no candidate: {}", path.display())?;
        }
        for path in &exclusions.unmatched_candidates {
            writeln!(output, "  no groundtruth: {}", path.display())?;
        }
        for path in &exclusions.shared_candidates {
            writeln!(output, "  shared candidate: {}", path.display())?;
        }
        for ambiguous in &exclusions.ambiguous {
            let candidates: Vec<String> = ambiguous
                .candidates
                .iter()
                .map(|path| path.display().to_string())
                .collect();
            writeln!(
                output,
                "  ambiguous: {} -> {}",
                ambiguous.groundtruth.display(),
                candidates.join(", ")
            )?;
        }
    }
    Ok(())
}

fn write_count<W: Write>(output: &mut W, label: &str, count: usize) -> io::Result<()> {
    if count > 0 {
        writeln!(output, "  {label}: {count}")?;
    }
    Ok(())
}

fn write_record_line<W: Write>(output: &mut W, root: &Path, record: &EvaluationRecord) -> io::Result<()> {
    let values: Vec<String> = record
        .results
        .iter()
        .map(|result| {
            if result.valid {
                format!(
                    "{}:{}({})",
                    result.metric.label(),
                    percent(result.value),
                    result.reference_magnitude
                )
            } else {
                format!("{}:n.a.(0)", result.metric.label())
            }
        })
        .chain(
            record
                .metric_failures
                .iter()
                .map(|failure| format!("{}:{}", failure.metric.label(), failure.kind)),
        )
        .collect();
    writeln!(
        output,
        "{}  {}",
        relative(root, &record.pair.groundtruth),
        values.join(" ")
    )
}

fn write_statistic<W: Write>(
    output: &mut W,
    statistic: &AggregateStatistic,
    label_width: usize,
) -> io::Result<()> {
    let label = format!("{}@{}", statistic.metric.label(), statistic.group);
    let (Some(mean), Some(median)) = (statistic.mean, statistic.median) else {
        return writeln!(output, "{label:<label_width$}  {:>6} items  no data", 0);
    };

    writeln!(
        output,
        "{label:<label_width$}  {:>6} items  {:>9} refs  mean {:>6}  median {:>6}  σ {:>6}",
        statistic.count,
        statistic.reference_total,
        percent(mean),
        percent(median),
        percent(statistic.std_dev.unwrap_or_default()),
    )?;
    if let (true, Some(robust)) = (statistic.outlier_count > 0, statistic.outlier_excluded_mean) {
        writeln!(
            output,
            "{:label_width$}  {:>6} outliers dropped, mean {:>6}",
            "",
            statistic.outlier_count,
            percent(robust)
        )?;
    }
    Ok(())
}

fn relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
