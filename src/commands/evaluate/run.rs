use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use super::aggregate::aggregate;
use super::config::EvalConfig;
use super::report::{EvaluationReport, Exclusions, write_text_report};
use super::runner::evaluate_all;
use crate::cli::EvaluateArgs;
use crate::error::EvalError;
use crate::extract::{DocumentExtractor, FileExtractor};
use crate::matching::match_files;
use crate::util::{ensure_existing_directory, write_json_pretty};

pub fn run(args: EvaluateArgs) -> Result<()> {
    ensure_existing_directory(&args.reference, "groundtruth")?;
    ensure_existing_directory(&args.candidates, "candidate")?;

    let config = EvalConfig::from_args(&args)?;
    info!(
        groundtruth = %config.groundtruth_root.display(),
        candidates = %config.candidate_root.display(),
        workers = config.workers,
        normalization = config.metric_set.form().as_str(),
        "starting evaluation"
    );

    let report = evaluate(config, &FileExtractor)?;

    if let Some(report_path) = &args.report_path {
        write_json_pretty(report_path, &report)?;
        info!(path = %report_path.display(), "wrote evaluation report");
    }

    let mut output = io::BufWriter::new(io::stdout().lock());
    if args.json {
        serde_json::to_writer_pretty(&mut output, &report)
            .context("failed to serialize evaluation report")?;
        writeln!(output)?;
    } else {
        write_text_report(&mut output, &report, args.verbose)
            .context("failed to write evaluation report")?;
    }
    output.flush()?;

    info!(
        evaluated = report.pairs_evaluated,
        excluded = report.pairs_total - report.pairs_evaluated,
        "evaluation completed"
    );
    Ok(())
}

/// Matches, evaluates and aggregates one run; per-pair problems end up in
/// the report, only configuration problems are returned as errors.
pub fn evaluate(config: EvalConfig, extractor: &dyn DocumentExtractor) -> Result<EvaluationReport> {
    let matching = match_files(
        &config.groundtruth_root,
        &config.candidate_root,
        &config.gt_suffix,
    )
    .context("failed to match groundtruth and candidate files")?;

    info!(
        pairs = matching.pairs.len(),
        unmatched_groundtruth = matching.unmatched_groundtruth.len(),
        unmatched_candidates = matching.unmatched_candidates.len(),
        ambiguous = matching.ambiguous.len(),
        "matched files"
    );
    for ambiguous in &matching.ambiguous {
        let err = EvalError::AmbiguousMatch {
            groundtruth: ambiguous.groundtruth.clone(),
            candidates: ambiguous.candidates.clone(),
        };
        warn!(kind = err.kind(), error = %err, "pair excluded");
    }
    for path in matching
        .unmatched_groundtruth
        .iter()
        .chain(&matching.unmatched_candidates)
    {
        let err = EvalError::UnmatchedFile { path: path.clone() };
        debug!(kind = err.kind(), error = %err, "file excluded");
    }

    let outcomes = evaluate_all(&matching.pairs, &config, extractor)?;
    let mut records = Vec::with_capacity(outcomes.len());
    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(record) => records.push(record),
            Err(failure) => failures.push(failure),
        }
    }

    let statistics = aggregate(
        &records,
        config.metric_set.metrics(),
        &config.root_label,
        config.grouping_depth,
    );
    let exclusions = Exclusions::collect(matching, &records, &failures);

    Ok(EvaluationReport::new(
        config, statistics, exclusions, records, failures,
    ))
}
