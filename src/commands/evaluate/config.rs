use std::path::{Path, PathBuf};
use std::thread;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::warn;

use crate::cli::EvaluateArgs;
use crate::error::EvalError;
use crate::geometry::Polygon;
use crate::metrics::{MetricSet, StopwordLookup};
use crate::model::MetricId;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FrameMode {
    Whole,
    /// One polygon applied to both documents of every pair.
    Fixed { polygon: Polygon },
    /// Per pair, the area of the groundtruth restricts the candidate.
    FromGroundtruth,
}

/// Read-only settings shared by every worker of one run.
#[derive(Debug, Clone, Serialize)]
pub struct EvalConfig {
    pub groundtruth_root: PathBuf,
    pub candidate_root: PathBuf,
    /// Name of the groundtruth root, the top aggregation group.
    pub root_label: String,
    pub metric_set: MetricSet,
    pub frame: FrameMode,
    pub gt_suffix: String,
    pub grouping_depth: usize,
    pub workers: usize,
}

impl EvalConfig {
    pub fn from_args(args: &EvaluateArgs) -> Result<Self> {
        let metrics = parse_metrics(&args.metrics)?;

        let language = args.language.trim().to_string();
        let lookup = StopwordLookup::new(args.stopwords_dir.clone());
        let stopwords = if metrics.iter().any(|metric| metric.is_information_retrieval()) {
            match lookup.resolve(&language) {
                Ok(stopwords) => Some(stopwords),
                Err(err @ EvalError::UnsupportedLanguage(_)) => {
                    warn!(language = %language, error = %err, "retrieval metrics will fail for every pair");
                    None
                }
                Err(err) => return Err(err).context("failed to load stopwords"),
            }
        } else {
            None
        };

        let frame = match (&args.frame, args.frame_from_groundtruth) {
            (Some(raw), _) => FrameMode::Fixed {
                polygon: Polygon::parse(raw)
                    .with_context(|| format!("invalid --frame '{raw}'"))?,
            },
            (None, true) => FrameMode::FromGroundtruth,
            (None, false) => FrameMode::Whole,
        };

        let workers = if args.sequential {
            1
        } else {
            args.workers.unwrap_or_else(default_workers).max(1)
        };

        Ok(Self {
            groundtruth_root: args.reference.clone(),
            candidate_root: args.candidates.clone(),
            root_label: root_label(&args.reference),
            metric_set: MetricSet::new(metrics, args.normalization, language, stopwords)
                .with_calculation(args.calculation),
            frame,
            gt_suffix: args.gt_suffix.clone(),
            grouping_depth: args.grouping_depth,
            workers,
        })
    }
}

/// Parses a comma-separated metric list, keeping the first occurrence of
/// each metric in the given order.
pub fn parse_metrics(raw: &str) -> Result<Vec<MetricId>> {
    let mut metrics = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|name| !name.is_empty()) {
        let Some(metric) = MetricId::parse(name) else {
            bail!("unknown metric '{name}'");
        };
        if !metrics.contains(&metric) {
            metrics.push(metric);
        }
    }
    if metrics.is_empty() {
        bail!("no metrics configured");
    }
    Ok(metrics)
}

fn default_workers() -> usize {
    thread::available_parallelism()
        .map(|count| count.get())
        .unwrap_or(1)
}

fn root_label(root: &Path) -> String {
    root.canonicalize()
        .ok()
        .as_deref()
        .unwrap_or(root)
        .file_name()
        .and_then(|name| name.to_str())
        .map_or_else(|| "root".to_string(), ToOwned::to_owned)
}
