use std::path::Path;
use std::thread;

use anyhow::{Context, Result};
use crossbeam_channel::unbounded;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use regex::Regex;
use tracing::{debug, warn};

use super::config::{EvalConfig, FrameMode};
use crate::error::{EvalError, EvalResult};
use crate::extract::{DocumentExtractor, ExtractedDocument, structural_tokens};
use crate::geometry::{Point, Polygon, bounding_rectangle, filter_by_polygon};
use crate::metrics::TextSample;
use crate::model::{EvaluationRecord, GroundtruthCandidatePair, PairFailure, TextItem};

pub type PairOutcome = std::result::Result<EvaluationRecord, PairFailure>;

/// `_<x0>x<y0>_<x1>x<y1>` in a groundtruth file name.
const FRAME_IN_NAME_PATTERN: &str = r"_(\d+)x(\d+)_(\d+)x(\d+)";

/// Evaluates every pair on a dedicated pool. Workers send finished records
/// or failures over a channel; the calling thread collects them.
pub fn evaluate_all(
    pairs: &[GroundtruthCandidatePair],
    config: &EvalConfig,
    extractor: &dyn DocumentExtractor,
) -> Result<Vec<PairOutcome>> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(config.workers)
        .thread_name(|index| format!("digital-eval-{index}"))
        .build()
        .context("failed to build evaluation worker pool")?;
    let frame_pattern =
        Regex::new(FRAME_IN_NAME_PATTERN).context("failed to compile frame filename regex")?;
    let context = PairContext {
        config,
        extractor,
        frame_pattern: &frame_pattern,
    };

    let total = pairs.len();
    let (tx, rx) = unbounded::<PairOutcome>();
    let mut outcomes = Vec::with_capacity(total);

    thread::scope(|scope| {
        let context = &context;
        scope.spawn(move || {
            pool.install(|| {
                pairs.par_iter().for_each_with(tx, |tx, pair| {
                    // receiver only goes away when the coordinator is gone
                    let _ = tx.send(context.evaluate(pair));
                });
            });
        });

        for outcome in rx.iter() {
            match &outcome {
                Ok(record) => debug!(
                    done = outcomes.len() + 1,
                    total,
                    groundtruth = %record.pair.groundtruth.display(),
                    "evaluated pair"
                ),
                Err(failure) => warn!(
                    groundtruth = %failure.groundtruth.display(),
                    kind = failure.kind,
                    reason = %failure.reason,
                    "pair excluded"
                ),
            }
            outcomes.push(outcome);
        }
    });

    outcomes.sort_by(|a, b| groundtruth_of(a).cmp(groundtruth_of(b)));
    Ok(outcomes)
}

fn groundtruth_of(outcome: &PairOutcome) -> &Path {
    match outcome {
        Ok(record) => &record.pair.groundtruth,
        Err(failure) => &failure.groundtruth,
    }
}

struct PairContext<'a> {
    config: &'a EvalConfig,
    extractor: &'a dyn DocumentExtractor,
    frame_pattern: &'a Regex,
}

impl PairContext<'_> {
    fn evaluate(&self, pair: &GroundtruthCandidatePair) -> PairOutcome {
        self.evaluate_inner(pair).map_err(|err| PairFailure {
            groundtruth: pair.groundtruth.clone(),
            candidate: pair.candidate.clone(),
            kind: err.kind(),
            reason: err.to_string(),
        })
    }

    fn evaluate_inner(&self, pair: &GroundtruthCandidatePair) -> EvalResult<EvaluationRecord> {
        let groundtruth = self.extractor.extract(&pair.groundtruth)?;
        let candidate = self.extractor.extract(&pair.candidate)?;

        let (reference, candidate, skipped_items) = match &self.config.frame {
            FrameMode::Whole => (whole_sample(&groundtruth), whole_sample(&candidate), 0),
            FrameMode::Fixed { polygon } => {
                let (reference, skipped_reference) =
                    framed_sample(&groundtruth, &pair.groundtruth, polygon)?;
                let (candidate, skipped_candidate) =
                    framed_sample(&candidate, &pair.candidate, polygon)?;
                (reference, candidate, skipped_reference + skipped_candidate)
            }
            FrameMode::FromGroundtruth => match self.groundtruth_frame(pair, &groundtruth)? {
                Some(polygon) => {
                    let (candidate, skipped) =
                        framed_sample(&candidate, &pair.candidate, &polygon)?;
                    (whole_sample(&groundtruth), candidate, skipped)
                }
                // empty reference, every result ends up invalid
                None => (whole_sample(&groundtruth), whole_sample(&candidate), 0),
            },
        };

        if skipped_items > 0 {
            debug!(
                groundtruth = %pair.groundtruth.display(),
                skipped_items,
                "items without usable geometry left out"
            );
        }
        if reference.text.trim().is_empty() {
            debug!(groundtruth = %pair.groundtruth.display(), "empty reference");
        }

        let outcome = self.config.metric_set.compute(&reference, &candidate);
        Ok(EvaluationRecord {
            pair: pair.clone(),
            results: outcome.results,
            metric_failures: outcome.failures,
            skipped_items,
        })
    }

    /// Frame from the groundtruth file name, else the hull of its items.
    /// `None` when the groundtruth has no items to derive a frame from.
    fn groundtruth_frame(
        &self,
        pair: &GroundtruthCandidatePair,
        groundtruth: &ExtractedDocument,
    ) -> EvalResult<Option<Polygon>> {
        let name = pair
            .groundtruth
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        if let Some(captures) = self.frame_pattern.captures(name) {
            let coordinate = |index: usize| -> EvalResult<f64> {
                captures[index]
                    .parse::<f64>()
                    .map_err(|err| EvalError::InvalidGeometry(format!("{name}: {err}")))
            };
            return Ok(Some(Polygon::rectangle(
                Point::new(coordinate(1)?, coordinate(2)?),
                Point::new(coordinate(3)?, coordinate(4)?),
            )));
        }

        let items = located_items(groundtruth, &pair.groundtruth)?;
        if items.is_empty() {
            return Ok(None);
        }
        bounding_rectangle(items)
            .map(Some)
            .ok_or_else(|| EvalError::MissingGeometry {
                path: pair.groundtruth.clone(),
            })
    }
}

fn whole_sample(document: &ExtractedDocument) -> TextSample {
    TextSample {
        tokens: document.structural_tokens(),
        ..TextSample::plain(document.text.clone())
    }
}

fn framed_sample(
    document: &ExtractedDocument,
    path: &Path,
    polygon: &Polygon,
) -> EvalResult<(TextSample, usize)> {
    let items = located_items(document, path)?;
    let filtered = filter_by_polygon(items, polygon)?;
    let sample = TextSample {
        tokens: structural_tokens(&filtered.retained),
        ..TextSample::plain(filtered.text())
    };
    Ok((sample, filtered.skipped.len()))
}

/// Items of a document that records geometry. Fails for plain text and for
/// structured documents where no item carries a polygon.
fn located_items<'a>(document: &'a ExtractedDocument, path: &Path) -> EvalResult<&'a [TextItem]> {
    let missing = || EvalError::MissingGeometry {
        path: path.to_path_buf(),
    };
    let items = document.items.as_deref().ok_or_else(missing)?;
    if !items.is_empty() && items.iter().all(|item| item.geometry.len() < 3) {
        return Err(missing());
    }
    Ok(items)
}
