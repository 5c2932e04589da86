use std::path::PathBuf;

use serde::Serialize;

use crate::geometry::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Word,
    Line,
    Region,
}

/// A unit of recognized text with its outline in page coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextItem {
    pub text: String,
    pub granularity: Granularity,
    /// Index of the source line the item belongs to, in reading order.
    pub line: usize,
    pub geometry: Vec<Point>,
}

impl TextItem {
    pub fn new(
        text: impl Into<String>,
        granularity: Granularity,
        line: usize,
        geometry: Vec<Point>,
    ) -> Self {
        Self {
            text: text.into(),
            granularity,
            line,
            geometry,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroundtruthType {
    Article,
    Announcement,
}

impl GroundtruthType {
    pub fn from_label(label: &str) -> Option<Self> {
        if label.starts_with("art") {
            Some(Self::Article)
        } else if label.starts_with("ann") {
            Some(Self::Announcement)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Announcement => "announcement",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroundtruthCandidatePair {
    pub stem: String,
    pub groundtruth: PathBuf,
    pub candidate: PathBuf,
    /// Directory names between the groundtruth root and the file.
    pub segments: Vec<String>,
    pub gt_type: Option<GroundtruthType>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AmbiguousMatch {
    pub groundtruth: PathBuf,
    pub candidates: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MatchOutcome {
    pub pairs: Vec<GroundtruthCandidatePair>,
    pub unmatched_groundtruth: Vec<PathBuf>,
    pub unmatched_candidates: Vec<PathBuf>,
    pub ambiguous: Vec<AmbiguousMatch>,
    /// Candidates paired with more than one groundtruth file.
    pub shared_candidates: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum MetricId {
    Cs,
    Ls,
    Ws,
    BoW,
    IRPre,
    IRRec,
    IRFMeasure,
}

impl MetricId {
    pub fn label(self) -> &'static str {
        match self {
            Self::Cs => "Cs",
            Self::Ls => "Ls",
            Self::Ws => "Ws",
            Self::BoW => "BoW",
            Self::IRPre => "IRPre",
            Self::IRRec => "IRRec",
            Self::IRFMeasure => "IRFMeasure",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "Cs" | "Characters" => Some(Self::Cs),
            "Ls" | "Letters" => Some(Self::Ls),
            "Ws" | "Words" => Some(Self::Ws),
            "BoW" | "BoWs" | "BagOfWords" => Some(Self::BoW),
            "IRPre" | "Pre" | "Precision" => Some(Self::IRPre),
            "IRRec" | "Rec" | "Recall" => Some(Self::IRRec),
            "IRFMeasure" | "FM" | "FMeasure" => Some(Self::IRFMeasure),
            _ => None,
        }
    }

    pub fn is_information_retrieval(self) -> bool {
        matches!(self, Self::IRPre | Self::IRRec | Self::IRFMeasure)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricResult {
    pub metric: MetricId,
    pub value: f64,
    pub reference_magnitude: usize,
    pub valid: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricFailure {
    pub metric: MetricId,
    pub kind: &'static str,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationRecord {
    pub pair: GroundtruthCandidatePair,
    pub results: Vec<MetricResult>,
    pub metric_failures: Vec<MetricFailure>,
    /// Items left out of a geometric comparison because of degenerate outlines.
    pub skipped_items: usize,
}

impl EvaluationRecord {
    pub fn result(&self, metric: MetricId) -> Option<&MetricResult> {
        self.results.iter().find(|result| result.metric == metric)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PairFailure {
    pub groundtruth: PathBuf,
    pub candidate: PathBuf,
    pub kind: &'static str,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateStatistic {
    pub group: String,
    pub metric: MetricId,
    pub count: usize,
    pub reference_total: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std_dev: Option<f64>,
    pub outlier_excluded_mean: Option<f64>,
    pub outlier_count: usize,
}
