use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::metrics::Calculation;
use crate::normalize::NormalizationForm;

#[derive(Parser, Debug)]
#[command(
    name = "digital-eval",
    version,
    about = "Evaluate OCR candidates against groundtruth with text similarity metrics"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Match, score and aggregate a candidate tree against a groundtruth tree
    Evaluate(EvaluateArgs),
    /// Only match files and list pairs, unmatched and ambiguous entries
    Pairs(PairsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    /// Root directory of the OCR candidates
    pub candidates: PathBuf,

    /// Root directory of the groundtruth
    #[arg(long = "reference", short = 'r')]
    pub reference: PathBuf,

    /// Comma-separated metrics: Cs, Ls, Ws, BoW, IRPre, IRRec, IRFMeasure
    #[arg(long, short = 'm', default_value = "Cs,Ls")]
    pub metrics: String,

    #[arg(long = "utf8", value_enum, default_value_t = NormalizationForm::Nfc)]
    pub normalization: NormalizationForm,

    /// Report accuracy or error rates for the edit distance and bag of words metrics
    #[arg(long = "calc", value_enum, default_value_t = Calculation::Accuracy)]
    pub calculation: Calculation,

    /// ISO 639 code selecting the stopwords of the retrieval metrics
    #[arg(long, default_value = "deu")]
    pub language: String,

    /// Directory with `<code>.txt` stopword lists
    #[arg(long)]
    pub stopwords_dir: Option<PathBuf>,

    /// Polygon as "x,y x,y ..."; two points describe a rectangle
    #[arg(long, conflicts_with = "frame_from_groundtruth")]
    pub frame: Option<String>,

    /// Restrict each candidate to the area covered by its groundtruth
    #[arg(long, default_value_t = false)]
    pub frame_from_groundtruth: bool,

    #[arg(long, default_value = ".gt")]
    pub gt_suffix: String,

    #[arg(long, default_value_t = 2)]
    pub grouping_depth: usize,

    #[arg(long, conflicts_with = "sequential")]
    pub workers: Option<usize>,

    #[arg(long, default_value_t = false)]
    pub sequential: bool,

    /// Print one line per evaluated pair
    #[arg(long, short = 'v', default_value_t = false)]
    pub verbose: bool,

    /// Print the report as JSON instead of text
    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[arg(long)]
    pub report_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct PairsArgs {
    pub candidates: PathBuf,

    #[arg(long = "reference", short = 'r')]
    pub reference: PathBuf,

    #[arg(long, default_value = ".gt")]
    pub gt_suffix: String,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}
