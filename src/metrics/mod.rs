//! Pairwise similarity between a reference text and a candidate text.
//!
//! Every metric reads the view of the text its class needs (characters,
//! letters or tokens), after the configured Unicode normalization. Results
//! against an empty reference view are marked invalid instead of failing.

use clap::ValueEnum;
use serde::Serialize;

use crate::error::EvalError;
use crate::model::{MetricFailure, MetricId, MetricResult};
use crate::normalize::{
    NormalizationForm, normalize, to_character_sequence, to_letter_sequence, to_token_sequence,
};

mod bag_of_words;
mod edit_distance;
mod retrieval;
pub mod stopwords;
#[cfg(test)]
mod tests;

pub use bag_of_words::bag_of_words_similarity;
pub use edit_distance::edit_similarity;
pub use retrieval::Retrieval;
pub use stopwords::{StopwordLookup, StopwordSet};

/// Text of one side of a pair, optionally with tokens taken from the
/// document structure instead of whitespace splitting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextSample {
    pub text: String,
    pub tokens: Option<Vec<String>>,
}

impl TextSample {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tokens: None,
        }
    }
}

struct Views {
    characters: Vec<char>,
    letters: Vec<char>,
    tokens: Vec<String>,
}

impl Views {
    fn build(sample: &TextSample, form: NormalizationForm) -> Self {
        let text = normalize(&sample.text, form);
        let tokens = match &sample.tokens {
            Some(tokens) => tokens
                .iter()
                .map(|token| normalize(token.trim(), form))
                .filter(|token| !token.is_empty())
                .collect(),
            None => to_token_sequence(&text),
        };
        Self {
            characters: to_character_sequence(&text),
            letters: to_letter_sequence(&text),
            tokens,
        }
    }
}

/// Whether the edit distance and bag of words classes report the share of
/// the reference that survived or the share that was lost.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Calculation {
    #[default]
    #[value(alias = "acc")]
    Accuracy,
    #[value(alias = "err")]
    Error,
}

impl Calculation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accuracy => "accuracy",
            Self::Error => "error",
        }
    }

    /// Retrieval scores are left as they are.
    fn apply(self, metric: MetricId, accuracy: f64) -> f64 {
        match self {
            Self::Error if !metric.is_information_retrieval() => 1.0 - accuracy,
            _ => accuracy,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MetricOutcome {
    pub results: Vec<MetricResult>,
    pub failures: Vec<MetricFailure>,
}

/// The configured metrics plus everything they need, shared read-only by
/// every worker of a run.
#[derive(Debug, Clone, Serialize)]
pub struct MetricSet {
    metrics: Vec<MetricId>,
    form: NormalizationForm,
    calculation: Calculation,
    language: String,
    #[serde(skip)]
    stopwords: Option<StopwordSet>,
}

impl MetricSet {
    /// `stopwords` is `None` when no list exists for `language`; the
    /// information retrieval metrics then fail per pair.
    pub fn new(
        metrics: Vec<MetricId>,
        form: NormalizationForm,
        language: impl Into<String>,
        stopwords: Option<StopwordSet>,
    ) -> Self {
        Self {
            metrics,
            form,
            calculation: Calculation::default(),
            language: language.into(),
            stopwords,
        }
    }

    pub fn with_calculation(mut self, calculation: Calculation) -> Self {
        self.calculation = calculation;
        self
    }

    pub fn metrics(&self) -> &[MetricId] {
        &self.metrics
    }

    pub fn form(&self) -> NormalizationForm {
        self.form
    }

    pub fn calculation(&self) -> Calculation {
        self.calculation
    }

    pub fn compute(&self, reference: &TextSample, candidate: &TextSample) -> MetricOutcome {
        let reference = Views::build(reference, self.form);
        let candidate = Views::build(candidate, self.form);

        let retrieval = self
            .stopwords
            .as_ref()
            .filter(|_| self.metrics.iter().any(|metric| metric.is_information_retrieval()))
            .map(|stopwords| Retrieval::compute(&reference.tokens, &candidate.tokens, stopwords));

        let mut outcome = MetricOutcome::default();
        for &metric in &self.metrics {
            let (value, magnitude) = match metric {
                MetricId::Cs => (
                    edit_similarity(&reference.characters, &candidate.characters),
                    reference.characters.len(),
                ),
                MetricId::Ls => (
                    edit_similarity(&reference.letters, &candidate.letters),
                    reference.letters.len(),
                ),
                MetricId::Ws => (
                    edit_similarity(&reference.tokens, &candidate.tokens),
                    reference.tokens.len(),
                ),
                MetricId::BoW => (
                    bag_of_words_similarity(&reference.tokens, &candidate.tokens),
                    reference.tokens.len(),
                ),
                MetricId::IRPre | MetricId::IRRec | MetricId::IRFMeasure => {
                    let Some(retrieval) = retrieval else {
                        let err = EvalError::UnsupportedLanguage(self.language.clone());
                        outcome.failures.push(MetricFailure {
                            metric,
                            kind: err.kind(),
                            reason: err.to_string(),
                        });
                        continue;
                    };
                    let value = match metric {
                        MetricId::IRPre => retrieval.precision,
                        MetricId::IRRec => retrieval.recall,
                        _ => retrieval.f_measure(),
                    };
                    (value, retrieval.relevant)
                }
            };

            let valid = magnitude > 0;
            outcome.results.push(MetricResult {
                metric,
                value: if valid {
                    self.calculation.apply(metric, value)
                } else {
                    0.0
                },
                reference_magnitude: magnitude,
                valid,
            });
        }
        outcome
    }
}
