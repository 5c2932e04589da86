use std::collections::HashSet;

use super::stopwords::StopwordSet;

/// Precision and recall over stopword-filtered token sets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Retrieval {
    pub precision: f64,
    pub recall: f64,
    /// Size of the filtered reference set.
    pub relevant: usize,
}

impl Retrieval {
    pub fn compute(reference: &[String], candidate: &[String], stopwords: &StopwordSet) -> Self {
        let relevant = filtered_set(reference, stopwords);
        let retrieved = filtered_set(candidate, stopwords);
        let hits = relevant.intersection(&retrieved).count() as f64;

        let precision = if retrieved.is_empty() {
            0.0
        } else {
            hits / retrieved.len() as f64
        };
        let recall = if relevant.is_empty() {
            0.0
        } else {
            hits / relevant.len() as f64
        };

        Self {
            precision,
            recall,
            relevant: relevant.len(),
        }
    }

    /// Harmonic mean of precision and recall, zero when both are zero.
    pub fn f_measure(&self) -> f64 {
        let sum = self.precision + self.recall;
        if sum == 0.0 {
            0.0
        } else {
            2.0 * self.precision * self.recall / sum
        }
    }
}

fn filtered_set<'a>(tokens: &'a [String], stopwords: &StopwordSet) -> HashSet<&'a str> {
    tokens
        .iter()
        .map(String::as_str)
        .filter(|token| !stopwords.contains(token))
        .collect()
}
