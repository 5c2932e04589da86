use std::collections::BTreeMap;

use crate::model::{AggregateStatistic, EvaluationRecord, MetricId};

/// Rolls records up into the root group, every directory prefix of up to
/// `grouping_depth` segments and one group per groundtruth type.
pub fn aggregate(
    records: &[EvaluationRecord],
    metrics: &[MetricId],
    root_label: &str,
    grouping_depth: usize,
) -> Vec<AggregateStatistic> {
    let mut groups: BTreeMap<String, Vec<&EvaluationRecord>> = BTreeMap::new();
    groups.entry(root_label.to_string()).or_default();

    for record in records {
        for key in group_keys(record, root_label, grouping_depth) {
            groups.entry(key).or_default().push(record);
        }
    }

    let mut statistics = Vec::with_capacity(groups.len() * metrics.len());
    for (group, members) in &groups {
        for &metric in metrics {
            let samples: Vec<Sample> = members
                .iter()
                .filter_map(|record| record.result(metric))
                .filter(|result| result.valid)
                .map(|result| Sample {
                    value: result.value,
                    weight: result.reference_magnitude,
                })
                .collect();
            statistics.push(summarize(group, metric, &samples));
        }
    }
    statistics
}

pub fn group_keys(record: &EvaluationRecord, root_label: &str, grouping_depth: usize) -> Vec<String> {
    let segments = &record.pair.segments;
    let mut keys = vec![root_label.to_string()];
    for depth in 1..=grouping_depth.min(segments.len()) {
        keys.push(format!("{root_label}/{}", segments[..depth].join("/")));
    }
    if let Some(gt_type) = record.pair.gt_type {
        keys.push(format!("{root_label}@{}", gt_type.as_str()));
    }
    keys
}

#[derive(Debug, Clone, Copy)]
pub struct Sample {
    pub value: f64,
    pub weight: usize,
}

pub fn summarize(group: &str, metric: MetricId, samples: &[Sample]) -> AggregateStatistic {
    let mut statistic = AggregateStatistic {
        group: group.to_string(),
        metric,
        count: samples.len(),
        reference_total: samples.iter().map(|sample| sample.weight).sum(),
        mean: None,
        median: None,
        std_dev: None,
        outlier_excluded_mean: None,
        outlier_count: 0,
    };
    if samples.is_empty() {
        return statistic;
    }

    let mut sorted: Vec<f64> = samples.iter().map(|sample| sample.value).collect();
    sorted.sort_by(f64::total_cmp);

    let q1 = quantile(&sorted, 0.25);
    let q3 = quantile(&sorted, 0.75);
    let fence = 1.5 * (q3 - q1);
    let (lower, upper) = (q1 - fence, q3 + fence);
    let retained: Vec<Sample> = samples
        .iter()
        .copied()
        .filter(|sample| sample.value >= lower && sample.value <= upper)
        .collect();

    statistic.mean = weighted_mean(samples);
    statistic.median = Some(quantile(&sorted, 0.5));
    statistic.std_dev = Some(population_std_dev(&sorted));
    statistic.outlier_excluded_mean = weighted_mean(&retained);
    statistic.outlier_count = samples.len() - retained.len();
    statistic
}

/// Linear interpolation between closest ranks of an ascending slice.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let position = (sorted.len() - 1) as f64 * p;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// Mean weighted by reference magnitude; plain mean when all weights are zero.
fn weighted_mean(samples: &[Sample]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let total_weight: usize = samples.iter().map(|sample| sample.weight).sum();
    if total_weight == 0 {
        let sum: f64 = samples.iter().map(|sample| sample.value).sum();
        return Some(sum / samples.len() as f64);
    }
    let weighted: f64 = samples
        .iter()
        .map(|sample| sample.value * sample.weight as f64)
        .sum();
    Some(weighted / total_weight as f64)
}

fn population_std_dev(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}
