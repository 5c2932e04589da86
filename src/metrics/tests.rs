use super::*;

const ALL_METRICS: [MetricId; 7] = [
    MetricId::Cs,
    MetricId::Ls,
    MetricId::Ws,
    MetricId::BoW,
    MetricId::IRPre,
    MetricId::IRRec,
    MetricId::IRFMeasure,
];

fn german_set() -> MetricSet {
    let stopwords = StopwordLookup::default().resolve("deu").unwrap();
    MetricSet::new(
        ALL_METRICS.to_vec(),
        NormalizationForm::Nfc,
        "deu",
        Some(stopwords),
    )
}

fn value(outcome: &MetricOutcome, metric: MetricId) -> &MetricResult {
    outcome
        .results
        .iter()
        .find(|result| result.metric == metric)
        .unwrap()
}

#[test]
fn identical_texts_score_one_everywhere() {
    let text = TextSample::plain("Die Zeitung erschien am 12. März 1899 in Halle.");
    let outcome = german_set().compute(&text, &text);

    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.results.len(), ALL_METRICS.len());
    for result in &outcome.results {
        assert!(result.valid, "{:?}", result.metric);
        assert_eq!(result.value, 1.0, "{:?}", result.metric);
    }
}

#[test]
fn empty_candidate_scores_zero_but_stays_valid() {
    let reference = TextSample::plain("Die Zeitung erschien in Halle");
    let outcome = german_set().compute(&reference, &TextSample::plain(""));

    for metric in [
        MetricId::Cs,
        MetricId::Ls,
        MetricId::Ws,
        MetricId::BoW,
        MetricId::IRPre,
        MetricId::IRRec,
    ] {
        let result = value(&outcome, metric);
        assert!(result.valid, "{metric:?}");
        assert_eq!(result.value, 0.0, "{metric:?}");
    }
}

#[test]
fn empty_reference_invalidates_every_metric() {
    for reference in ["", "  \n "] {
        let outcome =
            german_set().compute(&TextSample::plain(reference), &TextSample::plain("Zeitung"));
        assert!(outcome.failures.is_empty());
        assert!(outcome.results.iter().all(|result| !result.valid));
    }
}

#[test]
fn magnitudes_follow_each_metric_class() {
    let reference = TextSample::plain("Nr. 12 der Zeitung");
    let outcome = german_set().compute(&reference, &reference);

    assert_eq!(value(&outcome, MetricId::Cs).reference_magnitude, 15);
    assert_eq!(value(&outcome, MetricId::Ls).reference_magnitude, 12);
    assert_eq!(value(&outcome, MetricId::Ws).reference_magnitude, 4);
    assert_eq!(value(&outcome, MetricId::BoW).reference_magnitude, 4);
    // "der" is a stopword
    assert_eq!(value(&outcome, MetricId::IRRec).reference_magnitude, 3);
}

#[test]
fn digits_only_reference_invalidates_letter_metric_alone() {
    let reference = TextSample::plain("1899");
    let outcome = german_set().compute(&reference, &TextSample::plain("1898"));

    assert!(!value(&outcome, MetricId::Ls).valid);
    let characters = value(&outcome, MetricId::Cs);
    assert!(characters.valid);
    assert_eq!(characters.value, 0.75);
}

#[test]
fn missing_stopwords_fail_only_retrieval_metrics() {
    let set = MetricSet::new(ALL_METRICS.to_vec(), NormalizationForm::Nfc, "xyz", None);
    let text = TextSample::plain("Zeitung");
    let outcome = set.compute(&text, &text);

    assert_eq!(outcome.results.len(), 4);
    assert_eq!(outcome.failures.len(), 3);
    assert!(outcome
        .failures
        .iter()
        .all(|failure| failure.kind == "unsupported_language" && failure.metric.is_information_retrieval()));
}

#[test]
fn normalization_form_decides_combining_sequences() {
    let reference = TextSample::plain("caf\u{e9}");
    let candidate = TextSample::plain("cafe\u{301}");

    let nfc = MetricSet::new(vec![MetricId::Cs], NormalizationForm::Nfc, "deu", None);
    assert_eq!(nfc.compute(&reference, &candidate).results[0].value, 1.0);

    let nfd = MetricSet::new(vec![MetricId::Cs], NormalizationForm::Nfd, "deu", None);
    let decomposed = nfd.compute(&reference, &candidate).results[0];
    assert_eq!(decomposed.value, 1.0);
    assert_eq!(decomposed.reference_magnitude, 5);
}

#[test]
fn structural_tokens_replace_whitespace_splitting() {
    let reference = TextSample {
        text: "New York liegt".into(),
        tokens: Some(vec!["New York".into(), "liegt".into()]),
    };
    let candidate = TextSample {
        text: "New York liegt".into(),
        tokens: Some(vec!["New".into(), "York".into(), "liegt".into()]),
    };

    let set = MetricSet::new(vec![MetricId::Ws], NormalizationForm::Nfc, "deu", None);
    let result = set.compute(&reference, &candidate).results[0];
    assert_eq!(result.reference_magnitude, 2);
    assert_eq!(result.value, 0.0);
}

#[test]
fn error_calculation_complements_similarity_metrics_only() {
    let reference = TextSample::plain("abcd Mann");
    let candidate = TextSample::plain("abed Mann");

    let accuracy = german_set().compute(&reference, &candidate);
    let error = german_set()
        .with_calculation(Calculation::Error)
        .compute(&reference, &candidate);

    assert_eq!(value(&accuracy, MetricId::Cs).value, 7.0 / 8.0);
    assert_eq!(value(&error, MetricId::Cs).value, 1.0 / 8.0);
    assert_eq!(value(&error, MetricId::Ws).value, 0.5);
    assert_eq!(value(&error, MetricId::BoW).value, 0.5);
    for metric in [MetricId::IRPre, MetricId::IRRec, MetricId::IRFMeasure] {
        assert_eq!(value(&error, metric).value, value(&accuracy, metric).value);
    }
}

#[test]
fn error_calculation_caps_at_one_and_keeps_invalid_results_at_zero() {
    let set = MetricSet::new(vec![MetricId::Cs], NormalizationForm::Nfc, "deu", None)
        .with_calculation(Calculation::Error);

    let noisy = set.compute(&TextSample::plain("a"), &TextSample::plain("xyzxyz"));
    assert_eq!(noisy.results[0].value, 1.0);

    let identical = set.compute(&TextSample::plain("Mann"), &TextSample::plain("Mann"));
    assert_eq!(identical.results[0].value, 0.0);

    let empty = set.compute(&TextSample::plain(""), &TextSample::plain("Mann"));
    assert!(!empty.results[0].valid);
    assert_eq!(empty.results[0].value, 0.0);
}
