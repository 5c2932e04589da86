use strsim::generic_levenshtein;

/// `1 - lev(reference, candidate) / max(|reference|, 1)`, floored at zero.
pub fn edit_similarity<T: PartialEq>(reference: &[T], candidate: &[T]) -> f64 {
    let reference_view: Vec<&T> = reference.iter().collect();
    let candidate_view: Vec<&T> = candidate.iter().collect();
    let distance = generic_levenshtein(&reference_view, &candidate_view);
    let denominator = reference.len().max(1) as f64;
    (1.0 - distance as f64 / denominator).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_sequences_are_fully_similar() {
        let chars: Vec<char> = "Zeitung".chars().collect();
        assert_eq!(edit_similarity(&chars, &chars), 1.0);
    }

    #[test]
    fn single_substitution_costs_one_unit() {
        let reference: Vec<char> = "abcd".chars().collect();
        let candidate: Vec<char> = "abed".chars().collect();
        assert_eq!(edit_similarity(&reference, &candidate), 0.75);
    }

    #[test]
    fn tokens_are_atomic_units() {
        let reference = ["der", "Mann", "steht"];
        let candidate = ["der", "Marm", "steht"];
        let similarity = edit_similarity(&reference, &candidate);
        assert!((similarity - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn long_noisy_candidate_floors_at_zero() {
        let reference = ['a'];
        let candidate: Vec<char> = "xyzxyz".chars().collect();
        assert_eq!(edit_similarity(&reference, &candidate), 0.0);
        assert_eq!(edit_similarity(&reference, &[]), 0.0);
    }
}
