use std::collections::HashMap;

/// Multiset intersection size over the reference token count.
pub fn bag_of_words_similarity(reference: &[String], candidate: &[String]) -> f64 {
    if reference.is_empty() {
        return 0.0;
    }

    let mut remaining: HashMap<&str, usize> = HashMap::new();
    for token in candidate {
        *remaining.entry(token.as_str()).or_default() += 1;
    }

    let mut shared = 0usize;
    for token in reference {
        match remaining.get_mut(token.as_str()) {
            Some(count) if *count > 0 => {
                *count -= 1;
                shared += 1;
            }
            _ => {}
        }
    }
    shared as f64 / reference.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<String> {
        text.split_whitespace().map(ToOwned::to_owned).collect()
    }

    #[test]
    fn order_does_not_matter() {
        let reference = tokens("der Mann steht an der Ecke");
        let candidate = tokens("Ecke der an steht Mann der");
        assert_eq!(bag_of_words_similarity(&reference, &candidate), 1.0);
    }

    #[test]
    fn multiplicity_is_respected() {
        let reference = tokens("der der der Mann");
        let candidate = tokens("der Mann");
        assert_eq!(bag_of_words_similarity(&reference, &candidate), 0.5);
    }

    #[test]
    fn surplus_candidate_tokens_do_not_inflate_score() {
        let reference = tokens("Mann");
        let candidate = tokens("Mann Mann Mann Frau");
        assert_eq!(bag_of_words_similarity(&reference, &candidate), 1.0);
    }
}
