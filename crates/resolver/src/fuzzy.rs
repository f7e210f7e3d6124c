//! String similarity for the fuzzy matching tier.
//!
//! Pure-Rust Levenshtein distance and a best-match helper with an
//! acceptance threshold. Below the threshold there is no match — never
//! a low-confidence guess.

/// Standard dynamic-programming Levenshtein distance.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let insertions = previous[j + 1] + 1;
            let deletions = current[j] + 1;
            let substitutions = previous[j] + usize::from(ca != cb);
            current[j + 1] = insertions.min(deletions).min(substitutions);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// Normalized similarity in [0, 1]; 1 = identical. Case-insensitive.
pub fn similarity(a: &str, b: &str) -> f32 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 0.0;
    }
    1.0 - (levenshtein(&a, &b) as f32 / max_len as f32)
}

/// Find the best-scoring candidate, accepting only scores at or above
/// `threshold`. Returns the candidate and its score.
pub fn best_match<'a, I>(word: &str, choices: I, threshold: f32) -> Option<(&'a str, f32)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(&'a str, f32)> = None;

    for choice in choices {
        let score = similarity(word, choice);
        if best.is_none_or(|(_, s)| score > s) {
            best = Some((choice, score));
        }
    }

    best.filter(|&(_, score)| score >= threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_have_zero_distance() {
        assert_eq!(levenshtein("nvidia", "nvidia"), 0);
    }

    #[test]
    fn single_edit_distance() {
        assert_eq!(levenshtein("microsft", "microsoft"), 1);
        assert_eq!(levenshtein("apple", "appel"), 2);
    }

    #[test]
    fn empty_string_distance() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn similarity_is_case_insensitive() {
        assert!((similarity("NVIDIA", "nvidia") - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn similarity_of_typo() {
        // 1 edit over 9 chars ≈ 0.889
        let s = similarity("microsft", "microsoft");
        assert!(s > 0.85 && s < 0.95);
    }

    #[test]
    fn best_match_respects_threshold() {
        let choices = ["microsoft", "apple", "nvidia"];
        let hit = best_match("microsft", choices, 0.85);
        assert_eq!(hit.map(|(c, _)| c), Some("microsoft"));

        // "orcale" vs anything in the list is below 0.85
        assert!(best_match("orcale", choices, 0.85).is_none());
    }

    #[test]
    fn best_match_empty_choices() {
        assert!(best_match("anything", [], 0.5).is_none());
    }
}
