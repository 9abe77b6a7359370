//! Tokenization, term-frequency vectors, and the similarity measures built on them.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::OnceLock;

use regex::Regex;

const MIN_TOKEN_LEN: usize = 3;

/// Token occurrence counts for one document.
pub type TermVector = BTreeMap<String, u32>;

fn technical_token() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[a-z][a-z0-9+#.]+").expect("valid token pattern"))
}

fn word_token() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[a-z0-9_]{3,}").expect("valid word pattern"))
}

/// Lower-case `text` and keep technical tokens such as `c++`, `c#`, or `node.js`.
///
/// A trailing `.` is sentence punctuation and is dropped before the length check.
pub fn technical_tokens(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    technical_token()
        .find_iter(&lowered)
        .map(|found| found.as_str().trim_end_matches('.'))
        .filter(|token| token.chars().count() >= MIN_TOKEN_LEN)
        .map(str::to_string)
        .collect()
}

/// Distinct lower-cased word tokens (letters, digits, underscore) of length three or more.
pub fn word_set(text: &str) -> BTreeSet<String> {
    let lowered = text.to_lowercase();
    word_token()
        .find_iter(&lowered)
        .map(|found| found.as_str().to_string())
        .collect()
}

pub fn term_frequencies(text: &str) -> TermVector {
    let mut vector = TermVector::new();
    for token in technical_tokens(text) {
        *vector.entry(token).or_insert(0) += 1;
    }
    vector
}

/// Cosine similarity over the union of terms; zero when either vector is empty.
pub fn cosine_similarity(left: &TermVector, right: &TermVector) -> f64 {
    let mut dot = 0.0;
    let mut left_norm = 0.0;
    let mut right_norm = 0.0;

    let terms: BTreeSet<&String> = left.keys().chain(right.keys()).collect();
    for term in terms {
        let a = f64::from(left.get(term).copied().unwrap_or(0));
        let b = f64::from(right.get(term).copied().unwrap_or(0));
        dot += a * b;
        left_norm += a * a;
        right_norm += b * b;
    }

    if left_norm == 0.0 || right_norm == 0.0 {
        return 0.0;
    }
    dot / (left_norm.sqrt() * right_norm.sqrt())
}

pub fn jaccard_similarity(left: &BTreeSet<String>, right: &BTreeSet<String>) -> f64 {
    let union = left.union(right).count();
    if union == 0 {
        return 0.0;
    }
    left.intersection(right).count() as f64 / union as f64
}

/// Which required skills a candidate covers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SkillOverlap {
    pub matched: Vec<String>,
    pub missing: Vec<String>,
}

impl SkillOverlap {
    pub fn required(&self) -> usize {
        self.matched.len() + self.missing.len()
    }

    /// Matched fraction, or `None` when the drive requires nothing.
    pub fn fraction(&self) -> Option<f64> {
        match self.required() {
            0 => None,
            total => Some(self.matched.len() as f64 / total as f64),
        }
    }
}

pub fn normalize_skill(skill: &str) -> String {
    skill.trim().to_lowercase()
}

/// Compare skills case-insensitively. Duplicate requirements count once; blank ones are ignored.
pub fn skill_overlap(required: &[String], offered: &[String]) -> SkillOverlap {
    let offered: HashSet<String> = offered.iter().map(|skill| normalize_skill(skill)).collect();
    let mut seen = HashSet::new();
    let mut overlap = SkillOverlap::default();

    for skill in required {
        let normalized = normalize_skill(skill);
        if normalized.is_empty() || !seen.insert(normalized.clone()) {
            continue;
        }
        if offered.contains(&normalized) {
            overlap.matched.push(normalized);
        } else {
            overlap.missing.push(normalized);
        }
    }

    overlap
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn technical_tokens_keep_symbols_and_drop_short_words() {
        let tokens = technical_tokens("We use C++, C# and Node.js. Go is ok.");
        assert_eq!(tokens, vec!["use", "c++", "and", "node.js"]);
    }

    #[test]
    fn term_frequencies_count_repeats() {
        let vector = term_frequencies("rust Rust RUST python");
        assert_eq!(vector.get("rust"), Some(&3));
        assert_eq!(vector.get("python"), Some(&1));
    }

    #[test]
    fn cosine_is_zero_for_empty_vectors() {
        let empty = TermVector::new();
        let other = term_frequencies("rust services");
        assert_eq!(cosine_similarity(&empty, &other), 0.0);
        assert_eq!(cosine_similarity(&empty, &empty), 0.0);
    }

    #[test]
    fn cosine_of_identical_documents_is_one() {
        let vector = term_frequencies("distributed systems in rust");
        let similarity = cosine_similarity(&vector, &vector);
        assert!((similarity - 1.0).abs() < 1e-9);
    }

    #[test]
    fn jaccard_counts_shared_words() {
        let left = word_set("rust tokio axum");
        let right = word_set("rust axum serde python");
        let similarity = jaccard_similarity(&left, &right);
        assert!((similarity - 2.0 / 5.0).abs() < 1e-9);
    }

    #[test]
    fn skill_overlap_is_case_insensitive() {
        let overlap = skill_overlap(
            &["Rust".to_string(), "SQL".to_string(), "rust".to_string()],
            &[" rust ".to_string(), "python".to_string()],
        );
        assert_eq!(overlap.matched, vec!["rust"]);
        assert_eq!(overlap.missing, vec!["sql"]);
        assert_eq!(overlap.fraction(), Some(0.5));
        assert_eq!(skill_overlap(&[], &["rust".to_string()]).fraction(), None);
    }
}
