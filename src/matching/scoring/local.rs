use serde::{Deserialize, Serialize};

use super::super::text::{
    cosine_similarity, jaccard_similarity, skill_overlap, term_frequencies, word_set,
};

const COSINE_TEXT_WEIGHT: f64 = 0.6;
const COSINE_SKILL_WEIGHT: f64 = 0.4;
const NEUTRAL_SKILL_OVERLAP: f64 = 0.5;
const PRESENTATION_FLOOR: f64 = 0.30;
const PRESENTATION_SPAN: f64 = 0.65;

const JACCARD_TEXT_WEIGHT: f64 = 0.6;
const JACCARD_SKILL_BONUS: f64 = 0.4;
const JACCARD_FLOOR: f64 = 0.20;

/// Borrowed inputs shared by both local strategies.
#[derive(Debug, Clone, Copy)]
pub struct MatchInput<'a> {
    pub job_description: &'a str,
    pub required_skills: &'a [String],
    pub candidate_skills: &'a [String],
    pub resume_text: &'a str,
}

impl MatchInput<'_> {
    fn job_document(&self) -> String {
        format!("{} {}", self.job_description, self.required_skills.join(" "))
    }

    fn candidate_document(&self) -> String {
        format!("{} {}", self.candidate_skills.join(" "), self.resume_text)
    }
}

/// Single-pair score with the skill breakdown used for "why this score" queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CosineMatch {
    pub match_score: u8,
    pub text_similarity: f64,
    pub skill_overlap: f64,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub total_required: usize,
    pub total_matched: usize,
}

/// Term-frequency cosine blended with skill overlap, remapped into 30..=95.
pub fn pair_cosine(input: &MatchInput<'_>) -> CosineMatch {
    let job_vector = term_frequencies(&input.job_document());
    let candidate_vector = term_frequencies(&input.candidate_document());
    let text_similarity = cosine_similarity(&job_vector, &candidate_vector);

    let overlap = skill_overlap(input.required_skills, input.candidate_skills);
    let skill_fraction = overlap.fraction().unwrap_or(NEUTRAL_SKILL_OVERLAP);

    let raw = text_similarity * COSINE_TEXT_WEIGHT + skill_fraction * COSINE_SKILL_WEIGHT;
    let remapped = PRESENTATION_FLOOR + raw * PRESENTATION_SPAN;

    CosineMatch {
        match_score: to_percent(remapped),
        text_similarity,
        skill_overlap: skill_fraction,
        total_required: overlap.required(),
        total_matched: overlap.matched.len(),
        matched_skills: overlap.matched,
        missing_skills: overlap.missing,
    }
}

/// Word-set Jaccard plus a skill bonus on a 0.20 floor, used for bulk fallback ranking.
pub fn bulk_jaccard(input: &MatchInput<'_>) -> u8 {
    let job_words = word_set(&input.job_document());
    let candidate_words = word_set(&input.candidate_document());
    let base = jaccard_similarity(&job_words, &candidate_words);

    let bonus = skill_overlap(input.required_skills, input.candidate_skills)
        .fraction()
        .map(|fraction| fraction * JACCARD_SKILL_BONUS)
        .unwrap_or(0.0);

    let combined = (base * JACCARD_TEXT_WEIGHT + bonus + JACCARD_FLOOR).min(1.0);
    to_percent(combined)
}

pub(crate) fn to_percent(fraction: f64) -> u8 {
    if !fraction.is_finite() {
        return 0;
    }
    (fraction.clamp(0.0, 1.0) * 100.0).round() as u8
}
