use serde::{Deserialize, Serialize};

use super::super::domain::{CandidateProfile, Drive};
use super::super::text::skill_overlap;

const SKILL_MAX: f32 = 40.0;
const ACADEMIC_MAX: f32 = 25.0;
const PROJECT_MAX: f32 = 20.0;
const RESUME_MAX: f32 = 15.0;

const ACADEMIC_GRACE: f32 = 1.0;
const ACADEMIC_PENALTY_PER_POINT: f32 = 20.0;
const POINTS_PER_PROJECT_HIT: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    SkillOverlap,
    Academics,
    ProjectRelevance,
    ResumeKeywords,
}

impl ScoreFactor {
    pub const fn label(self) -> &'static str {
        match self {
            ScoreFactor::SkillOverlap => "Skill Overlap",
            ScoreFactor::Academics => "CGPA/Academics",
            ScoreFactor::ProjectRelevance => "Project Relevance",
            ScoreFactor::ResumeKeywords => "Resume Match",
        }
    }

    pub const fn max(self) -> f32 {
        match self {
            ScoreFactor::SkillOverlap => SKILL_MAX,
            ScoreFactor::Academics => ACADEMIC_MAX,
            ScoreFactor::ProjectRelevance => PROJECT_MAX,
            ScoreFactor::ResumeKeywords => RESUME_MAX,
        }
    }
}

/// One capped contribution to the weighted score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: ScoreFactor,
    pub label: String,
    pub score: f32,
    pub max: f32,
}

impl ScoreComponent {
    fn new(factor: ScoreFactor, score: f32) -> Self {
        Self {
            factor,
            label: factor.label().to_string(),
            score: score.clamp(0.0, factor.max()),
            max: factor.max(),
        }
    }
}

/// Explainable 0-100 score with its four labeled components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedScore {
    pub total: u8,
    pub components: Vec<ScoreComponent>,
}

impl WeightedScore {
    pub fn component(&self, factor: ScoreFactor) -> Option<&ScoreComponent> {
        self.components
            .iter()
            .find(|component| component.factor == factor)
    }
}

pub fn score(drive: &Drive, candidate: &CandidateProfile) -> WeightedScore {
    let components = vec![
        ScoreComponent::new(ScoreFactor::SkillOverlap, skill_points(drive, candidate)),
        ScoreComponent::new(ScoreFactor::Academics, academic_points(drive, candidate)),
        ScoreComponent::new(ScoreFactor::ProjectRelevance, project_points(drive, candidate)),
        ScoreComponent::new(ScoreFactor::ResumeKeywords, resume_points(candidate)),
    ];

    let sum: f32 = components.iter().map(|component| component.score).sum();
    WeightedScore {
        total: sum.round().clamp(0.0, 100.0) as u8,
        components,
    }
}

fn skill_points(drive: &Drive, candidate: &CandidateProfile) -> f32 {
    match skill_overlap(&drive.required_skills, &candidate.skills).fraction() {
        Some(fraction) => fraction as f32 * SKILL_MAX,
        None => SKILL_MAX,
    }
}

// Meeting the minimum earns the full share; exceeding it earns nothing extra.
fn academic_points(drive: &Drive, candidate: &CandidateProfile) -> f32 {
    let cgpa = candidate.cgpa.unwrap_or(0.0);
    let minimum = drive.eligibility.minimum_cgpa;
    if cgpa >= minimum {
        return ACADEMIC_MAX;
    }

    let deficit = minimum - cgpa;
    if deficit <= ACADEMIC_GRACE {
        (ACADEMIC_MAX - deficit * ACADEMIC_PENALTY_PER_POINT).max(0.0)
    } else {
        0.0
    }
}

fn project_points(drive: &Drive, candidate: &CandidateProfile) -> f32 {
    let required: Vec<String> = drive
        .required_skills
        .iter()
        .map(|skill| skill.to_lowercase())
        .filter(|skill| !skill.trim().is_empty())
        .collect();

    let hits: usize = candidate
        .projects
        .iter()
        .map(|project| {
            let title = project.title.to_lowercase();
            let description = project.description.to_lowercase();
            required
                .iter()
                .filter(|skill| title.contains(skill.as_str()) || description.contains(skill.as_str()))
                .count()
        })
        .sum();

    (hits as f32 * POINTS_PER_PROJECT_HIT).min(PROJECT_MAX)
}

fn resume_points(candidate: &CandidateProfile) -> f32 {
    let resume_score = if candidate.resume_score.is_finite() {
        candidate.resume_score.clamp(0.0, 100.0)
    } else {
        0.0
    };
    resume_score / 100.0 * RESUME_MAX
}
