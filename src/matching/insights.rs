use std::collections::BTreeMap;

use serde::Serialize;

use super::domain::CandidateProfile;
use super::text::normalize_skill;

const MARKET_DEMAND: [&str; 7] = ["react", "node.js", "python", "aws", "sql", "java", "c++"];
const MARKET_SKILLS_FOR_FULL_CREDIT: f32 = 3.0;
const MARKET_MAX: f32 = 40.0;

/// Placement readiness of a candidate, independent of any drive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadinessIndex {
    pub index: u8,
    pub completeness: u8,
    pub market_demand: u8,
    pub academics: u8,
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
}

pub fn readiness(profile: &CandidateProfile) -> ReadinessIndex {
    let mut strengths = Vec::new();
    let mut gaps = Vec::new();

    let mut completeness = 0u8;
    if profile.resume_text.trim().is_empty() {
        gaps.push("Upload your resume to improve visibility".to_string());
    } else {
        completeness += 10;
        strengths.push("Resume uploaded".to_string());
    }
    if profile.skills.len() > 3 {
        completeness += 10;
        strengths.push("Good skill coverage".to_string());
    } else {
        gaps.push("Add more technical skills to your profile".to_string());
    }
    if profile.projects.is_empty() {
        gaps.push("Add academic or personal projects".to_string());
    } else {
        completeness += 10;
        strengths.push("Projects added".to_string());
    }

    let skills: Vec<String> = profile.skills.iter().map(|s| normalize_skill(s)).collect();
    let in_demand = MARKET_DEMAND
        .iter()
        .filter(|skill| skills.iter().any(|owned| owned.as_str() == **skill))
        .count();
    let market_demand =
        ((in_demand as f32 / MARKET_SKILLS_FOR_FULL_CREDIT) * MARKET_MAX).min(MARKET_MAX);
    if in_demand < 2 {
        gaps.push("Missing high-demand industry skills (e.g., Cloud, Modern Web Dev)".to_string());
    }

    let cgpa = profile.cgpa.unwrap_or(0.0);
    let academics = if cgpa >= 8.5 {
        strengths.push("Excellent CGPA".to_string());
        30
    } else if cgpa >= 7.5 {
        strengths.push("Good CGPA".to_string());
        20
    } else if cgpa >= 6.0 {
        gaps.push("Maintain or improve CGPA for more shortlists".to_string());
        10
    } else {
        gaps.push("Low CGPA might restrict some company drives".to_string());
        0
    };

    let total = f32::from(completeness) + market_demand + f32::from(academics);
    ReadinessIndex {
        index: total.round() as u8,
        completeness,
        market_demand: market_demand.round() as u8,
        academics,
        strengths,
        gaps,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchCount {
    pub branch: String,
    pub count: usize,
}

/// Officer dashboard counters over the student pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacementStats {
    pub total: usize,
    pub placed: usize,
    pub unplaced: usize,
    pub with_profiles: usize,
    pub branches: Vec<BranchCount>,
}

pub fn placement_stats(students: &[CandidateProfile]) -> PlacementStats {
    let placed = students
        .iter()
        .filter(|student| student.placement.placed)
        .count();
    let with_profiles = students
        .iter()
        .filter(|student| student.cgpa.is_some())
        .count();

    let mut per_branch: BTreeMap<String, usize> = BTreeMap::new();
    for student in students {
        let branch = student
            .branch
            .as_deref()
            .map(str::trim)
            .filter(|branch| !branch.is_empty())
            .unwrap_or("unspecified");
        *per_branch.entry(branch.to_string()).or_insert(0) += 1;
    }
    let mut branches: Vec<BranchCount> = per_branch
        .into_iter()
        .map(|(branch, count)| BranchCount { branch, count })
        .collect();
    branches.sort_by(|left, right| right.count.cmp(&left.count));

    PlacementStats {
        total: students.len(),
        placed,
        unplaced: students.len() - placed,
        with_profiles,
        branches,
    }
}
