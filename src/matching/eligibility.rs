use super::domain::{CandidateProfile, EligibilityRules};

/// Keep the candidates that satisfy every rule, in pool order.
pub fn filter_eligible<'a, I>(pool: I, rules: &EligibilityRules) -> Vec<CandidateProfile>
where
    I: IntoIterator<Item = &'a CandidateProfile>,
{
    pool.into_iter()
        .filter(|candidate| is_eligible(candidate, rules))
        .cloned()
        .collect()
}

pub fn is_eligible(candidate: &CandidateProfile, rules: &EligibilityRules) -> bool {
    meets_cgpa(candidate, rules)
        && meets_branch(candidate, rules)
        && meets_graduation_year(candidate, rules)
        && meets_backlogs(candidate, rules)
}

fn meets_cgpa(candidate: &CandidateProfile, rules: &EligibilityRules) -> bool {
    candidate
        .cgpa
        .map(|cgpa| cgpa.is_finite() && cgpa >= rules.minimum_cgpa)
        .unwrap_or(false)
}

fn meets_branch(candidate: &CandidateProfile, rules: &EligibilityRules) -> bool {
    if rules.allowed_branches.is_empty() {
        return true;
    }
    let Some(branch) = candidate.branch.as_deref() else {
        return false;
    };
    let branch = branch.trim();
    rules
        .allowed_branches
        .iter()
        .any(|allowed| allowed.trim().eq_ignore_ascii_case(branch))
}

fn meets_graduation_year(candidate: &CandidateProfile, rules: &EligibilityRules) -> bool {
    match rules.graduation_year {
        Some(target) => candidate.graduation_year == Some(target),
        None => true,
    }
}

fn meets_backlogs(candidate: &CandidateProfile, rules: &EligibilityRules) -> bool {
    match rules.max_backlogs {
        Some(max) => candidate.backlogs <= max,
        None => true,
    }
}
