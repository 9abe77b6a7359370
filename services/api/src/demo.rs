use crate::infra::{seed_students, InMemoryAuditLog, InMemoryDriveRepository, InMemoryProfileStore};
use chrono::{Duration, Local};
use clap::Args;
use placement_match::config::ScoringConfig;
use placement_match::error::AppError;
use placement_match::matching::{
    CandidateId, CandidateStatus, DisabledScoringService, DriveDraft, EligibilityRules,
    PlacementMatchingService, Principal, ProfileStore, TransitionOutcome, TransitionRequest,
};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Candidate to select after ranking (defaults to the top-ranked candidate)
    #[arg(long)]
    pub(crate) select: Option<String>,
    /// Stop after printing the shortlist
    #[arg(long)]
    pub(crate) skip_governance: bool,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let drives = Arc::new(InMemoryDriveRepository::default());
    let profiles = Arc::new(InMemoryProfileStore::seeded(seed_students()));
    let audit = Arc::new(InMemoryAuditLog::default());
    let service = PlacementMatchingService::new(
        drives,
        profiles.clone(),
        audit.clone(),
        Arc::new(DisabledScoringService),
        &ScoringConfig::default(),
    );
    let officer = Principal::officer("officer-demo");

    println!("Placement matching demo (remote scoring disabled)");
    let drive = service.create_drive(&officer, demo_draft())?;
    println!(
        "- Created drive {} for {} ({}) -> status {}",
        drive.id,
        drive.company_name,
        drive.role,
        drive.status.label()
    );
    println!(
        "  Eligibility: CGPA >= {:.1}, branches {}",
        drive.eligibility.minimum_cgpa,
        drive.eligibility.allowed_branches.join(", ")
    );

    let outcome = service.rank_drive(&officer, &drive.id).await?;
    let strategy = outcome
        .strategy
        .map(|strategy| strategy.label())
        .unwrap_or("none");
    println!(
        "- Ranked {} eligible candidates using {} scoring",
        outcome.entries.len(),
        strategy
    );
    for (index, entry) in outcome.entries.iter().enumerate() {
        let name = profiles
            .fetch(&entry.candidate_id)
            .ok()
            .flatten()
            .map(|profile| profile.name)
            .unwrap_or_else(|| entry.candidate_id.to_string());
        println!(
            "    {}. {} ({}) score {} [{}]",
            index + 1,
            name,
            entry.candidate_id,
            entry.match_score,
            entry.status.label()
        );
    }

    let Some(top) = outcome.entries.first() else {
        println!("  No candidates passed the eligibility filter");
        return Ok(());
    };

    let breakdown = service.explain(&drive.id, &top.candidate_id)?;
    println!("  Weighted breakdown for {}:", top.candidate_id);
    for component in &breakdown.components {
        println!(
            "    - {}: {:.1} / {:.0}",
            component.label, component.score, component.max
        );
    }
    println!("    = {}", breakdown.total);

    if args.skip_governance {
        return Ok(());
    }

    let chosen = args
        .select
        .map(CandidateId)
        .unwrap_or_else(|| top.candidate_id.clone());
    let request = TransitionRequest {
        candidate_id: chosen.clone(),
        status: CandidateStatus::Selected,
        justification: Some("Cleared technical and HR rounds during the demo".to_string()),
    };
    match service.update_status(&officer, &drive.id, &request) {
        Ok(TransitionOutcome::Applied(transition)) => println!(
            "- {} moved {} -> {} by {}: {}",
            transition.candidate_id,
            transition.from.label(),
            transition.to.label(),
            transition.actor,
            transition.justification
        ),
        Ok(TransitionOutcome::Unchanged { status }) => {
            println!("- {} already {}", chosen, status.label())
        }
        Err(err) => {
            println!("  Status change rejected: {}", err);
            return Ok(());
        }
    }

    let readiness = service.readiness(&chosen)?;
    println!(
        "  Readiness index for {}: {} (completeness {}, market {}, academics {})",
        chosen,
        readiness.index,
        readiness.completeness,
        readiness.market_demand,
        readiness.academics
    );

    let stats = service.placement_stats(&officer)?;
    println!(
        "  Placement stats: {} placed / {} total",
        stats.placed, stats.total
    );
    println!("  Audit records written: {}", audit.records().len());

    let view = service.get_drive(&drive.id)?.view();
    match serde_json::to_string_pretty(&view) {
        Ok(json) => println!("  Shortlist payload:\n{}", json),
        Err(err) => println!("  Shortlist payload unavailable: {}", err),
    }

    Ok(())
}

fn demo_draft() -> DriveDraft {
    let today = Local::now().date_naive();
    DriveDraft {
        company_name: "Acme Systems".to_string(),
        role: "Backend Engineer".to_string(),
        job_description: "Design and operate backend services in Rust with SQL storage on AWS."
            .to_string(),
        ctc: "14 LPA".to_string(),
        location: "Pune".to_string(),
        drive_date: today + Duration::days(21),
        application_deadline: today + Duration::days(14),
        eligibility: EligibilityRules {
            minimum_cgpa: 7.0,
            allowed_branches: vec!["CSE".to_string(), "IT".to_string()],
            graduation_year: Some(2027),
            max_backlogs: Some(0),
        },
        required_skills: vec!["Rust".to_string(), "SQL".to_string(), "AWS".to_string()],
        rounds: vec![
            "Online assessment".to_string(),
            "Technical interview".to_string(),
            "HR".to_string(),
        ],
    }
}
