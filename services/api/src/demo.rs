use crate::infra::{parse_condition_arg, ConditionArg, InMemoryPopulationRepository};
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use va_ratings::disability::combiner::CombinationBreakdown;
use va_ratings::config::AppConfig;
use va_ratings::disability::population::{
    GenerationOptions, PopulationSummary, VeteranPopulationService,
};
use va_ratings::disability::{
    AuditReport, Branch, CompensationLookup, Condition, ConditionCatalog, ConsistencyValidator,
    ProfileSynthesizer, RatingCombiner, VeteranProfile,
};
use va_ratings::error::AppError;

#[derive(Args, Debug)]
pub(crate) struct CombineArgs {
    /// Conditions as DIAGNOSTIC_CODE=RATING, e.g. F43.10=70 S83.91XS=10
    #[arg(required = true, value_parser = parse_condition_arg)]
    pub(crate) conditions: Vec<ConditionArg>,
    /// Dependents used for the compensation estimate
    #[arg(long, default_value_t = 0)]
    pub(crate) dependents: u8,
}

#[derive(Args, Debug)]
pub(crate) struct GenerateArgs {
    /// Number of profiles to synthesize (defaults to the configured batch size)
    #[arg(long)]
    pub(crate) count: Option<usize>,
    /// Batch seed (defaults to the configured population seed)
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Draw branch and combat service uniformly instead of by service era
    #[arg(long)]
    pub(crate) baseline: bool,
    /// Print the batch as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct AuditArgs {
    /// JSON file holding an array of veteran profiles
    pub(crate) path: PathBuf,
    /// Print the repaired population as JSON after the findings
    #[arg(long)]
    pub(crate) regenerate: bool,
}

pub(crate) fn run_combine(args: CombineArgs) -> Result<(), AppError> {
    let (conditions, breakdown) = combine_conditions(&args.conditions)?;
    let compensation =
        CompensationLookup::schedule_2024().amount(breakdown.combined, args.dependents)?;

    println!("Combined rating worksheet");
    for condition in &conditions {
        let marker = if condition.bilateral { " (bilateral)" } else { "" };
        println!(
            "- {} [{}]: {}%{}",
            condition.name, condition.diagnostic_code, condition.rating_percent, marker
        );
    }
    render_breakdown(&breakdown);
    println!(
        "Monthly compensation with {} dependent(s): {}{}",
        args.dependents,
        compensation.monthly,
        if compensation.approximated {
            format!(" (approximated from {} dependents)", compensation.bracket_dependents)
        } else {
            String::new()
        }
    );
    Ok(())
}

pub(crate) async fn run_generate(args: GenerateArgs) -> Result<(), AppError> {
    let settings = AppConfig::load()?.population.settings();
    let service = VeteranPopulationService::new(
        Arc::new(InMemoryPopulationRepository::default()),
        settings,
    );
    let options = GenerationOptions {
        enhanced: !args.baseline,
        seed: args.seed,
    };
    let count = args.count.unwrap_or(settings.batch_size);
    let snapshot = service.generate_concurrently(count, options).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot.profiles)?);
        return Ok(());
    }

    println!(
        "Generated {} veteran profiles (seed {}, {} mode)",
        snapshot.len(),
        snapshot.batch_seed,
        if snapshot.enhanced { "enhanced" } else { "baseline" }
    );
    for profile in &snapshot.profiles {
        let summary = profile.summary();
        println!(
            "- {} {:<11} {:>3}% | {} condition(s) | {} claim(s) | {}{}",
            summary.id.0,
            profile
                .provenance
                .map(|params| params.branch.label())
                .unwrap_or("unknown"),
            summary.combined_rating,
            summary.conditions,
            summary.claims,
            summary.monthly_compensation,
            if profile.compensation_approximated { " ~" } else { "" }
        );
    }
    render_summary(&PopulationSummary::from_profiles(&snapshot.profiles));
    Ok(())
}

pub(crate) fn run_audit(args: AuditArgs) -> Result<(), AppError> {
    let (profiles, report) = audit_file(&args.path)?;
    render_audit(&profiles, &report);

    if args.regenerate {
        let repaired = ConsistencyValidator::default().regenerate(profiles)?;
        println!("{}", serde_json::to_string_pretty(&repaired)?);
    }
    Ok(())
}

pub(crate) fn run_demo() -> Result<(), AppError> {
    println!("VA disability rating demo");

    println!("\n1. Combining ratings without a bilateral pair");
    let (_, breakdown) = combine_conditions(&[
        condition_arg("F43.10", 70),
        condition_arg("M54.5", 20),
        condition_arg("H93.11", 10),
    ])?;
    render_breakdown(&breakdown);

    println!("\n2. Combining a bilateral knee pair");
    let (_, breakdown) =
        combine_conditions(&[condition_arg("S83.91XS", 10), condition_arg("S83.92XS", 10)])?;
    render_breakdown(&breakdown);

    println!("\n3. Compensation lookup");
    let lookup = CompensationLookup::schedule_2024();
    for dependents in [0, 3, 7] {
        let amount = lookup.amount(80, dependents)?;
        println!(
            "- 80% with {dependents} dependent(s): {}{}",
            amount.monthly,
            if amount.approximated {
                " (approximated, nearest published bracket)"
            } else {
                ""
            }
        );
    }

    println!("\n4. Population audit");
    let synthesizer = ProfileSynthesizer::default();
    let mut profiles = Vec::new();
    for (seed, branch) in Branch::ALL.into_iter().enumerate() {
        profiles.push(synthesizer.synthesize(seed as u64, branch, seed % 2 == 0, None)?);
    }
    if let Some(profile) = profiles.first_mut() {
        profile.combined_rating = 30;
        profile.conditions.clear();
        profile.claims.clear();
    }

    let validator = ConsistencyValidator::new(synthesizer);
    let report = validator.audit(&profiles);
    render_audit(&profiles, &report);

    let repaired = validator.regenerate(profiles)?;
    let after = validator.audit(&repaired);
    println!(
        "After regeneration: {} inconsistent profile(s)",
        after.count
    );
    Ok(())
}

fn condition_arg(code: &str, rating: u8) -> ConditionArg {
    ConditionArg {
        code: code.to_string(),
        rating,
    }
}

fn combine_conditions(
    args: &[ConditionArg],
) -> Result<(Vec<Condition>, CombinationBreakdown), AppError> {
    let catalog = ConditionCatalog::standard();
    let conditions = args
        .iter()
        .map(|arg| {
            catalog
                .lookup(&arg.code)
                .map(|template| template.rated(arg.rating, true))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let breakdown = RatingCombiner::breakdown(&conditions)?;
    Ok((conditions, breakdown))
}

fn audit_file(path: &Path) -> Result<(Vec<VeteranProfile>, AuditReport), AppError> {
    let raw = std::fs::read_to_string(path)?;
    let profiles: Vec<VeteranProfile> = serde_json::from_str(&raw)?;
    let report = ConsistencyValidator::default().audit(&profiles);
    Ok((profiles, report))
}

fn render_breakdown(breakdown: &CombinationBreakdown) {
    if let Some(bilateral) = &breakdown.bilateral {
        println!(
            "  Bilateral factor: {} paired entries, sum {} + {} = {}%",
            bilateral.entries.len(),
            bilateral.raw_sum,
            bilateral.factor,
            bilateral.adjusted
        );
    }
    for step in &breakdown.steps {
        println!("  + {:>3}% -> {}%", step.rating, step.combined);
    }
    println!(
        "  Combined: {}% (rounded to {}%)",
        breakdown.exact, breakdown.combined
    );
}

fn render_audit(profiles: &[VeteranProfile], report: &AuditReport) {
    println!(
        "Audited {} profile(s): {} inconsistent",
        profiles.len(),
        report.count
    );
    for finding in &report.findings {
        println!("- {}", finding.profile_id.0);
        for issue in &finding.issues {
            println!("    {}", issue.summary());
        }
    }
}

fn render_summary(summary: &PopulationSummary) {
    println!(
        "Summary: {} total | {} rated | {} with conditions | {} with claims | {} phantom | {} unrounded | {} approximated pay",
        summary.total,
        summary.with_ratings,
        summary.with_conditions,
        summary.with_claims,
        summary.phantom,
        summary.invalid_ratings,
        summary.approximated_compensation
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "va-ratings-{}-{name}.json",
            std::process::id()
        ));
        std::fs::write(&path, contents).expect("write temp file");
        path
    }

    #[test]
    fn combine_conditions_reads_catalog_codes() {
        let (conditions, breakdown) =
            combine_conditions(&[condition_arg("S83.91XS", 10), condition_arg("S83.92XS", 10)])
                .expect("combines");
        assert!(conditions.iter().all(|condition| condition.bilateral));
        assert_eq!(breakdown.combined, 20);
    }

    #[test]
    fn combine_conditions_surfaces_unknown_codes() {
        let error = combine_conditions(&[condition_arg("Z00.00", 10)]).expect_err("unknown");
        assert!(matches!(error, AppError::Catalog(_)));
    }

    #[test]
    fn audit_file_flags_phantom_profiles() {
        let mut profile = ProfileSynthesizer::default()
            .synthesize(21, Branch::Navy, false, Some(30))
            .expect("synthesizes");
        profile.conditions.clear();
        let path = temp_file(
            "phantom",
            &serde_json::to_string(&vec![profile]).expect("serializes"),
        );

        let (profiles, report) = audit_file(&path).expect("audits");
        std::fs::remove_file(&path).ok();

        assert_eq!(profiles.len(), 1);
        assert_eq!(report.count, 1);
    }

    #[test]
    fn audit_file_accepts_core_profile_fields() {
        let path = temp_file(
            "core-fields",
            r#"[{
                "id": "imported-7",
                "conditions": [{
                    "name": "Tinnitus",
                    "diagnosticCode": "H93.11",
                    "ratingPercent": 10,
                    "serviceConnected": true,
                    "bilateral": false
                }],
                "combinedRating": 10,
                "monthlyCompensation": 171.23,
                "claims": [],
                "dependents": 0
            }]"#,
        );

        let (profiles, report) = audit_file(&path).expect("audits");
        std::fs::remove_file(&path).ok();

        assert_eq!(profiles.len(), 1);
        assert!(profiles[0].provenance.is_none());
        assert_eq!(report.count, 1);
        let repaired = ConsistencyValidator::default()
            .regenerate(profiles)
            .expect("regenerates");
        assert_eq!(repaired[0].id.0, "imported-7");
    }

    #[test]
    fn audit_file_rejects_malformed_json() {
        let path = temp_file("malformed", "{ not json");
        let error = audit_file(&path).expect_err("malformed");
        std::fs::remove_file(&path).ok();
        assert!(matches!(error, AppError::Json(_)));
    }

    #[test]
    fn demo_runs_end_to_end() {
        run_demo().expect("demo completes");
    }
}
