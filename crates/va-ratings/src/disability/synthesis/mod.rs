//! Seeded construction of complete, self-consistent veteran profiles.

mod rng;
mod targeting;

pub use rng::{derive_seed, splitmix64};
pub(crate) use rng::{history_seed, profile_rng};

use chrono::{Duration, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::catalog::{ConditionCatalog, ConditionTemplate, PTSD_CODE};
use super::combiner::{RatingCombiner, RatingError};
use super::compensation::{CompensationError, CompensationLookup};
use super::domain::{
    Branch, ClaimRecord, ClaimStatus, Condition, SynthesisParams, VeteranId, VeteranProfile,
};

const PTSD_PROBABILITY: f64 = 0.85;
const PAIRED_LIMB_PROBABILITY: f64 = 0.6;
const SERVICE_CONNECTED_PROBABILITY: f64 = 0.9;
const SECONDARY_PROBABILITY: f64 = 0.6;
const APPROVED_PROBABILITY: f64 = 0.8;
const DENIED_CLAIM_PROBABILITY: f64 = 0.5;
const MAX_DEPENDENTS: u8 = 4;
const CLAIM_WINDOW_DAYS: i64 = 3 * 365;
/// PTSD drawn for combat veterans skips the 0% and 10% steps.
const COMBAT_PTSD_FLOOR: u8 = 30;

#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error(transparent)]
    Rating(#[from] RatingError),
    #[error(transparent)]
    Compensation(#[from] CompensationError),
}

/// A template chosen for a profile along with the rating drawn for it.
#[derive(Debug, Clone, Copy)]
struct Pick {
    template: &'static ConditionTemplate,
    rating: u8,
    service_connected: bool,
}

impl Pick {
    fn new(template: &'static ConditionTemplate, rating: u8, service_connected: bool) -> Self {
        Self {
            template,
            rating,
            service_connected,
        }
    }

    fn condition(&self) -> Condition {
        self.template.rated(self.rating, self.service_connected)
    }
}

fn picked(picks: &[Pick], template: &ConditionTemplate) -> bool {
    picks
        .iter()
        .any(|pick| pick.template.diagnostic_code == template.diagnostic_code)
}

fn conditions_of(picks: &[Pick]) -> Vec<Condition> {
    picks.iter().map(Pick::condition).collect()
}

/// Builds veteran profiles from the catalog. Pure: the same parameters always yield the
/// same profile.
#[derive(Debug, Clone, Default)]
pub struct ProfileSynthesizer {
    catalog: ConditionCatalog,
    compensation: CompensationLookup,
}

impl ProfileSynthesizer {
    pub fn new(catalog: ConditionCatalog, compensation: CompensationLookup) -> Self {
        Self {
            catalog,
            compensation,
        }
    }

    pub fn catalog(&self) -> &ConditionCatalog {
        &self.catalog
    }

    pub fn compensation(&self) -> &CompensationLookup {
        &self.compensation
    }

    pub fn synthesize(
        &self,
        seed: u64,
        branch: Branch,
        combat_service: bool,
        target_rating_hint: Option<u8>,
    ) -> Result<VeteranProfile, SynthesisError> {
        self.synthesize_with(&SynthesisParams {
            seed,
            branch,
            combat_service,
            target_rating_hint,
        })
    }

    pub fn synthesize_with(&self, params: &SynthesisParams) -> Result<VeteranProfile, SynthesisError> {
        let mut rng = profile_rng(params.seed);

        let mut picks = self.select(&mut rng, params.branch, params.combat_service);
        if let Some(hint) = params.target_rating_hint.filter(|hint| *hint > 0) {
            let eligible = self
                .catalog
                .list_by_eligibility(params.branch, params.combat_service);
            picks = targeting::steer(&eligible, picks, hint)?;
        }

        let conditions = conditions_of(&picks);
        let combined_rating = RatingCombiner::combine(&conditions)?;
        let dependents = rng.gen_range(0..=MAX_DEPENDENTS);
        let compensation = self.compensation.amount(combined_rating, dependents)?;
        let claims = file_claims(&mut rng, &conditions);

        Ok(VeteranProfile {
            id: VeteranId::from_seed(params.seed),
            conditions,
            combined_rating,
            monthly_compensation: compensation.monthly,
            compensation_approximated: compensation.approximated,
            claims,
            dependents,
            provenance: Some(*params),
        })
    }

    fn select(&self, rng: &mut ChaCha8Rng, branch: Branch, combat_service: bool) -> Vec<Pick> {
        let eligible = self.catalog.list_by_eligibility(branch, combat_service);
        let mut picks = Vec::new();

        if combat_service && rng.gen_bool(PTSD_PROBABILITY) {
            if let Ok(ptsd) = self.catalog.lookup(PTSD_CODE) {
                let rating = draw_rating(rng, ptsd, COMBAT_PTSD_FLOOR);
                picks.push(Pick::new(ptsd, rating, true));
            }
        }

        let draws = if combat_service {
            rng.gen_range(2..=4)
        } else {
            rng.gen_range(1..=3)
        };

        for _ in 0..draws {
            let remaining: Vec<&'static ConditionTemplate> = eligible
                .iter()
                .copied()
                .filter(|template| !picked(&picks, template))
                .collect();
            let Ok(template) = remaining.choose_weighted(rng, |template| {
                template.exposure_weight(branch, combat_service)
            }) else {
                break;
            };
            let template = *template;

            push_drawn(rng, &mut picks, template);
            if let Some(other_side) = self.catalog.counterpart(template) {
                if !picked(&picks, other_side) && rng.gen_bool(PAIRED_LIMB_PROBABILITY) {
                    push_drawn(rng, &mut picks, other_side);
                }
            }
        }

        let primaries: Vec<&'static str> = picks
            .iter()
            .filter(|pick| pick.service_connected && pick.rating > 0)
            .map(|pick| pick.template.diagnostic_code)
            .collect();
        for code in primaries {
            for secondary in self.catalog.secondaries_of(code) {
                if !picked(&picks, secondary) && rng.gen_bool(SECONDARY_PROBABILITY) {
                    let rating = draw_rating(rng, secondary, 1);
                    picks.push(Pick::new(secondary, rating, true));
                }
            }
        }

        picks
    }
}

/// Non-service-connected conditions are recorded at 0%.
fn push_drawn(rng: &mut ChaCha8Rng, picks: &mut Vec<Pick>, template: &'static ConditionTemplate) {
    let service_connected = rng.gen_bool(SERVICE_CONNECTED_PROBABILITY);
    let rating = if service_connected {
        draw_rating(rng, template, 1)
    } else {
        0
    };
    picks.push(Pick::new(template, rating, service_connected));
}

fn draw_rating(rng: &mut ChaCha8Rng, template: &ConditionTemplate, floor: u8) -> u8 {
    let options: Vec<u8> = template
        .allowed_ratings
        .iter()
        .copied()
        .filter(|rating| *rating >= floor)
        .collect();
    options
        .choose(rng)
        .copied()
        .or_else(|| template.allowed_ratings.iter().copied().max())
        .unwrap_or(0)
}

fn separation_date(rng: &mut ChaCha8Rng) -> NaiveDate {
    let year = rng.gen_range(1975..=2024);
    let month = rng.gen_range(1..=12);
    let day = rng.gen_range(1..=28);
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

/// Service-connected conditions always get a claim; the rest sometimes carry a denial.
fn file_claims(rng: &mut ChaCha8Rng, conditions: &[Condition]) -> Vec<ClaimRecord> {
    let separated = separation_date(rng);

    conditions
        .iter()
        .filter_map(|condition| {
            let filed_date = separated
                .checked_add_signed(Duration::days(rng.gen_range(0..CLAIM_WINDOW_DAYS)))
                .unwrap_or(separated);

            let status = if condition.service_connected {
                if rng.gen_bool(APPROVED_PROBABILITY) {
                    ClaimStatus::Approved
                } else {
                    ClaimStatus::PendingDecision
                }
            } else if rng.gen_bool(DENIED_CLAIM_PROBABILITY) {
                ClaimStatus::Denied
            } else {
                return None;
            };

            Some(ClaimRecord {
                condition: condition.name.clone(),
                filed_date,
                status,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::disability::catalog::LimbPair;

    fn synthesizer() -> ProfileSynthesizer {
        ProfileSynthesizer::default()
    }

    #[test]
    fn same_seed_reproduces_identical_profile() {
        let synthesizer = synthesizer();
        for seed in [0, 1, 42, u64::MAX] {
            let first = synthesizer
                .synthesize(seed, Branch::Marines, true, None)
                .expect("synthesizes");
            let second = synthesizer
                .synthesize(seed, Branch::Marines, true, None)
                .expect("synthesizes");
            assert_eq!(first, second);
            assert_eq!(
                serde_json::to_vec(&first).expect("json"),
                serde_json::to_vec(&second).expect("json")
            );
        }
    }

    #[test]
    fn rated_profiles_always_carry_conditions_and_claims() {
        let synthesizer = synthesizer();
        for seed in 0..300 {
            let branch = Branch::ALL[(seed % 6) as usize];
            let profile = synthesizer
                .synthesize(seed, branch, seed % 2 == 0, None)
                .expect("synthesizes");
            assert!(!profile.conditions.is_empty(), "seed {seed}");
            if profile.combined_rating > 0 {
                assert!(!profile.claims.is_empty(), "seed {seed}");
            }
            assert_eq!(profile.combined_rating % 10, 0);
        }
    }

    #[test]
    fn combined_rating_is_derived_from_conditions() {
        let synthesizer = synthesizer();
        for seed in 0..100 {
            let profile = synthesizer
                .synthesize(seed, Branch::Army, true, None)
                .expect("synthesizes");
            assert_eq!(
                RatingCombiner::combine(&profile.conditions),
                Ok(profile.combined_rating)
            );
            let expected = synthesizer
                .compensation()
                .amount(profile.combined_rating, profile.dependents)
                .expect("published");
            assert_eq!(profile.monthly_compensation, expected.monthly);
            assert_eq!(profile.compensation_approximated, expected.approximated);
        }
    }

    #[test]
    fn every_service_connected_condition_has_a_claim() {
        let synthesizer = synthesizer();
        for seed in 0..100 {
            let profile = synthesizer
                .synthesize(seed, Branch::Navy, seed % 3 == 0, None)
                .expect("synthesizes");
            for condition in profile.service_connected() {
                assert!(
                    profile
                        .claims
                        .iter()
                        .any(|claim| claim.condition == condition.name),
                    "seed {seed}: {} has no claim",
                    condition.name
                );
            }
            for claim in &profile.claims {
                assert!(profile
                    .conditions
                    .iter()
                    .any(|condition| condition.name == claim.condition));
            }
        }
    }

    #[test]
    fn ratings_stay_on_the_published_schedule() {
        let synthesizer = synthesizer();
        let catalog = ConditionCatalog::standard();
        for seed in 0..100 {
            let profile = synthesizer
                .synthesize(seed, Branch::AirForce, seed % 2 == 1, Some(60))
                .expect("synthesizes");
            for condition in &profile.conditions {
                let template = catalog
                    .lookup(&condition.diagnostic_code)
                    .expect("catalog condition");
                assert!(template.allows(condition.rating_percent));
                if !condition.service_connected {
                    assert_eq!(condition.rating_percent, 0);
                }
            }
        }
    }

    #[test]
    fn paired_limbs_never_exceed_two_entries() {
        let synthesizer = synthesizer();
        let catalog = ConditionCatalog::standard();
        for seed in 0..200 {
            let profile = synthesizer
                .synthesize(seed, Branch::Army, true, None)
                .expect("synthesizes");
            let mut per_pair: BTreeMap<LimbPair, usize> = BTreeMap::new();
            for condition in profile.conditions.iter().filter(|c| c.bilateral) {
                let limb = catalog
                    .lookup(&condition.diagnostic_code)
                    .expect("known")
                    .limb
                    .expect("limb");
                *per_pair.entry(limb.pair).or_default() += 1;
            }
            assert!(per_pair.values().all(|count| *count <= 2), "seed {seed}");
        }
    }

    #[test]
    fn knees_are_drawn_as_a_pair() {
        let synthesizer = synthesizer();
        let catalog = ConditionCatalog::standard();
        let knee_codes: Vec<&str> = catalog
            .templates_in_pair(LimbPair::Knees)
            .iter()
            .map(|template| template.diagnostic_code)
            .collect();
        assert_eq!(knee_codes.len(), 2);

        let both_knees = (0..400)
            .filter_map(|seed| synthesizer.synthesize(seed, Branch::Army, true, None).ok())
            .filter(|profile| {
                knee_codes.iter().all(|code| {
                    profile
                        .conditions
                        .iter()
                        .any(|condition| condition.diagnostic_code == *code)
                })
            })
            .count();
        assert!(both_knees > 0, "no profile drew both knees");
    }

    #[test]
    fn combat_service_biases_toward_ptsd() {
        let synthesizer = synthesizer();
        let count_ptsd = |combat: bool| {
            (0..200)
                .filter(|seed| {
                    synthesizer
                        .synthesize(*seed, Branch::Army, combat, None)
                        .expect("synthesizes")
                        .conditions
                        .iter()
                        .any(|condition| condition.diagnostic_code == PTSD_CODE)
                })
                .count()
        };
        assert!(count_ptsd(true) > count_ptsd(false));
    }

    #[test]
    fn non_combat_profiles_never_claim_combat_only_conditions() {
        let synthesizer = synthesizer();
        for seed in 0..150 {
            let profile = synthesizer
                .synthesize(seed, Branch::CoastGuard, false, Some(100))
                .expect("synthesizes");
            assert!(profile
                .conditions
                .iter()
                .all(|condition| condition.name != "TBI"));
        }
    }

    #[test]
    fn target_hint_lands_within_one_step() {
        let synthesizer = synthesizer();
        for target in (10..=100).step_by(10) {
            for seed in 0..10 {
                let profile = synthesizer
                    .synthesize(seed, Branch::Navy, seed % 2 == 0, Some(target))
                    .expect("synthesizes");
                assert!(
                    profile.combined_rating.abs_diff(target) <= 10,
                    "seed {seed} target {target} got {}",
                    profile.combined_rating
                );
                assert!(!profile.claims.is_empty());
            }
        }
    }

    #[test]
    fn zero_hint_is_ignored() {
        let synthesizer = synthesizer();
        let unhinted = synthesizer
            .synthesize(9, Branch::Army, false, None)
            .expect("synthesizes");
        let zero = synthesizer
            .synthesize(9, Branch::Army, false, Some(0))
            .expect("synthesizes");
        assert_eq!(unhinted.conditions, zero.conditions);
        assert_eq!(
            zero.provenance.and_then(|params| params.target_rating_hint),
            Some(0)
        );
    }

    #[test]
    fn identifier_follows_seed() {
        let profile = synthesizer()
            .synthesize(255, Branch::SpaceForce, false, None)
            .expect("synthesizes");
        assert_eq!(profile.id, VeteranId("vet-00000000000000ff".to_string()));
    }
}
