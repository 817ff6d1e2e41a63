//! Population-level consistency audit.
//!
//! The validator never edits a profile. Findings are returned as data, and repair means
//! replacing a flagged profile with a freshly synthesized one built from the same
//! parameters.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use super::catalog::LimbPair;
use super::combiner::{RatingCombiner, RatingError};
use super::compensation::Usd;
use super::domain::{Branch, SynthesisParams, VeteranId, VeteranProfile};
use super::synthesis::{splitmix64, ProfileSynthesizer, SynthesisError};

/// Paired-limb entries allowed per limb pair: one per side.
pub const MAX_BILATERAL_PER_PAIR: usize = 2;

/// Reason a profile fails the consistency rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Inconsistency {
    PhantomRating {
        combined_rating: u8,
        conditions: usize,
        claims: usize,
    },
    UnroundedRating {
        stored: u8,
    },
    InvalidConditionRating {
        condition: String,
        rating: u8,
    },
    StaleRating {
        stored: u8,
        derived: u8,
    },
    ExcessBilateral {
        pair: LimbPair,
        entries: usize,
    },
    OrphanClaim {
        condition: String,
    },
    StaleCompensation {
        stored: Usd,
        derived: Usd,
    },
}

impl Inconsistency {
    pub fn summary(&self) -> String {
        match self {
            Inconsistency::PhantomRating {
                combined_rating,
                conditions,
                claims,
            } => format!(
                "{combined_rating}% rating with {conditions} condition(s) and {claims} claim(s)"
            ),
            Inconsistency::UnroundedRating { stored } => {
                format!("stored rating {stored}% is not a multiple of 10")
            }
            Inconsistency::InvalidConditionRating { condition, rating } => {
                format!("{condition} rated {rating}% off the schedule")
            }
            Inconsistency::StaleRating { stored, derived } => {
                format!("stored rating {stored}% but conditions combine to {derived}%")
            }
            Inconsistency::ExcessBilateral { pair, entries } => {
                format!("{entries} bilateral entries for {}", pair.label())
            }
            Inconsistency::OrphanClaim { condition } => {
                format!("claim for '{condition}' has no matching condition")
            }
            Inconsistency::StaleCompensation { stored, derived } => {
                format!("stored compensation {stored} but schedule pays {derived}")
            }
        }
    }
}

/// Issues found on one profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditFinding {
    pub profile_id: VeteranId,
    pub issues: Vec<Inconsistency>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub inconsistent: Vec<VeteranProfile>,
    pub count: usize,
    pub findings: Vec<AuditFinding>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.count == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConsistencyValidator {
    synthesizer: ProfileSynthesizer,
}

impl ConsistencyValidator {
    pub fn new(synthesizer: ProfileSynthesizer) -> Self {
        Self { synthesizer }
    }

    /// Every rule the profile breaks, in a fixed order.
    pub fn inspect(&self, profile: &VeteranProfile) -> Vec<Inconsistency> {
        let mut issues = Vec::new();

        if profile.is_phantom() {
            issues.push(Inconsistency::PhantomRating {
                combined_rating: profile.combined_rating,
                conditions: profile.conditions.len(),
                claims: profile.claims.len(),
            });
        }

        if profile.combined_rating % 10 != 0 || profile.combined_rating > 100 {
            issues.push(Inconsistency::UnroundedRating {
                stored: profile.combined_rating,
            });
        }

        match RatingCombiner::combine(&profile.conditions) {
            Ok(derived) if derived != profile.combined_rating => {
                issues.push(Inconsistency::StaleRating {
                    stored: profile.combined_rating,
                    derived,
                });
            }
            Ok(_) => {}
            Err(RatingError::InvalidRatingValue { condition, rating }) => {
                issues.push(Inconsistency::InvalidConditionRating { condition, rating });
            }
        }

        let mut per_pair: BTreeMap<LimbPair, usize> = BTreeMap::new();
        for condition in profile.conditions.iter().filter(|c| c.bilateral) {
            // unknown codes can't be attributed to a pair
            if let Ok(template) = self.synthesizer.catalog().lookup(&condition.diagnostic_code) {
                if let Some(limb) = template.limb {
                    *per_pair.entry(limb.pair).or_default() += 1;
                }
            }
        }
        for (pair, entries) in per_pair {
            if entries > MAX_BILATERAL_PER_PAIR {
                issues.push(Inconsistency::ExcessBilateral { pair, entries });
            }
        }

        for claim in &profile.claims {
            if !profile
                .conditions
                .iter()
                .any(|condition| condition.name == claim.condition)
            {
                issues.push(Inconsistency::OrphanClaim {
                    condition: claim.condition.clone(),
                });
            }
        }

        if let Ok(expected) = self
            .synthesizer
            .compensation()
            .amount(profile.combined_rating, profile.dependents)
        {
            if expected.monthly != profile.monthly_compensation {
                issues.push(Inconsistency::StaleCompensation {
                    stored: profile.monthly_compensation,
                    derived: expected.monthly,
                });
            }
        }

        issues
    }

    pub fn audit(&self, profiles: &[VeteranProfile]) -> AuditReport {
        let mut inconsistent = Vec::new();
        let mut findings = Vec::new();

        for profile in profiles {
            let issues = self.inspect(profile);
            if issues.is_empty() {
                continue;
            }

            let detail: Vec<String> = issues.iter().map(Inconsistency::summary).collect();
            warn!(profile = %profile.id.0, issues = %detail.join("; "), "inconsistent veteran profile");

            findings.push(AuditFinding {
                profile_id: profile.id.clone(),
                issues,
            });
            inconsistent.push(profile.clone());
        }

        AuditReport {
            count: inconsistent.len(),
            inconsistent,
            findings,
        }
    }

    /// Replaces every flagged profile with a fresh synthesis from its recorded parameters.
    /// Consistent profiles pass through untouched and order is preserved.
    pub fn regenerate(
        &self,
        profiles: Vec<VeteranProfile>,
    ) -> Result<Vec<VeteranProfile>, SynthesisError> {
        profiles
            .into_iter()
            .map(|profile| {
                if self.inspect(&profile).is_empty() {
                    return Ok(profile);
                }
                match profile.provenance {
                    Some(params) => self.synthesizer.synthesize_with(&params),
                    None => {
                        let mut fresh = self
                            .synthesizer
                            .synthesize_with(&self.rebuild_params(&profile))?;
                        fresh.id = profile.id;
                        Ok(fresh)
                    }
                }
            })
            .collect()
    }

    /// Parameters for a profile that carries no provenance. The seed comes from a
    /// seed-shaped id, or is hashed from the id, and combat service is inferred from
    /// combat-only conditions on record.
    fn rebuild_params(&self, profile: &VeteranProfile) -> SynthesisParams {
        let seed = profile.id.seed().unwrap_or_else(|| {
            profile
                .id
                .0
                .bytes()
                .fold(0u64, |hash, byte| splitmix64(hash ^ u64::from(byte)))
        });
        let branch = Branch::ALL[(splitmix64(seed) % Branch::ALL.len() as u64) as usize];
        let catalog = self.synthesizer.catalog();
        let combat_service = profile.conditions.iter().any(|condition| {
            catalog
                .lookup(&condition.diagnostic_code)
                .map(|template| template.combat_only)
                .unwrap_or(false)
        });

        SynthesisParams {
            seed,
            branch,
            combat_service,
            target_rating_hint: None,
        }
    }
}
