use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::disability::domain::{Branch, ServiceEra, SynthesisParams, VeteranProfile};
use crate::disability::synthesis::{
    derive_seed, history_seed, profile_rng, ProfileSynthesizer, SynthesisError,
};

/// Caller options for a bulk generation request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    /// Draw service era first and weigh combat exposure by era.
    #[serde(default)]
    pub enhanced: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Era mix of the veteran population, weights out of 100.
const ERA_WEIGHTS: [(ServiceEra, u32); 4] = [
    (ServiceEra::Vietnam, 10),
    (ServiceEra::PostVietnam, 20),
    (ServiceEra::GulfWar, 20),
    (ServiceEra::OifOef, 50),
];

/// Expands a batch seed into per-member synthesis parameters.
#[derive(Debug, Clone, Default)]
pub struct PopulationGenerator {
    synthesizer: ProfileSynthesizer,
}

impl PopulationGenerator {
    pub fn new(synthesizer: ProfileSynthesizer) -> Self {
        Self { synthesizer }
    }

    pub fn synthesizer(&self) -> &ProfileSynthesizer {
        &self.synthesizer
    }

    /// Parameters for the `index`-th member of the batch. Depends only on its arguments.
    pub fn params_for(&self, batch_seed: u64, index: u64, enhanced: bool) -> SynthesisParams {
        self.draw_member(batch_seed, index, enhanced).0
    }

    /// Like [`Self::params_for`], also returning the service era drawn in enhanced mode.
    pub fn draw_member(
        &self,
        batch_seed: u64,
        index: u64,
        enhanced: bool,
    ) -> (SynthesisParams, Option<ServiceEra>) {
        let seed = derive_seed(batch_seed, index);
        let mut rng = profile_rng(history_seed(seed));

        let branch = Branch::ALL
            .choose(&mut rng)
            .copied()
            .unwrap_or(Branch::Army);

        let (combat_service, era) = if enhanced {
            let era = ERA_WEIGHTS
                .choose_weighted(&mut rng, |(_, weight)| *weight)
                .map(|(era, _)| *era)
                .unwrap_or(ServiceEra::OifOef);
            (rng.gen_bool(era.combat_probability()), Some(era))
        } else {
            (rng.gen_bool(0.5), None)
        };

        let params = SynthesisParams {
            seed,
            branch,
            combat_service,
            target_rating_hint: None,
        };
        (params, era)
    }

    pub fn generate_range(
        &self,
        batch_seed: u64,
        indices: std::ops::Range<u64>,
        enhanced: bool,
    ) -> Result<Vec<VeteranProfile>, SynthesisError> {
        indices
            .map(|index| {
                let params = self.params_for(batch_seed, index, enhanced);
                self.synthesizer.synthesize_with(&params)
            })
            .collect()
    }

    pub fn generate(
        &self,
        count: usize,
        batch_seed: u64,
        enhanced: bool,
    ) -> Result<Vec<VeteranProfile>, SynthesisError> {
        self.generate_range(batch_seed, 0..count as u64, enhanced)
    }
}

/// Aggregate counts for a generated batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationSummary {
    pub total: usize,
    pub with_ratings: usize,
    pub with_conditions: usize,
    pub with_claims: usize,
    pub phantom: usize,
    pub invalid_ratings: usize,
    pub approximated_compensation: usize,
}

impl PopulationSummary {
    pub fn from_profiles(profiles: &[VeteranProfile]) -> Self {
        let count = |predicate: fn(&VeteranProfile) -> bool| {
            profiles.iter().filter(|profile| predicate(profile)).count()
        };

        Self {
            total: profiles.len(),
            with_ratings: count(|profile| profile.has_rating()),
            with_conditions: count(|profile| !profile.conditions.is_empty()),
            with_claims: count(|profile| !profile.claims.is_empty()),
            phantom: count(|profile| profile.is_phantom()),
            invalid_ratings: count(|profile| profile.combined_rating % 10 != 0),
            approximated_compensation: count(|profile| profile.compensation_approximated),
        }
    }
}
