use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::task::JoinSet;
use tracing::info;

use super::generator::{GenerationOptions, PopulationGenerator, PopulationSummary};
use super::repository::{PopulationRepository, PopulationSnapshot, RepositoryError};
use crate::disability::domain::VeteranProfile;
use crate::disability::synthesis::{derive_seed, ProfileSynthesizer, SynthesisError};
use crate::disability::validator::{AuditFinding, AuditReport, ConsistencyValidator};

pub const DEFAULT_POPULATION_SEED: u64 = 20_240_101;
pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const MAX_BATCH_SIZE: usize = 10_000;

/// Members synthesized per blocking task during concurrent generation.
const CHUNK_SIZE: u64 = 64;

/// Defaults applied when a caller leaves batch parameters unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopulationSettings {
    pub default_seed: u64,
    pub batch_size: usize,
    pub enhanced: bool,
}

impl Default for PopulationSettings {
    fn default() -> Self {
        Self {
            default_seed: DEFAULT_POPULATION_SEED,
            batch_size: DEFAULT_BATCH_SIZE,
            enhanced: true,
        }
    }
}

/// Diagnostic view of the current batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugReport {
    pub batch_seed: u64,
    pub generation: u64,
    pub generated: Vec<VeteranProfile>,
    pub inconsistencies: Vec<VeteranProfile>,
    pub findings: Vec<AuditFinding>,
    pub summary: PopulationSummary,
}

/// Service owning the current population and the generate/debug/regenerate lifecycle.
pub struct VeteranPopulationService<R> {
    repository: Arc<R>,
    generator: Arc<PopulationGenerator>,
    validator: Arc<ConsistencyValidator>,
    settings: PopulationSettings,
    /// Last stored generation. Held while the repository swaps snapshots so stores land
    /// in generation order.
    generation: Mutex<u64>,
    /// Count of `regenerate` calls, feeding the fresh batch seeds.
    regenerations: AtomicU64,
}

impl<R> VeteranPopulationService<R>
where
    R: PopulationRepository + 'static,
{
    pub fn new(repository: Arc<R>, settings: PopulationSettings) -> Self {
        Self::with_synthesizer(repository, ProfileSynthesizer::default(), settings)
    }

    pub fn with_synthesizer(
        repository: Arc<R>,
        synthesizer: ProfileSynthesizer,
        settings: PopulationSettings,
    ) -> Self {
        Self {
            repository,
            generator: Arc::new(PopulationGenerator::new(synthesizer.clone())),
            validator: Arc::new(ConsistencyValidator::new(synthesizer)),
            settings,
            generation: Mutex::new(0),
            regenerations: AtomicU64::new(0),
        }
    }

    pub fn settings(&self) -> PopulationSettings {
        self.settings
    }

    pub fn synthesizer(&self) -> &ProfileSynthesizer {
        self.generator.synthesizer()
    }

    /// Generate a batch and make it the current population.
    pub fn generate(
        &self,
        count: usize,
        options: GenerationOptions,
    ) -> Result<PopulationSnapshot, PopulationServiceError> {
        let count = checked_count(count)?;
        let batch_seed = options.seed.unwrap_or(self.settings.default_seed);
        let profiles = self
            .generator
            .generate(count, batch_seed, options.enhanced)?;
        self.store(batch_seed, options.enhanced, profiles)
    }

    /// Same batch as [`Self::generate`], synthesized across blocking worker tasks.
    pub async fn generate_concurrently(
        &self,
        count: usize,
        options: GenerationOptions,
    ) -> Result<PopulationSnapshot, PopulationServiceError> {
        let count = checked_count(count)? as u64;
        let batch_seed = options.seed.unwrap_or(self.settings.default_seed);

        let mut tasks = JoinSet::new();
        let mut start = 0;
        while start < count {
            let end = (start + CHUNK_SIZE).min(count);
            let generator = Arc::clone(&self.generator);
            let enhanced = options.enhanced;
            tasks.spawn_blocking(move || {
                (start, generator.generate_range(batch_seed, start..end, enhanced))
            });
            start = end;
        }

        let mut chunks = BTreeMap::new();
        while let Some(joined) = tasks.join_next().await {
            let (start, chunk) =
                joined.map_err(|error| PopulationServiceError::Join(error.to_string()))?;
            chunks.insert(start, chunk?);
        }
        let profiles: Vec<VeteranProfile> = chunks.into_values().flatten().collect();

        self.store(batch_seed, options.enhanced, profiles)
    }

    /// Audit the current batch, generating the configured default batch when none exists.
    pub fn debug(&self) -> Result<DebugReport, PopulationServiceError> {
        let snapshot = match self.repository.snapshot()? {
            Some(snapshot) => snapshot,
            None => self.generate(
                self.settings.batch_size,
                GenerationOptions {
                    enhanced: self.settings.enhanced,
                    seed: None,
                },
            )?,
        };

        let report = self.validator.audit(&snapshot.profiles);
        Ok(DebugReport {
            batch_seed: snapshot.batch_seed,
            generation: snapshot.generation,
            summary: PopulationSummary::from_profiles(&snapshot.profiles),
            generated: snapshot.profiles,
            inconsistencies: report.inconsistent,
            findings: report.findings,
        })
    }

    /// Discard the current batch and generate a fresh one from a new batch seed.
    pub fn regenerate(&self, count: usize) -> Result<PopulationSnapshot, PopulationServiceError> {
        let count = checked_count(count)?;
        let regeneration = self.regenerations.fetch_add(1, Ordering::Relaxed) + 1;
        let batch_seed = derive_seed(self.settings.default_seed, regeneration);
        let profiles = self
            .generator
            .generate(count, batch_seed, self.settings.enhanced)?;
        self.store(batch_seed, self.settings.enhanced, profiles)
    }

    /// Replace flagged members of the current batch with fresh syntheses.
    pub fn repair(&self) -> Result<PopulationSnapshot, PopulationServiceError> {
        let Some(current) = self.repository.snapshot()? else {
            return Err(PopulationServiceError::EmptyPopulation);
        };

        let flagged = self.validator.audit(&current.profiles).count;
        let profiles = self.validator.regenerate(current.profiles)?;
        info!(repaired = flagged, "repaired veteran population");
        self.store(current.batch_seed, current.enhanced, profiles)
    }

    pub fn profiles(&self) -> Result<Vec<VeteranProfile>, PopulationServiceError> {
        Ok(self
            .repository
            .snapshot()?
            .map(|snapshot| snapshot.profiles)
            .unwrap_or_default())
    }

    pub fn audit(&self, profiles: &[VeteranProfile]) -> AuditReport {
        self.validator.audit(profiles)
    }

    fn store(
        &self,
        batch_seed: u64,
        enhanced: bool,
        profiles: Vec<VeteranProfile>,
    ) -> Result<PopulationSnapshot, PopulationServiceError> {
        let inconsistent = self.validator.audit(&profiles).count;

        // the counter stays consistent even if a previous holder panicked
        let mut last = self
            .generation
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let generation = *last + 1;
        info!(
            generation,
            batch_seed,
            count = profiles.len(),
            enhanced,
            inconsistent,
            "stored veteran population"
        );

        let snapshot = PopulationSnapshot {
            batch_seed,
            enhanced,
            generation,
            profiles,
        };
        self.repository.replace(snapshot.clone())?;
        *last = generation;
        Ok(snapshot)
    }
}

fn checked_count(count: usize) -> Result<usize, PopulationServiceError> {
    if count == 0 || count > MAX_BATCH_SIZE {
        return Err(PopulationServiceError::InvalidCount(count));
    }
    Ok(count)
}

/// Error raised by the population service.
#[derive(Debug, thiserror::Error)]
pub enum PopulationServiceError {
    #[error("batch size {0} is outside 1..=10000")]
    InvalidCount(usize),
    #[error("no population has been generated yet")]
    EmptyPopulation,
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("generation task failed: {0}")]
    Join(String),
}
