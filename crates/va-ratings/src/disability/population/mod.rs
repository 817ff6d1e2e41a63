//! Batch generation, diagnostics and regeneration of synthetic veteran populations.
//!
//! The service owns the generate/debug/regenerate lifecycle on top of a repository that
//! stores one snapshot at a time. The router exposes it over HTTP along with the
//! stateless rating, compensation and catalog lookups.

pub mod generator;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use generator::{GenerationOptions, PopulationGenerator, PopulationSummary};
pub use repository::{PopulationRepository, PopulationSnapshot, RepositoryError};
pub use router::{disability_router, CombineRequest, GenerateRequest, RegenerateRequest};
pub use service::{
    DebugReport, PopulationServiceError, PopulationSettings, VeteranPopulationService,
    DEFAULT_BATCH_SIZE, DEFAULT_POPULATION_SEED, MAX_BATCH_SIZE,
};
