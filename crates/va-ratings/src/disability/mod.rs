//! VA disability rating engine: condition catalog, combined-rating math, compensation
//! schedule, seeded profile synthesis and the population audit built on top of them.

pub mod catalog;
pub mod combiner;
pub mod compensation;
pub mod domain;
pub mod population;
pub mod synthesis;
pub mod validator;

pub use catalog::{CatalogError, ConditionCatalog, ConditionTemplate, LimbPair};
pub use combiner::{CombinationBreakdown, RatingCombiner, RatingError};
pub use compensation::{CompensationAmount, CompensationError, CompensationLookup, Usd};
pub use domain::{
    Branch, ClaimRecord, ClaimStatus, Condition, ServiceEra, SynthesisParams, VeteranId,
    VeteranProfile,
};
pub use population::{disability_router, VeteranPopulationService};
pub use synthesis::{ProfileSynthesizer, SynthesisError};
pub use validator::{AuditReport, ConsistencyValidator, Inconsistency};
