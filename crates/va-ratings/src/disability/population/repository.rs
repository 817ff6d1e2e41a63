use serde::Serialize;

use crate::disability::domain::VeteranProfile;

/// The batch the service currently serves, along with how it was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationSnapshot {
    pub batch_seed: u64,
    pub enhanced: bool,
    pub generation: u64,
    pub profiles: Vec<VeteranProfile>,
}

impl PopulationSnapshot {
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

/// Storage abstraction so the service module can be exercised in isolation.
///
/// Implementations swap the stored snapshot as a whole; readers never observe a batch
/// that mixes members of two generations.
pub trait PopulationRepository: Send + Sync {
    fn snapshot(&self) -> Result<Option<PopulationSnapshot>, RepositoryError>;
    fn replace(&self, snapshot: PopulationSnapshot) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
