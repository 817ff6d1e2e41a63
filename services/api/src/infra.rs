use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use va_ratings::disability::population::{
    PopulationRepository, PopulationSnapshot, RepositoryError,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local population store. Each `replace` swaps the whole snapshot.
#[derive(Default, Clone)]
pub(crate) struct InMemoryPopulationRepository {
    snapshot: Arc<Mutex<Option<PopulationSnapshot>>>,
}

impl PopulationRepository for InMemoryPopulationRepository {
    fn snapshot(&self) -> Result<Option<PopulationSnapshot>, RepositoryError> {
        let guard = self
            .snapshot
            .lock()
            .map_err(|_| RepositoryError::Unavailable("population mutex poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn replace(&self, snapshot: PopulationSnapshot) -> Result<(), RepositoryError> {
        let mut guard = self
            .snapshot
            .lock()
            .map_err(|_| RepositoryError::Unavailable("population mutex poisoned".to_string()))?;
        *guard = Some(snapshot);
        Ok(())
    }
}

/// A `CODE=RATING` pair given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ConditionArg {
    pub(crate) code: String,
    pub(crate) rating: u8,
}

pub(crate) fn parse_condition_arg(raw: &str) -> Result<ConditionArg, String> {
    let (code, rating) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected CODE=RATING, got '{raw}'"))?;

    let code = code.trim();
    if code.is_empty() {
        return Err(format!("missing diagnostic code in '{raw}'"));
    }

    let rating = rating
        .trim()
        .trim_end_matches('%')
        .parse::<u8>()
        .map_err(|err| format!("failed to parse rating in '{raw}' ({err})"))?;

    Ok(ConditionArg {
        code: code.to_string(),
        rating,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_code_and_rating() {
        assert_eq!(
            parse_condition_arg("S83.91XS=10%").expect("parses"),
            ConditionArg {
                code: "S83.91XS".to_string(),
                rating: 10
            }
        );
        assert!(parse_condition_arg("=10").is_err());
        assert!(parse_condition_arg("H93.11").is_err());
    }

    #[test]
    fn repository_swaps_whole_snapshots() {
        let repository = InMemoryPopulationRepository::default();
        assert_eq!(repository.snapshot().expect("readable"), None);

        let snapshot = PopulationSnapshot {
            batch_seed: 1,
            enhanced: true,
            generation: 1,
            profiles: Vec::new(),
        };
        repository.replace(snapshot.clone()).expect("replace succeeds");
        assert_eq!(repository.snapshot().expect("readable"), Some(snapshot));
    }
}
