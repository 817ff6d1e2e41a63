use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::disability::population::repository::{
    PopulationRepository, PopulationSnapshot, RepositoryError,
};
use crate::disability::population::{
    disability_router, PopulationSettings, VeteranPopulationService,
};

pub(super) fn settings() -> PopulationSettings {
    PopulationSettings {
        default_seed: 4242,
        batch_size: 12,
        enhanced: true,
    }
}

pub(super) fn build_service() -> (
    VeteranPopulationService<MemoryRepository>,
    Arc<MemoryRepository>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let service = VeteranPopulationService::new(repository.clone(), settings());
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) snapshot: Arc<Mutex<Option<PopulationSnapshot>>>,
    pub(super) replacements: Arc<Mutex<usize>>,
}

impl MemoryRepository {
    pub(super) fn replacements(&self) -> usize {
        *self.replacements.lock().expect("repository mutex poisoned")
    }

    pub(super) fn stored(&self) -> Option<PopulationSnapshot> {
        self.snapshot
            .lock()
            .expect("repository mutex poisoned")
            .clone()
    }
}

impl PopulationRepository for MemoryRepository {
    fn snapshot(&self) -> Result<Option<PopulationSnapshot>, RepositoryError> {
        Ok(self.stored())
    }

    fn replace(&self, snapshot: PopulationSnapshot) -> Result<(), RepositoryError> {
        *self.snapshot.lock().expect("repository mutex poisoned") = Some(snapshot);
        *self.replacements.lock().expect("repository mutex poisoned") += 1;
        Ok(())
    }
}

pub(super) struct UnavailableRepository;

impl PopulationRepository for UnavailableRepository {
    fn snapshot(&self) -> Result<Option<PopulationSnapshot>, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn replace(&self, _snapshot: PopulationSnapshot) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4 * 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(
    service: VeteranPopulationService<MemoryRepository>,
) -> axum::Router {
    disability_router(Arc::new(service))
}

pub(super) fn json_request(method: &str, uri: &str, body: Value) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(&body).expect("serialize body"),
        ))
        .expect("request builds")
}

pub(super) fn get_request(uri: &str) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::get(uri)
        .body(axum::body::Body::empty())
        .expect("request builds")
}
