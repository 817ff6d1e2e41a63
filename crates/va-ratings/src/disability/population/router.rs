use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::generator::{GenerationOptions, PopulationSummary};
use super::repository::{PopulationRepository, PopulationSnapshot};
use super::service::{PopulationServiceError, VeteranPopulationService};
use crate::disability::catalog::ConditionTemplate;
use crate::disability::combiner::RatingCombiner;
use crate::disability::domain::{Branch, Condition};

/// Body accepted by the generate endpoint. Missing fields fall back to service settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateRequest {
    pub count: Option<usize>,
    pub enhanced: Option<bool>,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegenerateRequest {
    pub count: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CombineRequest {
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompensationQuery {
    pub rating: u8,
    #[serde(default)]
    pub dependents: u8,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EligibilityQuery {
    pub branch: Option<String>,
    #[serde(default)]
    pub combat: bool,
}

/// Router builder exposing the population, rating and catalog endpoints.
pub fn disability_router<R>(service: Arc<VeteranPopulationService<R>>) -> Router
where
    R: PopulationRepository + 'static,
{
    Router::new()
        .route("/api/v1/veterans", get(profiles_handler::<R>))
        .route("/api/v1/veterans/generate", post(generate_handler::<R>))
        .route("/api/v1/veterans/debug", get(debug_handler::<R>))
        .route("/api/v1/veterans/regenerate", post(regenerate_handler::<R>))
        .route("/api/v1/ratings/combine", post(combine_handler))
        .route("/api/v1/compensation", get(compensation_handler::<R>))
        .route("/api/v1/conditions", get(conditions_handler::<R>))
        .route("/api/v1/conditions/:code", get(condition_handler::<R>))
        .with_state(service)
}

fn batch_payload(snapshot: &PopulationSnapshot) -> serde_json::Value {
    json!({
        "batchSeed": snapshot.batch_seed,
        "generation": snapshot.generation,
        "enhanced": snapshot.enhanced,
        "profiles": snapshot.profiles,
        "summary": PopulationSummary::from_profiles(&snapshot.profiles),
    })
}

fn service_error_response(error: PopulationServiceError) -> Response {
    let status = match &error {
        PopulationServiceError::InvalidCount(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PopulationServiceError::EmptyPopulation => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn generate_handler<R>(
    State(service): State<Arc<VeteranPopulationService<R>>>,
    axum::Json(request): axum::Json<GenerateRequest>,
) -> Response
where
    R: PopulationRepository + 'static,
{
    let settings = service.settings();
    let options = GenerationOptions {
        enhanced: request.enhanced.unwrap_or(settings.enhanced),
        seed: request.seed,
    };
    let count = request.count.unwrap_or(settings.batch_size);

    match service.generate_concurrently(count, options).await {
        Ok(snapshot) => (StatusCode::CREATED, axum::Json(batch_payload(&snapshot))).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn debug_handler<R>(
    State(service): State<Arc<VeteranPopulationService<R>>>,
) -> Response
where
    R: PopulationRepository + 'static,
{
    match service.debug() {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn regenerate_handler<R>(
    State(service): State<Arc<VeteranPopulationService<R>>>,
    axum::Json(request): axum::Json<RegenerateRequest>,
) -> Response
where
    R: PopulationRepository + 'static,
{
    let count = request.count.unwrap_or(service.settings().batch_size);
    match service.regenerate(count) {
        Ok(snapshot) => (StatusCode::CREATED, axum::Json(batch_payload(&snapshot))).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn profiles_handler<R>(
    State(service): State<Arc<VeteranPopulationService<R>>>,
) -> Response
where
    R: PopulationRepository + 'static,
{
    match service.profiles() {
        Ok(profiles) => (StatusCode::OK, axum::Json(profiles)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn combine_handler(axum::Json(request): axum::Json<CombineRequest>) -> Response {
    match RatingCombiner::breakdown(&request.conditions) {
        Ok(breakdown) => (StatusCode::OK, axum::Json(breakdown)).into_response(),
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn compensation_handler<R>(
    State(service): State<Arc<VeteranPopulationService<R>>>,
    Query(query): Query<CompensationQuery>,
) -> Response
where
    R: PopulationRepository + 'static,
{
    match service
        .synthesizer()
        .compensation()
        .amount(query.rating, query.dependents)
    {
        Ok(amount) => (StatusCode::OK, axum::Json(amount)).into_response(),
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn condition_handler<R>(
    State(service): State<Arc<VeteranPopulationService<R>>>,
    Path(code): Path<String>,
) -> Response
where
    R: PopulationRepository + 'static,
{
    match service.synthesizer().catalog().lookup(&code) {
        Ok(template) => (StatusCode::OK, axum::Json(template)).into_response(),
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn conditions_handler<R>(
    State(service): State<Arc<VeteranPopulationService<R>>>,
    Query(query): Query<EligibilityQuery>,
) -> Response
where
    R: PopulationRepository + 'static,
{
    let catalog = service.synthesizer().catalog();
    let templates: Vec<&ConditionTemplate> = match query.branch.as_deref() {
        None => catalog.templates().iter().collect(),
        Some(raw) => match Branch::parse(raw) {
            Some(branch) => catalog.list_by_eligibility(branch, query.combat),
            None => {
                let payload = json!({
                    "error": format!("unknown branch '{raw}'"),
                });
                return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
            }
        },
    };

    (StatusCode::OK, axum::Json(templates)).into_response()
}
