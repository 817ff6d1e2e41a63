use crate::config::ConfigError;
use crate::disability::catalog::CatalogError;
use crate::disability::combiner::RatingError;
use crate::disability::compensation::CompensationError;
use crate::disability::population::PopulationServiceError;
use crate::disability::synthesis::SynthesisError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Json(serde_json::Error),
    Server(axum::Error),
    Rating(RatingError),
    Compensation(CompensationError),
    Catalog(CatalogError),
    Synthesis(SynthesisError),
    Population(PopulationServiceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Json(err) => write!(f, "json error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Rating(err) => write!(f, "rating error: {}", err),
            AppError::Compensation(err) => write!(f, "compensation error: {}", err),
            AppError::Catalog(err) => write!(f, "catalog error: {}", err),
            AppError::Synthesis(err) => write!(f, "synthesis error: {}", err),
            AppError::Population(err) => write!(f, "population error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Json(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Rating(err) => Some(err),
            AppError::Compensation(err) => Some(err),
            AppError::Catalog(err) => Some(err),
            AppError::Synthesis(err) => Some(err),
            AppError::Population(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Rating(_) | AppError::Compensation(_) | AppError::Json(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Catalog(_) => StatusCode::NOT_FOUND,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Synthesis(_)
            | AppError::Population(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<RatingError> for AppError {
    fn from(value: RatingError) -> Self {
        Self::Rating(value)
    }
}

impl From<CompensationError> for AppError {
    fn from(value: CompensationError) -> Self {
        Self::Compensation(value)
    }
}

impl From<CatalogError> for AppError {
    fn from(value: CatalogError) -> Self {
        Self::Catalog(value)
    }
}

impl From<SynthesisError> for AppError {
    fn from(value: SynthesisError) -> Self {
        Self::Synthesis(value)
    }
}

impl From<PopulationServiceError> for AppError {
    fn from(value: PopulationServiceError) -> Self {
        Self::Population(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_errors_map_to_unprocessable() {
        let error = AppError::from(RatingError::InvalidRatingValue {
            condition: "Hypertension".to_string(),
            rating: 15,
        });
        assert!(error.to_string().contains("Hypertension"));
        assert_eq!(
            error.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn unknown_codes_map_to_not_found() {
        let error = AppError::from(CatalogError::UnknownDiagnosticCode("Z99".to_string()));
        assert!(std::error::Error::source(&error).is_some());
        assert_eq!(error.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn population_errors_map_to_internal() {
        let error = AppError::from(PopulationServiceError::EmptyPopulation);
        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
