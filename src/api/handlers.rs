use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::SecondsFormat;
use serde::Serialize;
use std::sync::Arc;

use super::validation::{validate_create, FieldError};
use crate::config::Config;
use crate::models::{CreateUrlRequest, CreateUrlResponse, UrlStats};
use crate::registry::{Registry, RegistryError};

pub struct AppState {
    pub registry: Arc<Registry>,
    pub config: Arc<Config>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse::new(message)))
}

/// Create a new short URL
pub async fn create_url(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateUrlRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateUrlResponse>), ApiError> {
    let Json(payload) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection.body_text(), "Rejected create short URL body");
        api_error(StatusCode::BAD_REQUEST, "Invalid JSON body")
    })?;

    let request = validate_create(&payload, state.config.links.default_validity_minutes)
        .map_err(|details| {
            tracing::warn!(errors = ?details, "Validation error in create short URL");
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Validation failed".to_string(),
                    details: Some(details),
                }),
            )
        })?;

    let created = state
        .registry
        .create(
            &request.url,
            request.validity_minutes,
            request.shortcode.as_deref(),
        )
        .map_err(|err| {
            tracing::warn!(error = %err, original_url = %request.url, "Failed to create short URL");
            match err {
                RegistryError::InvalidUrl { .. } => {
                    api_error(StatusCode::BAD_REQUEST, "Invalid URL format")
                }
                RegistryError::InvalidValidity { .. } => {
                    api_error(StatusCode::BAD_REQUEST, "Invalid validity")
                }
                RegistryError::ShortcodeTaken { .. } => {
                    api_error(StatusCode::CONFLICT, "Shortcode already in use")
                }
                RegistryError::GenerationExhausted { .. }
                | RegistryError::NotFound { .. }
                | RegistryError::Expired { .. } => api_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to create short URL",
                ),
            }
        })?;

    Ok((
        StatusCode::CREATED,
        Json(CreateUrlResponse {
            short_link: state.config.short_link(&created.shortcode),
            expiry: created
                .expires_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        }),
    ))
}

/// Statistics for a short URL, including expired ones that have not been
/// swept yet
pub async fn get_url_stats(
    State(state): State<Arc<AppState>>,
    Path(shortcode): Path<String>,
) -> Result<Json<UrlStats>, ApiError> {
    if shortcode.len() < 3 {
        tracing::warn!(shortcode = %shortcode, "Invalid shortcode provided");
        return Err(api_error(StatusCode::BAD_REQUEST, "Invalid shortcode"));
    }

    match state.registry.statistics(&shortcode) {
        Ok(stats) => {
            tracing::info!(
                shortcode = %shortcode,
                total_clicks = stats.total_clicks,
                is_expired = stats.is_expired,
                "Short URL statistics retrieved"
            );
            Ok(Json(stats))
        }
        Err(err) => {
            tracing::warn!(shortcode = %shortcode, error = %err, "Failed to retrieve short URL statistics");
            Err(api_error(StatusCode::NOT_FOUND, "Short URL not found"))
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        message: "URL Shortener Service is running".to_string(),
    })
}

/// Fallback for unmatched routes and unsupported methods on known ones
pub async fn route_not_found() -> ApiError {
    api_error(StatusCode::NOT_FOUND, "Route not found")
}
