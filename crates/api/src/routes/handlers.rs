// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP request handlers module
//!
//! Health reporting and the postal code lookup endpoint.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use external_apis::{LOOKUP_DEADLINE, RaceOutcome};
use shared_types::{AddressRecord, MIN_ZIP_CODE_DIGITS, is_valid_zip_code, normalize_zip_code};
use tokio::time::Instant;
use tracing::debug;

use crate::{
    error::ServerError,
    metrics,
    state::{HealthCheck, ServerState},
};

/// Health check endpoint handler
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    summary = "Health check endpoint",
    description = "Returns the current health status of the service including version, environment information and the postal code providers raced on every lookup.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthCheck)
    )
)]
pub async fn health_handler(State(state): State<ServerState>) -> Json<HealthCheck> {
    Json(state.health_check())
}

/// Postal code lookup
///
/// Races every provider for up to one second and answers with the first
/// address any of them returns. The zip code is forwarded to the providers
/// exactly as received.
///
/// # Errors
///
/// Returns `ServerError::ValidationError` when strict validation is enabled
/// and the zip code has fewer than eight digits.
#[utoipa::path(
    get,
    path = "/{zipcode}",
    tag = "lookup",
    summary = "Look up a Brazilian postal code",
    description = "Queries ViaCEP, Postmon and República Virtual concurrently and returns the first address found. Answers 204 when no provider finds the postal code within one second.",
    params(
        ("zipcode" = String, Path, description = "Postal code, with or without punctuation", example = "01310-100")
    ),
    responses(
        (status = 200, description = "Address found", body = AddressRecord),
        (status = 204, description = "No provider found the postal code before the deadline"),
        (status = 400, description = "Postal code rejected by strict validation", body = String)
    )
)]
pub async fn lookup_handler(
    State(state): State<ServerState>,
    Path(zip_code): Path<String>,
) -> Result<Response, ServerError> {
    if !is_valid_zip_code(&zip_code) {
        if state.config().strict_zip_validation {
            return Err(ServerError::ValidationError(format!(
                "zip code must contain at least {MIN_ZIP_CODE_DIGITS} digits"
            )));
        }
        debug!(
            %zip_code,
            digits = %normalize_zip_code(&zip_code),
            "zip code has too few digits, looking it up anyway"
        );
    }

    let started = Instant::now();
    let outcome = state.registry().resolve(&zip_code, LOOKUP_DEADLINE).await;
    metrics::record_lookup(&outcome, started.elapsed());

    Ok(match outcome {
        RaceOutcome::Resolved(record) => Json(record).into_response(),
        RaceOutcome::Unresolved => StatusCode::NO_CONTENT.into_response(),
    })
}
