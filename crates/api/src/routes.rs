// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Routes module
//!
//! This module provides route configuration and handlers for the zip-finder server.

pub mod handlers;

use axum::{Router, routing::get};
use handlers::{health_handler, lookup_handler};

use crate::{
    metrics::metrics_handler,
    openapi::{openapi_spec, swagger_ui},
    state::ServerState,
};

/// Create application routes
///
/// Fixed routes are matched before the `/{zipcode}` capture, so `/health`
/// never reaches the lookup handler.
pub fn create_routes() -> Router<ServerState> {
    let ops_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler));

    let docs_routes = Router::new()
        .route("/api-doc/openapi.json", get(openapi_spec))
        .route("/swagger-ui", get(swagger_ui));

    let lookup_routes = Router::new().route("/{zipcode}", get(lookup_handler));

    Router::new()
        .merge(ops_routes)
        .merge(docs_routes)
        .merge(lookup_routes)
}
