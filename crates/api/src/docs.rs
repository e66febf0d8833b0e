// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! `OpenAPI` document definition

use shared_types::AddressRecord;
use utoipa::OpenApi;

use crate::{
    config::Environment,
    routes::handlers,
    state::{HealthCheck, HealthStatus},
};

/// `OpenAPI` document for the zip-finder HTTP surface
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "zip-finder",
        description = "Brazilian postal code lookup racing several public providers"
    ),
    paths(handlers::health_handler, handlers::lookup_handler),
    components(schemas(AddressRecord, HealthCheck, HealthStatus, Environment)),
    tags(
        (name = "lookup", description = "Postal code lookup"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
