// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! zip-finder HTTP server
//!
//! A thin axum layer over the provider race in `external-apis`: `GET /{zipcode}`
//! answers with the first address any provider returns, or `204 No Content`
//! when none answers within the lookup deadline.
//!
//! # Module Structure
//!
//! - [`config`]: Server configuration and environment management with hierarchical loading
//! - [`error`]: Error types and HTTP response handling with proper status codes
//! - [`state`]: Shared application state with cancellation token support
//! - [`server`]: Main server implementation, lifecycle, and coordinated shutdown
//! - [`routes`]: Route configuration and HTTP request handlers
//! - [`metrics`]: Prometheus lookup metrics and the `/metrics` endpoint
//! - [`openapi`]: `OpenAPI` specification and Swagger UI endpoints for API documentation

pub mod config;
pub mod docs;
pub mod error;
pub mod metrics;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{Environment, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use server::{Server, ShutdownConfig};
pub use shared_types::AddressRecord;
pub use state::{HealthCheck, HealthStatus, ServerState};
