// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Server state management module
//!
//! Shared application state for the zip-finder server: configuration, the
//! provider registry and the cancellation token used for coordinated shutdown.

use std::sync::Arc;

use external_apis::ProviderRegistry;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use utoipa::ToSchema;

use crate::config::{Environment, ServerConfig};

/// Shared application state with cancellation token support
#[derive(Debug, Clone)]
pub struct ServerState {
    /// Server configuration
    config: ServerConfig,
    /// Providers raced on every lookup
    registry: Arc<ProviderRegistry>,
    /// Cancellation token for coordinated shutdown
    pub cancellation_token: CancellationToken,
}

impl ServerState {
    /// Create new server state
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `registry` - Providers raced on every lookup
    /// * `cancellation_token` - Token for coordinated cancellation
    pub fn new(
        config: ServerConfig,
        registry: Arc<ProviderRegistry>,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            config,
            registry,
            cancellation_token,
        }
    }

    /// Server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the provider registry
    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    /// Report service health
    ///
    /// Providers are not contacted here: a provider that is down only loses races.
    /// The service is degraded when nothing is registered to race.
    pub fn health_check(&self) -> HealthCheck {
        let providers: Vec<String> = self
            .registry
            .provider_names()
            .into_iter()
            .map(ToString::to_string)
            .collect();

        let status = if providers.is_empty() {
            HealthStatus::Degraded {
                reason: Box::from("no postal code providers registered"),
            }
        } else {
            HealthStatus::Up
        };

        HealthCheck {
            status,
            version: Box::from(env!("CARGO_PKG_VERSION")),
            environment: self.config.environment,
            timestamp: chrono::Utc::now().to_rfc3339(),
            providers,
        }
    }
}

/// Health status of the service
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub enum HealthStatus {
    /// Service is fully operational and responding normally
    Up,

    /// Service is running but cannot resolve anything
    Degraded {
        /// Human-readable explanation of the degradation condition
        reason: Box<str>,
    },
}

/// Health check status
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthCheck {
    /// Service status
    pub status: HealthStatus,
    /// Service version
    pub version: Box<str>,
    /// Environment
    pub environment: Environment,
    /// Timestamp
    pub timestamp: String,
    /// Identifiers of the providers raced on every lookup
    #[schema(example = json!(["viacep", "postmon", "republica_virtual"]))]
    pub providers: Vec<String>,
}
