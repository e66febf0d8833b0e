// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Provider registry and the concurrent lookup race
//!
//! [`ProviderRegistry::resolve`] starts one task per registered provider and
//! returns the first address any of them produces, or [`RaceOutcome::Unresolved`]
//! once the deadline passes without one.
//!
//! Provider failures never reach the caller: a failing provider simply does not
//! win. Tasks still running when the race is decided are left to finish on their
//! own; their results go into a channel buffer nobody reads anymore.

use std::{sync::Arc, time::Duration};

use api_client::AddressRecord;
use reqwest::Client;
use tokio::{
    sync::mpsc,
    time::{Instant, sleep_until, timeout_at},
};
use tracing::{Instrument, debug, debug_span, info, warn};

use crate::{AddressLookup, Postmon, RepublicaVirtual, ViaCep};

/// Overall time budget for one lookup
pub const LOOKUP_DEADLINE: Duration = Duration::from_secs(1);

/// Upper bound for a single provider request, so abandoned tasks always terminate
pub const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// Stand-in expiry for deadlines too large to add to the current instant
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

const USER_AGENT: &str = concat!("zip-finder/", env!("CARGO_PKG_VERSION"));

/// Result of a lookup race
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RaceOutcome {
    /// A provider answered before the deadline
    Resolved(AddressRecord),
    /// No provider answered before the deadline
    Unresolved,
}

impl RaceOutcome {
    /// Whether a provider answered in time
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// The winning record, if any
    pub fn into_record(self) -> Option<AddressRecord> {
        match self {
            Self::Resolved(record) => Some(record),
            Self::Unresolved => None,
        }
    }

    /// Short label used in logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            Self::Resolved(_) => "resolved",
            Self::Unresolved => "unresolved",
        }
    }
}

/// Error type for registry operations
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The shared HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Registry of postal code providers raced on every lookup
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    services: Vec<Arc<dyn AddressLookup>>,
    client: Client,
}

/// The production providers, in no particular order
pub fn default_services() -> Vec<Arc<dyn AddressLookup>> {
    vec![
        Arc::new(ViaCep::new()),
        Arc::new(Postmon::new()),
        Arc::new(RepublicaVirtual::new()),
    ]
}

impl ProviderRegistry {
    /// Create a registry with the production providers
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn new() -> Result<Self, RegistryError> {
        Self::with_services(default_services())
    }

    /// Create a registry racing the given providers
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn with_services(services: Vec<Arc<dyn AddressLookup>>) -> Result<Self, RegistryError> {
        let client = Client::builder()
            .timeout(PROVIDER_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self::with_client(client, services))
    }

    /// Create a registry with a caller-provided HTTP client
    pub fn with_client(client: Client, services: Vec<Arc<dyn AddressLookup>>) -> Self {
        Self { services, client }
    }

    /// Resolve a raw zip code by racing every provider against `deadline`
    ///
    /// The zip code is passed to providers unmodified. The first record any
    /// provider publishes wins; there is no ranking between providers. When no
    /// provider succeeds, [`RaceOutcome::Unresolved`] is returned once the
    /// deadline has elapsed, even if every provider failed earlier.
    pub async fn resolve(&self, zip_code: &str, deadline: Duration) -> RaceOutcome {
        let now = Instant::now();
        let expires_at = now
            .checked_add(deadline)
            .unwrap_or_else(|| now + FAR_FUTURE);

        // One slot per provider, so a publisher never waits on the consumer.
        let (sender, mut receiver) = mpsc::channel(self.services.len().max(1));

        for service in &self.services {
            let service = Arc::clone(service);
            let client = self.client.clone();
            let zip_code = zip_code.to_owned();
            let sender = sender.clone();
            let span = debug_span!("provider_lookup", service = service.service_name());

            tokio::spawn(
                async move {
                    let started = Instant::now();
                    match service.lookup(&client, &zip_code).await {
                        Ok(record) => {
                            debug!(elapsed = ?started.elapsed(), "provider produced an address");
                            if sender.try_send(record).is_err() {
                                debug!("race already decided, discarding address");
                            }
                        }
                        Err(error) => {
                            debug!(elapsed = ?started.elapsed(), %error, "provider lookup failed");
                        }
                    }
                }
                .instrument(span),
            );
        }
        drop(sender);

        match timeout_at(expires_at, receiver.recv()).await {
            Ok(Some(record)) => {
                info!(service = record.provider(), zip_code, "postal code resolved");
                RaceOutcome::Resolved(record)
            }
            Ok(None) => {
                // Every provider failed early; the outcome is still only known at the deadline.
                sleep_until(expires_at).await;
                warn!(zip_code, "no provider resolved the postal code");
                RaceOutcome::Unresolved
            }
            Err(_) => {
                warn!(zip_code, ?deadline, "postal code lookup deadline exceeded");
                RaceOutcome::Unresolved
            }
        }
    }

    /// Get the number of registered providers
    pub fn provider_count(&self) -> usize {
        self.services.len()
    }

    /// Get the names of all registered providers
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.services
            .iter()
            .map(|service| service.service_name())
            .collect()
    }
}
