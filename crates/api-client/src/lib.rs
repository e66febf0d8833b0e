// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Provider traits and utilities for postal code lookup services
//!
//! This crate provides the common abstraction every postal code provider implements,
//! independent of how the HTTP call is made or how providers are raced.
//!
//! # Core Abstractions
//!
//! - **`ZipCodeService` Trait**: endpoint construction, soft-failure detection,
//!   payload parsing and mapping to the canonical [`AddressRecord`]
//! - **Error Handling**: [`ApiError`] classifies transport, status, not-found and
//!   decoding failures
//!
//! Providers answer HTTP 200 even when a postal code does not exist, each with its
//! own "not found" signal, so a generic status check is never enough on its own.
//! [`ZipCodeService::is_valid_body`] carries that provider-specific check.

use std::fmt;

use serde::{Deserialize, Deserializer, de::DeserializeOwned};
pub use shared_types::AddressRecord;
use thiserror::Error;
use url::Url;

/// Contract every postal code provider implements
///
/// Implementations are stateless apart from their immutable endpoint template,
/// so a single value can serve any number of concurrent lookups.
pub trait ZipCodeService: Send + Sync + fmt::Debug + 'static {
    /// Provider-specific response layout
    type Payload: DeserializeOwned + Send;

    /// Identifier stamped on every record this provider produces
    fn name(&self) -> &'static str;

    /// Build the request URL for a raw, unnormalized zip code
    fn endpoint(&self, zip_code: &str) -> Result<Url, ApiError>;

    /// Whether the body is a real answer rather than the provider's "not found"
    fn is_valid_body(&self, body: &[u8]) -> bool;

    /// Decode the body into the provider's own field layout
    fn parse(&self, body: &[u8]) -> Result<Self::Payload, ApiError> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Map the provider payload to the canonical record
    fn to_canonical(&self, payload: Self::Payload) -> AddressRecord;

    /// Run the body through the validity check, the parser and the mapping
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the provider signalled a missing zip
    /// code, or [`ApiError::InvalidResponse`] when the body cannot be decoded.
    fn convert_body(&self, body: &[u8]) -> Result<AddressRecord, ApiError> {
        if !self.is_valid_body(body) {
            return Err(ApiError::NotFound {
                service: self.name(),
            });
        }

        let payload = self.parse(body)?;
        Ok(self.to_canonical(payload))
    }
}

/// Deserialize a provider string field, reading JSON `null` as `""`
///
/// Pair with `#[serde(default)]` so a missing key is empty as well.
pub fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Common errors that can occur while querying a provider
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure: connection, DNS, timeout or body read
    #[error("HTTP request failed: {message}")]
    Http {
        /// Error message
        message: String,
    },

    /// Provider answered with a non-success status
    #[error("{service} answered with status {status}")]
    Status {
        /// Provider identifier
        service: &'static str,
        /// HTTP status code received
        status: u16,
    },

    /// Provider signalled that the zip code does not exist
    #[error("{service} reported the zip code as not found")]
    NotFound {
        /// Provider identifier
        service: &'static str,
    },

    /// Invalid response format
    #[error("Invalid response format: {message}")]
    InvalidResponse {
        /// Decoder error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message
        message: String,
    },
}

impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        Self::InvalidResponse {
            message: error.to_string(),
        }
    }
}

impl From<url::ParseError> for ApiError {
    fn from(error: url::ParseError) -> Self {
        Self::Configuration {
            message: error.to_string(),
        }
    }
}
