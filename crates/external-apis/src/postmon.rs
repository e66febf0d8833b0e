// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Postmon integration
//!
//! Postmon signals an unknown postal code with an empty body.

use api_client::{AddressRecord, ApiError, ZipCodeService, nullable_string};
use serde::Deserialize;
use url::Url;

/// Production base URL
pub const POSTMON_BASE_URL: &str = "https://api.postmon.com.br/";

/// Provider identifier
pub const POSTMON_SERVICE_ID: &str = "postmon";

/// Postmon response layout
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PostmonResponse {
    /// District
    #[serde(deserialize_with = "nullable_string")]
    pub bairro: String,
    /// City
    #[serde(deserialize_with = "nullable_string")]
    pub cidade: String,
    /// Street name
    #[serde(deserialize_with = "nullable_string")]
    pub logradouro: String,
    /// State code
    #[serde(deserialize_with = "nullable_string")]
    pub estado: String,
}

/// Postmon adapter
#[derive(Debug, Clone)]
pub struct Postmon {
    base_url: String,
}

impl Default for Postmon {
    fn default() -> Self {
        Self::new()
    }
}

impl Postmon {
    /// Create an adapter pointing at the production endpoint
    pub fn new() -> Self {
        Self::with_base_url(POSTMON_BASE_URL)
    }

    /// Create an adapter pointing at a custom base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl ZipCodeService for Postmon {
    type Payload = PostmonResponse;

    fn name(&self) -> &'static str {
        POSTMON_SERVICE_ID
    }

    fn endpoint(&self, zip_code: &str) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|()| ApiError::Configuration {
                message: format!("{} cannot be used as a base URL", self.base_url),
            })?
            .pop_if_empty()
            .extend(["v1", "cep", zip_code]);
        Ok(url)
    }

    fn is_valid_body(&self, body: &[u8]) -> bool {
        !body.is_empty()
    }

    fn to_canonical(&self, payload: Self::Payload) -> AddressRecord {
        AddressRecord::new(
            POSTMON_SERVICE_ID,
            payload.cidade,
            payload.bairro,
            payload.logradouro,
            payload.estado,
        )
    }
}
