// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! ViaCEP integration
//!
//! ViaCEP answers `GET /ws/{zip}/json/` with HTTP 200 even for unknown postal
//! codes; the body then carries an `"erro"` key instead of an address.

use api_client::{AddressRecord, ApiError, ZipCodeService, nullable_string};
use serde::Deserialize;
use serde_json::{Map, Value};
use url::Url;

/// Production base URL
pub const VIACEP_BASE_URL: &str = "https://viacep.com.br/";

/// Provider identifier
pub const VIACEP_SERVICE_ID: &str = "viacep";

/// Field that marks a "not found" answer
const NOT_FOUND_FIELD: &str = "erro";

/// ViaCEP response layout
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ViaCepResponse {
    /// Street name
    #[serde(deserialize_with = "nullable_string")]
    pub logradouro: String,
    /// District
    #[serde(deserialize_with = "nullable_string")]
    pub bairro: String,
    /// City
    #[serde(deserialize_with = "nullable_string")]
    pub localidade: String,
    /// State code
    #[serde(deserialize_with = "nullable_string")]
    pub uf: String,
}

/// ViaCEP adapter
#[derive(Debug, Clone)]
pub struct ViaCep {
    base_url: String,
}

impl Default for ViaCep {
    fn default() -> Self {
        Self::new()
    }
}

impl ViaCep {
    /// Create an adapter pointing at the production endpoint
    pub fn new() -> Self {
        Self::with_base_url(VIACEP_BASE_URL)
    }

    /// Create an adapter pointing at a custom base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl ZipCodeService for ViaCep {
    type Payload = ViaCepResponse;

    fn name(&self) -> &'static str {
        VIACEP_SERVICE_ID
    }

    fn endpoint(&self, zip_code: &str) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|()| ApiError::Configuration {
                message: format!("{} cannot be used as a base URL", self.base_url),
            })?
            .pop_if_empty()
            .extend(["ws", zip_code, "json", ""]);
        Ok(url)
    }

    fn is_valid_body(&self, body: &[u8]) -> bool {
        // Bodies that are not JSON objects are left for `parse` to reject.
        !serde_json::from_slice::<Map<String, Value>>(body)
            .is_ok_and(|fields| fields.contains_key(NOT_FOUND_FIELD))
    }

    fn to_canonical(&self, payload: Self::Payload) -> AddressRecord {
        AddressRecord::new(
            VIACEP_SERVICE_ID,
            payload.localidade,
            payload.bairro,
            payload.logradouro,
            payload.uf,
        )
    }
}
