// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! República Virtual integration
//!
//! República Virtual always answers HTTP 200. An unknown postal code comes back
//! with `"resultado": "0"`. The street type (`"Avenida"`, `"Rua"`, ...) is a
//! separate field and is joined with the street name on conversion.

use api_client::{AddressRecord, ApiError, ZipCodeService, nullable_string};
use serde::Deserialize;
use serde_json::{Map, Value};
use url::Url;

/// Production base URL
pub const REPUBLICA_VIRTUAL_BASE_URL: &str = "https://republicavirtual.com.br/";

/// Provider identifier
pub const REPUBLICA_VIRTUAL_SERVICE_ID: &str = "republica_virtual";

const RESULT_FIELD: &str = "resultado";
const NOT_FOUND_RESULT: &str = "0";

/// República Virtual response layout
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RepublicaVirtualResponse {
    /// District
    #[serde(deserialize_with = "nullable_string")]
    pub bairro: String,
    /// City
    #[serde(deserialize_with = "nullable_string")]
    pub cidade: String,
    /// Street name without its type
    #[serde(deserialize_with = "nullable_string")]
    pub logradouro: String,
    /// Street type, e.g. `"Avenida"`
    #[serde(deserialize_with = "nullable_string")]
    pub tipo_logradouro: String,
    /// State code
    #[serde(deserialize_with = "nullable_string")]
    pub uf: String,
}

impl RepublicaVirtualResponse {
    /// Street type and name joined by a space, without surrounding blanks
    pub fn full_street(&self) -> String {
        format!("{} {}", self.tipo_logradouro, self.logradouro)
            .trim_matches(' ')
            .to_string()
    }
}

/// República Virtual adapter
#[derive(Debug, Clone)]
pub struct RepublicaVirtual {
    base_url: String,
}

impl Default for RepublicaVirtual {
    fn default() -> Self {
        Self::new()
    }
}

impl RepublicaVirtual {
    /// Create an adapter pointing at the production endpoint
    pub fn new() -> Self {
        Self::with_base_url(REPUBLICA_VIRTUAL_BASE_URL)
    }

    /// Create an adapter pointing at a custom base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl ZipCodeService for RepublicaVirtual {
    type Payload = RepublicaVirtualResponse;

    fn name(&self) -> &'static str {
        REPUBLICA_VIRTUAL_SERVICE_ID
    }

    fn endpoint(&self, zip_code: &str) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|()| ApiError::Configuration {
                message: format!("{} cannot be used as a base URL", self.base_url),
            })?
            .pop_if_empty()
            .push("web_cep.php");
        url.query_pairs_mut()
            .append_pair("cep", zip_code)
            .append_pair("formato", "json");
        Ok(url)
    }

    fn is_valid_body(&self, body: &[u8]) -> bool {
        let Ok(fields) = serde_json::from_slice::<Map<String, Value>>(body) else {
            return true;
        };

        !matches!(fields.get(RESULT_FIELD), Some(Value::String(result)) if result == NOT_FOUND_RESULT)
    }

    fn to_canonical(&self, payload: Self::Payload) -> AddressRecord {
        let street = payload.full_street();
        AddressRecord::new(
            REPUBLICA_VIRTUAL_SERVICE_ID,
            payload.cidade,
            payload.bairro,
            street,
            payload.uf,
        )
    }
}
