// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Canonical address record
//!
//! Every provider maps its own payload into [`AddressRecord`]. The serialized
//! field names (`service`, `cidade`, `bairro`, `logradouro`, `uf`) are part of the
//! public response contract and must not change.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Normalized address returned for a postal code lookup
///
/// Records are immutable once built: the fields are private and only exposed
/// through accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AddressRecord {
    /// Identifier of the provider that produced this record
    #[serde(rename = "service")]
    #[schema(example = "viacep")]
    provider: String,
    /// City name
    #[serde(rename = "cidade")]
    #[schema(example = "São Paulo")]
    city: String,
    /// District (neighbourhood) name
    #[serde(rename = "bairro")]
    #[schema(example = "Bela Vista")]
    district: String,
    /// Street, including its type prefix when the provider splits it
    #[serde(rename = "logradouro")]
    #[schema(example = "Av. Paulista")]
    street: String,
    /// Two-letter state code
    #[serde(rename = "uf")]
    #[schema(example = "SP")]
    state_code: String,
}

impl AddressRecord {
    /// Create a new address record
    pub fn new(
        provider: impl Into<String>,
        city: impl Into<String>,
        district: impl Into<String>,
        street: impl Into<String>,
        state_code: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            city: city.into(),
            district: district.into(),
            street: street.into(),
            state_code: state_code.into(),
        }
    }

    /// Provider identifier
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// City name
    pub fn city(&self) -> &str {
        &self.city
    }

    /// District name
    pub fn district(&self) -> &str {
        &self.district
    }

    /// Street name
    pub fn street(&self) -> &str {
        &self.street
    }

    /// State code
    pub fn state_code(&self) -> &str {
        &self.state_code
    }
}
