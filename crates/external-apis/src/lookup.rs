// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Single-provider lookup pipeline
//!
//! [`fetch_address`] runs one provider end to end: build the URL, send the
//! request, read the whole body, reject non-success statuses and soft failures,
//! then parse and convert. [`AddressLookup`] erases the provider's payload type
//! so the registry can hold every provider in one list.

use std::{fmt, future::Future, pin::Pin};

use api_client::{AddressRecord, ApiError, ZipCodeService};
use reqwest::{Client, header::ACCEPT};
use tracing::debug;

/// Boxed future returned by [`AddressLookup::lookup`]
pub type LookupFuture<'a> = Pin<Box<dyn Future<Output = Result<AddressRecord, ApiError>> + Send + 'a>>;

/// Object-safe view of a [`ZipCodeService`]
///
/// Implemented for every `ZipCodeService`, so providers never implement it by hand.
pub trait AddressLookup: Send + Sync + fmt::Debug {
    /// Provider identifier
    fn service_name(&self) -> &'static str;

    /// Look up a raw zip code with the given HTTP client
    fn lookup<'a>(&'a self, client: &'a Client, zip_code: &'a str) -> LookupFuture<'a>;
}

impl<S: ZipCodeService> AddressLookup for S {
    fn service_name(&self) -> &'static str {
        self.name()
    }

    fn lookup<'a>(&'a self, client: &'a Client, zip_code: &'a str) -> LookupFuture<'a> {
        Box::pin(fetch_address(client, self, zip_code))
    }
}

/// Query one provider and convert its answer to an [`AddressRecord`]
///
/// The response body is fully read and released before this returns, whatever
/// the outcome.
///
/// # Errors
///
/// Returns [`ApiError::Http`] on transport failures, [`ApiError::Status`] on a
/// non-success status, [`ApiError::NotFound`] on the provider's soft failure and
/// [`ApiError::InvalidResponse`] when the body cannot be decoded.
pub async fn fetch_address<S>(
    client: &Client,
    service: &S,
    zip_code: &str,
) -> Result<AddressRecord, ApiError>
where
    S: ZipCodeService,
{
    let url = service.endpoint(zip_code)?;

    debug!(service = service.name(), %url, "querying postal code provider");

    let response = client
        .get(url)
        .header(ACCEPT, "application/json")
        .send()
        .await
        .map_err(|error| ApiError::Http {
            message: error.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Status {
            service: service.name(),
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await.map_err(|error| ApiError::Http {
        message: error.to_string(),
    })?;

    service.convert_body(&body)
}
