// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Postal code provider integrations
//!
//! This crate provides implementations of the `ZipCodeService` trait for the public
//! Brazilian postal code services, along with the registry that races them.
//!
//! # Architecture
//!
//! - **Provider Implementations**: [`viacep`], [`postmon`], [`republica_virtual`] -
//!   endpoint templates, "not found" detection and payload mapping per provider
//! - **Lookup Pipeline**: [`lookup::fetch_address`] - one provider, request to record
//! - **Registry Pattern**: [`registry::ProviderRegistry`] - concurrent race with a deadline
//!
//! # Features
//!
//! - **First Answer Wins**: every provider is queried at once; the first valid
//!   address is returned and slower providers are ignored
//! - **Soft Failure Detection**: each provider's own "not found" signal is honoured
//!   even though all of them answer HTTP 200
//! - **Silent Degradation**: a failing provider only lowers the chance of an answer
//! - **Testing Support**: adapters accept a base URL so wiremock can stand in for
//!   the real services

pub mod lookup;
pub mod postmon;
pub mod registry;
pub mod republica_virtual;
pub mod viacep;

pub use lookup::*;
pub use postmon::*;
pub use registry::*;
pub use republica_virtual::*;
pub use viacep::*;
