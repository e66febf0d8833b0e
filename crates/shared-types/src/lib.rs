// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Shared types for the zip-finder service
//!
//! This crate provides the canonical address record every provider converges to
//! and the postal code validation helper, shared across the workspace to avoid
//! circular dependencies between the provider crates and the HTTP server.

pub mod address;
pub mod zip_code;

pub use address::AddressRecord;
pub use zip_code::{MIN_ZIP_CODE_DIGITS, NON_DIGIT_PATTERN, is_valid_zip_code, normalize_zip_code};
