// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Test fixtures for the HTTP surface
//!
//! Mocked providers and a helper that starts a server racing them.

pub mod providers;

pub use providers::*;
