// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Postal code validation
//!
//! Validation is advisory: providers always receive the raw input, and the
//! lookup itself never rejects a zip code based on this check.

use std::{borrow::Cow, sync::LazyLock};

use regex::Regex;

/// Pattern matching every character that is not an ASCII digit
pub const NON_DIGIT_PATTERN: &str = "[^0-9]";

/// Minimum number of digits a postal code must contain
pub const MIN_ZIP_CODE_DIGITS: usize = 8;

static NON_DIGIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(NON_DIGIT_PATTERN).expect("non-digit pattern is a valid regex")
});

/// Strip every non-digit character from a raw postal code
pub fn normalize_zip_code(raw: &str) -> Cow<'_, str> {
    NON_DIGIT.replace_all(raw, "")
}

/// Check whether a raw postal code carries at least [`MIN_ZIP_CODE_DIGITS`] digits
///
/// Punctuation and whitespace are ignored, so `"12345-678"` is valid.
pub fn is_valid_zip_code(raw: &str) -> bool {
    normalize_zip_code(raw).len() >= MIN_ZIP_CODE_DIGITS
}
