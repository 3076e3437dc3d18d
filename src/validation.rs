//! Syntactic validation of postal code lists

use crate::error::{Result, ValidationError};
use regex::Regex;
use std::sync::LazyLock;

static CODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[0-9]{5}$").expect("postal code pattern is valid")
});

/// Whether `code` is exactly five ASCII digits
///
/// Input is not trimmed: `" 10001"` is rejected.
pub fn is_valid_code(code: &str) -> bool {
    CODE_PATTERN.is_match(code)
}

/// Validate a whole request's code list
///
/// The list must be non-empty, hold at most `max_codes` entries, and every entry must
/// pass [`is_valid_code`]. The first offending code is reported with its position.
/// Duplicates are allowed and processed once per occurrence.
pub fn validate_codes(codes: &[String], max_codes: usize) -> Result<()> {
    if codes.is_empty() {
        return Err(ValidationError::EmptyCodeList.into());
    }
    if codes.len() > max_codes {
        return Err(ValidationError::TooManyCodes {
            count: codes.len(),
            max: max_codes,
        }
        .into());
    }
    if let Some((position, code)) = codes
        .iter()
        .enumerate()
        .find(|(_, code)| !is_valid_code(code))
    {
        return Err(ValidationError::InvalidCode {
            code: code.clone(),
            position,
        }
        .into());
    }
    Ok(())
}
