//! Point awards and reputation math.

use crate::error::CoreError;

/// Points credited to a fulfiller for claiming a request.
pub const ACCEPT_AWARD: i32 = 5;

/// Points credited to a fulfiller for completing a delivery.
pub const COMPLETION_AWARD: i32 = 10;

/// Points credited to a user for rating a counterpart.
pub const RATING_AWARD: i32 = 2;

pub const MIN_SCORE: i16 = 1;
pub const MAX_SCORE: i16 = 5;

/// Maximum length for a rating comment.
pub const MAX_COMMENT_LENGTH: usize = 1_000;

pub const TRANSACTION_REQUEST: &str = "request";
pub const TRANSACTION_PRODUCT: &str = "product";

/// Validate that a rating score is within 1..=5.
pub fn validate_score(score: i16) -> Result<(), CoreError> {
    if (MIN_SCORE..=MAX_SCORE).contains(&score) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Rating must be between {MIN_SCORE} and {MAX_SCORE}, got {score}"
        )))
    }
}

/// Mean of `scores` rounded half-up to one decimal; `0.0` when empty.
///
/// Computed in integer tenths so that e.g. a mean of exactly 4.05 rounds to
/// 4.1 regardless of binary floating point representation.
pub fn average_rating(scores: &[i16]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let sum: i64 = scores.iter().map(|&s| i64::from(s)).sum();
    let count = scores.len() as i64;
    let tenths = (sum * 20 + count) / (count * 2);
    tenths as f64 / 10.0
}
