//! Assertions for the tagged failure payload returned to callers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Mirrors the engine's failure shape without depending on its types.
#[derive(Debug, Deserialize, Serialize)]
struct FailureLike {
    code: String,
    detail: String,
    recoverable: bool,
}

/// Assert that `json` is a failure payload with `expected_code`.
///
/// `expected_detail_contains` checks a substring of the human-readable
/// message when given.
pub fn assert_failure(
    json: &Value,
    expected_code: &str,
    expected_recoverable: bool,
    expected_detail_contains: Option<&str>,
) {
    let failure: FailureLike = serde_json::from_value(json.clone())
        .unwrap_or_else(|e| panic!("not a failure payload ({e}): {json}"));

    assert_eq!(failure.code, expected_code, "unexpected code in {json}");
    assert_eq!(
        failure.recoverable, expected_recoverable,
        "unexpected recoverable flag in {json}"
    );
    assert!(!failure.detail.is_empty(), "detail should not be empty");
    if let Some(fragment) = expected_detail_contains {
        assert!(
            failure.detail.contains(fragment),
            "detail '{}' should contain '{fragment}'",
            failure.detail
        );
    }
}

/// Codes are SCREAMING_SNAKE_CASE ASCII.
pub fn assert_code_shape(code: &str) {
    assert!(!code.is_empty());
    assert!(
        code.chars().all(|c| c.is_ascii_uppercase() || c == '_'),
        "code '{code}' is not SCREAMING_SNAKE_CASE"
    );
}
