//! Turning raw completions into typed stage results.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::error::{ResponseError, ResponseFailure};

/// A JSON shape a stage expects back from the model.
pub trait ResponseSchema: DeserializeOwned {
    /// Name used in error messages.
    const NAME: &'static str;
}

/// Remove a surrounding triple-backtick fence (optionally tagged `json`).
///
/// Text that is not fenced is returned unchanged, so applying this twice
/// gives the same result as applying it once.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.len() >= 6 && trimmed.starts_with("```") && trimmed.ends_with("```") {
        let inner = &trimmed[3..trimmed.len() - 3];
        let inner = inner.strip_prefix("json").unwrap_or(inner).trim();
        if !inner.is_empty() {
            return inner;
        }
    }
    raw
}

/// Strip, parse and decode a completion into `T` in one step.
///
/// Missing required fields or wrong types fail with
/// [`ResponseFailure::Shape`]; unknown extra fields are ignored.
pub fn parse_response<T: ResponseSchema>(raw: &str) -> Result<T, ResponseError> {
    let fail = |reason: ResponseFailure| {
        warn!(
            schema = T::NAME,
            reason = %reason,
            completion_preview = %raw.chars().take(200).collect::<String>(),
            "Rejected model completion"
        );
        ResponseError {
            schema: T::NAME,
            reason,
        }
    };

    let body = strip_code_fence(raw).trim();
    if body.is_empty() {
        return Err(fail(ResponseFailure::Empty));
    }

    let value: Value = serde_json::from_str(body).map_err(|e| {
        fail(ResponseFailure::Malformed {
            message: e.to_string(),
        })
    })?;

    serde_json::from_value(value).map_err(|e| {
        fail(ResponseFailure::Shape {
            message: e.to_string(),
        })
    })
}
