//! Wire envelope and pagination types.
//!
//! Every gateway response is wrapped in `{success, data, message, error}`.
//! [`unwrap_envelope`] collapses that wrapper: failures become an error
//! carrying the server's message, successes yield the `data` payload, and
//! bodies that are not envelopes (plain arrays, bare objects) pass through
//! untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Message used when a failing envelope carries no usable text.
const GENERIC_FAILURE: &str = "API error";

/// A response body whose envelope declared failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    /// `success` was false or `error` was set.
    #[error("{message}")]
    Rejected {
        /// Server-provided failure text, best effort.
        message: String,
    },
}

/// The standard response wrapper used by the admin gateway.
///
/// Mostly useful for constructing bodies in tests and fixtures; the
/// client itself unwraps untyped values via [`unwrap_envelope`] so that
/// non-envelope bodies keep working.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Whether the operation succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    /// Payload, present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Informational text, sometimes present on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Failure text; non-null means the operation failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Builds a successful envelope around a payload.
    #[must_use]
    pub const fn success(data: T) -> Self {
        Self {
            success: Some(true),
            data: Some(data),
            message: None,
            error: None,
        }
    }

    /// Builds a failing envelope with the given error text.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: Some(false),
            data: None,
            message: None,
            error: Some(error.into()),
        }
    }
}

/// Collapses the wire envelope around a decoded JSON body.
///
/// Non-object bodies and objects without `success`/`error` keys are not
/// envelopes and pass through unchanged. An envelope with a missing or
/// null `data` field falls back to the whole body.
///
/// # Errors
///
/// Returns [`EnvelopeError::Rejected`] when `success` is false or `error`
/// is non-null, with the message resolved from `error`, then `message`,
/// then a generic fallback.
pub fn unwrap_envelope(body: Value) -> Result<Value, EnvelopeError> {
    match body {
        Value::Object(mut fields)
            if fields.contains_key("success") || fields.contains_key("error") =>
        {
            let failed = fields.get("success").and_then(Value::as_bool) == Some(false)
                || fields.get("error").is_some_and(|e| !e.is_null());
            if failed {
                let message = string_field(&fields, "error")
                    .or_else(|| string_field(&fields, "message"))
                    .unwrap_or_else(|| GENERIC_FAILURE.to_owned());
                return Err(EnvelopeError::Rejected { message });
            }

            if fields.get("data").is_some_and(|d| !d.is_null()) {
                Ok(fields.remove("data").unwrap_or(Value::Null))
            } else {
                Ok(Value::Object(fields))
            }
        }
        other => Ok(other),
    }
}

fn string_field(fields: &serde_json::Map<String, Value>, name: &str) -> Option<String> {
    fields.get(name).and_then(Value::as_str).map(str::to_owned)
}

/// Wire shape of a paginated listing, as found inside `data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope<T> {
    /// The rows of this page.
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    /// 1-based page number; 0 when the server omits it.
    #[serde(default)]
    pub page: u32,
    /// Page size the server applied.
    #[serde(default)]
    pub page_size: u32,
    /// Total rows across all pages.
    #[serde(default)]
    pub total_items: u64,
    /// Total page count.
    #[serde(default)]
    pub total_pages: u32,
}

impl<T> PageEnvelope<T> {
    /// Converts the wire shape into a [`Page`], substituting the requested
    /// page number when the server omitted its own.
    #[must_use]
    pub fn into_page(self, requested_page: u32) -> Page<T> {
        let page = if self.page == 0 {
            requested_page
        } else {
            self.page
        };
        let total_pages = self.total_pages.max(1);

        Page {
            has_next: page < total_pages,
            has_prev: page > 1,
            items: self.items,
            page,
            total_items: self.total_items,
            total_pages,
        }
    }
}

/// A resolved page of results with navigation flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// The rows of this page.
    pub items: Vec<T>,
    /// 1-based page number.
    pub page: u32,
    /// Total page count (at least 1).
    pub total_pages: u32,
    /// Total rows across all pages.
    pub total_items: u64,
    /// Whether a later page exists.
    pub has_next: bool,
    /// Whether an earlier page exists.
    pub has_prev: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_unwrap_success_yields_data() {
        let body = json!({ "success": true, "data": { "x": 1 } });
        assert_eq!(unwrap_envelope(body).unwrap(), json!({ "x": 1 }));
    }

    #[test]
    fn test_unwrap_failure_prefers_error_text() {
        let body = json!({ "success": false, "error": "bad", "message": "ignored" });
        assert_eq!(
            unwrap_envelope(body),
            Err(EnvelopeError::Rejected {
                message: "bad".to_owned()
            })
        );
    }

    #[test]
    fn test_unwrap_failure_falls_back_to_message() {
        let body = json!({ "success": false, "message": "broken" });
        assert_eq!(
            unwrap_envelope(body),
            Err(EnvelopeError::Rejected {
                message: "broken".to_owned()
            })
        );
    }

    #[test]
    fn test_unwrap_failure_generic_message() {
        let body = json!({ "success": false });
        assert_eq!(
            unwrap_envelope(body),
            Err(EnvelopeError::Rejected {
                message: GENERIC_FAILURE.to_owned()
            })
        );
    }

    #[test]
    fn test_error_key_alone_means_failure() {
        let body = json!({ "error": "denied" });
        assert!(unwrap_envelope(body).is_err());
    }

    #[test]
    fn test_null_error_is_not_failure() {
        let body = json!({ "success": true, "data": [1, 2], "error": null });
        assert_eq!(unwrap_envelope(body).unwrap(), json!([1, 2]));
    }

    #[test]
    fn test_missing_data_falls_back_to_whole_body() {
        let body = json!({ "success": true, "message": "done" });
        assert_eq!(
            unwrap_envelope(body.clone()).unwrap(),
            body,
            "envelope without data returns the body itself"
        );
    }

    #[test]
    fn test_non_envelope_bodies_pass_through() {
        let array = json!([{ "id": "c1" }]);
        assert_eq!(unwrap_envelope(array.clone()).unwrap(), array);

        let object = json!({ "id": "c1", "status": "open" });
        assert_eq!(unwrap_envelope(object.clone()).unwrap(), object);
    }

    #[test]
    fn test_envelope_constructors_roundtrip() {
        let ok: ApiEnvelope<Vec<u8>> = ApiEnvelope::success(vec![1, 2]);
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json, json!({ "success": true, "data": [1, 2] }));

        let bad: ApiEnvelope<Vec<u8>> = ApiEnvelope::failure("nope");
        let json = serde_json::to_value(&bad).unwrap();
        assert_eq!(json, json!({ "success": false, "error": "nope" }));
    }

    #[test]
    fn test_page_navigation_flags() {
        let envelope: PageEnvelope<u32> = serde_json::from_value(json!({
            "items": [1, 2, 3],
            "page": 2,
            "pageSize": 3,
            "totalItems": 7,
            "totalPages": 3,
        }))
        .unwrap();

        let page = envelope.into_page(2);
        assert_eq!(page.items, vec![1, 2, 3]);
        assert_eq!(page.page, 2);
        assert_eq!(page.total_items, 7);
        assert!(page.has_next);
        assert!(page.has_prev);
    }

    #[test]
    fn test_page_boundaries() {
        let first: PageEnvelope<u32> =
            serde_json::from_value(json!({ "items": [], "page": 1, "totalPages": 4 })).unwrap();
        let first = first.into_page(1);
        assert!(first.has_next);
        assert!(!first.has_prev);

        let last: PageEnvelope<u32> =
            serde_json::from_value(json!({ "items": [], "page": 4, "totalPages": 4 })).unwrap();
        let last = last.into_page(4);
        assert!(!last.has_next);
        assert!(last.has_prev);
    }

    #[test]
    fn test_sparse_page_envelope_uses_requested_page() {
        let envelope: PageEnvelope<u32> = serde_json::from_value(json!({})).unwrap();
        let page = envelope.into_page(3);

        assert!(page.items.is_empty());
        assert_eq!(page.page, 3);
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_next);
        assert!(page.has_prev);
    }
}
