//! Response classification.
//!
//! Every gateway response is mapped onto the `DocumentError` taxonomy here and
//! nowhere else:
//!
//! | Status | Outcome |
//! |---|---|
//! | the call's success status (200, or 201 for creations) | body deserialized as the expected payload |
//! | 401 | `Unauthorized`, raw body as detail |
//! | 400 | `ValidationFailed`, field messages rendered as detail |
//! | 404 | `NotFound`, raw body as detail |
//! | anything else, other 2xx included | `Unexpected`, raw body as detail |

use std::collections::BTreeMap;

use docdist_core::{DocumentError, DocumentResult};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

pub const UNEXPECTED_ERROR_MESSAGE: &str =
    "An unexpected error occurred while processing the request";
pub const NOT_FOUND_MESSAGE: &str = "Provided document id is invalid";
const UNREADABLE_RESPONSE_MESSAGE: &str = "Unable to process the service response";

/// Map a status code and body to the typed payload or a classified error.
/// Only 200 OK counts as success.
pub fn classify<T: DeserializeOwned>(status: StatusCode, body: &str) -> DocumentResult<T> {
    classify_expecting(StatusCode::OK, status, body)
}

/// Like [`classify`], for calls whose only success status is `expected`.
pub fn classify_expecting<T: DeserializeOwned>(
    expected: StatusCode,
    status: StatusCode,
    body: &str,
) -> DocumentResult<T> {
    match status {
        s if s == expected => decode(status, body),
        StatusCode::UNAUTHORIZED => Err(DocumentError::Unauthorized {
            detail: body.to_string(),
        }),
        StatusCode::BAD_REQUEST => Err(DocumentError::ValidationFailed {
            detail: bad_request_detail(body),
        }),
        StatusCode::NOT_FOUND => Err(DocumentError::NotFound {
            message: NOT_FOUND_MESSAGE.to_string(),
            detail: body.to_string(),
        }),
        other => Err(DocumentError::Unexpected {
            message: UNEXPECTED_ERROR_MESSAGE.to_string(),
            status: other.as_u16(),
            detail: body.to_string(),
        }),
    }
}

fn decode<T: DeserializeOwned>(status: StatusCode, body: &str) -> DocumentResult<T> {
    // An empty acknowledgment reads as JSON null.
    let text = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(text).map_err(|e| DocumentError::Unexpected {
        message: UNREADABLE_RESPONSE_MESSAGE.to_string(),
        status: status.as_u16(),
        detail: format!("{}: {}", e, body),
    })
}

#[derive(Deserialize)]
struct ProblemDetails {
    errors: BTreeMap<String, Vec<String>>,
}

/// Render a BadRequest body. Accepts a bare `{"field": ["message", ...]}` map
/// or a problem-details document carrying one under `errors`; anything else
/// yields an empty detail.
pub fn bad_request_detail(body: &str) -> String {
    let fields = serde_json::from_str::<BTreeMap<String, Vec<String>>>(body)
        .or_else(|_| serde_json::from_str::<ProblemDetails>(body).map(|p| p.errors));

    match fields {
        Ok(fields) => render_field_messages(&fields),
        Err(_) => String::new(),
    }
}

/// `"<field> : <message>\n"` per message, each field block closed by a blank line.
pub fn render_field_messages(fields: &BTreeMap<String, Vec<String>>) -> String {
    let mut rendered = String::new();
    for (field, messages) in fields {
        rendered.push_str(field);
        rendered.push_str(" : ");
        for message in messages {
            rendered.push_str(message);
            rendered.push('\n');
        }
        rendered.push('\n');
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use docdist_core::DocumentProviderConfigResponse;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Ack {
        id: u32,
    }

    #[test]
    fn test_success_status_deserializes() {
        let ack: Ack = classify(StatusCode::OK, r#"{"id": 7}"#).unwrap();
        assert_eq!(ack, Ack { id: 7 });

        let config: DocumentProviderConfigResponse = classify_expecting(
            StatusCode::CREATED,
            StatusCode::CREATED,
            r#"{"configurationId":"11111111-1111-1111-1111-111111111111","configName":"Test Config"}"#,
        )
        .unwrap();
        assert_eq!(config.config_name.as_deref(), Some("Test Config"));
    }

    #[test]
    fn test_empty_success_body_for_unit() {
        classify::<()>(StatusCode::OK, "").unwrap();
    }

    #[test]
    fn test_undecodable_success_is_unexpected() {
        let err = classify::<Ack>(StatusCode::OK, "<html>").unwrap_err();
        match err {
            DocumentError::Unexpected { message, status, .. } => {
                assert_eq!(message, UNREADABLE_RESPONSE_MESSAGE);
                assert_eq!(status, 200);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_status_mapping_table() {
        let cases = [
            (StatusCode::UNAUTHORIZED, "Unauthorized"),
            (StatusCode::BAD_REQUEST, "ValidationFailed"),
            (StatusCode::NOT_FOUND, "NotFound"),
            (StatusCode::FORBIDDEN, "Unexpected"),
            (StatusCode::CONFLICT, "Unexpected"),
            (StatusCode::ACCEPTED, "Unexpected"),
            (StatusCode::NO_CONTENT, "Unexpected"),
            (StatusCode::INTERNAL_SERVER_ERROR, "Unexpected"),
            (StatusCode::SERVICE_UNAVAILABLE, "Unexpected"),
        ];

        for (status, expected) in cases {
            let err = classify::<Ack>(status, "body").unwrap_err();
            assert_eq!(err.error_type(), expected, "status {}", status);
            assert_eq!(err.status_code(), Some(status.as_u16()));
        }
    }

    #[test]
    fn test_other_success_statuses_are_unexpected() {
        let err = classify::<Ack>(StatusCode::CREATED, r#"{"id": 7}"#).unwrap_err();
        assert_eq!(err.error_type(), "Unexpected");
        assert_eq!(err.status_code(), Some(201));

        let err = classify_expecting::<Ack>(StatusCode::CREATED, StatusCode::OK, r#"{"id": 7}"#)
            .unwrap_err();
        assert_eq!(err.error_type(), "Unexpected");
        assert_eq!(err.status_code(), Some(200));
    }

    #[test]
    fn test_expecting_created_keeps_error_table() {
        let err = classify_expecting::<Ack>(StatusCode::CREATED, StatusCode::UNAUTHORIZED, "no")
            .unwrap_err();
        assert_eq!(err.error_type(), "Unauthorized");
    }

    #[test]
    fn test_unauthorized_keeps_raw_body() {
        let err = classify::<Ack>(StatusCode::UNAUTHORIZED, "token expired").unwrap_err();
        assert_eq!(err.detail(), Some("token expired"));
        assert_eq!(err.to_string(), "Unauthorized");
    }

    #[test]
    fn test_unexpected_keeps_raw_body() {
        let err = classify::<Ack>(StatusCode::BAD_GATEWAY, "upstream down").unwrap_err();
        assert_eq!(err.to_string(), UNEXPECTED_ERROR_MESSAGE);
        assert_eq!(err.detail(), Some("upstream down"));
    }

    #[test]
    fn test_bad_request_field_rendering() {
        let err =
            classify::<Ack>(StatusCode::BAD_REQUEST, r#"{"DocumentName": ["required"]}"#)
                .unwrap_err();
        assert_eq!(err.detail(), Some("DocumentName : required\n\n"));
    }

    #[test]
    fn test_bad_request_multiple_fields_and_messages() {
        let detail = bad_request_detail(
            r#"{"Cpr": ["required", "must be 10 digits"], "DocumentName": ["required"]}"#,
        );
        assert_eq!(
            detail,
            "Cpr : required\nmust be 10 digits\n\nDocumentName : required\n\n"
        );
    }

    #[test]
    fn test_bad_request_problem_details() {
        let detail = bad_request_detail(
            r#"{"title": "One or more validation errors occurred.", "status": 400, "errors": {"Cpr": ["required"]}}"#,
        );
        assert_eq!(detail, "Cpr : required\n\n");
    }

    #[test]
    fn test_bad_request_without_field_map_has_empty_detail() {
        assert_eq!(bad_request_detail("plain text"), "");
        assert_eq!(bad_request_detail(""), "");
        assert_eq!(bad_request_detail(r#"["a"]"#), "");
    }
}
