//! Response classification.
//!
//! Every invocation ends in exactly one [`ServiceOutcome`]. It decides what is printed
//! and which exit code the process returns; nothing is retried.

use crate::request::{RawResponse, TransportError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Body shape a successful (HTTP 200) response must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedShape {
    /// `{"jobId": ..., "jobName": ...}`
    Submitted,
    /// `{}`
    Empty,
}

/// Success body of `/submit_job`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitSuccess {
    #[serde(rename = "jobId")]
    pub job_id: String,
    #[serde(rename = "jobName")]
    pub job_name: String,
}

/// Error body the service sends with a non-200 status. Either field may be missing.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    exception: Option<String>,
}

fn is_blank(field: &Option<String>) -> bool {
    field.as_deref().map_or(true, str::is_empty)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceOutcome {
    SubmitAccepted { job_id: String, job_name: String },
    Accepted,
    ServiceError { message: String, exception: String },
    TransportError { detail: String },
    UnexpectedStatus { status: u16, raw_body: Vec<u8> },
}

impl ServiceOutcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            ServiceOutcome::SubmitAccepted { .. } | ServiceOutcome::Accepted
        )
    }

    /// Bytes to print. An unexpected body is passed through untouched, even if it is not UTF-8.
    pub fn render(&self) -> Vec<u8> {
        match self {
            ServiceOutcome::UnexpectedStatus { raw_body, .. } => {
                let mut out = b"Got error: ".to_vec();
                out.extend_from_slice(raw_body);
                out
            }
            _ => self.to_string().into_bytes(),
        }
    }
}

/// Decide the outcome of one exchange.
///
/// A transport failure wins outright and no body is looked at. A 200 must match
/// `expect`; anything that doesn't is reported as an unexpected response. Any other
/// status is a service error unless both `error` and `exception` are blank.
pub fn classify(
    result: Result<RawResponse, TransportError>,
    expect: ExpectedShape,
) -> ServiceOutcome {
    let response = match result {
        Ok(response) => response,
        Err(err) => return ServiceOutcome::TransportError { detail: err.detail },
    };

    if response.status == 200 {
        return classify_success(response, expect);
    }

    let body: ErrorBody = serde_json::from_slice(&response.body).unwrap_or_default();
    if is_blank(&body.error) && is_blank(&body.exception) {
        return ServiceOutcome::UnexpectedStatus {
            status: response.status,
            raw_body: response.body,
        };
    }

    ServiceOutcome::ServiceError {
        message: body.error.unwrap_or_default(),
        exception: body.exception.unwrap_or_default(),
    }
}

fn classify_success(response: RawResponse, expect: ExpectedShape) -> ServiceOutcome {
    let parsed = match expect {
        ExpectedShape::Submitted => serde_json::from_slice::<SubmitSuccess>(&response.body)
            .map(|ok| ServiceOutcome::SubmitAccepted {
                job_id: ok.job_id,
                job_name: ok.job_name,
            }),
        ExpectedShape::Empty => {
            serde_json::from_slice::<serde_json::Map<String, serde_json::Value>>(&response.body)
                .map(|_| ServiceOutcome::Accepted)
        }
    };

    parsed.unwrap_or_else(|e| {
        tracing::debug!(error = %e, "HTTP 200 body does not match the expected shape");
        ServiceOutcome::UnexpectedStatus {
            status: response.status,
            raw_body: response.body,
        }
    })
}

impl fmt::Display for ServiceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceOutcome::SubmitAccepted { job_id, job_name } => {
                let body = SubmitSuccess {
                    job_id: job_id.clone(),
                    job_name: job_name.clone(),
                };
                let text = serde_json::to_string_pretty(&body).map_err(|_| fmt::Error)?;
                write!(f, "{}", text)
            }
            ServiceOutcome::Accepted => write!(f, "{{}}"),
            ServiceOutcome::ServiceError { message, exception } => {
                writeln!(f, "Wrapper threw an error.")?;
                writeln!(f, "Exception: {}", exception)?;
                write!(f, "Message: {}", message)
            }
            ServiceOutcome::TransportError { detail } => write!(f, "{}", detail),
            ServiceOutcome::UnexpectedStatus { raw_body, .. } => {
                write!(f, "Got error: {}", String::from_utf8_lossy(raw_body))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> Result<RawResponse, TransportError> {
        Ok(RawResponse {
            status,
            body: body.as_bytes().to_vec(),
        })
    }

    #[test]
    fn test_submit_success() {
        let outcome = classify(
            response(200, r#"{"jobId":"123","jobName":"demo-job"}"#),
            ExpectedShape::Submitted,
        );
        assert_eq!(
            outcome,
            ServiceOutcome::SubmitAccepted {
                job_id: "123".to_string(),
                job_name: "demo-job".to_string(),
            }
        );
        assert!(outcome.is_success());

        let printed = outcome.to_string();
        assert!(printed.contains(r#""jobId": "123""#));
        assert!(printed.contains(r#""jobName": "demo-job""#));
    }

    #[test]
    fn test_empty_success() {
        let outcome = classify(response(200, "{}"), ExpectedShape::Empty);
        assert_eq!(outcome, ServiceOutcome::Accepted);
        assert_eq!(outcome.to_string(), "{}");
    }

    #[test]
    fn test_empty_success_ignores_extra_fields() {
        let outcome = classify(response(200, r#"{"status":"ok"}"#), ExpectedShape::Empty);
        assert_eq!(outcome, ServiceOutcome::Accepted);
    }

    #[test]
    fn test_200_with_wrong_shape_is_unexpected() {
        let outcome = classify(response(200, r#"{"jobId":"123"}"#), ExpectedShape::Submitted);
        assert!(matches!(outcome, ServiceOutcome::UnexpectedStatus { status: 200, .. }));
        assert!(!outcome.is_success());

        let outcome = classify(response(200, ""), ExpectedShape::Empty);
        assert!(matches!(outcome, ServiceOutcome::UnexpectedStatus { status: 200, .. }));

        let outcome = classify(response(200, "[]"), ExpectedShape::Empty);
        assert!(matches!(outcome, ServiceOutcome::UnexpectedStatus { status: 200, .. }));
    }

    #[test]
    fn test_service_error_both_fields() {
        let outcome = classify(
            response(403, r#"{"error":"not authorized","exception":"AuthException"}"#),
            ExpectedShape::Empty,
        );
        assert_eq!(
            outcome,
            ServiceOutcome::ServiceError {
                message: "not authorized".to_string(),
                exception: "AuthException".to_string(),
            }
        );
        assert_eq!(
            outcome.to_string(),
            "Wrapper threw an error.\nException: AuthException\nMessage: not authorized"
        );
    }

    #[test]
    fn test_service_error_partial_fields() {
        let outcome = classify(response(400, r#"{"error":"bad job id"}"#), ExpectedShape::Empty);
        assert_eq!(
            outcome,
            ServiceOutcome::ServiceError {
                message: "bad job id".to_string(),
                exception: String::new(),
            }
        );

        let outcome = classify(
            response(500, r#"{"error":"","exception":"KeyError"}"#),
            ExpectedShape::Submitted,
        );
        assert!(matches!(outcome, ServiceOutcome::ServiceError { .. }));
    }

    #[test]
    fn test_blank_error_fields_are_unexpected() {
        for body in [
            r#"{"error":"","exception":""}"#,
            r#"{"error":null}"#,
            r#"{"detail":"gateway"}"#,
        ] {
            let outcome = classify(response(502, body), ExpectedShape::Empty);
            assert_eq!(
                outcome,
                ServiceOutcome::UnexpectedStatus {
                    status: 502,
                    raw_body: body.as_bytes().to_vec(),
                },
                "body: {}",
                body
            );
        }
    }

    #[test]
    fn test_whitespace_error_fields_are_kept() {
        let outcome = classify(
            response(400, r#"{"error":" ","exception":""}"#),
            ExpectedShape::Empty,
        );
        assert_eq!(
            outcome,
            ServiceOutcome::ServiceError {
                message: " ".to_string(),
                exception: String::new(),
            }
        );

        let outcome = classify(
            response(400, r#"{"error":"  ","exception":"\t"}"#),
            ExpectedShape::Empty,
        );
        assert_eq!(
            outcome,
            ServiceOutcome::ServiceError {
                message: "  ".to_string(),
                exception: "\t".to_string(),
            }
        );
    }

    #[test]
    fn test_unexpected_body_rendered_byte_for_byte() {
        let body = vec![0xff, 0xfe, b'x'];
        let outcome = classify(
            Ok(RawResponse {
                status: 500,
                body: body.clone(),
            }),
            ExpectedShape::Submitted,
        );

        let printed = outcome.render();
        assert!(printed.starts_with(b"Got error: "));
        assert!(printed.ends_with(&body));
        assert_eq!(printed.len(), "Got error: ".len() + body.len());
    }

    #[test]
    fn test_empty_500_is_unexpected() {
        let outcome = classify(response(500, ""), ExpectedShape::Submitted);
        assert_eq!(
            outcome,
            ServiceOutcome::UnexpectedStatus {
                status: 500,
                raw_body: Vec::new(),
            }
        );
        assert_eq!(outcome.to_string(), "Got error: ");
    }

    #[test]
    fn test_non_json_error_body_printed_verbatim() {
        let outcome = classify(response(503, "<html>down</html>"), ExpectedShape::Empty);
        assert_eq!(outcome.to_string(), "Got error: <html>down</html>");
    }

    #[test]
    fn test_transport_error_skips_body() {
        let outcome = classify(
            Err(TransportError {
                detail: "connection refused".to_string(),
            }),
            ExpectedShape::Submitted,
        );
        assert_eq!(
            outcome,
            ServiceOutcome::TransportError {
                detail: "connection refused".to_string(),
            }
        );
        assert!(!outcome.is_success());
    }
}
