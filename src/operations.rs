//! Job operations against the batch service.

use crate::error::FileReadError;
use crate::outcome::{classify, ExpectedShape, ServiceOutcome};
use crate::request::{PreparedRequest, RequestTemplate, Transport};
use std::path::Path;

pub const SUBMIT_PATH: &str = "submit_job";
/// Cancel and terminate share this endpoint; the service does not tell them apart.
pub const TERMINATE_PATH: &str = "terminate_job";

/// One user command with its validated parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationRequest {
    /// Job definition JSON, sent byte for byte as read.
    Submit { job_input: Vec<u8> },
    Cancel { job_id: String, reason: String },
    Terminate { job_id: String, reason: String },
}

impl OperationRequest {
    /// Read a job-definition file for `submit`.
    pub fn submit_from_file(path: &Path) -> Result<Self, FileReadError> {
        let job_input = std::fs::read(path).map_err(|source| FileReadError {
            path: path.to_path_buf(),
            source,
        })?;
        if serde_json::from_slice::<serde_json::Value>(&job_input).is_err() {
            tracing::warn!(path = %path.display(), "job definition is not valid JSON; sending it anyway");
        }
        Ok(OperationRequest::Submit { job_input })
    }

    pub fn name(&self) -> &'static str {
        match self {
            OperationRequest::Submit { .. } => "submit",
            OperationRequest::Cancel { .. } => "cancel",
            OperationRequest::Terminate { .. } => "terminate",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            OperationRequest::Submit { .. } => SUBMIT_PATH,
            OperationRequest::Cancel { .. } | OperationRequest::Terminate { .. } => TERMINATE_PATH,
        }
    }

    pub fn expected_shape(&self) -> ExpectedShape {
        match self {
            OperationRequest::Submit { .. } => ExpectedShape::Submitted,
            OperationRequest::Cancel { .. } | OperationRequest::Terminate { .. } => {
                ExpectedShape::Empty
            }
        }
    }

    /// Build the POST for this operation, consuming it.
    pub fn into_request(self, template: &RequestTemplate) -> PreparedRequest {
        let path = self.path();
        let expect = self.expected_shape();
        let body = match self {
            OperationRequest::Submit { job_input } => job_input,
            OperationRequest::Cancel { job_id, reason }
            | OperationRequest::Terminate { job_id, reason } => {
                serde_json::json!({ "jobId": job_id, "reason": reason })
                    .to_string()
                    .into_bytes()
            }
        };
        template.post(path, body, expect)
    }
}

/// Run one operation: a single POST, classified. Never retries.
pub fn execute(
    operation: OperationRequest,
    template: &RequestTemplate,
    transport: &dyn Transport,
) -> ServiceOutcome {
    let name = operation.name();
    let request = operation.into_request(template);
    let expect = request.expect;

    tracing::info!(operation = name, url = %request.url, "sending request");
    let outcome = classify(transport.send(&request), expect);
    tracing::info!(operation = name, success = outcome.is_success(), "request finished");

    if let ServiceOutcome::UnexpectedStatus { status, .. } = &outcome {
        tracing::warn!(operation = name, status, "service returned an unexpected response");
    }

    outcome
}
