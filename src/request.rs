//! Authenticated request construction and the HTTP transport.

use crate::config::endpoint;
use crate::credentials::Credentials;
use crate::outcome::ExpectedShape;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::blocking::Client;
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Url;
use std::fmt;

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Settings shared by every request of an invocation: where to send it and how to authenticate.
#[derive(Clone)]
pub struct RequestTemplate {
    base_url: Url,
    authorization: String,
}

impl fmt::Debug for RequestTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestTemplate")
            .field("base_url", &self.base_url.as_str())
            .field("authorization", &"<redacted>")
            .finish()
    }
}

impl RequestTemplate {
    /// Preset HTTP Basic auth from the access key / secret key pair.
    pub fn build(base_url: &Url, creds: &Credentials) -> Self {
        let token = STANDARD.encode(format!("{}:{}", creds.access_key, creds.secret_key));
        Self {
            base_url: base_url.clone(),
            authorization: format!("Basic {}", token),
        }
    }

    /// Attach a body and a response shape to produce a POST for `path`.
    pub fn post(&self, path: &str, body: Vec<u8>, expect: ExpectedShape) -> PreparedRequest {
        PreparedRequest {
            url: endpoint(&self.base_url, path),
            authorization: self.authorization.clone(),
            content_type: CONTENT_TYPE_JSON,
            body,
            expect,
        }
    }
}

/// A fully built POST, ready for a [`Transport`].
#[derive(Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub url: String,
    pub authorization: String,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    pub expect: ExpectedShape,
}

impl fmt::Debug for PreparedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedRequest")
            .field("url", &self.url)
            .field("content_type", &self.content_type)
            .field("body_len", &self.body.len())
            .field("expect", &self.expect)
            .finish()
    }
}

/// Status and body of a completed exchange, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// The exchange never completed: DNS, connect, TLS, timeout, or a broken body stream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{detail}")]
pub struct TransportError {
    pub detail: String,
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let mut detail = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            detail.push_str(": ");
            detail.push_str(&cause.to_string());
            source = cause.source();
        }
        Self { detail }
    }
}

/// Performs exactly one exchange per call. No retries.
pub trait Transport {
    fn send(&self, request: &PreparedRequest) -> Result<RawResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &PreparedRequest) -> Result<RawResponse, TransportError> {
        (**self).send(request)
    }
}

/// Blocking `reqwest` transport.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &PreparedRequest) -> Result<RawResponse, TransportError> {
        let mut auth = HeaderValue::from_str(&request.authorization).map_err(|e| TransportError {
            detail: format!("invalid authorization header: {e}"),
        })?;
        auth.set_sensitive(true);

        tracing::debug!(url = %request.url, bytes = request.body.len(), "POST");

        let response = self
            .client
            .post(&request.url)
            .header(AUTHORIZATION, auth)
            .header(CONTENT_TYPE, request.content_type)
            .body(request.body.clone())
            .send()?;

        let status = response.status().as_u16();
        let body = response.bytes()?.to_vec();
        tracing::debug!(status, bytes = body.len(), "response received");

        Ok(RawResponse { status, body })
    }
}

/// Transport double that records every request and answers with a canned reply.
#[cfg(test)]
pub(crate) struct RecordingTransport {
    pub sent: std::cell::RefCell<Vec<PreparedRequest>>,
    reply: Result<RawResponse, TransportError>,
}

#[cfg(test)]
impl RecordingTransport {
    pub fn replying(status: u16, body: &str) -> Self {
        Self::replying_bytes(status, body.as_bytes().to_vec())
    }

    pub fn replying_bytes(status: u16, body: Vec<u8>) -> Self {
        Self {
            sent: Default::default(),
            reply: Ok(RawResponse { status, body }),
        }
    }

    pub fn failing(detail: &str) -> Self {
        Self {
            sent: Default::default(),
            reply: Err(TransportError {
                detail: detail.to_string(),
            }),
        }
    }
}

#[cfg(test)]
impl Transport for RecordingTransport {
    fn send(&self, request: &PreparedRequest) -> Result<RawResponse, TransportError> {
        self.sent.borrow_mut().push(request.clone());
        self.reply.clone()
    }
}
