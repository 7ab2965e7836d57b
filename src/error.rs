//! Failures that stop an invocation before any request reaches the service.

use std::path::PathBuf;

/// No usable AWS credentials could be obtained from the ambient environment.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("failed to load default AWS config: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("failed to load AWS credentials: no credentials provider configured")]
    NoProvider,

    #[error("failed to load AWS credentials: {0}")]
    Provider(String),
}

/// The job-definition file could not be read.
#[derive(Debug, thiserror::Error)]
#[error("failed to read {}: {source}", .path.display())]
pub struct FileReadError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("failed to parse bundled root certificate {name}: {source}")]
    Certificate {
        name: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Any failure the dispatcher hits before an exchange with the service is attempted.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Credentials(#[from] CredentialError),

    #[error(transparent)]
    FileRead(#[from] FileReadError),

    #[error(transparent)]
    Tls(#[from] TlsError),
}
