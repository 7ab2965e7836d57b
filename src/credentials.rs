//! Credential resolution from the AWS default provider chain.

use crate::error::CredentialError;
use aws_config::BehaviorVersion;
use aws_credential_types::provider::ProvideCredentials;
use std::fmt;

/// AWS key material plus region, resolved once per invocation.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String,
    /// Not used to build requests; empty when the chain has no region.
    pub region: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("region", &self.region)
            .finish()
    }
}

/// Source of credentials for the dispatcher.
pub trait CredentialProvider {
    fn resolve(&self) -> Result<Credentials, CredentialError>;
}

/// Reads environment variables, shared config files and instance metadata,
/// in the SDK's standard precedence order.
#[derive(Debug, Default)]
pub struct AwsCredentialProvider;

impl CredentialProvider for AwsCredentialProvider {
    fn resolve(&self) -> Result<Credentials, CredentialError> {
        // The runtime only lives for the lookup; the HTTP client below is blocking
        // and must not be driven from inside it.
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(CredentialError::Runtime)?;

        runtime.block_on(async {
            let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
            let provider = config
                .credentials_provider()
                .ok_or(CredentialError::NoProvider)?;
            let creds = provider
                .provide_credentials()
                .await
                .map_err(|e| CredentialError::Provider(e.to_string()))?;

            let region = config.region().map(|r| r.to_string()).unwrap_or_default();
            if region.is_empty() {
                tracing::debug!("no AWS region configured");
            }

            Ok::<_, CredentialError>(Credentials {
                access_key: creds.access_key_id().to_string(),
                secret_key: creds.secret_access_key().to_string(),
                region,
            })
        })
    }
}
