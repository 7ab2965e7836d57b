//! HTTP client construction and the macOS trust-store workaround.
//!
//! Some macOS hosts fail to validate the `*.fhcrc.org` wildcard certificate because
//! the GoDaddy G2 chain is missing from the system store. On macOS the two G2
//! certificates are added as extra trust anchors; the platform roots stay trusted.

use crate::error::TlsError;
use reqwest::blocking::{Client, ClientBuilder};
use reqwest::Certificate;

const EXTRA_ROOTS: [(&str, &[u8]); 2] = [
    (
        "Go Daddy Root Certificate Authority - G2",
        include_bytes!("../certs/godaddy-root-ca-g2.pem"),
    ),
    (
        "Go Daddy Secure Certificate Authority - G2",
        include_bytes!("../certs/godaddy-secure-ca-g2.pem"),
    ),
];

/// Parse the bundled certificates.
pub fn extra_roots() -> Result<Vec<Certificate>, TlsError> {
    EXTRA_ROOTS
        .iter()
        .map(|(name, pem)| {
            Certificate::from_pem(pem).map_err(|source| TlsError::Certificate { name: *name, source })
        })
        .collect()
}

fn with_platform_roots(builder: ClientBuilder, augment: bool) -> Result<ClientBuilder, TlsError> {
    if !augment {
        return Ok(builder);
    }
    let mut builder = builder;
    for cert in extra_roots()? {
        builder = builder.add_root_certificate(cert);
    }
    tracing::debug!(count = EXTRA_ROOTS.len(), "added bundled root certificates");
    Ok(builder)
}

/// Blocking client for the service, with the extra roots on macOS.
pub fn build_client() -> Result<Client, TlsError> {
    let builder = with_platform_roots(Client::builder(), cfg!(target_os = "macos"))?;
    builder.build().map_err(TlsError::Client)
}
