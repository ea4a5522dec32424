//! Write-scoped storage credential.
//!
//! The gateway answers a storage access request with a single URI such as
//! `https://account.blob.core.windows.net/documents/name.pdf?sv=...&sig=...`.
//! The container address (scheme, authority, first path segment) addresses
//! blobs; the query string is the grant attached to every block operation.

use reqwest::Url;

use crate::{StorageError, StorageResult};

#[derive(Clone, PartialEq, Eq)]
pub struct WriteCredential {
    container_address: String,
    sas: String,
}

impl WriteCredential {
    /// Decompose a write URI into container address and grant.
    pub fn parse(uri: &str) -> StorageResult<Self> {
        let url = Url::parse(uri.trim())
            .map_err(|e| StorageError::InvalidCredential(format!("malformed URI: {}", e)))?;

        let host = url
            .host_str()
            .ok_or_else(|| StorageError::InvalidCredential("URI has no host".to_string()))?;

        let container = url
            .path_segments()
            .and_then(|mut segments| segments.next())
            .filter(|segment| !segment.is_empty())
            .ok_or_else(|| StorageError::InvalidCredential("URI has no container".to_string()))?;

        let sas = url.query().unwrap_or_default();
        if sas.is_empty() {
            return Err(StorageError::InvalidCredential(
                "URI carries no access grant".to_string(),
            ));
        }

        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        Ok(Self {
            container_address: format!("{}://{}/{}", url.scheme(), authority, container),
            sas: sas.to_string(),
        })
    }

    /// `scheme://host[:port]/container`
    pub fn container_address(&self) -> &str {
        &self.container_address
    }

    /// Query component (without the leading `?`) granting write access.
    pub fn sas(&self) -> &str {
        &self.sas
    }

    /// Address a blob in this container will be readable at once committed.
    pub fn blob_url(&self, blob_name: &str) -> String {
        format!("{}/{}", self.container_address, blob_name)
    }
}

impl std::fmt::Debug for WriteCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteCredential")
            .field("container_address", &self.container_address)
            .field("sas", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_blob_uri() {
        let credential = WriteCredential::parse(
            "https://docs.blob.core.windows.net/citizen-documents/Invoice_1.pdf?sv=2020-08-04&sp=cw&sig=abc%3D",
        )
        .unwrap();

        assert_eq!(
            credential.container_address(),
            "https://docs.blob.core.windows.net/citizen-documents"
        );
        assert_eq!(credential.sas(), "sv=2020-08-04&sp=cw&sig=abc%3D");
        assert_eq!(
            credential.blob_url("Invoicepdf_1.pdf"),
            "https://docs.blob.core.windows.net/citizen-documents/Invoicepdf_1.pdf"
        );
    }

    #[test]
    fn test_parse_keeps_explicit_port() {
        let credential = WriteCredential::parse("http://127.0.0.1:10000/devstore/x.pdf?sig=1").unwrap();
        assert_eq!(credential.container_address(), "http://127.0.0.1:10000/devstore");
    }

    #[test]
    fn test_missing_grant_rejected() {
        let err = WriteCredential::parse("https://docs.blob.core.windows.net/c/x.pdf").unwrap_err();
        assert!(matches!(err, StorageError::InvalidCredential(_)));
    }

    #[test]
    fn test_missing_container_rejected() {
        assert!(WriteCredential::parse("https://docs.blob.core.windows.net/?sig=1").is_err());
        assert!(WriteCredential::parse("not a uri").is_err());
    }

    #[test]
    fn test_debug_redacts_grant() {
        let credential = WriteCredential::parse("https://h/c/b?sig=secret").unwrap();
        let printed = format!("{:?}", credential);
        assert!(!printed.contains("secret"));
        assert!(printed.contains("https://h/c"));
    }
}
