//! Storage credential exchange.

use std::time::Instant;

use docdist_core::{DocumentError, DocumentResult};
use docdist_storage::WriteCredential;
use reqwest::StatusCode;

use crate::gateway::GatewayClient;

/// Ask the gateway for a write-scoped URI for `document_name` and decompose it.
///
/// Any status other than OK, or a grant that cannot be decomposed, means no
/// write access was granted and fails with `PermissionDenied`.
pub async fn acquire_write_credential(
    gateway: &GatewayClient,
    document_name: &str,
) -> DocumentResult<WriteCredential> {
    if document_name.trim().is_empty() {
        return Err(DocumentError::InvalidArgument(
            "Storage document name cannot be empty".to_string(),
        ));
    }

    let start = Instant::now();
    let url = gateway.subscription_url(&format!(
        "documents/storage-access?documentName={}",
        urlencoding::encode(document_name)
    ));
    let (status, body) = gateway.execute(gateway.http().post(url)).await?;

    if status != StatusCode::OK {
        tracing::warn!(
            status = status.as_u16(),
            blob_name = %document_name,
            "Storage access refused"
        );
        return Err(DocumentError::PermissionDenied {
            status: status.as_u16(),
            detail: body,
        });
    }

    let uri = parse_storage_access_body(&body);
    let credential = WriteCredential::parse(&uri).map_err(|e| {
        tracing::warn!(error = %e, blob_name = %document_name, "Storage access grant unusable");
        DocumentError::PermissionDenied {
            status: status.as_u16(),
            detail: e.to_string(),
        }
    })?;

    tracing::debug!(
        blob_name = %document_name,
        container = %credential.container_address(),
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Storage access granted"
    );

    Ok(credential)
}

/// The grant arrives as a JSON string, or as plain text from some deployments.
fn parse_storage_access_body(body: &str) -> String {
    serde_json::from_str::<String>(body).unwrap_or_else(|_| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_string_body() {
        assert_eq!(
            parse_storage_access_body(r#""https://h/c/b.pdf?sig=a""#),
            "https://h/c/b.pdf?sig=a"
        );
    }

    #[test]
    fn test_parse_plain_body() {
        assert_eq!(
            parse_storage_access_body("  https://h/c/b.pdf?sig=a\n"),
            "https://h/c/b.pdf?sig=a"
        );
    }
}
