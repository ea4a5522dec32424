//! Chunked upload pipeline shared by the citizen and company clients.
//!
//! One run: derive a unique storage name, exchange it for a write credential,
//! stage and commit the blocks. The caller then commits its metadata record.
//! Each step short-circuits the rest on failure.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use docdist_core::constants::STORAGE_DOCUMENT_EXTENSION;
use docdist_core::{DocumentError, DocumentResult, DocumentsOptions};
use docdist_storage::{
    AzureBlockStoreFactory, BlockManifest, BlockStoreFactory, BlockUploader, StorageError,
};
use reqwest::Client;
use tokio::io::AsyncRead;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::credential::acquire_write_credential;
use crate::gateway::GatewayClient;
use crate::token::TokenIssuer;

/// Blob staged and committed in storage, awaiting its metadata record.
#[derive(Debug)]
pub struct StagedDocument {
    pub document_id: Uuid,
    pub blob_name: String,
    pub document_url: String,
    pub manifest: BlockManifest,
}

/// `<name without dots>_<document id>.pdf`
pub fn storage_document_name(document_name: &str, document_id: Uuid) -> DocumentResult<String> {
    let stem = document_name.trim().replace('.', "");
    if stem.is_empty() {
        return Err(DocumentError::InvalidArgument(
            "Document name is required".to_string(),
        ));
    }
    Ok(format!("{}_{}{}", stem, document_id, STORAGE_DOCUMENT_EXTENSION))
}

pub(crate) fn from_storage_error(err: StorageError) -> DocumentError {
    match err {
        StorageError::Cancelled => DocumentError::Cancelled,
        other => DocumentError::TransportFailure(other.to_string()),
    }
}

/// Log a failed upload at the level its kind deserves and pass it on.
pub(crate) fn log_upload_failure(err: DocumentError, document_name: &str) -> DocumentError {
    match err {
        DocumentError::Cancelled => {
            tracing::info!(document_name = %document_name, "Document upload cancelled")
        }
        ref e => tracing::warn!(
            document_name = %document_name,
            error_type = e.error_type(),
            error = %e,
            "Document upload failed"
        ),
    }
    err
}

/// Race `step` against cancellation.
pub(crate) async fn cancellable<T, F>(cancel: &CancellationToken, step: F) -> DocumentResult<T>
where
    F: Future<Output = DocumentResult<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(DocumentError::Cancelled),
        result = step => result,
    }
}

/// Gateway, options and block store factory, built once per client.
pub(crate) struct UploadContext {
    pub gateway: GatewayClient,
    pub options: DocumentsOptions,
    pub stores: Arc<dyn BlockStoreFactory>,
}

impl UploadContext {
    pub fn new(http: Client, issuer: &dyn TokenIssuer, options: DocumentsOptions) -> Self {
        let gateway = GatewayClient::new(http, issuer, &options);
        Self::from_gateway(gateway, options)
    }

    pub fn with_owned_transport(
        issuer: &dyn TokenIssuer,
        options: DocumentsOptions,
    ) -> DocumentResult<Self> {
        let gateway = GatewayClient::with_owned_transport(issuer, &options)?;
        Ok(Self::from_gateway(gateway, options))
    }

    fn from_gateway(gateway: GatewayClient, options: DocumentsOptions) -> Self {
        let stores = Arc::new(AzureBlockStoreFactory::new(gateway.http().clone()));
        Self {
            gateway,
            options,
            stores,
        }
    }

    /// Stage `document` under a fresh id and commit its block list.
    pub async fn stage<R>(
        &self,
        document: R,
        document_name: &str,
        block_size: usize,
        cancel: &CancellationToken,
    ) -> DocumentResult<StagedDocument>
    where
        R: AsyncRead + Unpin + Send,
    {
        let start = Instant::now();
        let document_id = Uuid::new_v4();
        let blob_name = storage_document_name(document_name, document_id)?;

        let uploader = BlockUploader::new(block_size)
            .map_err(|e| DocumentError::InvalidArgument(e.to_string()))?
            .with_concurrency(self.options.upload_concurrency())
            .with_cancellation(cancel.clone());

        let credential =
            cancellable(cancel, acquire_write_credential(&self.gateway, &blob_name)).await?;
        let store = self.stores.create(&credential);

        let manifest = uploader
            .upload(document, &blob_name, store.as_ref())
            .await
            .map_err(from_storage_error)?;

        tracing::info!(
            document_id = %document_id,
            blob_name = %blob_name,
            block_count = manifest.len(),
            bytes = manifest.total_bytes(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Document blocks committed"
        );

        Ok(StagedDocument {
            document_id,
            document_url: credential.blob_url(&blob_name),
            blob_name,
            manifest,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_name_strips_dots_and_appends_id() {
        let id = Uuid::parse_str("22222222-2222-2222-2222-222222222222").unwrap();
        assert_eq!(
            storage_document_name("  Invoice.pdf ", id).unwrap(),
            "Invoicepdf_22222222-2222-2222-2222-222222222222.pdf"
        );
    }

    #[test]
    fn test_storage_name_requires_stem() {
        let id = Uuid::new_v4();
        assert!(storage_document_name("...", id).is_err());
        assert!(storage_document_name("   ", id).is_err());
    }

    #[test]
    fn test_storage_errors_map_to_taxonomy() {
        assert!(matches!(
            from_storage_error(StorageError::Cancelled),
            DocumentError::Cancelled
        ));
        assert!(matches!(
            from_storage_error(StorageError::UploadFailed("x".to_string())),
            DocumentError::TransportFailure(_)
        ));
    }

    #[tokio::test]
    async fn test_cancellable_prefers_cancellation() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = cancellable(&cancel, async { Ok::<_, DocumentError>(1) }).await;
        assert!(matches!(result, Err(DocumentError::Cancelled)));
    }
}
