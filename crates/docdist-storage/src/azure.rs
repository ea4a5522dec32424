use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode};

use crate::traits::{BlockBlobStore, StorageError, StorageResult};
use crate::{BlockId, WriteCredential};

/// Storage service REST API version sent with every request.
const STORAGE_API_VERSION: &str = "2021-08-06";

/// Block-blob store speaking the Azure Blob REST protocol against a
/// SAS-scoped container.
#[derive(Clone)]
pub struct AzureBlockStore {
    http: Client,
    credential: WriteCredential,
}

impl AzureBlockStore {
    /// Create a store for the container the credential grants access to.
    ///
    /// # Arguments
    /// * `http` - Shared HTTP client; cloning it shares the connection pool
    /// * `credential` - Container address plus SAS grant
    pub fn new(http: Client, credential: WriteCredential) -> Self {
        Self { http, credential }
    }

    /// `{container}/{blob}?{operation}&{sas}`
    fn blob_endpoint(&self, blob_name: &str, operation: &str) -> String {
        format!(
            "{}/{}?{}&{}",
            self.credential.container_address(),
            urlencoding::encode(blob_name),
            operation,
            self.credential.sas()
        )
    }

    /// Render the block list body. Every id goes under `<Latest>` so the
    /// freshly staged block wins over any committed block with the same id.
    fn block_list_xml(block_ids: &[BlockId]) -> String {
        let mut xml = String::from(r#"<?xml version="1.0" encoding="utf-8"?><BlockList>"#);
        for id in block_ids {
            xml.push_str("<Latest>");
            xml.push_str(id.as_str());
            xml.push_str("</Latest>");
        }
        xml.push_str("</BlockList>");
        xml
    }
}

#[async_trait]
impl BlockBlobStore for AzureBlockStore {
    async fn put_block(
        &self,
        blob_name: &str,
        block_id: &BlockId,
        data: Bytes,
    ) -> StorageResult<()> {
        let start = std::time::Instant::now();
        let size = data.len();
        let url = self.blob_endpoint(
            blob_name,
            &format!("comp=block&blockid={}", urlencoding::encode(block_id.as_str())),
        );

        let response = self
            .http
            .put(&url)
            .header("x-ms-version", STORAGE_API_VERSION)
            .body(data)
            .send()
            .await
            .map_err(|e| StorageError::BackendError(format!("Put block request failed: {}", e)))?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = status.as_u16(),
                blob_name = %blob_name,
                block_id = %block_id,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Put block rejected"
            );
            return Err(StorageError::UploadFailed(format!(
                "block {} rejected with status {}: {}",
                block_id, status, body
            )));
        }

        Ok(())
    }

    async fn put_block_list(&self, blob_name: &str, block_ids: &[BlockId]) -> StorageResult<()> {
        let start = std::time::Instant::now();
        let url = self.blob_endpoint(blob_name, "comp=blocklist");

        let response = self
            .http
            .put(&url)
            .header("x-ms-version", STORAGE_API_VERSION)
            .header(reqwest::header::CONTENT_TYPE, "application/xml")
            .body(Self::block_list_xml(block_ids))
            .send()
            .await
            .map_err(|e| {
                StorageError::BackendError(format!("Put block list request failed: {}", e))
            })?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = status.as_u16(),
                blob_name = %blob_name,
                block_count = block_ids.len(),
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Put block list rejected"
            );
            return Err(StorageError::CommitFailed(format!(
                "status {}: {}",
                status, body
            )));
        }

        tracing::debug!(
            blob_name = %blob_name,
            block_count = block_ids.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Put block list accepted"
        );
        Ok(())
    }
}
