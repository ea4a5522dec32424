//! Block-blob storage abstraction
//!
//! This module defines the trait every block store backend implements.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::BlockId;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Block upload failed: {0}")]
    UploadFailed(String),

    #[error("Block list commit failed: {0}")]
    CommitFailed(String),

    #[error("Invalid write credential: {0}")]
    InvalidCredential(String),

    #[error("Invalid block sequence: {0}")]
    InvalidBlockSequence(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Upload cancelled")]
    Cancelled,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Block-blob store scoped to one container and write credential.
///
/// Staged blocks stay invisible until `put_block_list` commits them; the
/// committed blob is the concatenation of the listed blocks in list order.
#[async_trait]
pub trait BlockBlobStore: Send + Sync {
    /// Stage one block of `blob_name` under `block_id`.
    async fn put_block(&self, blob_name: &str, block_id: &BlockId, data: Bytes)
        -> StorageResult<()>;

    /// Commit the ordered block list, making the blob readable.
    async fn put_block_list(&self, blob_name: &str, block_ids: &[BlockId]) -> StorageResult<()>;
}
