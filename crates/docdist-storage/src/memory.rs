//! In-memory block store.
//!
//! Keeps staged blocks and committed blobs in process memory. Committed blobs
//! are assembled from the listed blocks in list order, which makes this store a
//! faithful stand-in for the block-blob service in tests and dry runs.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};

use crate::{BlockBlobStore, BlockId, BlockStoreFactory, StorageError, StorageResult, WriteCredential};

#[derive(Default)]
struct MemoryState {
    staged: HashMap<(String, BlockId), Bytes>,
    committed: HashMap<String, Bytes>,
    put_block_calls: usize,
    put_block_list_calls: usize,
}

#[derive(Default)]
pub struct InMemoryBlockStore {
    state: Mutex<MemoryState>,
    fail_at_block: Option<u32>,
}

impl InMemoryBlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the upload of block `sequence` fail with a backend error.
    pub fn failing_at_block(mut self, sequence: u32) -> Self {
        self.fail_at_block = Some(sequence);
        self
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        // A panic while holding the lock cannot leave the maps half-written.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Content of a committed blob.
    pub fn committed(&self, blob_name: &str) -> Option<Bytes> {
        self.state().committed.get(blob_name).cloned()
    }

    pub fn committed_blob_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state().committed.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn put_block_calls(&self) -> usize {
        self.state().put_block_calls
    }

    pub fn put_block_list_calls(&self) -> usize {
        self.state().put_block_list_calls
    }

    /// Blocks staged but not (yet) part of a committed list.
    pub fn staged_block_count(&self) -> usize {
        self.state().staged.len()
    }
}

#[async_trait]
impl BlockBlobStore for InMemoryBlockStore {
    async fn put_block(
        &self,
        blob_name: &str,
        block_id: &BlockId,
        data: Bytes,
    ) -> StorageResult<()> {
        let mut state = self.state();
        state.put_block_calls += 1;

        if self.fail_at_block.is_some() && block_id.sequence() == self.fail_at_block {
            return Err(StorageError::BackendError(format!(
                "injected failure for block {}",
                block_id
            )));
        }

        state
            .staged
            .insert((blob_name.to_string(), block_id.clone()), data);
        Ok(())
    }

    async fn put_block_list(&self, blob_name: &str, block_ids: &[BlockId]) -> StorageResult<()> {
        let mut state = self.state();
        state.put_block_list_calls += 1;

        let mut blob = BytesMut::new();
        for block_id in block_ids {
            let key = (blob_name.to_string(), block_id.clone());
            let data = state.staged.get(&key).ok_or_else(|| {
                StorageError::CommitFailed(format!("block {} was never staged", block_id))
            })?;
            blob.extend_from_slice(data);
        }

        state.staged.retain(|(name, _), _| name != blob_name);
        state.committed.insert(blob_name.to_string(), blob.freeze());
        Ok(())
    }
}

/// Hands out one shared in-memory store for every credential and records the
/// credentials it was asked for.
#[derive(Default)]
pub struct InMemoryBlockStoreFactory {
    store: Arc<InMemoryBlockStore>,
    credentials: Mutex<Vec<WriteCredential>>,
}

impl InMemoryBlockStoreFactory {
    pub fn new(store: InMemoryBlockStore) -> Self {
        Self {
            store: Arc::new(store),
            credentials: Mutex::new(Vec::new()),
        }
    }

    pub fn store(&self) -> &InMemoryBlockStore {
        &self.store
    }

    pub fn credentials(&self) -> Vec<WriteCredential> {
        self.credentials
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl BlockStoreFactory for InMemoryBlockStoreFactory {
    fn create(&self, credential: &WriteCredential) -> Arc<dyn BlockBlobStore> {
        self.credentials
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(credential.clone());
        self.store.clone()
    }
}
