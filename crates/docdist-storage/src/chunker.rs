//! Chunked block upload.
//!
//! Reads a stream in fixed-size windows, stages each window as a block and
//! commits the ordered block list once the stream is exhausted. Memory use is
//! bounded by `block_size * concurrency` regardless of document length.

use bytes::Bytes;
use futures::TryStreamExt;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::sync::CancellationToken;

use crate::{
    BlockBlobStore, BlockDescriptor, BlockId, BlockManifest, StorageError, StorageResult,
};

/// Largest block the block-blob service accepts (4000 MiB).
pub const MAX_BLOCK_SIZE_BYTES: usize = 4000 * 1024 * 1024;

/// Initial window allocation; the buffer grows with what is actually read.
const INITIAL_WINDOW_CAPACITY: usize = 64 * 1024;

/// Uploads one document as a sequence of blocks.
#[derive(Debug, Clone)]
pub struct BlockUploader {
    block_size: usize,
    concurrency: usize,
    cancel: CancellationToken,
}

struct Window {
    sequence: u32,
    id: BlockId,
    data: Bytes,
}

struct ReadState<R> {
    reader: R,
    sequence: u32,
    exhausted: bool,
}

impl BlockUploader {
    pub fn new(block_size: usize) -> StorageResult<Self> {
        if block_size == 0 || block_size > MAX_BLOCK_SIZE_BYTES {
            return Err(StorageError::InvalidBlockSequence(format!(
                "block size must be within 1..={} bytes, got {}",
                MAX_BLOCK_SIZE_BYTES, block_size
            )));
        }

        Ok(Self {
            block_size,
            concurrency: 1,
            cancel: CancellationToken::new(),
        })
    }

    /// Allow up to `concurrency` blocks in flight. The committed list keeps
    /// sequence order either way.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Stage every block of `reader` under `blob_name` and commit the list.
    ///
    /// A stream whose length is an exact multiple of the block size produces
    /// no trailing empty block. An empty stream produces exactly one empty
    /// block so the commit still creates the blob.
    ///
    /// Any block failure aborts before the commit; cancellation is observed
    /// while reading, while blocks are in flight and before the commit.
    pub async fn upload<R>(
        &self,
        reader: R,
        blob_name: &str,
        store: &dyn BlockBlobStore,
    ) -> StorageResult<BlockManifest>
    where
        R: AsyncRead + Unpin + Send,
    {
        let start = std::time::Instant::now();
        let block_size = self.block_size;

        let state = ReadState {
            reader,
            sequence: 0,
            exhausted: false,
        };
        let windows =
            futures::stream::try_unfold(state, move |state| next_window(state, block_size));

        let uploads = windows
            .map_ok(|window| async move {
                let length = window.data.len() as u64;
                store
                    .put_block(blob_name, &window.id, window.data)
                    .await
                    .map_err(|e| {
                        tracing::error!(
                            error = %e,
                            blob_name = %blob_name,
                            sequence = window.sequence,
                            "Block upload failed"
                        );
                        e
                    })?;

                tracing::debug!(
                    blob_name = %blob_name,
                    sequence = window.sequence,
                    bytes = length,
                    "Block staged"
                );

                Ok::<_, StorageError>(BlockDescriptor {
                    sequence: window.sequence,
                    id: window.id,
                    length,
                })
            })
            .try_buffered(self.concurrency);
        futures::pin_mut!(uploads);

        let mut manifest = BlockManifest::new();
        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    tracing::info!(
                        blob_name = %blob_name,
                        staged_blocks = manifest.len(),
                        "Block upload cancelled, list not committed"
                    );
                    return Err(StorageError::Cancelled);
                }
                next = uploads.try_next() => next?,
            };

            match next {
                Some(block) => manifest.push(block)?,
                None => break,
            }
        }

        let block_ids = manifest.block_ids();
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(StorageError::Cancelled),
            result = store.put_block_list(blob_name, &block_ids) => result?,
        }

        tracing::info!(
            blob_name = %blob_name,
            block_count = manifest.len(),
            bytes = manifest.total_bytes(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Block list committed"
        );

        Ok(manifest)
    }
}

/// Read the next window of up to `block_size` bytes.
async fn next_window<R>(
    mut state: ReadState<R>,
    block_size: usize,
) -> StorageResult<Option<(Window, ReadState<R>)>>
where
    R: AsyncRead + Unpin + Send,
{
    if state.exhausted {
        return Ok(None);
    }

    let mut buffer = Vec::with_capacity(block_size.min(INITIAL_WINDOW_CAPACITY));
    // A single read may return short without EOF; keep filling the window.
    let read = (&mut state.reader)
        .take(block_size as u64)
        .read_to_end(&mut buffer)
        .await?;

    if read == 0 && state.sequence > 0 {
        return Ok(None);
    }

    state.sequence += 1;
    state.exhausted = read < block_size;

    let window = Window {
        sequence: state.sequence,
        id: BlockId::from_sequence(state.sequence)?,
        data: Bytes::from(buffer),
    };
    Ok(Some((window, state)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryBlockStore;

    fn payload(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    async fn upload(len: usize, block_size: usize) -> (BlockManifest, InMemoryBlockStore) {
        let store = InMemoryBlockStore::new();
        let data = payload(len);
        let manifest = BlockUploader::new(block_size)
            .unwrap()
            .upload(&data[..], "doc.pdf", &store)
            .await
            .unwrap();
        (manifest, store)
    }

    #[tokio::test]
    async fn test_block_count_is_ceiling() {
        for (len, block_size, expected) in [
            (1usize, 4usize, 1usize),
            (3, 4, 1),
            (5, 4, 2),
            (9, 4, 3),
            (10, 3, 4),
        ] {
            let (manifest, _) = upload(len, block_size).await;
            assert_eq!(manifest.len(), expected, "len={} block_size={}", len, block_size);
        }
    }

    #[tokio::test]
    async fn test_exact_multiple_has_no_trailing_empty_block() {
        let (manifest, store) = upload(12, 4).await;
        assert_eq!(manifest.len(), 3);
        assert!(manifest.blocks().iter().all(|b| b.length == 4));
        assert_eq!(store.put_block_calls(), 3);
    }

    #[tokio::test]
    async fn test_empty_stream_uploads_one_empty_block() {
        let (manifest, store) = upload(0, 4).await;
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.blocks()[0].length, 0);
        assert_eq!(store.committed("doc.pdf").unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_round_trip_reproduces_stream() {
        let data = payload(10_007);
        let store = InMemoryBlockStore::new();
        let manifest = BlockUploader::new(1_000)
            .unwrap()
            .upload(&data[..], "doc.pdf", &store)
            .await
            .unwrap();

        assert_eq!(manifest.len(), 11);
        assert_eq!(manifest.total_bytes(), 10_007);
        assert_eq!(store.committed("doc.pdf").unwrap().as_ref(), &data[..]);
        assert_eq!(store.put_block_list_calls(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_upload_keeps_sequence_order() {
        let data = payload(50_000);
        let store = InMemoryBlockStore::new();
        let manifest = BlockUploader::new(1_024)
            .unwrap()
            .with_concurrency(8)
            .upload(&data[..], "doc.pdf", &store)
            .await
            .unwrap();

        let sequences: Vec<u32> = manifest.blocks().iter().map(|b| b.sequence).collect();
        let expected: Vec<u32> = (1..=manifest.len() as u32).collect();
        assert_eq!(sequences, expected);
        assert_eq!(store.committed("doc.pdf").unwrap().as_ref(), &data[..]);
    }

    #[tokio::test]
    async fn test_block_failure_skips_commit() {
        let data = payload(100);
        let store = InMemoryBlockStore::new().failing_at_block(2);
        let err = BlockUploader::new(30)
            .unwrap()
            .upload(&data[..], "doc.pdf", &store)
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::BackendError(_)));
        assert_eq!(store.put_block_list_calls(), 0);
        assert!(store.committed("doc.pdf").is_none());
    }

    #[tokio::test]
    async fn test_cancelled_upload_never_commits() {
        let data = payload(100);
        let store = InMemoryBlockStore::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = BlockUploader::new(10)
            .unwrap()
            .with_cancellation(cancel)
            .upload(&data[..], "doc.pdf", &store)
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::Cancelled));
        assert_eq!(store.put_block_list_calls(), 0);
    }

    #[test]
    fn test_block_size_bounds() {
        assert!(BlockUploader::new(0).is_err());
        assert!(BlockUploader::new(MAX_BLOCK_SIZE_BYTES + 1).is_err());
        assert!(BlockUploader::new(usize::MAX / 2).is_err());
        assert!(BlockUploader::new(MAX_BLOCK_SIZE_BYTES).is_ok());
    }

    #[tokio::test]
    async fn test_largest_block_size_reads_only_the_stream() {
        let store = InMemoryBlockStore::new();
        let manifest = BlockUploader::new(MAX_BLOCK_SIZE_BYTES)
            .unwrap()
            .upload(&[1u8, 2, 3][..], "doc.pdf", &store)
            .await
            .unwrap();

        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.total_bytes(), 3);
        assert_eq!(store.committed("doc.pdf").unwrap().as_ref(), &[1u8, 2, 3][..]);
    }
}
