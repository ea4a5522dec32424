//! Ordered record of the blocks staged for one blob.

use crate::{BlockId, StorageError, StorageResult};

/// One staged chunk of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDescriptor {
    /// 1-based position of the block in the document
    pub sequence: u32,
    pub id: BlockId,
    /// Bytes transferred for this block
    pub length: u64,
}

/// Block descriptors in upload order. Sequence numbers start at 1 and have
/// no gaps, so list order is also document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockManifest {
    blocks: Vec<BlockDescriptor>,
}

impl BlockManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the next block. Rejects anything but the next sequence number.
    pub fn push(&mut self, block: BlockDescriptor) -> StorageResult<()> {
        let expected = self.blocks.len() as u32 + 1;
        if block.sequence != expected {
            return Err(StorageError::InvalidBlockSequence(format!(
                "expected block {}, got {}",
                expected, block.sequence
            )));
        }

        // Ids are unique because each one encodes its own sequence number.
        if block.id.sequence() != Some(block.sequence) {
            return Err(StorageError::InvalidBlockSequence(format!(
                "block id {} does not encode sequence {}",
                block.id, block.sequence
            )));
        }

        self.blocks.push(block);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> &[BlockDescriptor] {
        &self.blocks
    }

    /// Block ids in commit order.
    pub fn block_ids(&self) -> Vec<BlockId> {
        self.blocks.iter().map(|b| b.id.clone()).collect()
    }

    pub fn total_bytes(&self) -> u64 {
        self.blocks.iter().map(|b| b.length).sum()
    }
}
