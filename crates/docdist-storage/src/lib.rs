//! Document distribution storage library
//!
//! This crate uploads a document's byte stream into block-blob storage using a
//! temporary, write-scoped credential issued by the gateway.
//!
//! # Upload protocol
//!
//! - The credential URI is split into a container address and a SAS query
//!   (`credential` module).
//! - The stream is read in fixed-size windows; each window is staged as a block
//!   whose id is the base64 of its 7-digit, zero-padded sequence number
//!   (`block_id` module).
//! - The ordered block list is committed once, after every block is staged
//!   (`chunker` module). Blocks that never make it into a committed list are
//!   invisible to readers and are left for the storage service to expire.

pub mod azure;
pub mod block_id;
pub mod chunker;
pub mod credential;
pub mod factory;
pub mod manifest;
pub mod memory;
pub mod traits;

// Re-export commonly used types
pub use azure::AzureBlockStore;
pub use block_id::{BlockId, MAX_BLOCK_SEQUENCE};
pub use chunker::{BlockUploader, MAX_BLOCK_SIZE_BYTES};
pub use credential::WriteCredential;
pub use factory::{AzureBlockStoreFactory, BlockStoreFactory};
pub use manifest::{BlockDescriptor, BlockManifest};
pub use memory::{InMemoryBlockStore, InMemoryBlockStoreFactory};
pub use traits::{BlockBlobStore, StorageError, StorageResult};
