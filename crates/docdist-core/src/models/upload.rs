use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status literal recorded with the document metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentStatus {
    Completed,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal result of one chunked upload: where the blob landed, the id the
/// metadata was registered under and the gateway's acknowledgment.
#[derive(Debug, Clone, Serialize)]
pub struct UploadOutcome<R> {
    pub document_id: Uuid,
    pub document_url: String,
    pub blob_name: String,
    pub status: DocumentStatus,
    pub block_count: usize,
    /// Bytes in each committed block, in commit order
    pub block_lengths: Vec<u64>,
    pub bytes_uploaded: u64,
    pub response: R,
}
