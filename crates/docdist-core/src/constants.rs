/// Gateway used when no service URI is configured.
pub const DEFAULT_SERVICE_URI: &str = "https://gateway.kmdlogic.io/document-service/v2";

/// Default block size for chunked uploads (5 MiB).
pub const DEFAULT_BLOCK_SIZE_BYTES: usize = 5 * 1024 * 1024;

/// Largest block the block-blob service accepts (4000 MiB).
pub const MAX_BLOCK_SIZE_BYTES: usize = 4000 * 1024 * 1024;

pub const DEFAULT_UPLOAD_CONCURRENCY: usize = 1;

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Extension appended to every storage document name.
pub const STORAGE_DOCUMENT_EXTENSION: &str = ".pdf";

/// Default retention for citizen uploads when the caller does not pick one.
pub const DEFAULT_RETENTION_PERIOD_DAYS: u32 = 5;
