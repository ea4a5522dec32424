//! Configuration module
//!
//! Options consumed by the upload orchestrators: the Logic subscription, the
//! gateway base address and the chunking parameters.

use std::env;
use std::time::Duration;

use uuid::Uuid;

use crate::constants::{
    DEFAULT_BLOCK_SIZE_BYTES, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_SERVICE_URI,
    DEFAULT_UPLOAD_CONCURRENCY, MAX_BLOCK_SIZE_BYTES,
};
use crate::error::{DocumentError, DocumentResult};

/// Provide the configuration options for using the document service.
#[derive(Clone, Debug)]
pub struct DocumentsOptions {
    subscription_id: Uuid,
    service_uri: String,
    block_size_bytes: usize,
    upload_concurrency: usize,
    http_timeout: Duration,
}

impl DocumentsOptions {
    /// Build options for a subscription. `service_uri` should only be
    /// overridden for testing.
    pub fn new(subscription_id: &str, service_uri: Option<&str>) -> DocumentResult<Self> {
        let subscription_id = Uuid::parse_str(subscription_id.trim())?;
        let service_uri = service_uri
            .unwrap_or(DEFAULT_SERVICE_URI)
            .trim()
            .trim_end_matches('/')
            .to_string();

        let options = Self {
            subscription_id,
            service_uri,
            block_size_bytes: DEFAULT_BLOCK_SIZE_BYTES,
            upload_concurrency: DEFAULT_UPLOAD_CONCURRENCY,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };
        options.validate()?;
        Ok(options)
    }

    /// Load options from the environment (and `.env` when present).
    ///
    /// Reads DOCDIST_SUBSCRIPTION_ID (required), DOCDIST_SERVICE_URI,
    /// DOCDIST_BLOCK_SIZE_BYTES, DOCDIST_UPLOAD_CONCURRENCY and
    /// DOCDIST_HTTP_TIMEOUT_SECS.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let subscription_id = env::var("DOCDIST_SUBSCRIPTION_ID")
            .map_err(|_| anyhow::anyhow!("DOCDIST_SUBSCRIPTION_ID must be set"))?;
        let service_uri = env::var("DOCDIST_SERVICE_URI")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let block_size_bytes = match env::var("DOCDIST_BLOCK_SIZE_BYTES") {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("DOCDIST_BLOCK_SIZE_BYTES must be a valid number"))?,
            Err(_) => DEFAULT_BLOCK_SIZE_BYTES,
        };
        let upload_concurrency = match env::var("DOCDIST_UPLOAD_CONCURRENCY") {
            Ok(value) => value.trim().parse().map_err(|_| {
                anyhow::anyhow!("DOCDIST_UPLOAD_CONCURRENCY must be a valid number")
            })?,
            Err(_) => DEFAULT_UPLOAD_CONCURRENCY,
        };
        let http_timeout_secs = match env::var("DOCDIST_HTTP_TIMEOUT_SECS") {
            Ok(value) => value.trim().parse().map_err(|_| {
                anyhow::anyhow!("DOCDIST_HTTP_TIMEOUT_SECS must be a valid number")
            })?,
            Err(_) => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        let options = Self::new(&subscription_id, service_uri.as_deref())?
            .with_block_size(block_size_bytes)?
            .with_upload_concurrency(upload_concurrency)?
            .with_http_timeout(Duration::from_secs(http_timeout_secs))?;
        Ok(options)
    }

    pub fn with_block_size(mut self, block_size_bytes: usize) -> DocumentResult<Self> {
        self.block_size_bytes = block_size_bytes;
        self.validate()?;
        Ok(self)
    }

    /// Number of blocks allowed in flight at once for a single document.
    pub fn with_upload_concurrency(mut self, upload_concurrency: usize) -> DocumentResult<Self> {
        self.upload_concurrency = upload_concurrency;
        self.validate()?;
        Ok(self)
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> DocumentResult<Self> {
        self.http_timeout = timeout;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> DocumentResult<()> {
        if self.block_size_bytes == 0 || self.block_size_bytes > MAX_BLOCK_SIZE_BYTES {
            return Err(DocumentError::InvalidArgument(format!(
                "Block size must be between 1 and {} bytes",
                MAX_BLOCK_SIZE_BYTES
            )));
        }

        if self.http_timeout.is_zero() {
            return Err(DocumentError::InvalidArgument(
                "HTTP timeout must be greater than 0".to_string(),
            ));
        }

        if self.upload_concurrency == 0 {
            return Err(DocumentError::InvalidArgument(
                "Upload concurrency must be greater than 0".to_string(),
            ));
        }

        if !(self.service_uri.starts_with("https://") || self.service_uri.starts_with("http://"))
        {
            return Err(DocumentError::InvalidArgument(format!(
                "Service URI must be an absolute http(s) address: {}",
                self.service_uri
            )));
        }

        Ok(())
    }

    pub fn subscription_id(&self) -> Uuid {
        self.subscription_id
    }

    pub fn service_uri(&self) -> &str {
        &self.service_uri
    }

    pub fn block_size_bytes(&self) -> usize {
        self.block_size_bytes
    }

    pub fn upload_concurrency(&self) -> usize {
        self.upload_concurrency
    }

    pub fn http_timeout(&self) -> Duration {
        self.http_timeout
    }
}
