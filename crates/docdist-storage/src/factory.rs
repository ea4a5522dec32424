use std::sync::Arc;

use reqwest::Client;

use crate::{AzureBlockStore, BlockBlobStore, WriteCredential};

/// Builds the block store a freshly issued write credential grants access to.
pub trait BlockStoreFactory: Send + Sync {
    fn create(&self, credential: &WriteCredential) -> Arc<dyn BlockBlobStore>;
}

/// Creates Azure REST block stores that share one HTTP client.
#[derive(Clone)]
pub struct AzureBlockStoreFactory {
    http: Client,
}

impl AzureBlockStoreFactory {
    pub fn new(http: Client) -> Self {
        Self { http }
    }
}

impl BlockStoreFactory for AzureBlockStoreFactory {
    fn create(&self, credential: &WriteCredential) -> Arc<dyn BlockBlobStore> {
        Arc::new(AzureBlockStore::new(self.http.clone(), credential.clone()))
    }
}
