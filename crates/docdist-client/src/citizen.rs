//! Citizen documents: chunked upload, single-shot attachment upload, dispatch
//! and provider configuration management.
//!
//! To use the citizen documents service you need a Logic subscription, a
//! client credential for the Logic platform and a citizen document
//! configuration for the distribution service being used.

use std::sync::Arc;
use std::time::Instant;

use docdist_core::{
    CitizenDocumentConfigResponse, CitizenDocumentUpdateRequest, CitizenDocumentUploadResponse,
    DocumentError, DocumentProviderConfigRequest, DocumentProviderConfigResponse, DocumentResult,
    DocumentStatus, DocumentsOptions, SendCitizenDocumentRequest, SendCitizenDocumentResponse,
    UploadFileParameters, UploadOutcome,
};
use docdist_storage::BlockStoreFactory;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tokio::io::AsyncRead;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use validator::Validate;

use crate::gateway::GatewayClient;
use crate::token::TokenIssuer;
use crate::upload::{cancellable, log_upload_failure, UploadContext};

pub struct CitizenDocumentsClient {
    context: UploadContext,
}

impl CitizenDocumentsClient {
    /// Create a client over a caller-supplied transport. The transport is
    /// never closed by this client; `close` hands it back.
    ///
    /// # Arguments
    /// * `http` - HTTP client shared with the caller
    /// * `issuer` - Source of the bearer token provider, asked once here
    /// * `options` - Subscription, gateway address and chunking options
    pub fn new(http: Client, issuer: &dyn TokenIssuer, options: DocumentsOptions) -> Self {
        Self {
            context: UploadContext::new(http, issuer, options),
        }
    }

    /// Create a client that owns its transport.
    pub fn with_owned_transport(
        issuer: &dyn TokenIssuer,
        options: DocumentsOptions,
    ) -> DocumentResult<Self> {
        Ok(Self {
            context: UploadContext::with_owned_transport(issuer, options)?,
        })
    }

    /// Replace the block store factory (defaults to the Azure REST store).
    pub fn with_block_store_factory(mut self, stores: Arc<dyn BlockStoreFactory>) -> Self {
        self.context.stores = stores;
        self
    }

    pub fn gateway(&self) -> &GatewayClient {
        &self.context.gateway
    }

    pub fn options(&self) -> &DocumentsOptions {
        &self.context.options
    }

    /// Upload a citizen document of any size and register its metadata.
    ///
    /// The document is chunked into blocks of `parameters.buffer_size` bytes.
    /// Every call creates a new document, even for identical input.
    pub async fn upload_file<R>(
        &self,
        document: R,
        parameters: &UploadFileParameters,
    ) -> DocumentResult<UploadOutcome<CitizenDocumentUploadResponse>>
    where
        R: AsyncRead + Unpin + Send,
    {
        self.upload_file_cancellable(document, parameters, CancellationToken::new())
            .await
    }

    /// [`upload_file`](Self::upload_file) that stops at the next suspension
    /// point once `cancel` fires. A cancelled upload never commits.
    pub async fn upload_file_cancellable<R>(
        &self,
        document: R,
        parameters: &UploadFileParameters,
        cancel: CancellationToken,
    ) -> DocumentResult<UploadOutcome<CitizenDocumentUploadResponse>>
    where
        R: AsyncRead + Unpin + Send,
    {
        let start = Instant::now();
        parameters.validate()?;

        let staged = self
            .context
            .stage(document, &parameters.document_name, parameters.buffer_size, &cancel)
            .await
            .map_err(|e| log_upload_failure(e, &parameters.document_name))?;

        let record = CitizenDocumentUpdateRequest {
            id: staged.document_id,
            subscription_id: parameters.subscription_id,
            document_url: staged.document_url.clone(),
            status: DocumentStatus::Completed,
            cpr: parameters.cpr.clone(),
            document_name: parameters.document_name.clone(),
            document_type: parameters.document_type,
            retention_period_in_days: parameters.retention_period_in_days,
            citizen_document_config_id: parameters.citizen_document_config_id,
        };

        let response: CitizenDocumentUploadResponse = cancellable(
            &cancel,
            self.context.gateway.post_json(
                "citizen_metadata_commit",
                "citizen-documents/update",
                &record,
            ),
        )
        .await
        .map_err(|e| log_upload_failure(e, &parameters.document_name))?;

        tracing::info!(
            document_id = %staged.document_id,
            blob_name = %staged.blob_name,
            block_count = staged.manifest.len(),
            bytes = staged.manifest.total_bytes(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Citizen document uploaded"
        );

        Ok(UploadOutcome {
            document_id: staged.document_id,
            document_url: staged.document_url,
            blob_name: staged.blob_name,
            status: DocumentStatus::Completed,
            block_count: staged.manifest.len(),
            block_lengths: staged.manifest.blocks().iter().map(|b| b.length).collect(),
            bytes_uploaded: staged.manifest.total_bytes(),
            response,
        })
    }

    /// Upload a small, in-memory citizen document in a single multipart request.
    pub async fn upload_attachment(
        &self,
        document: Vec<u8>,
        parameters: &UploadFileParameters,
    ) -> DocumentResult<CitizenDocumentUploadResponse> {
        parameters.validate()?;

        let part = Part::bytes(document)
            .file_name(parameters.document_name.clone())
            .mime_str("application/pdf")
            .map_err(|e| DocumentError::InvalidArgument(e.to_string()))?;

        let form = Form::new()
            .text(
                "configurationId",
                parameters.citizen_document_config_id.to_string(),
            )
            .text("cpr", parameters.cpr.clone())
            .text(
                "retentionPeriodInDays",
                parameters.retention_period_in_days.to_string(),
            )
            .text("documentType", parameters.document_type.as_str())
            .text("documentName", parameters.document_name.clone())
            .part("document", part);

        self.context
            .gateway
            .post_multipart("citizen_attachment_upload", "citizen-documents/upload", form)
            .await
    }

    /// Distribute a previously uploaded document. `NotFound` means the
    /// gateway does not know the document id.
    pub async fn send_document(
        &self,
        request: &SendCitizenDocumentRequest,
    ) -> DocumentResult<SendCitizenDocumentResponse> {
        if request.cpr.trim().is_empty() {
            return Err(DocumentError::InvalidArgument(
                "CPR number is required".to_string(),
            ));
        }

        let response: SendCitizenDocumentResponse = self
            .context
            .gateway
            .post_json("send_document", "citizen-documents/send", request)
            .await?;

        tracing::info!(
            document_id = %request.citizen_document_id,
            message_id = ?response.message_id,
            "Citizen document dispatched"
        );
        Ok(response)
    }

    /// Register a named sending profile.
    pub async fn create_provider_configuration(
        &self,
        request: &DocumentProviderConfigRequest,
    ) -> DocumentResult<DocumentProviderConfigResponse> {
        request.validate()?;
        self.context
            .gateway
            .post_json_created(
                "create_provider_configuration",
                "document-configurations",
                request,
            )
            .await
    }

    pub async fn load_provider_configurations(
        &self,
    ) -> DocumentResult<Vec<CitizenDocumentConfigResponse>> {
        self.context
            .gateway
            .get("load_provider_configurations", "document-configurations")
            .await
    }

    pub async fn edit_provider_configuration(
        &self,
        configuration_id: Uuid,
        request: &DocumentProviderConfigRequest,
    ) -> DocumentResult<DocumentProviderConfigResponse> {
        request.validate()?;
        self.context
            .gateway
            .put_json(
                "edit_provider_configuration",
                &format!("document-configurations/{}", configuration_id),
                request,
            )
            .await
    }

    /// Release the client, handing back a caller-supplied transport.
    pub fn close(self) -> Option<Client> {
        self.context.gateway.close()
    }
}
