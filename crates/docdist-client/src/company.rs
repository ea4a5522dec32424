//! Company documents: chunked upload, single-shot attachment upload and direct
//! metadata updates.

use std::sync::Arc;
use std::time::Instant;

use docdist_core::{
    CompanyDocumentRequest, CompanyDocumentResponse, DocumentError, DocumentResult,
    DocumentStatus, DocumentsOptions, UploadOutcome,
};
use docdist_storage::BlockStoreFactory;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tokio::io::AsyncRead;
use tokio_util::sync::CancellationToken;
use validator::Validate;

use crate::gateway::GatewayClient;
use crate::token::TokenIssuer;
use crate::upload::{cancellable, log_upload_failure, UploadContext};

pub struct CompanyDocumentsClient {
    context: UploadContext,
}

impl CompanyDocumentsClient {
    /// Create a client over a caller-supplied transport; `close` hands it back.
    pub fn new(http: Client, issuer: &dyn TokenIssuer, options: DocumentsOptions) -> Self {
        Self {
            context: UploadContext::new(http, issuer, options),
        }
    }

    pub fn with_owned_transport(
        issuer: &dyn TokenIssuer,
        options: DocumentsOptions,
    ) -> DocumentResult<Self> {
        Ok(Self {
            context: UploadContext::with_owned_transport(issuer, options)?,
        })
    }

    pub fn with_block_store_factory(mut self, stores: Arc<dyn BlockStoreFactory>) -> Self {
        self.context.stores = stores;
        self
    }

    pub fn gateway(&self) -> &GatewayClient {
        &self.context.gateway
    }

    /// Upload a company document of any size and register its metadata.
    ///
    /// `request` describes the document; its `id`, `document_url` and
    /// `status` are filled in by the upload. Blocks are
    /// `DocumentsOptions::block_size_bytes` long.
    pub async fn upload_company_file<R>(
        &self,
        document: R,
        request: &CompanyDocumentRequest,
    ) -> DocumentResult<UploadOutcome<CompanyDocumentResponse>>
    where
        R: AsyncRead + Unpin + Send,
    {
        self.upload_company_file_cancellable(document, request, CancellationToken::new())
            .await
    }

    pub async fn upload_company_file_cancellable<R>(
        &self,
        document: R,
        request: &CompanyDocumentRequest,
        cancel: CancellationToken,
    ) -> DocumentResult<UploadOutcome<CompanyDocumentResponse>>
    where
        R: AsyncRead + Unpin + Send,
    {
        let start = Instant::now();
        request.validate()?;

        let staged = self
            .context
            .stage(
                document,
                &request.document_name,
                self.context.options.block_size_bytes(),
                &cancel,
            )
            .await
            .map_err(|e| log_upload_failure(e, &request.document_name))?;

        let mut record = request.clone();
        record.id = Some(staged.document_id);
        record.document_url = Some(staged.document_url.clone());
        record.status = Some(DocumentStatus::Completed);

        let response = cancellable(&cancel, self.commit_metadata(&record))
            .await
            .map_err(|e| log_upload_failure(e, &request.document_name))?;

        tracing::info!(
            document_id = %staged.document_id,
            blob_name = %staged.blob_name,
            cvr_count = request.cvrs.len(),
            block_count = staged.manifest.len(),
            bytes = staged.manifest.total_bytes(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Company document uploaded"
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

    /// Record company document metadata directly, for documents already in
    /// storage.
    pub async fn update_company_data(
        &self,
        request: &CompanyDocumentRequest,
    ) -> DocumentResult<CompanyDocumentResponse> {
        request.validate()?;
        self.commit_metadata(request).await
    }

    async fn commit_metadata(
        &self,
        record: &CompanyDocumentRequest,
    ) -> DocumentResult<CompanyDocumentResponse> {
        self.context
            .gateway
            .post_json("company_metadata_commit", "company-documents/update", record)
            .await
    }

    /// Upload a small, in-memory company document in a single multipart request.
    pub async fn upload_attachment(
        &self,
        document: Vec<u8>,
        request: &CompanyDocumentRequest,
    ) -> DocumentResult<CompanyDocumentResponse> {
        request.validate()?;

        let file_name = request
            .file_name
            .clone()
            .unwrap_or_else(|| request.document_name.clone());
        let part = Part::bytes(document)
            .file_name(file_name)
            .mime_str("application/pdf")
            .map_err(|e| DocumentError::InvalidArgument(e.to_string()))?;

        let mut form = Form::new().text(
            "documentConfigurationId",
            request.document_configuration_id.to_string(),
        );
        for cvr in &request.cvrs {
            form = form.text("cvrs", cvr.clone());
        }
        form = form
            .text(
                "retentionPeriodInDays",
                request.retention_period_in_days.to_string(),
            )
            .text("companyDocumentType", request.company_document_type.as_str())
            .text("documentName", request.document_name.clone());
        if let Some(sender) = &request.sender {
            form = form.text("sender", sender.clone());
        }
        if let Some(comment) = &request.document_comment {
            form = form.text("documentComment", comment.clone());
        }
        let form = form.part("document", part);

        self.context
            .gateway
            .post_multipart("company_attachment_upload", "company-documents/upload", form)
            .await
    }

    /// Release the client, handing back a caller-supplied transport.
    pub fn close(self) -> Option<Client> {
        self.context.gateway.close()
    }
}
