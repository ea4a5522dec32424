//! Client for the document distribution gateway.
//!
//! Uploads citizen and company documents of any size: a write-scoped storage
//! credential is obtained from the gateway, the document is staged as
//! fixed-size blocks and committed, then its metadata is registered. Every
//! gateway response is classified into the shared `DocumentError` taxonomy.
//! Also covers dispatch of uploaded documents and provider configuration
//! management.

pub mod citizen;
pub mod classify;
pub mod company;
pub mod credential;
pub mod gateway;
pub mod token;
pub mod upload;

pub use citizen::CitizenDocumentsClient;
pub use classify::{classify, classify_expecting};
pub use company::CompanyDocumentsClient;
pub use credential::acquire_write_credential;
pub use gateway::GatewayClient;
pub use token::{
    ClientCredentialsIssuer, StaticTokenIssuer, TokenIssuer, TokenProvider, TokenProviderOptions,
};
pub use upload::storage_document_name;

// Re-export the shared models for convenience.
pub use docdist_core::{
    CitizenDocumentConfigResponse, CitizenDocumentType, CitizenDocumentUploadResponse,
    CompanyDocumentRequest, CompanyDocumentResponse, CompanyDocumentType, DocumentError,
    DocumentProviderConfigRequest, DocumentProviderConfigResponse, DocumentResult,
    DocumentStatus, DocumentsOptions, SendCitizenDocumentRequest, SendCitizenDocumentResponse,
    UploadFileParameters, UploadOutcome,
};
