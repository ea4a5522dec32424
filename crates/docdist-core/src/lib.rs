//! Document distribution core library
//!
//! This crate provides the error taxonomy, request/response models and gateway
//! options shared by the storage, client and CLI crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::DocumentsOptions;
pub use error::{DocumentError, DocumentResult, LogLevel};
pub use models::{
    CitizenDocumentConfigResponse, CitizenDocumentType, CitizenDocumentUpdateRequest,
    CitizenDocumentUploadResponse, CompanyDocumentRequest, CompanyDocumentResponse,
    CompanyDocumentType, DocumentProviderConfigRequest, DocumentProviderConfigResponse,
    DocumentStatus, SendCitizenDocumentRequest, SendCitizenDocumentResponse,
    UploadFileParameters, UploadOutcome,
};
