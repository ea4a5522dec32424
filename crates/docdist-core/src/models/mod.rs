//! Data models for the document gateway
//!
//! Request and response bodies exchanged with the gateway, organized by
//! feature area. Wire names are camelCase.

mod citizen;
mod company;
mod configuration;
mod dispatch;
mod upload;

pub use citizen::{
    CitizenDocumentType, CitizenDocumentUpdateRequest, CitizenDocumentUploadResponse,
    UploadFileParameters,
};
pub use company::{CompanyDocumentRequest, CompanyDocumentResponse, CompanyDocumentType};
pub use configuration::{
    CitizenDocumentConfigResponse, DocumentProviderConfigRequest, DocumentProviderConfigResponse,
};
pub use dispatch::{SendCitizenDocumentRequest, SendCitizenDocumentResponse};
pub use upload::{DocumentStatus, UploadOutcome};
