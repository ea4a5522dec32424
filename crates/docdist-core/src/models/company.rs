use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::upload::DocumentStatus;
use crate::constants::DEFAULT_RETENTION_PERIOD_DAYS;

/// Type of a company document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CompanyDocumentType {
    #[default]
    Document,
    DigitalPostCoverLetter,
    SnailMailCoverLetter,
}

impl CompanyDocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompanyDocumentType::Document => "Document",
            CompanyDocumentType::DigitalPostCoverLetter => "DigitalPostCoverLetter",
            CompanyDocumentType::SnailMailCoverLetter => "SnailMailCoverLetter",
        }
    }
}

impl std::fmt::Display for CompanyDocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CompanyDocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Document" => Ok(CompanyDocumentType::Document),
            "DigitalPostCoverLetter" => Ok(CompanyDocumentType::DigitalPostCoverLetter),
            "SnailMailCoverLetter" => Ok(CompanyDocumentType::SnailMailCoverLetter),
            other => Err(format!("Unknown company document type: {}", other)),
        }
    }
}

/// Company document metadata. Used both as the caller's upload description
/// and, with `id`, `document_url` and `status` filled in, as the metadata
/// commit record.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDocumentRequest {
    pub document_configuration_id: Uuid,
    /// Organization (CVR) numbers the document is addressed to
    #[validate(length(min = 1, message = "At least one CVR number is required"))]
    pub cvrs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub company_document_type: CompanyDocumentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_url: Option<String>,
    #[validate(range(min = 1, message = "RetentionPeriodInDays must be greater than 0"))]
    pub retention_period_in_days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DocumentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[validate(length(min = 1, message = "Document name is required"))]
    pub document_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_comment: Option<String>,
}

impl CompanyDocumentRequest {
    pub fn new(
        document_configuration_id: Uuid,
        cvrs: Vec<String>,
        document_name: impl Into<String>,
        company_document_type: CompanyDocumentType,
    ) -> Self {
        Self {
            document_configuration_id,
            cvrs,
            id: None,
            company_document_type,
            document_url: None,
            retention_period_in_days: DEFAULT_RETENTION_PERIOD_DAYS,
            status: None,
            file_name: None,
            document_name: document_name.into(),
            sender: None,
            document_comment: None,
        }
    }

    pub fn with_retention_period(mut self, days: u32) -> Self {
        self.retention_period_in_days = days;
        self
    }

    /// Sender and free-text comment shown alongside the document.
    pub fn with_sender(mut self, sender: impl Into<String>, comment: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self.document_comment = Some(comment.into());
        self
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }
}

/// File access page details returned for an uploaded company document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyDocumentResponse {
    pub document_id: Option<Uuid>,
    pub company_document_type: Option<String>,
    pub document_name: Option<String>,
    pub file_access_page_url: Option<String>,
}
