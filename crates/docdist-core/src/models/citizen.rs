use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::upload::DocumentStatus;
use crate::constants::{
    DEFAULT_BLOCK_SIZE_BYTES, DEFAULT_RETENTION_PERIOD_DAYS, MAX_BLOCK_SIZE_BYTES,
};

/// Type of a citizen document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CitizenDocumentType {
    #[default]
    CitizenDocument,
    DigitalPostCoverLetter,
    SnailMailCoverLetter,
}

impl CitizenDocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CitizenDocumentType::CitizenDocument => "CitizenDocument",
            CitizenDocumentType::DigitalPostCoverLetter => "DigitalPostCoverLetter",
            CitizenDocumentType::SnailMailCoverLetter => "SnailMailCoverLetter",
        }
    }
}

impl std::fmt::Display for CitizenDocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CitizenDocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CitizenDocument" => Ok(CitizenDocumentType::CitizenDocument),
            "DigitalPostCoverLetter" => Ok(CitizenDocumentType::DigitalPostCoverLetter),
            "SnailMailCoverLetter" => Ok(CitizenDocumentType::SnailMailCoverLetter),
            other => Err(format!("Unknown citizen document type: {}", other)),
        }
    }
}

/// Caller-supplied description of one citizen document upload.
#[derive(Debug, Clone, Validate)]
pub struct UploadFileParameters {
    /// Citizen document provider configuration the document belongs to
    pub citizen_document_config_id: Uuid,
    pub subscription_id: Uuid,
    /// Citizen CPR number
    #[validate(length(min = 1, message = "CPR number is required"))]
    pub cpr: String,
    /// Preferred name of the document
    #[validate(length(min = 1, message = "Document name is required"))]
    pub document_name: String,
    pub document_type: CitizenDocumentType,
    #[validate(range(min = 1, message = "RetentionPeriodInDays must be greater than 0"))]
    pub retention_period_in_days: u32,
    /// Block size used when chunking the document
    #[validate(range(
        min = 1,
        max = MAX_BLOCK_SIZE_BYTES,
        message = "BufferSize must be between 1 byte and 4000 MiB"
    ))]
    pub buffer_size: usize,
}

impl UploadFileParameters {
    pub fn new(
        citizen_document_config_id: Uuid,
        subscription_id: Uuid,
        cpr: impl Into<String>,
        document_name: impl Into<String>,
        document_type: CitizenDocumentType,
    ) -> Self {
        Self {
            citizen_document_config_id,
            subscription_id,
            cpr: cpr.into(),
            document_name: document_name.into(),
            document_type,
            retention_period_in_days: DEFAULT_RETENTION_PERIOD_DAYS,
            buffer_size: DEFAULT_BLOCK_SIZE_BYTES,
        }
    }

    pub fn with_retention_period(mut self, days: u32) -> Self {
        self.retention_period_in_days = days;
        self
    }

    pub fn with_buffer_size(mut self, bytes: usize) -> Self {
        self.buffer_size = bytes;
        self
    }
}

/// Metadata record committed once the citizen document's blocks are in storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitizenDocumentUpdateRequest {
    pub id: Uuid,
    pub subscription_id: Uuid,
    pub document_url: String,
    pub status: DocumentStatus,
    pub cpr: String,
    pub document_name: String,
    pub document_type: CitizenDocumentType,
    pub retention_period_in_days: u32,
    pub citizen_document_config_id: Uuid,
}

/// File access page details returned for an uploaded citizen document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CitizenDocumentUploadResponse {
    pub document_id: Option<Uuid>,
    pub document_type: Option<String>,
    pub document_name: Option<String>,
    pub file_access_page_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> UploadFileParameters {
        UploadFileParameters::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "0101701234",
            "Invoice.pdf",
            CitizenDocumentType::CitizenDocument,
        )
    }

    #[test]
    fn test_defaults() {
        let p = params();
        assert_eq!(p.retention_period_in_days, 5);
        assert_eq!(p.buffer_size, 5 * 1024 * 1024);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_zero_retention_invalid() {
        assert!(params().with_retention_period(0).validate().is_err());
    }

    #[test]
    fn test_buffer_size_bounds() {
        assert!(params().with_buffer_size(0).validate().is_err());
        assert!(params().with_buffer_size(MAX_BLOCK_SIZE_BYTES).validate().is_ok());
        assert!(params()
            .with_buffer_size(MAX_BLOCK_SIZE_BYTES + 1)
            .validate()
            .is_err());
    }

    #[test]
    fn test_missing_cpr_invalid() {
        let mut p = params();
        p.cpr = String::new();
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_document_type_round_trips_through_str() {
        let parsed: CitizenDocumentType = "SnailMailCoverLetter".parse().unwrap();
        assert_eq!(parsed, CitizenDocumentType::SnailMailCoverLetter);
        assert!("Letter".parse::<CitizenDocumentType>().is_err());
    }

    #[test]
    fn test_update_request_wire_names() {
        let request = CitizenDocumentUpdateRequest {
            id: Uuid::nil(),
            subscription_id: Uuid::nil(),
            document_url: "https://blob/docs/a.pdf".to_string(),
            status: DocumentStatus::Completed,
            cpr: "0101701234".to_string(),
            document_name: "Invoice.pdf".to_string(),
            document_type: CitizenDocumentType::CitizenDocument,
            retention_period_in_days: 3,
            citizen_document_config_id: Uuid::nil(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["status"], "Completed");
        assert_eq!(value["retentionPeriodInDays"], 3);
        assert_eq!(value["documentType"], "CitizenDocument");
        assert!(value.get("citizenDocumentConfigId").is_some());
    }

    #[test]
    fn test_upload_response_tolerates_missing_fields() {
        let response: CitizenDocumentUploadResponse =
            serde_json::from_str(r#"{"fileAccessPageUrl":"https://x"}"#).unwrap();
        assert_eq!(response.file_access_page_url.as_deref(), Some("https://x"));
        assert!(response.document_id.is_none());
    }
}
