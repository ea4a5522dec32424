use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to distribute a previously uploaded citizen document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCitizenDocumentRequest {
    pub citizen_document_id: Uuid,
    pub cpr: String,
    pub sending_system: String,
    pub document_type: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SendCitizenDocumentResponse {
    pub message_id: Option<Uuid>,
}
