use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Named sending profile governing how distributed documents are branded.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DocumentProviderConfigRequest {
    #[validate(length(min = 1, max = 255, message = "Config name must be between 1 and 255 characters"))]
    pub config_name: String,
    pub app_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digital_post_configuration_id: Option<Uuid>,
    pub system_name: String,
    pub page_header: String,
    pub footer: String,
}

/// Acknowledgment for a created or edited provider configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentProviderConfigResponse {
    pub configuration_id: Option<Uuid>,
    pub config_name: Option<String>,
}

/// A provider configuration as listed by the gateway.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CitizenDocumentConfigResponse {
    pub config_id: Option<Uuid>,
    pub config_name: Option<String>,
    pub app_title: Option<String>,
    pub system_name: Option<String>,
    pub page_header: Option<String>,
    pub footer: Option<String>,
}
