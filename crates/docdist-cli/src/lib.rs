use std::path::Path;

use anyhow::Context;
use docdist_client::{ClientCredentialsIssuer, TokenProviderOptions};
use docdist_core::{DocumentError, DocumentsOptions};

/// Everything the CLI needs before it may talk to the gateway.
#[derive(Debug, Clone)]
pub struct AppConfiguration {
    pub documents: DocumentsOptions,
    pub token_provider: TokenProviderOptions,
}

impl AppConfiguration {
    /// Load and validate from the environment (and `.env`). Refuses to
    /// proceed without client id, client secret, authorization scope and a
    /// subscription id that parses as a UUID.
    pub fn from_env() -> anyhow::Result<Self> {
        let token_provider = TokenProviderOptions::from_env().context(
            "Invalid configuration. Set DOCDIST_CLIENT_ID, DOCDIST_CLIENT_SECRET and DOCDIST_AUTHORIZATION_SCOPE",
        )?;
        let documents = DocumentsOptions::from_env().context(
            "Invalid configuration. Set DOCDIST_SUBSCRIPTION_ID to the Logic subscription UUID",
        )?;

        Ok(Self {
            documents,
            token_provider,
        })
    }

    pub fn token_issuer(&self) -> ClientCredentialsIssuer {
        ClientCredentialsIssuer::new(self.token_provider.clone())
    }
}

/// Document name to register: the explicit one, else the file name.
pub fn document_name_for(path: &Path, explicit: Option<String>) -> anyhow::Result<String> {
    if let Some(name) = explicit.filter(|n| !n.trim().is_empty()) {
        return Ok(name);
    }
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .with_context(|| format!("Cannot derive a document name from {}", path.display()))
}

/// Turn a classified error into an operator-facing failure.
pub fn report(err: DocumentError) -> anyhow::Error {
    anyhow::anyhow!("{} [{}]", err.detailed_message(), err.error_type())
}

/// Initialize tracing for the CLI binary.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_name_prefers_explicit() {
        let path = Path::new("/tmp/TestPdfInA4Format.pdf");
        assert_eq!(
            document_name_for(path, Some("Invoice".to_string())).unwrap(),
            "Invoice"
        );
    }

    #[test]
    fn document_name_falls_back_to_file_name() {
        let path = Path::new("/tmp/TestPdfInA4Format.pdf");
        assert_eq!(
            document_name_for(path, None).unwrap(),
            "TestPdfInA4Format.pdf"
        );
        assert_eq!(
            document_name_for(path, Some("  ".to_string())).unwrap(),
            "TestPdfInA4Format.pdf"
        );
    }

    #[test]
    fn document_name_requires_file_name() {
        assert!(document_name_for(Path::new("/"), None).is_err());
    }

    #[test]
    fn report_includes_detail_and_kind() {
        let err = report(DocumentError::ValidationFailed {
            detail: "DocumentName : required\n\n".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "BadRequest\n  Detail: DocumentName : required [ValidationFailed]"
        );
    }

    #[test]
    fn document_file_can_be_opened() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"%PDF-1.7").unwrap();
        let name = document_name_for(file.path(), None).unwrap();
        assert!(!name.is_empty());
    }
}
