//! Bearer token supply for gateway calls.
//!
//! A [`TokenIssuer`] is asked once, when an orchestrator is constructed, for
//! the [`TokenProvider`] that every gateway request then draws its bearer
//! token from.

use std::env;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use docdist_core::{DocumentError, DocumentResult};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;

/// Default client-credentials token endpoint of the Logic identity platform.
pub const DEFAULT_TOKEN_ISSUER: &str = "https://b2clogicidentityprod.b2clogin.com/b2clogicidentityprod.onmicrosoft.com/B2C_1A_ClientCredentialsFlow/oauth2/v2.0/token";

/// Tokens are refreshed this long before the issuer says they expire.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Assumed lifetime when the issuer omits `expires_in`.
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// Longest lifetime honored for a cached token, whatever the issuer claims.
const MAX_TOKEN_LIFETIME_SECS: i64 = 86_400;

#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Current bearer token, without the `Bearer ` prefix.
    async fn access_token(&self) -> DocumentResult<String>;
}

pub trait TokenIssuer: Send + Sync {
    /// Build the provider gateway calls will use over `http`.
    fn token_provider(&self, http: &Client) -> Arc<dyn TokenProvider>;
}

/// A pre-issued token, handed out unchanged.
#[derive(Clone)]
pub struct StaticTokenIssuer {
    token: String,
}

impl StaticTokenIssuer {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

struct StaticTokenProvider(String);

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> DocumentResult<String> {
        Ok(self.0.clone())
    }
}

impl TokenIssuer for StaticTokenIssuer {
    fn token_provider(&self, _http: &Client) -> Arc<dyn TokenProvider> {
        Arc::new(StaticTokenProvider(self.token.clone()))
    }
}

/// Client credential settings for the token issuer.
#[derive(Clone)]
pub struct TokenProviderOptions {
    pub client_id: String,
    pub client_secret: String,
    pub authorization_scope: String,
    pub token_issuer: String,
}

impl TokenProviderOptions {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        authorization_scope: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            authorization_scope: authorization_scope.into(),
            token_issuer: DEFAULT_TOKEN_ISSUER.to_string(),
        }
    }

    pub fn with_token_issuer(mut self, token_issuer: impl Into<String>) -> Self {
        self.token_issuer = token_issuer.into();
        self
    }

    /// Load from DOCDIST_CLIENT_ID, DOCDIST_CLIENT_SECRET,
    /// DOCDIST_AUTHORIZATION_SCOPE and DOCDIST_TOKEN_ISSUER (optional).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let client_id = env::var("DOCDIST_CLIENT_ID")
            .map_err(|_| anyhow::anyhow!("DOCDIST_CLIENT_ID must be set"))?;
        let client_secret = env::var("DOCDIST_CLIENT_SECRET")
            .map_err(|_| anyhow::anyhow!("DOCDIST_CLIENT_SECRET must be set"))?;
        let authorization_scope = env::var("DOCDIST_AUTHORIZATION_SCOPE")
            .map_err(|_| anyhow::anyhow!("DOCDIST_AUTHORIZATION_SCOPE must be set"))?;

        let mut options = Self::new(client_id, client_secret, authorization_scope);
        if let Ok(issuer) = env::var("DOCDIST_TOKEN_ISSUER") {
            if !issuer.trim().is_empty() {
                options.token_issuer = issuer.trim().to_string();
            }
        }

        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.client_id.trim().is_empty() {
            return Err(anyhow::anyhow!("Client id cannot be empty"));
        }
        if self.client_secret.trim().is_empty() {
            return Err(anyhow::anyhow!("Client secret cannot be empty"));
        }
        if self.authorization_scope.trim().is_empty() {
            return Err(anyhow::anyhow!("Authorization scope cannot be empty"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for TokenProviderOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProviderOptions")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("authorization_scope", &self.authorization_scope)
            .field("token_issuer", &self.token_issuer)
            .finish()
    }
}

/// OAuth2 client-credentials grant against the configured token issuer.
#[derive(Clone, Debug)]
pub struct ClientCredentialsIssuer {
    options: TokenProviderOptions,
}

impl ClientCredentialsIssuer {
    pub fn new(options: TokenProviderOptions) -> Self {
        Self { options }
    }
}

impl TokenIssuer for ClientCredentialsIssuer {
    fn token_provider(&self, http: &Client) -> Arc<dyn TokenProvider> {
        Arc::new(ClientCredentialsTokenProvider {
            http: http.clone(),
            options: self.options.clone(),
            cached: Mutex::new(None),
        })
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

struct CachedToken {
    token: String,
    refresh_at: DateTime<Utc>,
}

struct ClientCredentialsTokenProvider {
    http: Client,
    options: TokenProviderOptions,
    cached: Mutex<Option<CachedToken>>,
}

impl ClientCredentialsTokenProvider {
    async fn request_token(&self) -> DocumentResult<TokenResponse> {
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.options.client_id.as_str()),
            ("client_secret", self.options.client_secret.as_str()),
            ("scope", self.options.authorization_scope.as_str()),
        ];

        let response = self
            .http
            .post(&self.options.token_issuer)
            .form(&form)
            .send()
            .await
            .map_err(|e| DocumentError::TokenIssuance(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                token_issuer = %self.options.token_issuer,
                "Token issuer rejected client credentials"
            );
            return Err(DocumentError::TokenIssuance(format!(
                "issuer responded with status {}: {}",
                status, body
            )));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| DocumentError::TokenIssuance(format!("invalid token response: {}", e)))
    }
}

#[async_trait]
impl TokenProvider for ClientCredentialsTokenProvider {
    async fn access_token(&self) -> DocumentResult<String> {
        // Held across the request so concurrent callers share one refresh.
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if Utc::now() < token.refresh_at {
                return Ok(token.token.clone());
            }
        }

        let issued = self.request_token().await?;
        // Issuer-supplied; bounded so the refresh instant stays representable.
        let lifetime = issued
            .expires_in
            .unwrap_or(DEFAULT_EXPIRES_IN_SECS)
            .clamp(0, MAX_TOKEN_LIFETIME_SECS);
        let refresh_at = Utc::now() + Duration::seconds(lifetime - EXPIRY_MARGIN_SECS);

        tracing::debug!(expires_in = lifetime, "Issued gateway access token");

        *cached = Some(CachedToken {
            token: issued.access_token.clone(),
            refresh_at,
        });
        Ok(issued.access_token)
    }
}
