//! HTTP plumbing for the document gateway.
//!
//! Builds subscription-scoped URLs, attaches the bearer token and routes every
//! response through the classifier.

use std::sync::Arc;
use std::time::Instant;

use docdist_core::{DocumentError, DocumentResult, DocumentsOptions};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::classify::classify_expecting;
use crate::token::{TokenIssuer, TokenProvider};

/// HTTP client for the document gateway of one subscription.
#[derive(Clone)]
pub struct GatewayClient {
    http: Client,
    owns_transport: bool,
    base_url: String,
    subscription_id: Uuid,
    tokens: Arc<dyn TokenProvider>,
}

impl GatewayClient {
    /// Use a caller-supplied transport. The caller keeps ownership; `close`
    /// hands it back.
    pub fn new(http: Client, issuer: &dyn TokenIssuer, options: &DocumentsOptions) -> Self {
        let tokens = issuer.token_provider(&http);
        Self {
            http,
            owns_transport: false,
            base_url: options.service_uri().trim_end_matches('/').to_string(),
            subscription_id: options.subscription_id(),
            tokens,
        }
    }

    /// Build a dedicated transport honoring the configured timeout. It is
    /// released when the client is closed or dropped.
    pub fn with_owned_transport(
        issuer: &dyn TokenIssuer,
        options: &DocumentsOptions,
    ) -> DocumentResult<Self> {
        let http = Client::builder()
            .timeout(options.http_timeout())
            .build()
            .map_err(|e| {
                DocumentError::TransportFailure(format!("Failed to create HTTP client: {}", e))
            })?;

        let mut client = Self::new(http, issuer, options);
        client.owns_transport = true;
        Ok(client)
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    pub fn owns_transport(&self) -> bool {
        self.owns_transport
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn subscription_id(&self) -> Uuid {
        self.subscription_id
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `{base}/subscriptions/{subscription_id}/{path}`
    pub fn subscription_url(&self, path: &str) -> String {
        self.build_url(&format!(
            "subscriptions/{}/{}",
            self.subscription_id,
            path.trim_start_matches('/')
        ))
    }

    async fn authorize(&self, request: RequestBuilder) -> DocumentResult<RequestBuilder> {
        let token = self.tokens.access_token().await?;
        Ok(request.bearer_auth(token))
    }

    /// Send an authorized request and return the raw status and body.
    /// Only transport failures are errors here; statuses are left to the caller.
    pub async fn execute(&self, request: RequestBuilder) -> DocumentResult<(StatusCode, String)> {
        let request = self.authorize(request).await?;
        let response = request.send().await.map_err(|e| {
            tracing::error!(error = %e, "Gateway request failed");
            DocumentError::TransportFailure(format!("Failed to send request: {}", e))
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            DocumentError::TransportFailure(format!("Failed to read response body: {}", e))
        })?;
        Ok((status, body))
    }

    /// Send and classify; `expected` is the only status accepted as success.
    async fn send<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
        expected: StatusCode,
    ) -> DocumentResult<T> {
        let start = Instant::now();
        let (status, body) = self.execute(request).await?;
        let result = classify_expecting(expected, status, &body);

        match &result {
            Ok(_) => tracing::debug!(
                operation,
                status = status.as_u16(),
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Gateway call succeeded"
            ),
            Err(e) => tracing::warn!(
                operation,
                status = status.as_u16(),
                error_type = e.error_type(),
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Gateway call rejected"
            ),
        }

        result
    }

    /// GET a subscription-scoped resource.
    pub async fn get<T: DeserializeOwned>(&self, operation: &'static str, path: &str) -> DocumentResult<T> {
        let request = self.http.get(self.subscription_url(path));
        self.send(operation, request, StatusCode::OK).await
    }

    /// POST a JSON body to a subscription-scoped resource.
    pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        operation: &'static str,
        path: &str,
        body: &B,
    ) -> DocumentResult<T> {
        let request = self.http.post(self.subscription_url(path)).json(body);
        self.send(operation, request, StatusCode::OK).await
    }

    /// POST a JSON body that creates a resource; only 201 Created succeeds.
    pub async fn post_json_created<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        operation: &'static str,
        path: &str,
        body: &B,
    ) -> DocumentResult<T> {
        let request = self.http.post(self.subscription_url(path)).json(body);
        self.send(operation, request, StatusCode::CREATED).await
    }

    /// PUT a JSON body to a subscription-scoped resource.
    pub async fn put_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        operation: &'static str,
        path: &str,
        body: &B,
    ) -> DocumentResult<T> {
        let request = self.http.put(self.subscription_url(path)).json(body);
        self.send(operation, request, StatusCode::OK).await
    }

    /// POST a multipart form to a subscription-scoped resource.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> DocumentResult<T> {
        let request = self.http.post(self.subscription_url(path)).multipart(form);
        self.send(operation, request, StatusCode::OK).await
    }

    /// Release the client. A caller-supplied transport is handed back
    /// untouched; an owned one is dropped.
    pub fn close(self) -> Option<Client> {
        if self.owns_transport {
            None
        } else {
            Some(self.http)
        }
    }
}

impl std::fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayClient")
            .field("base_url", &self.base_url)
            .field("subscription_id", &self.subscription_id)
            .field("owns_transport", &self.owns_transport)
            .finish()
    }
}
