//! Client-credentials token issuance against a mock identity provider.
//!
//! Run with: `cargo test -p docdist-client --test token_test`

use docdist_client::{
    ClientCredentialsIssuer, DocumentError, DocumentsOptions, GatewayClient, TokenIssuer,
    TokenProviderOptions,
};
use mockito::Matcher;
use serde_json::json;

fn issuer(server: &mockito::ServerGuard) -> ClientCredentialsIssuer {
    ClientCredentialsIssuer::new(
        TokenProviderOptions::new("client-id", "client-secret", "https://logic/scope")
            .with_token_issuer(format!("{}/oauth2/token", server.url())),
    )
}

#[tokio::test]
async fn test_token_is_issued_once_and_cached() {
    let mut server = mockito::Server::new_async().await;
    let token = server
        .mock("POST", "/oauth2/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "client_credentials".into()),
            Matcher::UrlEncoded("client_id".into(), "client-id".into()),
            Matcher::UrlEncoded("client_secret".into(), "client-secret".into()),
            Matcher::UrlEncoded("scope".into(), "https://logic/scope".into()),
        ]))
        .with_status(200)
        .with_body(json!({ "access_token": "issued-token", "expires_in": 3600 }).to_string())
        .expect(1)
        .create_async()
        .await;

    let provider = issuer(&server).token_provider(&reqwest::Client::new());
    assert_eq!(provider.access_token().await.unwrap(), "issued-token");
    assert_eq!(provider.access_token().await.unwrap(), "issued-token");

    token.assert_async().await;
}

#[tokio::test]
async fn test_short_lived_token_is_refreshed() {
    let mut server = mockito::Server::new_async().await;
    // Lifetime inside the refresh margin, so every call re-issues.
    let token = server
        .mock("POST", "/oauth2/token")
        .with_status(200)
        .with_body(json!({ "access_token": "brief", "expires_in": 30 }).to_string())
        .expect(2)
        .create_async()
        .await;

    let provider = issuer(&server).token_provider(&reqwest::Client::new());
    provider.access_token().await.unwrap();
    provider.access_token().await.unwrap();

    token.assert_async().await;
}

#[tokio::test]
async fn test_oversized_lifetime_is_bounded() {
    let mut server = mockito::Server::new_async().await;
    let token = server
        .mock("POST", "/oauth2/token")
        .with_status(200)
        .with_body(r#"{"access_token": "long-lived", "expires_in": 9223372036854775807}"#)
        .expect(1)
        .create_async()
        .await;

    let provider = issuer(&server).token_provider(&reqwest::Client::new());
    assert_eq!(provider.access_token().await.unwrap(), "long-lived");
    assert_eq!(provider.access_token().await.unwrap(), "long-lived");

    token.assert_async().await;
}

#[tokio::test]
async fn test_rejected_credentials_fail_issuance() {
    let mut server = mockito::Server::new_async().await;
    let _token = server
        .mock("POST", "/oauth2/token")
        .with_status(400)
        .with_body(r#"{"error": "invalid_client"}"#)
        .create_async()
        .await;

    let provider = issuer(&server).token_provider(&reqwest::Client::new());
    let err = provider.access_token().await.unwrap_err();

    match err {
        DocumentError::TokenIssuance(message) => assert!(message.contains("invalid_client")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_gateway_calls_carry_issued_token() {
    let mut server = mockito::Server::new_async().await;
    let _token = server
        .mock("POST", "/oauth2/token")
        .with_status(200)
        .with_body(json!({ "access_token": "issued-token", "expires_in": 3600 }).to_string())
        .create_async()
        .await;
    let configs = server
        .mock(
            "GET",
            "/subscriptions/11111111-1111-1111-1111-111111111111/document-configurations",
        )
        .match_header("authorization", "Bearer issued-token")
        .with_status(200)
        .with_body("[]")
        .expect(1)
        .create_async()
        .await;

    let options = DocumentsOptions::new(
        "11111111-1111-1111-1111-111111111111",
        Some(server.url().as_str()),
    )
    .unwrap();
    let gateway = GatewayClient::new(reqwest::Client::new(), &issuer(&server), &options);

    let listed: Vec<serde_json::Value> = gateway
        .get("load_provider_configurations", "document-configurations")
        .await
        .unwrap();
    assert!(listed.is_empty());
    configs.assert_async().await;
}

#[tokio::test]
async fn test_issuance_failure_stops_gateway_call() {
    let mut server = mockito::Server::new_async().await;
    let _token = server
        .mock("POST", "/oauth2/token")
        .with_status(401)
        .create_async()
        .await;
    let configs = server
        .mock(
            "GET",
            "/subscriptions/11111111-1111-1111-1111-111111111111/document-configurations",
        )
        .expect(0)
        .create_async()
        .await;

    let options = DocumentsOptions::new(
        "11111111-1111-1111-1111-111111111111",
        Some(server.url().as_str()),
    )
    .unwrap();
    let gateway = GatewayClient::new(reqwest::Client::new(), &issuer(&server), &options);

    let err = gateway
        .get::<Vec<serde_json::Value>>("load_provider_configurations", "document-configurations")
        .await
        .unwrap_err();
    assert!(matches!(err, DocumentError::TokenIssuance(_)));
    configs.assert_async().await;
}
