//! Integration tests for the bearer token lifecycle

use std::sync::Arc;
use std::time::Duration;

use social_post_downloader::auth::{AuthError, Credentials, TokenManager};
use social_post_downloader::transport::ThrottledClient;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials() -> Credentials {
    Credentials {
        client_id: "client".to_string(),
        client_secret: "secret".to_string(),
        username: "user".to_string(),
        password: "pass".to_string(),
    }
}

fn manager(server: &MockServer) -> TokenManager {
    let transport = Arc::new(ThrottledClient::new(Duration::ZERO, 1).unwrap());
    TokenManager::new(transport, credentials(), server.uri())
}

fn token_body(access: &str, refresh: &str, expires_in: u64) -> serde_json::Value {
    serde_json::json!({
        "access_token": access,
        "refresh_token": refresh,
        "expires_in": expires_in,
    })
}

#[tokio::test]
async fn valid_token_triggers_exactly_one_password_grant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-1", "ref-1", 3600)))
        .expect(1)
        .mount(&server)
        .await;

    let mut tokens = manager(&server);
    let first = tokens.bearer().await.unwrap();
    let second = tokens.bearer().await.unwrap();
    assert_eq!(first, "tok-1");
    assert_eq!(second, "tok-1");
}

#[tokio::test]
async fn expired_token_triggers_exactly_one_refresh_grant() {
    let server = MockServer::start().await;
    // expires_in equal to the safety margin leaves no usable lifetime, so
    // the token is invalid as soon as it is issued.
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-1", "ref-1", 120)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=ref-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-2", "ref-2", 3600)))
        .expect(1)
        .mount(&server)
        .await;

    let mut tokens = manager(&server);
    let first = tokens.bearer().await.unwrap();
    assert_eq!(first, "tok-1");

    // The cached token is already past its margin: the next call refreshes,
    // and the replacement is then reused.
    let second = tokens.bearer().await.unwrap();
    assert_eq!(second, "tok-2");
    let third = tokens.bearer().await.unwrap();
    assert_eq!(third, "tok-2");
}

#[tokio::test]
async fn password_grant_sends_client_and_user_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("client_id=client"))
        .and(body_string_contains("client_secret=secret"))
        .and(body_string_contains("username=user"))
        .and(body_string_contains("password=pass"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok", "ref", 3600)))
        .expect(1)
        .mount(&server)
        .await;

    manager(&server).bearer().await.unwrap();
}

#[tokio::test]
async fn failed_exchange_surfaces_as_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = manager(&server).bearer().await.unwrap_err();
    assert!(matches!(err, AuthError::Exchange(_)));
}

#[tokio::test]
async fn malformed_token_body_surfaces_as_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"nope": 1})))
        .mount(&server)
        .await;

    let err = manager(&server).bearer().await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidResponse(_)));
}
