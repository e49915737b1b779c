//! Credential store integration tests.
//!
//! Covers load precedence (environment blob before persisted file), malformed
//! candidate fall-through, refresh prerequisites, and file persistence.

use anyhow::Result;
use fitbit_gateway::config::{ClientIdentity, GatewayConfig, LogLevel};
use fitbit_gateway::credentials::{Credential, CredentialStore};
use fitbit_gateway::errors::ErrorCode;
use serial_test::serial;
use std::path::PathBuf;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn base_config(token_file: PathBuf) -> GatewayConfig {
    GatewayConfig {
        identity: ClientIdentity::default(),
        token_env_blob: None,
        token_file,
        tokens_secret: None,
        api_base: "http://127.0.0.1:1".to_string(),
        timeout_secs: 5,
        log_level: LogLevel::Info,
        json_logs: false,
    }
}

#[tokio::test]
async fn test_env_blob_wins_over_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let token_file = dir.path().join("tokens.json");
    std::fs::write(
        &token_file,
        r#"{"access_token":"from_file","refresh_token":"rf"}"#,
    )?;

    let mut config = base_config(token_file);
    config.token_env_blob =
        Some(r#"{"access_token":"from_env","refresh_token":"re"}"#.to_string());

    let store = CredentialStore::new(&config, reqwest::Client::new());
    store.load().await;

    assert_eq!(store.access_token().await.as_deref(), Some("from_env"));
    Ok(())
}

#[tokio::test]
async fn test_malformed_env_blob_falls_through_to_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let token_file = dir.path().join("tokens.json");
    std::fs::write(
        &token_file,
        r#"{"access_token":"from_file","refresh_token":"rf"}"#,
    )?;

    let mut config = base_config(token_file);
    config.token_env_blob = Some("{not json".to_string());

    let store = CredentialStore::new(&config, reqwest::Client::new());
    store.load().await;

    assert_eq!(store.access_token().await.as_deref(), Some("from_file"));
    Ok(())
}

#[tokio::test]
async fn test_no_source_starts_unauthenticated() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = base_config(dir.path().join("missing.json"));

    let store = CredentialStore::new(&config, reqwest::Client::new());
    store.load().await;

    assert!(store.access_token().await.is_none());
    Ok(())
}

#[tokio::test]
async fn test_malformed_token_file_is_treated_as_absent() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let token_file = dir.path().join("tokens.json");
    std::fs::write(&token_file, "not json at all")?;

    let store = CredentialStore::new(&base_config(token_file), reqwest::Client::new());
    store.load().await;

    assert!(store.access_token().await.is_none());
    Ok(())
}

#[tokio::test]
async fn test_refresh_without_credential_fails_without_network() -> Result<()> {
    let dir = tempfile::tempdir()?;
    // api_base is unroutable; any network attempt would error differently.
    let store = CredentialStore::new(
        &base_config(dir.path().join("tokens.json")),
        reqwest::Client::new(),
    );

    let err = store.refresh().await.unwrap_err();
    assert_eq!(err.code, ErrorCode::AuthExpired);
    Ok(())
}

#[tokio::test]
async fn test_refresh_without_client_identity_fails_fast() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = CredentialStore::new(
        &base_config(dir.path().join("tokens.json")),
        reqwest::Client::new(),
    );
    store
        .set_credential(Credential {
            access_token: "at".to_string(),
            refresh_token: "rt".to_string(),
        })
        .await;

    let err = store.refresh().await.unwrap_err();
    assert_eq!(err.code, ErrorCode::AuthExpired);
    assert!(err.message.contains("client identity"));
    Ok(())
}

#[tokio::test]
async fn test_persist_writes_file_creating_parent_dirs() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let token_file = dir.path().join("nested").join("deeper").join("tokens.json");

    let store = CredentialStore::new(&base_config(token_file.clone()), reqwest::Client::new());
    let credential = Credential {
        access_token: "persisted_at".to_string(),
        refresh_token: "persisted_rt".to_string(),
    };

    let outcome = store.persist(&credential).await;
    assert!(outcome.persisted);
    assert!(outcome.warning.is_none());

    let raw = std::fs::read_to_string(&token_file)?;
    let back: Credential = serde_json::from_str(&raw)?;
    assert_eq!(back, credential);
    Ok(())
}

fn refresh_config(api_base: String, token_file: PathBuf) -> GatewayConfig {
    let mut config = base_config(token_file);
    config.api_base = api_base;
    config.identity = ClientIdentity {
        client_id: Some("test_client_id".to_string()),
        client_secret: Some("test_client_secret".to_string()),
    };
    config
}

fn rotated_token_body() -> serde_json::Value {
    serde_json::json!({
        "access_token": "rotated_at",
        "refresh_token": "rotated_rt",
        "expires_in": 28800,
        "scope": "sleep heartrate",
        "token_type": "Bearer",
        "user_id": "ABC123"
    })
}

#[tokio::test]
async fn test_refresh_succeeds_when_persistence_fails() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rotated_token_body()))
        .expect(1)
        .mount(&server)
        .await;

    // A regular file where the parent directory should be makes the file
    // sink unwritable.
    let dir = tempfile::tempdir()?;
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory")?;
    let token_file = blocker.join("tokens.json");

    let store = CredentialStore::new(
        &refresh_config(server.uri(), token_file),
        reqwest::Client::new(),
    );
    store
        .set_credential(Credential {
            access_token: "stale_at".to_string(),
            refresh_token: "stale_rt".to_string(),
        })
        .await;

    // The exchange decides success; the failed write is only a soft warning.
    let outcome = store.refresh().await?;
    assert!(!outcome.persisted);
    assert!(outcome.warning.as_deref().unwrap().contains("file"));

    assert_eq!(store.access_token().await.as_deref(), Some("rotated_at"));
    Ok(())
}

#[tokio::test]
async fn test_concurrent_refreshes_coalesce_onto_one_exchange() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rotated_token_body()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir()?;
    let store = CredentialStore::new(
        &refresh_config(server.uri(), dir.path().join("tokens.json")),
        reqwest::Client::new(),
    );
    store
        .set_credential(Credential {
            access_token: "stale_at".to_string(),
            refresh_token: "stale_rt".to_string(),
        })
        .await;

    // The loser of the race reuses the winner's token instead of running a
    // second exchange; the mock enforces the single POST.
    let (first, second) = tokio::join!(store.refresh(), store.refresh());
    assert!(first.is_ok());
    assert!(second.is_ok());

    assert_eq!(store.access_token().await.as_deref(), Some("rotated_at"));
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_config_from_env_reads_identity_and_blob() -> Result<()> {
    std::env::set_var("FITBIT_CLIENT_ID", "env_client");
    std::env::set_var("FITBIT_CLIENT_SECRET", "env_secret");
    std::env::set_var("FITBIT_TOKENS", r#"{"access_token":"a","refresh_token":"r"}"#);
    std::env::set_var("HTTP_TIMEOUT_SECS", "12");

    let config = GatewayConfig::from_env();
    assert_eq!(config.identity.client_id.as_deref(), Some("env_client"));
    assert!(config.identity.is_complete());
    assert!(config.token_env_blob.is_some());
    assert_eq!(config.timeout_secs, 12);

    std::env::remove_var("FITBIT_CLIENT_ID");
    std::env::remove_var("FITBIT_CLIENT_SECRET");
    std::env::remove_var("FITBIT_TOKENS");
    std::env::remove_var("HTTP_TIMEOUT_SECS");
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_config_from_env_invalid_timeout_falls_back() -> Result<()> {
    std::env::set_var("HTTP_TIMEOUT_SECS", "not-a-number");

    let config = GatewayConfig::from_env();
    assert_eq!(config.timeout_secs, 30);

    std::env::remove_var("HTTP_TIMEOUT_SECS");
    Ok(())
}
