use mockito::{Matcher, Server};
use nessus_client::{
    config::Config, AlertQuery, ClientError, Credentials, ExportFormat, ExportRequest,
    NessusClient, Result, ScanListQuery,
};
use serde_json::json;

fn api_key_client(server: &Server) -> Result<NessusClient> {
    NessusClient::new(&server.url(), Credentials::api_keys("ak", "sk"), true)
}

#[tokio::test]
async fn response_body_is_passed_through_unchanged() -> Result<()> {
    let mut server = Server::new_async().await;
    let body = json!({
        "scans": [{"id": 42, "name": "weekly", "status": "completed"}],
        "folders": [{"id": 3, "name": "My Scans"}],
        "timestamp": 1700000000
    });
    let mock = server
        .mock("GET", "/scans")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await;

    let client = api_key_client(&server)?;
    let result = client.scans_list(&ScanListQuery::default()).await?;

    assert_eq!(result, body);
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn non_200_becomes_typed_api_error() -> Result<()> {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/scans/7")
        .with_status(403)
        .with_body(r#"{"error":"You are not authorized to view this scan"}"#)
        .create_async()
        .await;

    let client = api_key_client(&server)?;
    let err = client.scans_details(7).await.unwrap_err();

    match err {
        ClientError::Api { status, body, .. } => {
            assert_eq!(status.as_u16(), 403);
            assert!(body.contains("not authorized"));
        }
        other => panic!("expected Api error, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn server_status_maps_503_to_sentinel() -> Result<()> {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/server/status")
        .with_status(503)
        .with_body("Service Unavailable")
        .create_async()
        .await;

    let client = api_key_client(&server)?;
    let status = client.server_status().await?;

    assert_eq!(status, json!({"status": "503 - Session Destroy required."}));
    Ok(())
}

#[tokio::test]
async fn api_key_header_is_sent_on_every_request() -> Result<()> {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/server/properties")
        .match_header("X-ApiKeys", "accessKey=ak-111; secretKey=sk-222")
        .with_status(200)
        .with_body(r#"{"nessus_type":"Nessus Professional","server_version":"10.7.0"}"#)
        .create_async()
        .await;

    let client = NessusClient::new(
        &server.url(),
        Credentials::api_keys("ak-111", "sk-222"),
        true,
    )?;
    client.server_properties().await?;

    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn session_token_is_carried_after_session_create() -> Result<()> {
    let mut server = Server::new_async().await;
    let login = server
        .mock("POST", "/session")
        .match_body(Matcher::Json(json!({
            "username": "admin",
            "password": "hunter2"
        })))
        .with_status(200)
        .with_body(r#"{"token":"abc123"}"#)
        .create_async()
        .await;
    let properties = server
        .mock("GET", "/server/properties")
        .match_header("X-Cookie", "token=abc123;")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let mut client = NessusClient::new(
        &server.url(),
        Credentials::user_password("admin", "hunter2"),
        true,
    )?;
    client.session_create().await?;
    client.server_properties().await?;

    login.assert_async().await;
    properties.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn session_create_rejects_api_key_clients() -> Result<()> {
    let server = Server::new_async().await;
    let mut client = api_key_client(&server)?;

    let err = client.session_create().await.unwrap_err();
    assert!(matches!(err, ClientError::MissingCredentials(_)));
    Ok(())
}

#[tokio::test]
async fn session_create_fails_loudly_on_bad_credentials() -> Result<()> {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/session")
        .with_status(401)
        .with_body(r#"{"error":"Invalid credentials"}"#)
        .create_async()
        .await;

    let mut client = NessusClient::new(
        &server.url(),
        Credentials::user_password("admin", "wrong"),
        true,
    )?;
    let err = client.session_create().await.unwrap_err();

    assert_eq!(err.status().map(|s| s.as_u16()), Some(401));
    Ok(())
}

#[tokio::test]
async fn session_create_rejects_token_less_response() -> Result<()> {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/session")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let mut client = NessusClient::new(
        &server.url(),
        Credentials::user_password("admin", "hunter2"),
        true,
    )?;
    let err = client.session_create().await.unwrap_err();

    assert!(matches!(err, ClientError::MalformedResponse(_)));
    Ok(())
}

// The mock only matches a bare /scans with no query string, so this also
// proves unset filters are omitted rather than sent as empty values.
#[tokio::test]
async fn scan_list_omits_unset_filters() -> Result<()> {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/scans")
        .with_status(200)
        .with_body(r#"{"scans":[]}"#)
        .create_async()
        .await;

    let client = api_key_client(&server)?;
    client.scans_list(&ScanListQuery::default()).await?;

    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn scan_list_sends_supplied_filters() -> Result<()> {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/scans")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("folder_id".into(), "3".into()),
            Matcher::UrlEncoded("last_modification_date".into(), "1700000000".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"scans":[]}"#)
        .create_async()
        .await;

    let client = api_key_client(&server)?;
    let query = ScanListQuery {
        folder_id: Some(3),
        last_modification_date: Some(1_700_000_000),
    };
    client.scans_list(&query).await?;

    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn health_alerts_send_only_supplied_window_bounds() -> Result<()> {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/settings/health/alerts")
        .match_query(Matcher::UrlEncoded("start_time".into(), "1690000000".into()))
        .with_status(200)
        .with_body(r#"{"alerts":[]}"#)
        .create_async()
        .await;

    let client = api_key_client(&server)?;
    let query = AlertQuery {
        start_time: Some(1_690_000_000),
        end_time: None,
    };
    client.server_health_alerts(&query).await?;

    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn plugin_output_carries_optional_history_id() -> Result<()> {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/scans/1/hosts/2/plugins/19506")
        .match_query(Matcher::UrlEncoded("history_id".into(), "99".into()))
        .with_status(200)
        .with_body(r#"{"outputs":[]}"#)
        .create_async()
        .await;

    let client = api_key_client(&server)?;
    client.scans_plugin_output(1, 2, 19506, Some(99)).await?;

    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn scan_configure_puts_uuid_and_settings() -> Result<()> {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PUT", "/scans/12")
        .match_body(Matcher::Json(json!({
            "uuid": "template-uuid",
            "settings": {"name": "renamed scan", "enabled": false}
        })))
        .with_status(200)
        .with_body(r#"{"name":"renamed scan"}"#)
        .create_async()
        .await;

    let client = api_key_client(&server)?;
    client
        .scans_configure(
            12,
            "template-uuid",
            json!({"name": "renamed scan", "enabled": false}),
        )
        .await?;

    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn export_request_defaults_every_section_on() -> Result<()> {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/scans/42/export")
        .match_body(Matcher::Json(json!({
            "format": "nessus",
            "reportContents": {
                "hostSections": {
                    "host_information": true,
                    "scan_information": true
                },
                "vulnerabilitySections": {
                    "description": true,
                    "see_also": true,
                    "solution": true,
                    "risk_factor": true,
                    "cvss_base_score": true,
                    "cvss_temporal_score": true,
                    "cvss3_base_score": true,
                    "cvss3_temporal_score": true,
                    "stig_severity": true,
                    "references": true,
                    "exploitable_with": true,
                    "plugin_information": true,
                    "plugin_output": true
                }
            }
        })))
        .with_status(200)
        .with_body(r#"{"file":1337,"token":"export-token"}"#)
        .create_async()
        .await;

    let client = api_key_client(&server)?;
    let response = client
        .scans_export_request(42, &ExportRequest::new(ExportFormat::Nessus))
        .await?;

    assert_eq!(response["file"], json!(1337));
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn export_download_returns_raw_bytes() -> Result<()> {
    let mut server = Server::new_async().await;
    let payload: &[u8] = b"%PDF-1.7 not actually json";
    let _mock = server
        .mock("GET", "/scans/42/export/1337/download")
        .with_status(200)
        .with_header("content-type", "application/octet-stream")
        .with_body(payload)
        .create_async()
        .await;

    let client = api_key_client(&server)?;
    let bytes = client.scans_export_download(42, 1337).await?;

    assert_eq!(bytes, payload);
    Ok(())
}

#[tokio::test]
async fn attachment_download_returns_bytes_without_sending_key() -> Result<()> {
    let mut server = Server::new_async().await;
    // Matches only the bare path: the access token must not end up in the
    // query string (current upstream behavior).
    let mock = server
        .mock("GET", "/scans/5/attachments/9")
        .with_status(200)
        .with_body("attachment bytes")
        .create_async()
        .await;

    let client = api_key_client(&server)?;
    let bytes = client.scans_attachment(5, 9, "some-access-token").await?;

    assert_eq!(bytes, b"attachment bytes");
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn export_status_polls_without_state() -> Result<()> {
    let mut server = Server::new_async().await;
    let _loading = server
        .mock("GET", "/scans/42/export/1337/status")
        .with_status(200)
        .with_body(r#"{"status":"loading"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = api_key_client(&server)?;
    let status = client.scans_export_status(42, 1337).await?;
    assert_eq!(status["status"], json!("loading"));
    Ok(())
}

#[test]
fn config_save_and_load_round_trip() -> Result<()> {
    use tempfile::Builder;

    let mut config = Config::default();
    config.server.url = "https://scanner.internal:8834".to_string();
    config.server.verify_tls = false;
    config.auth.access_key = Some("ak".to_string());
    config.auth.secret_key = Some("sk".to_string());

    let temp_file = Builder::new().suffix(".toml").tempfile().unwrap();
    let temp_path = temp_file.path().to_str().unwrap();

    config.save_to_file(temp_path)?;
    let loaded = Config::load_from_file(temp_path)?;

    assert_eq!(loaded.server.url, config.server.url);
    assert_eq!(loaded.server.verify_tls, config.server.verify_tls);
    assert_eq!(loaded.auth.access_key, config.auth.access_key);
    Ok(())
}
