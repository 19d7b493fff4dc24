//! The REST client itself: one method per remote resource.
//!
//! Every method builds a URL and optional payload, issues a single request,
//! and returns the parsed JSON body (or raw bytes for downloads). There is no
//! retry, pagination, or caching; a failed call is terminal for that call and
//! surfaces as [`ClientError::Api`] carrying the status, headers, and body.

use crate::auth::{cookie_header, Credentials};
use crate::export::ExportRequest;
use crate::{ClientError, Result};
use log::{debug, warn};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

const API_KEYS_HEADER: &str = "X-ApiKeys";
const COOKIE_HEADER: &str = "X-Cookie";

/// Optional filters for `GET /scans`. Unset fields are omitted from the
/// query string entirely rather than sent as empty values.
#[derive(Debug, Clone, Default)]
pub struct ScanListQuery {
    /// Only list scans inside this folder.
    pub folder_id: Option<i64>,
    /// Only list scans modified since this unixtime.
    pub last_modification_date: Option<i64>,
}

/// Optional time window for `GET /settings/health/alerts`. The server
/// defaults to the last 24 hours when the window is left unset.
#[derive(Debug, Clone, Default)]
pub struct AlertQuery {
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
}

/// Client for a single Nessus server.
///
/// Holds the base URL, the credentials chosen at construction, and the
/// session-token state. The auth header is attached to every outbound
/// request by the shared request builder; individual methods never set it.
pub struct NessusClient {
    base_url: Url,
    http: Client,
    credentials: Credentials,
    token: Option<String>,
}

impl NessusClient {
    /// Build a client for `server` (scheme://host:port, e.g.
    /// `https://scanner:8834`). No network I/O happens here; with API-key
    /// credentials the static auth header is ready immediately, while the
    /// session flow needs an explicit [`session_create`](Self::session_create).
    pub fn new(server: &str, credentials: Credentials, verify_tls: bool) -> Result<Self> {
        Self::builder_with(server, credentials, verify_tls, None)
    }

    /// Like [`new`](Self::new) but with a per-request timeout instead of the
    /// HTTP library default of no timeout.
    pub fn with_timeout(
        server: &str,
        credentials: Credentials,
        verify_tls: bool,
        timeout: Duration,
    ) -> Result<Self> {
        Self::builder_with(server, credentials, verify_tls, Some(timeout))
    }

    fn builder_with(
        server: &str,
        credentials: Credentials,
        verify_tls: bool,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let base_url = Url::parse(server)?;

        let mut builder = Client::builder().danger_accept_invalid_certs(!verify_tls);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            base_url,
            http,
            credentials,
            token: None,
        })
    }

    /// Exchange the stored username/password for a session token.
    ///
    /// On success the token is carried as an `X-Cookie` header on all
    /// subsequent requests. Fails for API-key clients, on any non-200
    /// response, and on a response body without a `token` field.
    pub async fn session_create(&mut self) -> Result<()> {
        let payload = match &self.credentials {
            Credentials::UserPassword { username, password } => json!({
                "username": username,
                "password": password,
            }),
            Credentials::ApiKeys { .. } => {
                return Err(ClientError::MissingCredentials(
                    "session creation requires username/password credentials".to_string(),
                ))
            }
        };

        let response = self
            .request(Method::POST, "/session")?
            .json(&payload)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(api_error(response).await);
        }

        let body: Value = serde_json::from_str(&response.text().await?)?;
        let token = body
            .get("token")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ClientError::MalformedResponse("session response has no token field".to_string())
            })?;

        debug!("session established");
        self.token = Some(token.to_string());
        Ok(())
    }

    /// Retrieve server version and other properties.
    pub async fn server_properties(&self) -> Result<Value> {
        let response = self.request(Method::GET, "/server/properties")?.send().await?;
        expect_json(response).await
    }

    /// Retrieve server status (loading, ready, corrupt-db, feed-expired,
    /// eval-expired, locked, register, register-locked, download-failed,
    /// feed-error).
    ///
    /// A 503 is not treated as a failure: the server answers 503 while a
    /// stale session must be destroyed, and that state is reported as the
    /// sentinel value `{"status": "503 - Session Destroy required."}`.
    pub async fn server_status(&self) -> Result<Value> {
        let response = self.request(Method::GET, "/server/status")?.send().await?;

        if response.status() == StatusCode::SERVICE_UNAVAILABLE {
            return Ok(json!({
                "status": "503 - Session Destroy required."
            }));
        }
        expect_json(response).await
    }

    /// List alerts the scanner raised about its own health, optionally
    /// limited to a unixtime window.
    pub async fn server_health_alerts(&self, query: &AlertQuery) -> Result<Value> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(end_time) = query.end_time {
            params.push(("end_time", end_time.to_string()));
        }
        if let Some(start_time) = query.start_time {
            params.push(("start_time", start_time.to_string()));
        }

        let mut request = self.request(Method::GET, "/settings/health/alerts")?;
        if !params.is_empty() {
            request = request.query(&params);
        }
        expect_json(request.send().await?).await
    }

    /// Retrieve the scan list, optionally filtered.
    pub async fn scans_list(&self, query: &ScanListQuery) -> Result<Value> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(folder_id) = query.folder_id {
            params.push(("folder_id", folder_id.to_string()));
        }
        if let Some(last_modification_date) = query.last_modification_date {
            params.push(("last_modification_date", last_modification_date.to_string()));
        }

        let mut request = self.request(Method::GET, "/scans")?;
        if !params.is_empty() {
            request = request.query(&params);
        }
        expect_json(request.send().await?).await
    }

    /// Retrieve details for a given scan.
    pub async fn scans_details(&self, scan_id: i64) -> Result<Value> {
        let response = self
            .request(Method::GET, &format!("/scans/{}", scan_id))?
            .send()
            .await?;
        expect_json(response).await
    }

    /// Remotely configure schedule and/or policy parameters of a scan.
    /// `uuid` names the editor template; `settings` is passed through to the
    /// server unmodified.
    pub async fn scans_configure(&self, scan_id: i64, uuid: &str, settings: Value) -> Result<Value> {
        let payload = json!({
            "uuid": uuid,
            "settings": settings,
        });

        let response = self
            .request(Method::PUT, &format!("/scans/{}", scan_id))?
            .json(&payload)
            .send()
            .await?;
        expect_json(response).await
    }

    /// Retrieve details for one host of a scan.
    pub async fn scans_host_details(&self, scan_id: i64, host_id: i64) -> Result<Value> {
        let response = self
            .request(Method::GET, &format!("/scans/{}/hosts/{}", scan_id, host_id))?
            .send()
            .await?;
        expect_json(response).await
    }

    /// Retrieve the output of one plugin (detection check) against one host,
    /// optionally from a historical scan run.
    pub async fn scans_plugin_output(
        &self,
        scan_id: i64,
        host_id: i64,
        plugin_id: i64,
        history_id: Option<i64>,
    ) -> Result<Value> {
        let mut request = self.request(
            Method::GET,
            &format!("/scans/{}/hosts/{}/plugins/{}", scan_id, host_id, plugin_id),
        )?;
        if let Some(history_id) = history_id {
            request = request.query(&[("history_id", history_id.to_string())]);
        }
        expect_json(request.send().await?).await
    }

    /// Retrieve a scan attachment as raw bytes.
    ///
    /// `key` is the attachment access token from the scan output. It is
    /// accepted here but not transmitted, matching observed server behavior
    /// where the session auth alone grants access.
    /// TODO: confirm against the vendor API docs whether the token belongs
    /// in the query string.
    pub async fn scans_attachment(
        &self,
        scan_id: i64,
        attachment_id: i64,
        key: &str,
    ) -> Result<Vec<u8>> {
        let _ = key;
        let response = self
            .request(
                Method::GET,
                &format!("/scans/{}/attachments/{}", scan_id, attachment_id),
            )?
            .send()
            .await?;
        expect_bytes(response).await
    }

    /// Retrieve the export formats and report options available for a scan.
    pub async fn scans_export_formats(&self, scan_id: i64) -> Result<Value> {
        let response = self
            .request(Method::GET, &format!("/scans/{}/export/formats", scan_id))?
            .send()
            .await?;
        expect_json(response).await
    }

    /// Request a report export for a scan. The response carries the file id
    /// to poll with [`scans_export_status`](Self::scans_export_status) and
    /// download with [`scans_export_download`](Self::scans_export_download);
    /// sequencing those calls is the caller's job.
    pub async fn scans_export_request(
        &self,
        scan_id: i64,
        export: &ExportRequest,
    ) -> Result<Value> {
        let response = self
            .request(Method::POST, &format!("/scans/{}/export", scan_id))?
            .json(export)
            .send()
            .await?;
        expect_json(response).await
    }

    /// Check the file status of a requested export.
    pub async fn scans_export_status(&self, scan_id: i64, file_id: i64) -> Result<Value> {
        let response = self
            .request(
                Method::GET,
                &format!("/scans/{}/export/{}/status", scan_id, file_id),
            )?
            .send()
            .await?;
        expect_json(response).await
    }

    /// Download a finished export as raw bytes.
    pub async fn scans_export_download(&self, scan_id: i64, file_id: i64) -> Result<Vec<u8>> {
        let response = self
            .request(
                Method::GET,
                &format!("/scans/{}/export/{}/download", scan_id, file_id),
            )?
            .send()
            .await?;
        expect_bytes(response).await
    }

    /// Build a request against `path` with the active auth header attached.
    /// All methods funnel through here so auth is never set per-call.
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.base_url.join(path)?;
        debug!("{} {}", method, url);

        let mut request = self.http.request(method, url);
        if let Some(header) = self.credentials.api_key_header() {
            request = request.header(API_KEYS_HEADER, header);
        } else if let Some(token) = &self.token {
            request = request.header(COOKIE_HEADER, cookie_header(token));
        }
        Ok(request)
    }
}

async fn expect_json(response: Response) -> Result<Value> {
    if response.status() == StatusCode::OK {
        // An unparseable body on a JSON endpoint is an error, not a silent
        // null, so success stays unambiguous.
        Ok(serde_json::from_str(&response.text().await?)?)
    } else {
        Err(api_error(response).await)
    }
}

async fn expect_bytes(response: Response) -> Result<Vec<u8>> {
    if response.status() == StatusCode::OK {
        Ok(response.bytes().await?.to_vec())
    } else {
        Err(api_error(response).await)
    }
}

async fn api_error(response: Response) -> ClientError {
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.text().await.unwrap_or_default();
    warn!("API request failed: {} {}", status, body);
    ClientError::Api {
        status,
        headers,
        body,
    }
}
