// API client module: a small async HTTP client for the ViewEngine MCP
// endpoints. One `reqwest::Client` is built per run and reused for every
// call; the API key travels as a default `X-API-Key` header.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ConfigError};
use crate::poll::StatusSource;

pub const DEFAULT_BASE_URL: &str = "https://www.viewengine.io";

/// Server-side timeout sent with every retrieval request.
pub const DEFAULT_JOB_TIMEOUT_SECS: u32 = 60;

// Sent on the wire as `X-API-Key`; header names are case-insensitive.
const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");

/// Connection settings for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// A remote operation advertised by the tools listing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Tool {
    pub name: String,
    pub description: String,
}

#[derive(Deserialize, Debug)]
struct ToolsResponse {
    #[serde(default)]
    tools: Vec<Tool>,
}

/// Processing profile for a retrieval job.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Private,
    Community,
}

impl Mode {
    /// Interpret free-form user input. Only "community" (any case) selects
    /// the community profile; anything else falls back to private.
    pub fn from_input(input: &str) -> Self {
        if input.trim().eq_ignore_ascii_case("community") {
            Mode::Community
        } else {
            Mode::Private
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Private => "private",
            Mode::Community => "community",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /v1/mcp/retrieve`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalRequest {
    pub url: String,
    pub timeout_seconds: u32,
    pub force_refresh: bool,
    pub mode: Mode,
}

impl RetrievalRequest {
    pub fn new(url: impl Into<String>, force_refresh: bool, mode: Mode) -> Self {
        Self {
            url: url.into(),
            timeout_seconds: DEFAULT_JOB_TIMEOUT_SECS,
            force_refresh,
            mode,
        }
    }
}

/// Answer to a submission. `request_id` is the only handle for polling.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalSubmission {
    pub request_id: Uuid,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, alias = "estimatedWaitSeconds")]
    pub estimated_wait_time_seconds: i64,
}

/// Lifecycle state of a retrieval job as reported by the server.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Pending,
    Processing,
    Complete,
    Failed,
    Canceled,
    /// A status this client does not know; treated as still running.
    Other(String),
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Complete => "complete",
            JobStatus::Failed => "failed",
            JobStatus::Canceled => "canceled",
            JobStatus::Other(raw) => raw,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Complete | JobStatus::Failed | JobStatus::Canceled
        )
    }

    pub fn is_success(&self) -> bool {
        matches!(self, JobStatus::Complete)
    }
}

impl From<String> for JobStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "pending" => JobStatus::Pending,
            "processing" => JobStatus::Processing,
            "complete" => JobStatus::Complete,
            "failed" => JobStatus::Failed,
            "canceled" => JobStatus::Canceled,
            _ => JobStatus::Other(raw),
        }
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Location and metadata of the retrieved content. Only present once the
/// job is complete.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContentInfo {
    pub page_data_url: String,
    #[serde(default)]
    pub content_hash: Option<String>,
    #[serde(default)]
    pub artifacts: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub metrics: Option<BTreeMap<String, serde_json::Value>>,
}

/// Snapshot of a job returned by `GET /v1/mcp/retrieve/{id}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalStatus {
    pub request_id: Uuid,
    #[serde(default)]
    pub url: String,
    pub status: JobStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub content: Option<ContentInfo>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "timestamp::option")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Holds the shared HTTP client and the base URL of the service.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client that sends `api_key` with every request.
    pub fn new(api_key: &str, config: &ClientConfig) -> Result<Self, ConfigError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        let mut key = HeaderValue::from_str(api_key).map_err(|_| ConfigError::InvalidApiKey)?;
        key.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, key);

        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| ConfigError::Client(err.to_string()))?;

        Ok(ApiClient {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /v1/mcp/tools`, in server order.
    pub async fn list_tools(&self) -> Result<Vec<Tool>, ApiError> {
        let url = format!("{}/v1/mcp/tools", self.base_url);
        let resp: ToolsResponse = self.get_json(&url).await?;
        Ok(resp.tools)
    }

    /// `POST /v1/mcp/retrieve`. A non-success status comes back as
    /// [`ApiError::Status`] carrying the response body.
    pub async fn submit(&self, req: &RetrievalRequest) -> Result<RetrievalSubmission, ApiError> {
        let url = format!("{}/v1/mcp/retrieve", self.base_url);
        debug!("POST {url} (url={}, mode={})", req.url, req.mode);
        let res = self.client.post(&url).json(req).send().await?;
        read_json(res).await
    }

    /// `GET /v1/mcp/retrieve/{request_id}`.
    pub async fn status(&self, request_id: Uuid) -> Result<RetrievalStatus, ApiError> {
        let url = format!("{}/v1/mcp/retrieve/{}", self.base_url, request_id);
        self.get_json(&url).await
    }

    /// Fetch the page data behind a completed job. `page_data_url` is the
    /// absolute URL the server handed out in [`ContentInfo`].
    pub async fn download(&self, page_data_url: &str) -> Result<serde_json::Value, ApiError> {
        self.get_json(page_data_url).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        debug!("GET {url}");
        let res = self.client.get(url).send().await?;
        read_json(res).await
    }
}

#[async_trait]
impl StatusSource for ApiClient {
    async fn fetch_status(&self, request_id: Uuid) -> Result<RetrievalStatus, ApiError> {
        self.status(request_id).await
    }
}

/// Turn a response into `T`, keeping the body text when the status is not
/// a success so callers can show it verbatim.
async fn read_json<T: DeserializeOwned>(res: reqwest::Response) -> Result<T, ApiError> {
    let status = res.status();
    let body = res.text().await?;
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(serde_json::from_str(&body)?)
}

/// Timestamps arrive either as RFC 3339 or as a bare ISO-8601 date-time
/// without an offset, which is taken to be UTC.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Ok(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|err| format!("invalid timestamp {raw:?}: {err}"))
    }

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            dt: &Option<DateTime<Utc>>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match dt {
                Some(dt) => s.serialize_some(&dt.to_rfc3339()),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(d)? {
                Some(raw) => super::parse(&raw)
                    .map(Some)
                    .map_err(serde::de::Error::custom),
                None => Ok(None),
            }
        }
    }
}
