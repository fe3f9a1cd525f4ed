use std::error::Error;
use std::fmt;

use futures::StreamExt;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{QueryError, QueryExecutor, QueryFuture};
use crate::progress::{self, ProgressSink, ProgressUpdate};
use crate::query::QueryResult;

/// Response header carrying the numeric exception code on failed queries.
pub const EXCEPTION_CODE_HEADER: &str = "x-clickhouse-exception-code";

const OUTPUT_FORMAT: &str = "JSON";
/// Data is read-only; settings may still be changed per query.
const READONLY_MODE: &str = "2";

/// Connection settings for the ClickHouse HTTP interface.
#[derive(Clone)]
pub struct ClickHouseConfig {
    pub url: String,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ClickHouseConfig {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            database: "default".to_string(),
            username: None,
            password: None,
        }
    }

    #[must_use]
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: Option<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = password;
        self
    }
}

impl fmt::Debug for ClickHouseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClickHouseConfig")
            .field("url", &self.url)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug)]
pub enum ClientError {
    InvalidUrl { url: String, reason: String },
    Build(reqwest::Error),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUrl { url, reason } => write!(f, "invalid database url {url}: {reason}"),
            Self::Build(err) => write!(f, "failed to build HTTP client: {err}"),
        }
    }
}

impl Error for ClientError {}

/// Executes statements over the ClickHouse HTTP interface.
#[derive(Debug, Clone)]
pub struct ClickHouseClient {
    http: Client,
    endpoint: Url,
    config: ClickHouseConfig,
}

impl ClickHouseClient {
    /// Builds a client for the configured endpoint.
    ///
    /// # Errors
    /// Returns `ClientError` if the URL is not an http(s) URL or the HTTP
    /// client cannot be constructed.
    pub fn new(config: ClickHouseConfig) -> Result<Self, ClientError> {
        let endpoint = parse_endpoint(&config.url)?;
        let http = Client::builder()
            .user_agent(concat!("tokenapi-mcp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Build)?;
        Ok(Self {
            http,
            endpoint,
            config,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &ClickHouseConfig {
        &self.config
    }

    async fn run(
        &self,
        sql: &str,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<QueryResult, QueryError> {
        let query_id = Uuid::new_v4().to_string();
        debug!(%query_id, sql, "executing query");

        let mut request = self
            .http
            .post(self.endpoint.clone())
            .query(&[
                ("database", self.config.database.as_str()),
                ("default_format", OUTPUT_FORMAT),
                ("readonly", READONLY_MODE),
                ("query_id", query_id.as_str()),
            ])
            .body(sql.to_owned());
        if let Some(username) = self.config.username.as_deref() {
            request = request.basic_auth(username, self.config.password.as_deref());
        }

        let result = receive(request, progress).await;
        match &result {
            Ok(result) => debug!(%query_id, rows = result.rows, "query completed"),
            Err(err) => warn!(%query_id, error = %err, "query failed"),
        }
        result
    }
}

impl QueryExecutor for ClickHouseClient {
    fn execute<'a>(
        &'a self,
        sql: &'a str,
        progress: Option<&'a dyn ProgressSink>,
    ) -> QueryFuture<'a> {
        Box::pin(self.run(sql, progress))
    }
}

async fn receive(
    request: reqwest::RequestBuilder,
    progress: Option<&dyn ProgressSink>,
) -> Result<QueryResult, QueryError> {
    let response = request.send().await?;
    let status = response.status();

    if !status.is_success() {
        let code = response
            .headers()
            .get(EXCEPTION_CODE_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;
        let message = body.trim().to_string();
        return Err(QueryError::Database {
            status: status.as_u16(),
            code: code.or_else(|| exception_code(&message)),
            message,
        });
    }

    let total = response.content_length();
    let mut body = Vec::new();
    let mut chunks = response.bytes_stream();
    while let Some(chunk) = chunks.next().await {
        body.extend_from_slice(&chunk?);
        progress::report(progress, ProgressUpdate::bytes(body.len() as u64, total)).await;
    }

    decode_body(status.as_u16(), &body)
}

fn parse_endpoint(url: &str) -> Result<Url, ClientError> {
    let endpoint = Url::parse(url).map_err(|err| ClientError::InvalidUrl {
        url: url.to_string(),
        reason: err.to_string(),
    })?;
    match endpoint.scheme() {
        "http" | "https" => Ok(endpoint),
        scheme => Err(ClientError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme {scheme}"),
        }),
    }
}

/// `JSON` format body. ClickHouse adds `exception` when a query fails after
/// rows were already written with a 200 status.
#[derive(Deserialize)]
struct JsonBody {
    #[serde(flatten)]
    result: QueryResult,
    #[serde(default)]
    exception: Option<String>,
}

/// Decodes a `JSON` format body, surfacing exceptions raised mid-stream.
fn decode_body(status: u16, body: &[u8]) -> Result<QueryResult, QueryError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(QueryResult::default());
    }
    let decoded: JsonBody = serde_json::from_slice(body).map_err(|err| {
        let text = String::from_utf8_lossy(body);
        match text.find("DB::Exception") {
            Some(index) => {
                let start = text[..index].rfind("Code:").unwrap_or(index);
                database_error(status, &text[start..])
            }
            None => QueryError::Decode(err),
        }
    })?;
    match decoded.exception {
        Some(exception) => Err(database_error(status, &exception)),
        None => Ok(decoded.result),
    }
}

fn database_error(status: u16, message: &str) -> QueryError {
    let message = message.trim().to_string();
    QueryError::Database {
        status,
        code: exception_code(&message),
        message,
    }
}

/// Extracts `241` from `Code: 241. DB::Exception: ...`.
fn exception_code(message: &str) -> Option<String> {
    let rest = message.strip_prefix("Code: ")?;
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() { None } else { Some(digits) }
}
