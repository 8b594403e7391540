use std::fmt::{Debug, Formatter};

use reqwest::{header::CONTENT_TYPE, Client, StatusCode, Url};
use thiserror::Error;
use tracing::{debug, trace};

use super::wire::{self, NamedropRequest, NamedropResponse, TtlMode};
use super::{Record, RecordAppender, RecordDeleter, RecordGetter, RecordSetter};

pub const DEFAULT_SERVER_URI: &str = "https://takingnames.io/namedrop";

const GET_RECORDS: &str = "/get-records";
const CREATE_RECORDS: &str = "/create-records";
const SET_RECORDS: &str = "/set-records";
const DELETE_RECORDS: &str = "/delete-records";

/// DNS record management through a NameDrop server.
#[derive(Clone)]
pub struct NamedropProvider {
    server_uri: String,
    token: String,

    client: Client,

    ttl_mode: TtlMode,
}

impl NamedropProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            server_uri: DEFAULT_SERVER_URI.to_owned(),
            token: token.into(),
            client: Client::new(),
            ttl_mode: TtlMode::default(),
        }
    }

    /// Sets the server base URI. An empty URI selects [`DEFAULT_SERVER_URI`].
    pub fn with_server_uri(mut self, uri: &str) -> Result<Self, NamedropError> {
        if uri.is_empty() {
            self.server_uri = DEFAULT_SERVER_URI.to_owned();
            return Ok(self);
        }

        let url = Url::parse(uri)?;
        if url.cannot_be_a_base() {
            return Err(NamedropError::BadBaseUrl);
        }

        self.server_uri = uri.strip_suffix('/').unwrap_or(uri).to_owned();
        Ok(self)
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_ttl_mode(mut self, ttl_mode: TtlMode) -> Self {
        self.ttl_mode = ttl_mode;
        self
    }

    pub fn server_uri(&self) -> &str { &self.server_uri }
    pub fn ttl_mode(&self) -> TtlMode { self.ttl_mode }

    async fn mutate_records(&self, zone: &str, endpoint: &str, records: &[Record]) -> Result<Vec<Record>, NamedropError> {
        let request = NamedropRequest::new(wire::zone_to_domain(zone), &self.token)
            .with_records(wire::to_wire(records, self.ttl_mode));

        let response = self.request(endpoint, &request).await?;
        Ok(wire::to_generic(&response.records.unwrap_or_default()))
    }

    async fn request(&self, endpoint: &str, request: &NamedropRequest<'_>) -> Result<NamedropResponse, NamedropError> {
        let uri = format!("{}{}", self.server_uri, endpoint);

        if tracing::enabled!(tracing::Level::TRACE) {
            if let Ok(body) = serde_json::to_string_pretty(&request.redacted()) {
                trace!(%uri, "request envelope:\n{}", body);
            }
        }

        let body = serde_json::to_vec(request).map_err(NamedropError::Encode)?;

        let response = self.client.post(&uri)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status != StatusCode::OK {
            return Err(NamedropError::BadStatus {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let response: NamedropResponse = serde_json::from_slice(&body).map_err(NamedropError::Decode)?;
        debug!(
            %uri,
            status = status.as_u16(),
            "got {} records from NameDrop",
            response.records.as_ref().map_or(0, Vec::len),
        );

        Ok(response)
    }
}

impl Debug for NamedropProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamedropProvider")
            .field("server_uri", &self.server_uri)
            .field("token", &"<redacted>")
            .field("ttl_mode", &self.ttl_mode)
            .finish_non_exhaustive()
    }
}

impl<'a> NamedropRequest<'a> {
    fn redacted(&self) -> NamedropRequest<'a> {
        NamedropRequest {
            token: self.token.map(|_| "<redacted>"),
            ..self.clone()
        }
    }
}

#[async_trait::async_trait]
impl RecordGetter for NamedropProvider {
    type Error = NamedropError;

    #[tracing::instrument(skip(self))]
    async fn get_records(&self, zone: &str) -> Result<Vec<Record>, Self::Error> {
        let request = NamedropRequest::new(wire::zone_to_domain(zone), &self.token);

        let response = self.request(GET_RECORDS, &request).await?;
        Ok(wire::to_generic(&response.records.unwrap_or_default()))
    }
}

#[async_trait::async_trait]
impl RecordAppender for NamedropProvider {
    type Error = NamedropError;

    #[tracing::instrument(skip(self, records), fields(count = records.len()))]
    async fn append_records(&self, zone: &str, records: &[Record]) -> Result<Vec<Record>, Self::Error> {
        self.mutate_records(zone, CREATE_RECORDS, records).await
    }
}

#[async_trait::async_trait]
impl RecordSetter for NamedropProvider {
    type Error = NamedropError;

    #[tracing::instrument(skip(self, records), fields(count = records.len()))]
    async fn set_records(&self, zone: &str, records: &[Record]) -> Result<Vec<Record>, Self::Error> {
        self.mutate_records(zone, SET_RECORDS, records).await
    }
}

#[async_trait::async_trait]
impl RecordDeleter for NamedropProvider {
    type Error = NamedropError;

    #[tracing::instrument(skip(self, records), fields(count = records.len()))]
    async fn delete_records(&self, zone: &str, records: &[Record]) -> Result<Vec<Record>, Self::Error> {
        self.mutate_records(zone, DELETE_RECORDS, records).await
    }
}

#[derive(Debug, Error)]
pub enum NamedropError {
    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),
    #[error("bad status code {status}: {body}")]
    BadStatus { status: u16, body: String },
    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("bad base url")]
    BadBaseUrl,
    #[error(transparent)]
    UrlParseError(#[from] url::ParseError),
}
