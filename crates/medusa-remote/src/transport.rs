//! HTTP client for the head's JSON API.
//!
//! Owns no state beyond the connection pool. Nothing here retries: a failed
//! call is reported once and the caller decides what a failure means.

use std::time::Duration;

use medusa_proto::config::Config;
use medusa_proto::protocol::{
    MediaMetadata, MediaRecord, MetadataError, SearchHit, SearchResponse, SnakeList,
    TransportStatus,
};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::dispatch::Command;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("head answered {0}")]
    Status(StatusCode),
    #[error("undecodable answer: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("unusable media record: {0}")]
    Metadata(#[from] MetadataError),
    #[error("invalid base url {0:?}")]
    BaseUrl(String),
}

/// What the head said about a command. Only the HTTP status decides success;
/// the body is informational.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ack {
    Ok,
    Failed,
    Unrecognized(String),
}

impl Ack {
    fn from_body(body: &str) -> Self {
        match body.trim() {
            "0" => Ack::Ok,
            "1" => Ack::Failed,
            other => Ack::Unrecognized(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MedusaClient {
    http: reqwest::Client,
    /// Base URL including the API prefix, e.g. `http://head:5000/medusa/api`.
    api: Url,
}

impl MedusaClient {
    pub fn new(base_url: &str, api_base: &str) -> Result<Self, TransportError> {
        Self::with_timeout(base_url, api_base, None)
    }

    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        Self::with_timeout(
            &config.server.base_url,
            &config.server.api_base,
            config.http.request_timeout_secs.map(Duration::from_secs),
        )
    }

    pub fn with_timeout(
        base_url: &str,
        api_base: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, TransportError> {
        let joined = format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            api_base.trim_matches('/')
        );
        let api = Url::parse(&joined).map_err(|_| TransportError::BaseUrl(joined.clone()))?;
        if api.cannot_be_a_base() {
            return Err(TransportError::BaseUrl(joined));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            api,
        })
    }

    /// `{api}/{segments...}` with each segment percent-encoded.
    fn endpoint<I, S>(&self, segments: I) -> Url
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut url = self.api.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            for seg in segments {
                path.push(seg.as_ref());
            }
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, TransportError> {
        trace!("GET {}", url);
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(TransportError::Status(response.status()));
        }
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn get_ack(&self, url: Url) -> Result<Ack, TransportError> {
        debug!("GET {}", url);
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(TransportError::Status(response.status()));
        }
        let body = response.text().await?;
        Ok(Ack::from_body(&body))
    }

    /// `GET /status/{session}`.
    pub async fn fetch_status(&self, session: &str) -> Result<TransportStatus, TransportError> {
        self.get_json(self.endpoint(["status", session])).await
    }

    /// `GET /media/{id}`.
    pub async fn fetch_metadata(&self, media_id: u64) -> Result<MediaMetadata, TransportError> {
        let record: MediaRecord = self
            .get_json(self.endpoint(["media".to_string(), media_id.to_string()]))
            .await?;
        Ok(MediaMetadata::try_from(record)?)
    }

    /// `GET /snake/{session}/{action}[/{value}]`.
    pub async fn send_command(
        &self,
        session: &str,
        command: &Command,
    ) -> Result<Ack, TransportError> {
        let mut segments = vec![
            "snake".to_string(),
            session.to_string(),
            command.action().to_string(),
        ];
        if let Some(value) = command.value() {
            segments.push(value);
        }
        self.get_ack(self.endpoint(segments)).await
    }

    /// `GET /snakes` or, with `queue`, only the snakes that have media loaded.
    pub async fn list_snakes(&self, queue: bool) -> Result<Vec<String>, TransportError> {
        let url = if queue {
            self.endpoint(["snakes", "queue"])
        } else {
            self.endpoint(["snakes"])
        };
        let list: SnakeList = self.get_json(url).await?;
        Ok(list.snakes)
    }

    /// `POST /search` with form field `term`.
    pub async fn search(&self, term: &str) -> Result<Vec<SearchHit>, TransportError> {
        let url = self.endpoint(["search"]);
        trace!("POST {} term={:?}", url, term);
        let response = self.http.post(url).form(&[("term", term)]).send().await?;
        if !response.status().is_success() {
            return Err(TransportError::Status(response.status()));
        }
        let bytes = response.bytes().await?;
        let parsed: SearchResponse = serde_json::from_slice(&bytes)?;
        Ok(parsed.into_hits())
    }

    /// `GET /index`: ask the head to rescan its media folders.
    pub async fn refresh_index(&self) -> Result<Ack, TransportError> {
        self.get_ack(self.endpoint(["index"])).await
    }
}
