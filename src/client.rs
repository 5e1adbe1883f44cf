//! HTTP client for the hub's announcement service.
//!
//! Configuration comes from [`BoardConfig`](crate::config::BoardConfig):
//! - base URL of the hub (the service lives under `/services/announcement`)
//! - optional API token, sent as `Authorization: token <value>`
//!
//! Redirects are never followed. A login redirect therefore surfaces as a
//! non-success status instead of an HTML login page.

use announcements_core::{Announcement, ExtraMode, LatestAnnouncement};
use async_trait::async_trait;
use reqwest::{redirect, Client, StatusCode};
use thiserror::Error;

/// Path of the service below the hub's base URL.
pub const SERVICE_PREFIX: &str = "/services/announcement";

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse response ({status}): {source}")]
    Parse {
        status: StatusCode,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unauthorized: API token required or invalid")]
    Unauthorized,

    #[error("Server error: {0}")]
    Server(String),
}

/// Anything the board can poll for announcements.
#[async_trait]
pub trait AnnouncementSource: Send + Sync + 'static {
    async fn fetch_announcements(&self) -> Result<Vec<Announcement>, ClientError>;
}

/// HTTP client for the announcement service.
#[derive(Debug, Clone)]
pub struct AnnouncementClient {
    base_url: String,
    api_token: Option<String>,
    limit: Option<u32>,
    client: Client,
}

impl AnnouncementClient {
    /// Create with explicit configuration.
    pub fn new(
        base_url: impl Into<String>,
        api_token: Option<String>,
    ) -> Result<Self, ClientError> {
        let client = Client::builder().redirect(redirect::Policy::none()).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token,
            limit: None,
            client,
        })
    }

    /// Ask the service for at most `limit` records per list call.
    pub fn with_limit(mut self, limit: Option<u32>) -> Self {
        self.limit = limit;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a GET request with the optional auth header.
    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}{}", self.base_url, SERVICE_PREFIX, path);
        let mut req = self.client.get(&url);
        if let Some(ref token) = self.api_token {
            req = req.header(reqwest::header::AUTHORIZATION, format!("token {}", token));
        }
        req
    }

    /// Fetch the announcement list.
    ///
    /// A non-success status is logged but the body is still parsed as the
    /// list, so an error page fails here as a parse error rather than a
    /// status error.
    pub async fn list(&self) -> Result<Vec<Announcement>, ClientError> {
        let mut req = self.get("/list");
        if let Some(limit) = self.limit {
            req = req.query(&[("limit", limit)]);
        }
        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("Error fetching announcements: {}", status);
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|source| ClientError::Parse { status, source })
    }

    /// Fetch the most recent announcement.
    pub async fn latest(
        &self,
        extra: Option<ExtraMode>,
    ) -> Result<LatestAnnouncement, ClientError> {
        let mut req = self.get("/latest");
        if let Some(mode) = extra {
            req = req.query(&[("extra", mode.as_str())]);
        }
        let response = req.send().await?;

        let status = response.status();
        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body).map_err(|source| ClientError::Parse { status, source })
        } else {
            let body = response.text().await.unwrap_or_default();
            match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ClientError::Unauthorized),
                _ => Err(ClientError::Server(format!("{}: {}", status, body))),
            }
        }
    }
}

#[async_trait]
impl AnnouncementSource for AnnouncementClient {
    async fn fetch_announcements(&self) -> Result<Vec<Announcement>, ClientError> {
        self.list().await
    }
}
