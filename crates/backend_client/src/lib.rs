//! Client for the ticket/tag REST backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use shared::domain::{
    AddTagRequest, Attachment, CreateTagRequest, CreateTicketRequest, HistoryPage, Paginated, Tag,
    Ticket, TicketQuery, UpdateStatusRequest, UpdateTicketRequest,
};
use thiserror::Error;
use tracing::debug;
use url::{ParseError, Url};

pub use reqwest::StatusCode;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum BackendError {
    /// Non-success status; display reads like `backend returned 404 Not Found: ...`.
    #[error("backend returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid backend response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid backend url: {0}")]
    InvalidUrl(#[from] ParseError),
    #[error("invalid resource id '{0}'")]
    InvalidId(String),
}

impl BackendError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            Self::Decode(_) | Self::InvalidUrl(_) | Self::InvalidId(_) => None,
        }
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

#[async_trait]
pub trait TicketBackend: Send + Sync {
    async fn list_tickets(&self, query: &TicketQuery) -> BackendResult<Paginated<Ticket>>;
    async fn get_ticket(&self, id: &str) -> BackendResult<Ticket>;
    async fn create_ticket(&self, request: &CreateTicketRequest) -> BackendResult<Ticket>;
    async fn update_ticket(&self, id: &str, request: &UpdateTicketRequest)
        -> BackendResult<Ticket>;
    async fn delete_ticket(&self, id: &str) -> BackendResult<()>;
    async fn update_ticket_status(
        &self,
        id: &str,
        request: &UpdateStatusRequest,
    ) -> BackendResult<Ticket>;
    async fn add_ticket_tag(&self, id: &str, tag_id: &str) -> BackendResult<()>;
    async fn remove_ticket_tag(&self, id: &str, tag_id: &str) -> BackendResult<()>;
    async fn get_ticket_history(&self, id: &str) -> BackendResult<HistoryPage>;
    async fn list_attachments(&self, id: &str) -> BackendResult<Vec<Attachment>>;
    async fn list_tags(&self) -> BackendResult<Vec<Tag>>;
    async fn create_tag(&self, request: &CreateTagRequest) -> BackendResult<Tag>;
    async fn delete_tag(&self, id: &str) -> BackendResult<()>;
}

/// reqwest-backed [`TicketBackend`]. Proxy environment variables are
/// ignored; the backend is expected to be reachable directly.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> BackendResult<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ParseError::RelativeUrlWithCannotBeABaseBase.into());
        }
        let http = Client::builder().no_proxy().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    /// Base url plus `segments`, each percent-encoded as a single path
    /// segment so an id can never address another resource.
    fn endpoint(&self, segments: &[&str]) -> BackendResult<Url> {
        if let Some(bad) = segments
            .iter()
            .find(|segment| matches!(segment.trim(), "" | "." | ".."))
        {
            return Err(BackendError::InvalidId((*bad).to_string()));
        }
        let mut endpoint = self.base_url.clone();
        endpoint
            .path_segments_mut()
            .map_err(|()| ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        Ok(endpoint)
    }

    fn request(&self, method: Method, segments: &[&str]) -> BackendResult<RequestBuilder> {
        let url = self.endpoint(segments)?;
        debug!(method = method.as_str(), path = url.path(), "backend request");
        Ok(self.http.request(method, url))
    }

    async fn send(&self, request: RequestBuilder) -> BackendResult<Vec<u8>> {
        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            return Err(BackendError::Status {
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        Ok(bytes.to_vec())
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> BackendResult<T> {
        let bytes = self.send(request).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl TicketBackend for HttpBackend {
    async fn list_tickets(&self, query: &TicketQuery) -> BackendResult<Paginated<Ticket>> {
        let request = self.request(Method::GET, &["api", "tickets"])?;
        self.fetch(request.query(query)).await
    }

    async fn get_ticket(&self, id: &str) -> BackendResult<Ticket> {
        self.fetch(self.request(Method::GET, &["api", "tickets", id])?)
            .await
    }

    async fn create_ticket(&self, request: &CreateTicketRequest) -> BackendResult<Ticket> {
        let builder = self.request(Method::POST, &["api", "tickets"])?;
        self.fetch(builder.json(request)).await
    }

    async fn update_ticket(
        &self,
        id: &str,
        request: &UpdateTicketRequest,
    ) -> BackendResult<Ticket> {
        let builder = self.request(Method::PUT, &["api", "tickets", id])?;
        self.fetch(builder.json(request)).await
    }

    async fn delete_ticket(&self, id: &str) -> BackendResult<()> {
        self.send(self.request(Method::DELETE, &["api", "tickets", id])?)
            .await
            .map(drop)
    }

    async fn update_ticket_status(
        &self,
        id: &str,
        request: &UpdateStatusRequest,
    ) -> BackendResult<Ticket> {
        let builder = self.request(Method::PATCH, &["api", "tickets", id, "status"])?;
        self.fetch(builder.json(request)).await
    }

    async fn add_ticket_tag(&self, id: &str, tag_id: &str) -> BackendResult<()> {
        let body = AddTagRequest {
            tag_id: tag_id.to_string(),
        };
        let builder = self.request(Method::POST, &["api", "tickets", id, "tags"])?;
        self.send(builder.json(&body)).await.map(drop)
    }

    async fn remove_ticket_tag(&self, id: &str, tag_id: &str) -> BackendResult<()> {
        self.send(self.request(Method::DELETE, &["api", "tickets", id, "tags", tag_id])?)
            .await
            .map(drop)
    }

    async fn get_ticket_history(&self, id: &str) -> BackendResult<HistoryPage> {
        self.fetch(self.request(Method::GET, &["api", "tickets", id, "history"])?)
            .await
    }

    async fn list_attachments(&self, id: &str) -> BackendResult<Vec<Attachment>> {
        self.fetch(self.request(Method::GET, &["api", "tickets", id, "attachments"])?)
            .await
    }

    async fn list_tags(&self) -> BackendResult<Vec<Tag>> {
        self.fetch(self.request(Method::GET, &["api", "tags"])?)
            .await
    }

    async fn create_tag(&self, request: &CreateTagRequest) -> BackendResult<Tag> {
        let builder = self.request(Method::POST, &["api", "tags"])?;
        self.fetch(builder.json(request)).await
    }

    async fn delete_tag(&self, id: &str) -> BackendResult<()> {
        self.send(self.request(Method::DELETE, &["api", "tags", id])?)
            .await
            .map(drop)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
