//! In-memory [`TicketBackend`] for tests of this crate and its dependents.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use backend_client::{BackendError, BackendResult, StatusCode, TicketBackend};
use chrono::{TimeZone, Utc};
use shared::domain::{
    Attachment, CreateTagRequest, CreateTicketRequest, HistoryEntry, HistoryPage, Paginated,
    Priority, Tag, Ticket, TicketQuery, TicketStatus, UpdateStatusRequest, UpdateTicketRequest,
};

#[derive(Default)]
struct State {
    tickets: Vec<Ticket>,
    tags: Vec<Tag>,
    attachments: HashMap<String, Vec<Attachment>>,
    history: HashMap<String, Vec<HistoryEntry>>,
    failures: HashMap<String, StatusCode>,
    calls: Vec<String>,
    next_id: u64,
}

/// Cloning shares the underlying state.
#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<State>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn with_ticket(self, ticket: Ticket) -> Self {
        self.lock().tickets.push(ticket);
        self
    }

    pub fn with_tag(self, tag: Tag) -> Self {
        self.lock().tags.push(tag);
        self
    }

    pub fn with_attachment(self, attachment: Attachment) -> Self {
        self.lock()
            .attachments
            .entry(attachment.ticket_id.clone())
            .or_default()
            .push(attachment);
        self
    }

    pub fn with_history(self, entry: HistoryEntry) -> Self {
        self.lock()
            .history
            .entry(entry.ticket_id.clone())
            .or_default()
            .push(entry);
        self
    }

    /// Makes every later call of `operation` (a trait method name) fail
    /// with `status`.
    pub fn fail(self, operation: &str, status: StatusCode) -> Self {
        self.lock().failures.insert(operation.to_string(), status);
        self
    }

    /// Calls so far, as `operation` or `operation:arg`.
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn tickets(&self) -> Vec<Ticket> {
        self.lock().tickets.clone()
    }

    pub fn tags(&self) -> Vec<Tag> {
        self.lock().tags.clone()
    }

    fn record(&self, operation: &str, arg: Option<&str>) -> BackendResult<MutexGuard<'_, State>> {
        let mut state = self.lock();
        state.calls.push(match arg {
            Some(arg) => format!("{operation}:{arg}"),
            None => operation.to_string(),
        });
        let failure = state.failures.get(operation).copied();
        match failure {
            Some(status) => Err(status_error(status)),
            None => Ok(state),
        }
    }
}

fn status_error(status: StatusCode) -> BackendError {
    BackendError::Status {
        status,
        body: format!("{{\"error\":\"{}\"}}", status.canonical_reason().unwrap_or("error")),
    }
}

fn not_found() -> BackendError {
    status_error(StatusCode::NOT_FOUND)
}

pub fn sample_ticket(id: &str, title: &str) -> Ticket {
    let at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).single().unwrap_or_else(Utc::now);
    Ticket {
        id: id.to_string(),
        title: title.to_string(),
        description: None,
        priority: Priority::Medium,
        status: TicketStatus::Open,
        resolution: None,
        completed_at: None,
        created_at: at,
        updated_at: at,
        tags: Vec::new(),
    }
}

pub fn sample_tag(id: &str, name: &str, is_predefined: bool) -> Tag {
    Tag {
        id: id.to_string(),
        name: name.to_string(),
        color: "#3B82F6".to_string(),
        icon: None,
        is_predefined,
        created_at: Utc::now(),
    }
}

#[async_trait]
impl TicketBackend for FakeBackend {
    async fn list_tickets(&self, query: &TicketQuery) -> BackendResult<Paginated<Ticket>> {
        let state = self.record("list_tickets", None)?;
        let matches: Vec<Ticket> = state
            .tickets
            .iter()
            .filter(|t| query.status.as_deref().map_or(true, |s| t.status.as_str() == s))
            .filter(|t| {
                query
                    .priority
                    .as_deref()
                    .map_or(true, |p| t.priority.as_str() == p)
            })
            .filter(|t| query.search.as_deref().map_or(true, |s| t.title.contains(s)))
            .cloned()
            .collect();
        let per_page = query.per_page.max(1);
        let total = matches.len() as i64;
        let total_pages = (total + per_page - 1) / per_page;
        let skip = ((query.page.max(1) - 1) * per_page) as usize;
        Ok(Paginated {
            data: matches.into_iter().skip(skip).take(per_page as usize).collect(),
            total,
            page: query.page,
            per_page,
            total_pages,
        })
    }

    async fn get_ticket(&self, id: &str) -> BackendResult<Ticket> {
        let state = self.record("get_ticket", Some(id))?;
        state
            .tickets
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn create_ticket(&self, request: &CreateTicketRequest) -> BackendResult<Ticket> {
        let mut state = self.record("create_ticket", Some(request.title.as_str()))?;
        state.next_id += 1;
        let mut ticket = sample_ticket(&format!("new-{}", state.next_id), &request.title);
        ticket.description = request.description.clone();
        ticket.priority = request.priority;
        state.tickets.push(ticket.clone());
        Ok(ticket)
    }

    async fn update_ticket(
        &self,
        id: &str,
        request: &UpdateTicketRequest,
    ) -> BackendResult<Ticket> {
        let mut state = self.record("update_ticket", Some(id))?;
        let ticket = state
            .tickets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(not_found)?;
        if let Some(title) = &request.title {
            ticket.title = title.clone();
        }
        if let Some(description) = &request.description {
            ticket.description = Some(description.clone());
        }
        if let Some(priority) = request.priority {
            ticket.priority = priority;
        }
        Ok(ticket.clone())
    }

    async fn delete_ticket(&self, id: &str) -> BackendResult<()> {
        let mut state = self.record("delete_ticket", Some(id))?;
        let before = state.tickets.len();
        state.tickets.retain(|t| t.id != id);
        if state.tickets.len() == before {
            return Err(not_found());
        }
        Ok(())
    }

    async fn update_ticket_status(
        &self,
        id: &str,
        request: &UpdateStatusRequest,
    ) -> BackendResult<Ticket> {
        let mut state = self.record("update_ticket_status", Some(id))?;
        let ticket = state
            .tickets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(not_found)?;
        if !ticket.status.allowed_transitions().contains(&request.status) {
            return Err(status_error(StatusCode::BAD_REQUEST));
        }
        ticket.status = request.status;
        if request.resolution.is_some() {
            ticket.resolution = request.resolution.clone();
        }
        Ok(ticket.clone())
    }

    async fn add_ticket_tag(&self, id: &str, tag_id: &str) -> BackendResult<()> {
        let mut state = self.record("add_ticket_tag", Some(format!("{id}/{tag_id}").as_str()))?;
        let tag = state
            .tags
            .iter()
            .find(|t| t.id == tag_id)
            .cloned()
            .ok_or_else(not_found)?;
        let ticket = state
            .tickets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(not_found)?;
        if !ticket.tags.iter().any(|t| t.id == tag.id) {
            ticket.tags.push(tag);
        }
        Ok(())
    }

    async fn remove_ticket_tag(&self, id: &str, tag_id: &str) -> BackendResult<()> {
        let mut state = self.record("remove_ticket_tag", Some(format!("{id}/{tag_id}").as_str()))?;
        let ticket = state
            .tickets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(not_found)?;
        ticket.tags.retain(|t| t.id != tag_id);
        Ok(())
    }

    async fn get_ticket_history(&self, id: &str) -> BackendResult<HistoryPage> {
        let state = self.record("get_ticket_history", Some(id))?;
        let data = state.history.get(id).cloned().unwrap_or_default();
        Ok(HistoryPage {
            total: data.len() as i64,
            data,
        })
    }

    async fn list_attachments(&self, id: &str) -> BackendResult<Vec<Attachment>> {
        let state = self.record("list_attachments", Some(id))?;
        Ok(state.attachments.get(id).cloned().unwrap_or_default())
    }

    async fn list_tags(&self) -> BackendResult<Vec<Tag>> {
        let state = self.record("list_tags", None)?;
        Ok(state.tags.clone())
    }

    async fn create_tag(&self, request: &CreateTagRequest) -> BackendResult<Tag> {
        let mut state = self.record("create_tag", Some(request.name.as_str()))?;
        if state.tags.iter().any(|t| t.name == request.name) {
            return Err(status_error(StatusCode::CONFLICT));
        }
        state.next_id += 1;
        let mut tag = sample_tag(&format!("tag-{}", state.next_id), &request.name, false);
        tag.color = request.color.clone();
        state.tags.push(tag.clone());
        Ok(tag)
    }

    async fn delete_tag(&self, id: &str) -> BackendResult<()> {
        let mut state = self.record("delete_tag", Some(id))?;
        let before = state.tags.len();
        state.tags.retain(|t| t.id != id);
        if state.tags.len() == before {
            return Err(not_found());
        }
        Ok(())
    }
}
