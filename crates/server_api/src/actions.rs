//! User-action dispatch. Actions are parsed into [`UiAction`] at the boundary
//! and then handled by one exhaustive match.

use backend_client::BackendError;
use serde::{ser::SerializeMap, Serialize, Serializer};
use serde_json::{Map, Value};
use shared::{
    domain::{
        CreateTagRequest, CreateTicketRequest, Priority, TicketStatus, UpdateStatusRequest,
        UpdateTicketRequest, DEFAULT_TAG_COLOR,
    },
    error::{ApiError, ErrorCode},
    protocol::UserAction,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    route::{safe_int, ListQuery},
    ApiContext,
};

const DEFAULT_NAVIGATE_TO: &str = "/tickets";

/// Actions the renderer resolves locally; the server only acknowledges them.
const CLIENT_SIDE: [&str; 8] = [
    "show_create_tag_form",
    "hide_create_tag_form",
    "set_tag_color",
    "set_form_priority",
    "toggle_multi_select",
    "show_delete_dialog",
    "dismiss_dialog",
    "download_attachment",
];

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("缺少必要参数：{0}")]
    MissingField(&'static str),
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl DispatchError {
    pub fn to_api_error(&self) -> ApiError {
        match self {
            // A known status is classified on its canonical text alone, so a
            // response body cannot skew the result.
            Self::Backend(err) => match err.status() {
                Some(status) => ApiError::operation_failed(&status.to_string()),
                None => ApiError::operation_failed(&err.to_string()),
            },
            other => ApiError::new(ErrorCode::Validation, other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketForm {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub tag_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketEdit {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub id: String,
    pub status: TicketStatus,
    pub resolution: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketTag {
    pub id: String,
    pub tag_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagForm {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    Navigate { to: String },
    SearchTickets(ListQuery),
    FilterStatus(ListQuery),
    FilterPriority(ListQuery),
    Paginate(ListQuery),
    ViewTicket { id: String },
    CreateTicket(TicketForm),
    UpdateTicket(TicketEdit),
    DeleteTicket { id: String },
    ChangeStatus(StatusChange),
    AddTicketTag(TicketTag),
    RemoveTicketTag(TicketTag),
    CreateTag(TagForm),
    DeleteTag { id: String },
    ClientSide(String),
    Retry,
    Unknown(String),
}

impl UiAction {
    pub fn parse(name: &str, context: &Map<String, Value>) -> Result<Self, DispatchError> {
        let ctx = Context(Some(context));
        let action = match name {
            "navigate" => Self::Navigate {
                to: ctx
                    .non_empty("to")
                    .unwrap_or_else(|| DEFAULT_NAVIGATE_TO.to_string()),
            },
            "search_tickets" => Self::SearchTickets(ListQuery {
                search: ctx.text("search"),
                status: ctx.text("status"),
                priority: ctx.text("priority"),
                page: 1,
            }),
            "filter_status" => Self::FilterStatus(ListQuery {
                search: ctx.text("current_search"),
                status: ctx.text("status"),
                priority: ctx.text("current_priority"),
                page: 1,
            }),
            "filter_priority" => Self::FilterPriority(ListQuery {
                search: ctx.text("current_search"),
                status: ctx.text("current_status"),
                priority: ctx.text("priority"),
                page: 1,
            }),
            "paginate" => Self::Paginate(ListQuery {
                search: ctx.text("search"),
                status: ctx.text("status"),
                priority: ctx.text("priority"),
                page: safe_int(context.get("page"), 1).max(1),
            }),
            "view_ticket" => Self::ViewTicket {
                id: ctx.id("id")?,
            },
            "create_ticket" => {
                let form = ctx.form();
                let title = form.text("title").trim().to_string();
                if title.is_empty() {
                    return Err(DispatchError::Invalid("标题不能为空".into()));
                }
                let priority = match form.non_empty("priority") {
                    Some(raw) => parse_priority(&raw)?,
                    None => Priority::default(),
                };
                Self::CreateTicket(TicketForm {
                    title,
                    description: form.non_empty("description"),
                    priority,
                    tag_ids: form.id_list("tag_ids"),
                })
            }
            "update_ticket" => {
                let id = ctx.id("id")?;
                let form = ctx.form();
                let title = match form.get("title") {
                    Some(_) => {
                        let title = form.text("title").trim().to_string();
                        if title.is_empty() {
                            return Err(DispatchError::Invalid("标题不能为空".into()));
                        }
                        Some(title)
                    }
                    None => None,
                };
                let priority = form
                    .non_empty("priority")
                    .map(|raw| parse_priority(&raw))
                    .transpose()?;
                Self::UpdateTicket(TicketEdit {
                    id,
                    title,
                    description: form.get("description").map(|_| form.text("description")),
                    priority,
                })
            }
            "delete_ticket" => Self::DeleteTicket {
                id: ctx.id("id")?,
            },
            "change_status" => {
                let id = ctx.id("id")?;
                let raw = ctx.required("status")?;
                let status = TicketStatus::parse(&raw)
                    .ok_or_else(|| DispatchError::Invalid("操作失败：请求参数无效".into()))?;
                Self::ChangeStatus(StatusChange {
                    id,
                    status,
                    resolution: ctx.non_empty("resolution"),
                })
            }
            "add_ticket_tag" => Self::AddTicketTag(TicketTag {
                id: ctx.id("id")?,
                tag_id: ctx.id("tag_id")?,
            }),
            "remove_ticket_tag" => Self::RemoveTicketTag(TicketTag {
                id: ctx.id("id")?,
                tag_id: ctx.id("tag_id")?,
            }),
            "create_tag" => {
                let form = ctx.form();
                let name = form.text("name").trim().to_string();
                if name.is_empty() {
                    return Err(DispatchError::Invalid("标签名称不能为空".into()));
                }
                Self::CreateTag(TagForm {
                    name,
                    color: form
                        .non_empty("color")
                        .unwrap_or_else(|| DEFAULT_TAG_COLOR.to_string()),
                })
            }
            "delete_tag" => Self::DeleteTag {
                id: ctx.id("id")?,
            },
            "retry" => Self::Retry,
            other if CLIENT_SIDE.contains(&other) => Self::ClientSide(other.to_string()),
            other => Self::Unknown(other.to_string()),
        };
        Ok(action)
    }
}

/// Directive returned to the client after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult {
    Navigate(String),
    Handled,
    Refresh,
    Unknown,
}

impl Serialize for ActionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Self::Navigate(to) => map.serialize_entry("navigate", to)?,
            Self::Handled => map.serialize_entry("handled", &true)?,
            Self::Refresh => map.serialize_entry("refresh", &true)?,
            Self::Unknown => map.serialize_entry("unknown", &true)?,
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ActionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResponse {
    pub fn ok(result: ActionResult) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(message.into()),
        }
    }
}

pub async fn handle_action(ctx: &ApiContext, action: &UserAction) -> ActionResponse {
    info!(
        name = %action.name,
        source = %action.source_component_id,
        "received action"
    );
    let outcome = match UiAction::parse(&action.name, &action.context) {
        Ok(parsed) => dispatch(ctx, parsed).await,
        Err(err) => Err(err),
    };
    match outcome {
        Ok(result) => ActionResponse::ok(result),
        Err(err) => {
            warn!(name = %action.name, error = %err, "action failed");
            ActionResponse::failed(err.to_api_error().message)
        }
    }
}

pub async fn dispatch(ctx: &ApiContext, action: UiAction) -> Result<ActionResult, DispatchError> {
    let backend = &ctx.backend;
    let result = match action {
        UiAction::Navigate { to } => ActionResult::Navigate(to),
        UiAction::SearchTickets(query)
        | UiAction::FilterStatus(query)
        | UiAction::FilterPriority(query)
        | UiAction::Paginate(query) => ActionResult::Navigate(query.to_path()),
        UiAction::ViewTicket { id } => ActionResult::Navigate(ticket_path(&id)),
        UiAction::CreateTicket(form) => {
            let ticket = backend
                .create_ticket(&CreateTicketRequest {
                    title: form.title,
                    description: form.description,
                    priority: form.priority,
                })
                .await?;
            for tag_id in &form.tag_ids {
                if let Err(err) = backend.add_ticket_tag(&ticket.id, tag_id).await {
                    warn!(ticket_id = %ticket.id, %tag_id, error = %err, "tag assignment failed");
                }
            }
            ActionResult::Navigate(ticket_path(&ticket.id))
        }
        UiAction::UpdateTicket(edit) => {
            backend
                .update_ticket(
                    &edit.id,
                    &UpdateTicketRequest {
                        title: edit.title,
                        description: edit.description,
                        priority: edit.priority,
                    },
                )
                .await?;
            ActionResult::Navigate(ticket_path(&edit.id))
        }
        UiAction::DeleteTicket { id } => {
            backend.delete_ticket(&id).await?;
            ActionResult::Navigate(DEFAULT_NAVIGATE_TO.to_string())
        }
        UiAction::ChangeStatus(change) => {
            backend
                .update_ticket_status(
                    &change.id,
                    &UpdateStatusRequest {
                        status: change.status,
                        resolution: change.resolution,
                    },
                )
                .await?;
            ActionResult::Navigate(ticket_path(&change.id))
        }
        UiAction::AddTicketTag(link) => {
            backend.add_ticket_tag(&link.id, &link.tag_id).await?;
            ActionResult::Navigate(ticket_path(&link.id))
        }
        UiAction::RemoveTicketTag(link) => {
            backend.remove_ticket_tag(&link.id, &link.tag_id).await?;
            ActionResult::Navigate(ticket_path(&link.id))
        }
        UiAction::CreateTag(form) => {
            backend
                .create_tag(&CreateTagRequest {
                    name: form.name,
                    color: form.color,
                    icon: None,
                })
                .await?;
            ActionResult::Navigate("/tags".to_string())
        }
        UiAction::DeleteTag { id } => {
            backend.delete_tag(&id).await?;
            ActionResult::Navigate("/tags".to_string())
        }
        UiAction::ClientSide(_) => ActionResult::Handled,
        UiAction::Retry => ActionResult::Refresh,
        UiAction::Unknown(name) => {
            warn!(%name, "unknown action");
            ActionResult::Unknown
        }
    };
    Ok(result)
}

fn ticket_path(id: &str) -> String {
    format!("/tickets/{id}")
}

fn parse_priority(raw: &str) -> Result<Priority, DispatchError> {
    Priority::parse(raw).ok_or_else(|| DispatchError::Invalid("操作失败：请求参数无效".into()))
}

fn is_plain_id(id: &str) -> bool {
    !matches!(id, "." | "..") && !id.contains(&['/', '\\', '?', '#'][..])
}

/// Read access to a loosely typed action context. `None` reads as empty.
#[derive(Clone, Copy)]
struct Context<'a>(Option<&'a Map<String, Value>>);

impl<'a> Context<'a> {
    fn get(&self, key: &str) -> Option<&'a Value> {
        self.0
            .and_then(|map| map.get(key))
            .filter(|value| !value.is_null())
    }

    /// Strings as-is, numbers and booleans in their JSON form, anything
    /// else as empty.
    fn text(&self, key: &str) -> String {
        match self.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => String::new(),
        }
    }

    fn non_empty(&self, key: &str) -> Option<String> {
        let value = self.text(key);
        (!value.trim().is_empty()).then_some(value)
    }

    fn required(&self, key: &'static str) -> Result<String, DispatchError> {
        self.non_empty(key).ok_or(DispatchError::MissingField(key))
    }

    /// A resource id; it must stay a single backend path segment.
    fn id(&self, key: &'static str) -> Result<String, DispatchError> {
        let id = self.required(key)?;
        if is_plain_id(&id) {
            Ok(id)
        } else {
            Err(DispatchError::Invalid("操作失败：请求参数无效".into()))
        }
    }

    /// Nested `form` object; missing or malformed forms read as empty.
    fn form(&self) -> Context<'a> {
        match self.get("form") {
            Some(Value::Object(form)) => Context(Some(form)),
            _ => Context(None),
        }
    }

    /// Ids from a comma-separated string or a JSON array.
    fn id_list(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.trim().to_string()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .filter(|id| !id.is_empty())
                .filter(|id| is_plain_id(id))
                .collect(),
            Some(Value::String(s)) => s
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty() && is_plain_id(id))
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "tests/actions_tests.rs"]
mod tests;
