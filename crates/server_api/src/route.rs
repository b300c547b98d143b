//! Page-path resolution and the ticket-list query carried in list URLs.

use std::collections::HashMap;

use serde_json::Value;
use shared::domain::TicketQuery;
use url::form_urlencoded;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRoute {
    TicketList,
    TicketCreate,
    TicketEdit(String),
    TicketDetail(String),
    Tags,
    NotFound,
}

impl PageRoute {
    pub fn resolve(path: &str) -> Self {
        match path {
            "/" | "/tickets" => return Self::TicketList,
            "/tickets/new" => return Self::TicketCreate,
            "/tags" => return Self::Tags,
            _ => {}
        }
        let Some(rest) = path.strip_prefix("/tickets/") else {
            return Self::NotFound;
        };
        let id = rest.split('/').next().unwrap_or_default();
        if id.is_empty() {
            Self::NotFound
        } else if rest.ends_with("/edit") {
            Self::TicketEdit(id.to_string())
        } else {
            Self::TicketDetail(id.to_string())
        }
    }
}

/// Splits a `path` parameter that may carry its own query string and merges
/// it over `outer`. Parameters embedded in the path win.
pub fn split_path_query(
    raw_path: &str,
    outer: &HashMap<String, String>,
) -> (String, HashMap<String, String>) {
    let mut params = outer.clone();
    params.remove("path");
    let (path, embedded) = match raw_path.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (raw_path, None),
    };
    if let Some(query) = embedded {
        params.extend(form_urlencoded::parse(query.as_bytes()).into_owned());
    }
    let path = if path.is_empty() { "/" } else { path };
    (path.to_string(), params)
}

/// Integer from a loosely typed value: numbers (floats truncate), numeric
/// strings, anything else falls back to `default`.
pub fn safe_int(value: Option<&Value>, default: i64) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .unwrap_or(default),
        Some(Value::String(s)) => safe_int_str(Some(s), default),
        _ => default,
    }
}

pub fn safe_int_str(value: Option<&str>, default: i64) -> i64 {
    value
        .and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(default)
}

/// Filters and page of the ticket list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub search: String,
    pub status: String,
    pub priority: String,
    pub page: i64,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            status: String::new(),
            priority: String::new(),
            page: 1,
        }
    }
}

impl ListQuery {
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let text = |key: &str| params.get(key).cloned().unwrap_or_default();
        Self {
            search: text("search"),
            status: text("status"),
            priority: text("priority"),
            page: safe_int_str(params.get("page").map(String::as_str), 1).max(1),
        }
    }

    /// `/tickets?search=..&status=..&priority=..&page=..`; empty filters and
    /// page 1 are left out.
    pub fn to_path(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        for (key, value) in [
            ("search", &self.search),
            ("status", &self.status),
            ("priority", &self.priority),
        ] {
            if !value.is_empty() {
                query.append_pair(key, value);
            }
        }
        if self.page > 1 {
            query.append_pair("page", &self.page.to_string());
        }
        let query = query.finish();
        if query.is_empty() {
            "/tickets".to_string()
        } else {
            format!("/tickets?{query}")
        }
    }

    pub fn to_ticket_query(&self, per_page: i64) -> TicketQuery {
        let filter = |value: &String| (!value.is_empty()).then(|| value.clone());
        TicketQuery {
            search: filter(&self.search),
            status: filter(&self.status),
            priority: filter(&self.priority),
            page: self.page,
            per_page,
        }
    }
}

#[cfg(test)]
#[path = "tests/route_tests.rs"]
mod tests;
