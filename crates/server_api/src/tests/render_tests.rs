use std::sync::Arc;

use super::*;
use backend_client::StatusCode;
use shared::protocol::{BeginRendering, DataModelUpdate, SurfaceUpdate};

use crate::testing::{sample_tag, sample_ticket, FakeBackend};

fn context(backend: &FakeBackend) -> ApiContext {
    ApiContext::new(Arc::new(backend.clone()))
}

fn no_params() -> HashMap<String, String> {
    HashMap::new()
}

fn surface(messages: &[Message]) -> &SurfaceUpdate {
    match messages.first() {
        Some(Message::SurfaceUpdate(update)) => update,
        other => panic!("expected surfaceUpdate first, got {other:?}"),
    }
}

fn begin(messages: &[Message]) -> &BeginRendering {
    match messages.last() {
        Some(Message::BeginRendering(begin)) => begin,
        other => panic!("expected beginRendering last, got {other:?}"),
    }
}

fn data_paths(messages: &[Message]) -> Vec<&str> {
    messages
        .iter()
        .filter_map(|message| match message {
            Message::DataModelUpdate(DataModelUpdate { path, .. }) => path.as_deref(),
            _ => None,
        })
        .collect()
}

fn has_component(messages: &[Message], id: &str) -> bool {
    surface(messages)
        .components
        .iter()
        .any(|component| component.id == id)
}

#[tokio::test]
async fn list_page_emits_update_data_then_begin() {
    let backend = FakeBackend::new().with_ticket(sample_ticket("t1", "Printer jam"));
    let messages = render_page(&context(&backend), "/tickets", &no_params()).await;

    assert_eq!(messages.len(), 5);
    assert!(has_component(&messages, "tickets-page"));
    assert!(has_component(&messages, "app-layout"));
    assert_eq!(
        data_paths(&messages),
        vec![
            tickets::LIST_QUERY,
            tickets::LIST_ITEMS,
            tickets::LIST_PAGINATION
        ]
    );
    let begin = begin(&messages);
    assert_eq!(begin.root, "app-layout");
    assert_eq!(begin.surface_id, "main");
}

#[tokio::test]
async fn root_path_renders_ticket_list() {
    let backend = FakeBackend::new();
    let messages = render_page(&context(&backend), "/", &no_params()).await;
    assert!(has_component(&messages, "tickets-page"));
    assert!(has_component(&messages, "tickets-empty"));
    assert_eq!(backend.calls(), vec!["list_tickets"]);
}

#[tokio::test]
async fn list_filters_reach_backend() {
    let backend = FakeBackend::new()
        .with_ticket(sample_ticket("t1", "Printer jam"))
        .with_ticket(sample_ticket("t2", "Wifi down"));
    let params = HashMap::from([("search".to_string(), "Wifi".to_string())]);
    let messages = render_page(&context(&backend), "/tickets", &params).await;

    let rows = messages
        .iter()
        .find_map(|message| match message {
            Message::DataModelUpdate(update)
                if update.path.as_deref() == Some(tickets::LIST_ITEMS) =>
            {
                Some(update.contents.len())
            }
            _ => None,
        })
        .expect("list rows");
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn unknown_path_renders_not_found() {
    let backend = FakeBackend::new();
    let messages = render_page(&context(&backend), "/nowhere", &no_params()).await;
    assert!(has_component(&messages, "notfound-page"));
    assert_eq!(begin(&messages).root, "app-layout");
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn detail_failure_becomes_error_page() {
    let backend = FakeBackend::new()
        .with_ticket(sample_ticket("abc", "Printer jam"))
        .fail("list_attachments", StatusCode::NOT_FOUND);
    let messages = render_page(&context(&backend), "/tickets/abc", &no_params()).await;

    assert!(has_component(&messages, "error-page"));
    assert!(!has_component(&messages, "detail-page"));
    assert!(data_paths(&messages).is_empty());
    assert_eq!(begin(&messages).root, "app-layout");
}

#[tokio::test]
async fn detail_survives_missing_tag_list() {
    let backend = FakeBackend::new()
        .with_ticket(sample_ticket("abc", "Printer jam"))
        .fail("list_tags", StatusCode::SERVICE_UNAVAILABLE);
    let messages = render_page(&context(&backend), "/tickets/abc", &no_params()).await;

    assert!(has_component(&messages, "detail-page"));
    assert!(data_paths(&messages).contains(&tickets::DETAIL_AVAILABLE_TAGS));
    let calls = backend.calls();
    for expected in [
        "get_ticket:abc",
        "list_attachments:abc",
        "get_ticket_history:abc",
        "list_tags",
    ] {
        assert!(calls.iter().any(|call| call == expected), "missing {expected}");
    }
}

#[tokio::test]
async fn edit_page_loads_ticket() {
    let backend = FakeBackend::new().with_ticket(sample_ticket("abc", "Printer jam"));
    let messages = render_page(&context(&backend), "/tickets/abc/edit", &no_params()).await;
    assert!(has_component(&messages, "edit-page"));
    assert_eq!(data_paths(&messages), vec![tickets::EDIT_FORM]);
}

#[tokio::test]
async fn missing_ticket_on_edit_is_error_page() {
    let backend = FakeBackend::new();
    let messages = render_page(&context(&backend), "/tickets/zzz/edit", &no_params()).await;
    assert!(has_component(&messages, "error-page"));
}

#[tokio::test]
async fn create_page_renders_without_tags() {
    let backend = FakeBackend::new().fail("list_tags", StatusCode::BAD_GATEWAY);
    let messages = render_page(&context(&backend), "/tickets/new", &no_params()).await;
    assert!(has_component(&messages, "create-page"));
    assert!(has_component(&messages, "create-tags-select"));
}

#[tokio::test]
async fn tags_page_failure_is_error_page() {
    let backend = FakeBackend::new()
        .with_tag(sample_tag("g1", "bug", true))
        .fail("list_tags", StatusCode::INTERNAL_SERVER_ERROR);
    let messages = render_page(&context(&backend), "/tags", &no_params()).await;
    assert!(has_component(&messages, "error-page"));
    assert!(!has_component(&messages, "tags-page"));
}

#[tokio::test]
async fn custom_surface_id_is_used() {
    let backend = FakeBackend::new().with_tag(sample_tag("g1", "bug", true));
    let ctx = context(&backend).with_surface_id("side");
    let messages = render_page(&ctx, "/tags", &no_params()).await;
    assert!(messages.iter().all(|message| message.surface_id() == "side"));
}
