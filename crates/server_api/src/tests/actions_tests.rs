use std::sync::Arc;

use super::*;
use backend_client::StatusCode;
use serde_json::json;

use crate::testing::{sample_tag, sample_ticket, FakeBackend};

fn context(backend: &FakeBackend) -> ApiContext {
    ApiContext::new(Arc::new(backend.clone()))
}

fn user_action(name: &str, context: Value) -> UserAction {
    UserAction {
        name: name.to_string(),
        surface_id: "main".to_string(),
        source_component_id: "btn".to_string(),
        timestamp: "2024-03-01T08:30:00Z".to_string(),
        context: match context {
            Value::Object(map) => map,
            _ => Map::new(),
        },
    }
}

async fn run(backend: &FakeBackend, name: &str, context_value: Value) -> ActionResponse {
    handle_action(&context(backend), &user_action(name, context_value)).await
}

fn navigated(response: &ActionResponse) -> &str {
    match &response.result {
        Some(ActionResult::Navigate(to)) => to,
        other => panic!("expected navigate, got {other:?} ({:?})", response.error),
    }
}

#[test]
fn parse_filter_status_keeps_other_filters_and_resets_page() {
    let context = json!({"status": "open", "current_search": "x", "current_page": 3});
    let action = UiAction::parse("filter_status", context.as_object().expect("object"))
        .expect("parse");
    let UiAction::FilterStatus(query) = action else {
        panic!("filter_status parsed to another action");
    };
    assert_eq!(query.page, 1);
    assert_eq!(query.to_path(), "/tickets?search=x&status=open");
}

#[test]
fn parse_paginate_accepts_loose_page_numbers() {
    let cases = [
        (json!(3), 3),
        (json!("4"), 4),
        (json!(2.9), 2),
        (json!("x"), 1),
        (json!(-5), 1),
    ];
    for (raw, expected) in cases {
        let context = json!({"page": raw});
        let action = UiAction::parse("paginate", context.as_object().expect("object"))
            .expect("parse");
        assert_eq!(
            action,
            UiAction::Paginate(ListQuery {
                page: expected,
                ..ListQuery::default()
            })
        );
    }
}

#[test]
fn parse_create_ticket_reads_form() {
    let context = json!({
        "form": {
            "title": "  Printer jam ",
            "description": "",
            "priority": "high",
            "tag_ids": "g1, g2,,"
        }
    });
    let action = UiAction::parse("create_ticket", context.as_object().expect("object"))
        .expect("parse");
    assert_eq!(
        action,
        UiAction::CreateTicket(TicketForm {
            title: "Printer jam".into(),
            description: None,
            priority: Priority::High,
            tag_ids: vec!["g1".into(), "g2".into()],
        })
    );
}

#[test]
fn parse_tag_ids_from_array() {
    let context = json!({"form": {"title": "t", "tag_ids": ["g1", 7, null, ""]}});
    let Ok(UiAction::CreateTicket(form)) =
        UiAction::parse("create_ticket", context.as_object().expect("object"))
    else {
        panic!("create_ticket did not parse");
    };
    assert_eq!(form.tag_ids, vec!["g1".to_string(), "7".to_string()]);
    assert_eq!(form.priority, Priority::Medium);
}

#[test]
fn parse_update_ticket_only_sets_present_fields() {
    let context = json!({"id": "t1", "form": {"description": "new text"}});
    let action = UiAction::parse("update_ticket", context.as_object().expect("object"))
        .expect("parse");
    assert_eq!(
        action,
        UiAction::UpdateTicket(TicketEdit {
            id: "t1".into(),
            title: None,
            description: Some("new text".into()),
            priority: None,
        })
    );
}

#[test]
fn missing_or_malformed_form_reads_as_empty() {
    for context in [json!({"id": "t1"}), json!({"id": "t1", "form": "oops"})] {
        let action = UiAction::parse("update_ticket", context.as_object().expect("object"))
            .expect("parse");
        assert_eq!(
            action,
            UiAction::UpdateTicket(TicketEdit {
                id: "t1".into(),
                title: None,
                description: None,
                priority: None,
            })
        );
    }
    let err = UiAction::parse("create_tag", json!({"form": []}).as_object().expect("object"))
        .expect_err("empty name");
    assert_eq!(err.to_string(), "标签名称不能为空");
}

#[test]
fn parse_rejects_invalid_input() {
    let cases = [
        ("create_ticket", json!({"form": {"title": "   "}}), "标题不能为空"),
        ("update_ticket", json!({"id": "t1", "form": {"title": ""}}), "标题不能为空"),
        ("create_tag", json!({"form": {"color": "#fff"}}), "标签名称不能为空"),
        ("view_ticket", json!({}), "缺少必要参数：id"),
        ("change_status", json!({"id": "t1", "status": "done"}), "操作失败：请求参数无效"),
        (
            "create_ticket",
            json!({"form": {"title": "t", "priority": "asap"}}),
            "操作失败：请求参数无效",
        ),
    ];
    for (name, context, message) in cases {
        let err = UiAction::parse(name, context.as_object().expect("object"))
            .expect_err(name);
        assert_eq!(err.to_string(), message, "{name}");
    }
}

#[test]
fn navigate_defaults_to_ticket_list() {
    for context in [json!({}), json!({"to": ""}), json!({"to": null})] {
        let action = UiAction::parse("navigate", context.as_object().expect("object"))
            .expect("parse");
        assert_eq!(
            action,
            UiAction::Navigate {
                to: "/tickets".into()
            }
        );
    }
}

#[test]
fn action_results_serialize_as_single_key_objects() {
    let cases = [
        (ActionResult::Navigate("/tags".into()), json!({"navigate": "/tags"})),
        (ActionResult::Handled, json!({"handled": true})),
        (ActionResult::Refresh, json!({"refresh": true})),
        (ActionResult::Unknown, json!({"unknown": true})),
    ];
    for (result, expected) in cases {
        assert_eq!(serde_json::to_value(&result).expect("serialize"), expected);
    }
    let failed = serde_json::to_value(ActionResponse::failed("boom")).expect("serialize");
    assert_eq!(failed, json!({"success": false, "error": "boom"}));
}

#[test]
fn backend_status_errors_map_to_messages() {
    let cases = [
        (StatusCode::NOT_FOUND, "操作失败：资源未找到"),
        (StatusCode::CONFLICT, "操作失败：资源冲突（名称可能已存在）"),
        (StatusCode::BAD_REQUEST, "操作失败：请求参数无效"),
        (StatusCode::INTERNAL_SERVER_ERROR, "操作失败：500 Internal Server Error"),
    ];
    for (status, message) in cases {
        let err = DispatchError::Backend(BackendError::Status {
            status,
            body: "{\"error\":\"Not Found\"}".into(),
        });
        assert_eq!(err.to_api_error().message, message);
    }
}

#[tokio::test]
async fn unknown_action_is_reported_not_failed() {
    let response = run(&FakeBackend::new(), "launch_rockets", json!({})).await;
    assert!(response.success);
    assert_eq!(response.result, Some(ActionResult::Unknown));
}

#[tokio::test]
async fn client_side_actions_are_acknowledged() {
    let backend = FakeBackend::new();
    for name in ["show_delete_dialog", "set_tag_color", "download_attachment"] {
        let response = run(&backend, name, json!({"id": "t1"})).await;
        assert_eq!(response.result, Some(ActionResult::Handled), "{name}");
    }
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn retry_asks_for_refresh() {
    let response = run(&FakeBackend::new(), "retry", json!({})).await;
    assert_eq!(response.result, Some(ActionResult::Refresh));
}

#[tokio::test]
async fn view_ticket_navigates_to_detail() {
    let response = run(&FakeBackend::new(), "view_ticket", json!({"id": "t7"})).await;
    assert_eq!(navigated(&response), "/tickets/t7");
}

#[tokio::test]
async fn create_ticket_assigns_tags_and_opens_it() {
    let backend = FakeBackend::new()
        .with_tag(sample_tag("g1", "bug", true))
        .with_tag(sample_tag("g2", "ops", false));
    let response = run(
        &backend,
        "create_ticket",
        json!({"form": {"title": "Printer jam", "tag_ids": "g1,g2"}}),
    )
    .await;

    assert_eq!(navigated(&response), "/tickets/new-1");
    assert_eq!(
        backend.calls(),
        vec![
            "create_ticket:Printer jam",
            "add_ticket_tag:new-1/g1",
            "add_ticket_tag:new-1/g2"
        ]
    );
    let created = &backend.tickets()[0];
    assert_eq!(created.tags.len(), 2);
}

#[tokio::test]
async fn create_ticket_survives_tag_failures() {
    let backend = FakeBackend::new().fail("add_ticket_tag", StatusCode::INTERNAL_SERVER_ERROR);
    let response = run(
        &backend,
        "create_ticket",
        json!({"form": {"title": "Printer jam", "tag_ids": ["g1"]}}),
    )
    .await;
    assert!(response.success);
    assert_eq!(navigated(&response), "/tickets/new-1");
}

#[tokio::test]
async fn create_ticket_without_title_never_reaches_backend() {
    let backend = FakeBackend::new();
    let response = run(&backend, "create_ticket", json!({"form": {"title": ""}})).await;
    assert!(!response.success);
    assert_eq!(response.error.as_deref(), Some("标题不能为空"));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn change_status_follows_transition_rules() {
    let backend = FakeBackend::new().with_ticket(sample_ticket("t1", "a"));
    let response = run(
        &backend,
        "change_status",
        json!({"id": "t1", "status": "in_progress"}),
    )
    .await;
    assert_eq!(navigated(&response), "/tickets/t1");

    let response = run(
        &backend,
        "change_status",
        json!({"id": "t1", "status": "in_progress"}),
    )
    .await;
    assert!(!response.success);
    assert_eq!(response.error.as_deref(), Some("操作失败：请求参数无效"));
}

#[tokio::test]
async fn delete_ticket_returns_to_list() {
    let backend = FakeBackend::new().with_ticket(sample_ticket("t1", "a"));
    let response = run(&backend, "delete_ticket", json!({"id": "t1"})).await;
    assert_eq!(navigated(&response), "/tickets");
    assert!(backend.tickets().is_empty());
}

#[tokio::test]
async fn ids_that_would_leave_their_path_segment_never_reach_backend() {
    let backend = FakeBackend::new()
        .with_ticket(sample_ticket("t9", "a"))
        .with_tag(sample_tag("t1", "bug", false));
    for id in ["../tags/t1", "t9#frag", "t9?x=1", "..", "a\\b"] {
        let response = run(&backend, "delete_ticket", json!({ "id": id })).await;
        assert!(!response.success, "{id}");
        assert_eq!(response.error.as_deref(), Some("操作失败：请求参数无效"), "{id}");
    }
    let response = run(&backend, "delete_tag", json!({"id": "t1/../.."})).await;
    assert!(!response.success);
    assert!(backend.calls().is_empty());
    assert_eq!(backend.tickets().len(), 1);
    assert_eq!(backend.tags().len(), 1);
}

#[test]
fn tag_id_lists_drop_path_like_ids() {
    let context = json!({"form": {"title": "t", "tag_ids": "g1, ../g2, g3#x"}});
    let Ok(UiAction::CreateTicket(form)) =
        UiAction::parse("create_ticket", context.as_object().expect("object"))
    else {
        panic!("create_ticket did not parse");
    };
    assert_eq!(form.tag_ids, vec!["g1".to_string()]);
}

#[tokio::test]
async fn ticket_tag_actions_return_to_detail() {
    let backend = FakeBackend::new()
        .with_ticket(sample_ticket("t1", "a"))
        .with_tag(sample_tag("g1", "bug", true));
    let added = run(&backend, "add_ticket_tag", json!({"id": "t1", "tag_id": "g1"})).await;
    assert_eq!(navigated(&added), "/tickets/t1");
    assert_eq!(backend.tickets()[0].tags.len(), 1);

    let removed = run(&backend, "remove_ticket_tag", json!({"id": "t1", "tag_id": "g1"})).await;
    assert_eq!(navigated(&removed), "/tickets/t1");
    assert!(backend.tickets()[0].tags.is_empty());
}

#[tokio::test]
async fn create_tag_defaults_color() {
    let backend = FakeBackend::new();
    let response = run(&backend, "create_tag", json!({"form": {"name": "infra"}})).await;
    assert_eq!(navigated(&response), "/tags");
    let tags = backend.tags();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].color, "#3B82F6");
}

#[tokio::test]
async fn duplicate_tag_reports_conflict() {
    let backend = FakeBackend::new().with_tag(sample_tag("g1", "bug", true));
    let response = run(&backend, "create_tag", json!({"form": {"name": "bug"}})).await;
    assert!(!response.success);
    assert_eq!(
        response.error.as_deref(),
        Some("操作失败：资源冲突（名称可能已存在）")
    );
}

#[tokio::test]
async fn deleting_missing_tag_reports_not_found() {
    let response = run(&FakeBackend::new(), "delete_tag", json!({"id": "ghost"})).await;
    assert!(!response.success);
    assert_eq!(response.error.as_deref(), Some("操作失败：资源未找到"));
}
