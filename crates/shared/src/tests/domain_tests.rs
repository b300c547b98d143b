use super::*;
use serde_json::json;

#[test]
fn status_transitions_match_workflow() {
    assert_eq!(
        TicketStatus::Open.allowed_transitions(),
        &[TicketStatus::InProgress, TicketStatus::Cancelled]
    );
    assert_eq!(
        TicketStatus::InProgress.allowed_transitions(),
        &[
            TicketStatus::Open,
            TicketStatus::Completed,
            TicketStatus::Cancelled
        ]
    );
    assert_eq!(
        TicketStatus::Completed.allowed_transitions(),
        &[TicketStatus::Open]
    );
    assert_eq!(
        TicketStatus::Cancelled.allowed_transitions(),
        &[TicketStatus::Open]
    );
}

#[test]
fn status_and_priority_parse_wire_names() {
    assert_eq!(TicketStatus::parse("in_progress"), Some(TicketStatus::InProgress));
    assert_eq!(TicketStatus::parse("done"), None);
    assert_eq!(Priority::parse("urgent"), Some(Priority::Urgent));
    assert_eq!(Priority::default(), Priority::Medium);
    assert_eq!(TicketStatus::InProgress.label(), "处理中");
    assert_eq!(Priority::High.label(), "高");
}

#[test]
fn attachment_sizes_are_human_readable() {
    let mut attachment = Attachment {
        id: "a1".into(),
        ticket_id: "t1".into(),
        filename: "log.txt".into(),
        content_type: "text/plain".into(),
        size_bytes: 512,
        created_at: Utc::now(),
    };
    assert_eq!(attachment.size_formatted(), "512 B");
    attachment.size_bytes = 1536;
    assert_eq!(attachment.size_formatted(), "1.5 KB");
    attachment.size_bytes = 2 * 1024 * 1024;
    assert_eq!(attachment.size_formatted(), "2.0 MB");
}

#[test]
fn change_type_labels_fall_back_to_raw() {
    assert_eq!(change_type_label("status"), "状态变更");
    assert_eq!(change_type_label("tag_added"), "添加标签");
    assert_eq!(change_type_label("custom"), "custom");
}

#[test]
fn ticket_deserializes_without_optional_fields() {
    let ticket: Ticket = serde_json::from_value(json!({
        "id": "t1",
        "title": "Printer jam",
        "priority": "high",
        "status": "open",
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-02T00:00:00Z"
    }))
    .expect("deserialize");
    assert_eq!(ticket.priority, Priority::High);
    assert!(ticket.tags.is_empty());
    assert!(ticket.resolution.is_none());
}

#[test]
fn update_request_skips_unset_fields() {
    let body = serde_json::to_value(UpdateTicketRequest {
        title: Some("new".into()),
        ..Default::default()
    })
    .expect("serialize");
    assert_eq!(body, json!({"title": "new"}));
}
