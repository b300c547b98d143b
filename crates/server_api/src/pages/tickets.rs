use shared::{
    builder::{Layout, SurfaceBuilder},
    data_model::{value_map_from_entries, DataEntry, ModelValue},
    domain::{
        change_type_label, Attachment, HistoryEntry, Paginated, Priority, Tag, Ticket,
        TicketStatus,
    },
    protocol::{
        Action, Alignment, BoundValue, Direction, Distribution, SelectOption, TextFieldType,
        UsageHint,
    },
};

use super::{date_only, date_time, indexed_maps, tag_fields, PageOutput, CENTERED, PLAIN, SPREAD};
use crate::route::ListQuery;

pub const LIST_QUERY: &str = "/app/tickets/query";
pub const LIST_ITEMS: &str = "/app/tickets/list";
pub const LIST_PAGINATION: &str = "/app/tickets/pagination";
pub const DETAIL: &str = "/app/ticket/detail";
pub const DETAIL_TAGS: &str = "/app/ticket/tags";
pub const DETAIL_AVAILABLE_TAGS: &str = "/app/ticket/available_tags";
pub const DETAIL_ATTACHMENTS: &str = "/app/ticket/attachments";
pub const DETAIL_HISTORY: &str = "/app/ticket/history";
pub const CREATE_FORM: &str = "/app/form/create";
pub const CREATE_TAG_OPTIONS: &str = "/app/form/create_options/tags";
pub const EDIT_FORM: &str = "/app/form/edit";

const QUERY_SEARCH: &str = "/app/tickets/query/search";
const QUERY_STATUS: &str = "/app/tickets/query/status";
const QUERY_PRIORITY: &str = "/app/tickets/query/priority";

const NO_DESCRIPTION: &str = "无描述";
const END: Layout = Layout::new(Distribution::End, Alignment::Center);

pub fn ticket_list(
    builder: &mut SurfaceBuilder,
    page: &Paginated<Ticket>,
    query: &ListQuery,
) -> PageOutput {
    builder
        .heading("tickets-title", "票据列表", UsageHint::H1)
        .text_button(
            "tickets-add-btn",
            "+ 新建票据",
            Action::navigate("/tickets/new"),
        )
        .row("tickets-header", ["tickets-title", "tickets-add-btn"], SPREAD);

    builder
        .text_field(
            "tickets-search",
            "搜索票据...",
            Some(BoundValue::path(QUERY_SEARCH)),
            None,
        )
        .text_button(
            "tickets-search-btn",
            "搜索",
            Action::new("search_tickets")
                .with_context("search", BoundValue::path(QUERY_SEARCH))
                .with_context("status", BoundValue::path(QUERY_STATUS))
                .with_context("priority", BoundValue::path(QUERY_PRIORITY)),
        )
        .row(
            "tickets-search-row",
            ["tickets-search", "tickets-search-btn"],
            CENTERED,
        );

    let statuses = [("all", "", "全部")]
        .into_iter()
        .chain(TicketStatus::ALL.map(|s| (s.as_str(), s.as_str(), s.label())));
    let mut status_filters = Vec::new();
    for (key, value, label) in statuses {
        let id = format!("filter-status-{key}");
        builder.text_button(
            id.clone(),
            label,
            Action::new("filter_status")
                .with_context("status", BoundValue::string(value))
                .with_context("current_search", BoundValue::path(QUERY_SEARCH))
                .with_context("current_priority", BoundValue::path(QUERY_PRIORITY)),
        );
        status_filters.push(id);
    }
    builder.row("tickets-status-filters", status_filters, CENTERED);

    let priorities = [("all", "", "全部优先级")]
        .into_iter()
        .chain(Priority::ALL.map(|p| (p.as_str(), p.as_str(), p.label())));
    let mut priority_filters = Vec::new();
    for (key, value, label) in priorities {
        let id = format!("filter-priority-{key}");
        builder.text_button(
            id.clone(),
            label,
            Action::new("filter_priority")
                .with_context("priority", BoundValue::string(value))
                .with_context("current_search", BoundValue::path(QUERY_SEARCH))
                .with_context("current_status", BoundValue::path(QUERY_STATUS)),
        );
        priority_filters.push(id);
    }
    builder
        .row("tickets-priority-filters", priority_filters, CENTERED)
        .column(
            "tickets-filters",
            [
                "tickets-search-row",
                "tickets-status-filters",
                "tickets-priority-filters",
            ],
            PLAIN,
        )
        .card("tickets-filters-card", "tickets-filters");

    // Row template, instantiated once per entry under LIST_ITEMS.
    builder
        .heading("ticket-item-title", BoundValue::path("title"), UsageHint::H3)
        .text("ticket-item-status", BoundValue::path("statusLabel"))
        .text("ticket-item-priority", BoundValue::path("priorityLabel"))
        .text("ticket-item-date", BoundValue::path("created_at"))
        .row(
            "ticket-item-meta",
            [
                "ticket-item-status",
                "ticket-item-priority",
                "ticket-item-date",
            ],
            CENTERED,
        )
        .column(
            "ticket-item-content",
            ["ticket-item-title", "ticket-item-meta"],
            PLAIN,
        )
        .text("ticket-item-arrow", "→")
        .row(
            "ticket-item-row",
            ["ticket-item-content", "ticket-item-arrow"],
            SPREAD,
        )
        .button(
            "ticket-item-btn",
            "ticket-item-row",
            Action::new("view_ticket").with_context("id", BoundValue::path("id")),
        )
        .card("ticket-item-card", "ticket-item-btn")
        .template_list(
            "tickets-list",
            "ticket-item-card",
            LIST_ITEMS,
            Direction::Vertical,
        );

    builder
        .heading("tickets-empty-title", "暂无票据", UsageHint::H3)
        .text("tickets-empty-desc", "点击上方按钮创建第一个票据")
        .column(
            "tickets-empty",
            ["tickets-empty-title", "tickets-empty-desc"],
            CENTERED,
        );

    let filters = |action: Action| {
        action
            .with_context("search", BoundValue::path(QUERY_SEARCH))
            .with_context("status", BoundValue::path(QUERY_STATUS))
            .with_context("priority", BoundValue::path(QUERY_PRIORITY))
    };
    builder
        .text_button(
            "pagination-prev",
            "← 上一页",
            filters(
                Action::new("paginate")
                    .with_context("page", BoundValue::path("/app/tickets/pagination/prevPage")),
            ),
        )
        .text("pagination-info", BoundValue::path("/app/tickets/pagination/info"))
        .text_button(
            "pagination-next",
            "下一页 →",
            filters(
                Action::new("paginate")
                    .with_context("page", BoundValue::path("/app/tickets/pagination/nextPage")),
            ),
        )
        .row(
            "tickets-pagination",
            ["pagination-prev", "pagination-info", "pagination-next"],
            Layout::new(Distribution::Center, Alignment::Center),
        );

    let listing = if page.data.is_empty() {
        "tickets-empty"
    } else {
        "tickets-list"
    };
    builder
        .column("tickets-content", [listing, "tickets-pagination"], PLAIN)
        .column(
            "tickets-page",
            ["tickets-header", "tickets-filters-card", "tickets-content"],
            PLAIN,
        );

    let current = page.page.max(1);
    let items = indexed_maps("ticket", &page.data, |ticket| {
        vec![
            ("id", ticket.id.as_str().into()),
            ("title", ticket.title.as_str().into()),
            ("status", ticket.status.as_str().into()),
            ("statusLabel", ticket.status.label().into()),
            ("priority", ticket.priority.as_str().into()),
            ("priorityLabel", ticket.priority.label().into()),
            ("created_at", date_only(&ticket.created_at).into()),
        ]
    });

    PageOutput::new("tickets-page")
        .with_data(
            LIST_QUERY,
            vec![
                DataEntry::string("search", query.search.as_str()),
                DataEntry::string("status", query.status.as_str()),
                DataEntry::string("priority", query.priority.as_str()),
                DataEntry::number("page", current),
            ],
        )
        .with_data(LIST_ITEMS, items)
        .with_data(
            LIST_PAGINATION,
            pagination_entries(current, page.total_pages),
        )
}

/// Pager state; a reported page count below one is treated as one.
pub fn pagination_entries(page: i64, total_pages: i64) -> Vec<DataEntry> {
    let total_pages = total_pages.max(1);
    vec![
        DataEntry::number("page", page),
        DataEntry::number("totalPages", total_pages),
        DataEntry::number("prevPage", (page - 1).max(1)),
        DataEntry::number("nextPage", (page + 1).min(total_pages)),
        DataEntry::string("info", format!("第 {page} 页 / 共 {total_pages} 页")),
    ]
}

pub fn ticket_detail(
    builder: &mut SurfaceBuilder,
    ticket: &Ticket,
    attachments: &[Attachment],
    history: &[HistoryEntry],
    all_tags: &[Tag],
) -> PageOutput {
    let ticket_id = ticket.id.as_str();
    let on_ticket = |action: &str| {
        Action::new(action).with_context("id", BoundValue::string(ticket_id))
    };

    builder
        .text_button(
            "detail-back-btn",
            "← 返回列表",
            Action::navigate("/tickets"),
        )
        .heading(
            "detail-title",
            BoundValue::path("/app/ticket/detail/title"),
            UsageHint::H1,
        )
        .text_button(
            "detail-edit-btn",
            "编辑",
            Action::navigate(format!("/tickets/{ticket_id}/edit")),
        )
        .text_button(
            "detail-delete-btn",
            "删除",
            on_ticket("show_delete_dialog"),
        );

    builder
        .heading("delete-modal-title", "确认删除", UsageHint::H3)
        .text("delete-modal-desc", "确定要删除这个票据吗？此操作无法撤销。")
        .text_button("delete-modal-cancel", "取消", Action::new("dismiss_dialog"))
        .text_button(
            "delete-modal-confirm",
            "确认删除",
            on_ticket("delete_ticket"),
        )
        .row(
            "delete-modal-actions",
            ["delete-modal-cancel", "delete-modal-confirm"],
            Layout::distributed(Distribution::End),
        )
        .column(
            "delete-modal-content",
            [
                "delete-modal-title",
                "delete-modal-desc",
                "delete-modal-actions",
            ],
            PLAIN,
        )
        .modal(
            "detail-delete-modal",
            "detail-delete-btn",
            "delete-modal-content",
        )
        .row(
            "detail-actions",
            ["detail-edit-btn", "detail-delete-modal"],
            CENTERED,
        )
        .row(
            "detail-header",
            ["detail-back-btn", "detail-title", "detail-actions"],
            SPREAD,
        );

    section(
        builder,
        "detail-desc",
        "描述",
        &[("detail-desc-content", "/app/ticket/detail/description")],
    );
    let has_resolution = ticket
        .resolution
        .as_deref()
        .is_some_and(|r| !r.trim().is_empty());
    if has_resolution {
        section(
            builder,
            "detail-resolution",
            "处理结果",
            &[("detail-resolution-content", "/app/ticket/detail/resolution")],
        );
    }

    let mut status_buttons = Vec::new();
    for target in ticket.status.allowed_transitions() {
        let id = format!("status-btn-{}", target.as_str());
        builder.text_button(
            id.clone(),
            format!("→ {}", target.label()),
            on_ticket("change_status").with_context("status", BoundValue::string(target.as_str())),
        );
        status_buttons.push(id);
    }
    builder
        .heading("detail-status-label", "状态", UsageHint::H4)
        .text(
            "detail-status-value",
            BoundValue::path("/app/ticket/detail/statusLabel"),
        )
        .row("detail-status-btns", status_buttons, CENTERED)
        .column(
            "detail-status-col",
            [
                "detail-status-label",
                "detail-status-value",
                "detail-status-btns",
            ],
            PLAIN,
        )
        .card("detail-status-card", "detail-status-col");

    section(
        builder,
        "detail-priority",
        "优先级",
        &[("detail-priority-value", "/app/ticket/detail/priorityLabel")],
    );

    builder
        .heading("detail-tags-label", "标签", UsageHint::H4)
        .text("detail-tag-name", BoundValue::path("name"))
        .text_button(
            "detail-tag-remove",
            "×",
            on_ticket("remove_ticket_tag").with_context("tag_id", BoundValue::path("id")),
        )
        .row(
            "detail-tag-item",
            ["detail-tag-name", "detail-tag-remove"],
            CENTERED,
        )
        .template_list(
            "detail-tags-list",
            "detail-tag-item",
            DETAIL_TAGS,
            Direction::Horizontal,
        )
        .text("detail-tags-add-label", "添加标签")
        .text_button(
            "detail-tag-add",
            BoundValue::path("name"),
            on_ticket("add_ticket_tag").with_context("tag_id", BoundValue::path("id")),
        )
        .template_list(
            "detail-tags-available",
            "detail-tag-add",
            DETAIL_AVAILABLE_TAGS,
            Direction::Horizontal,
        )
        .column(
            "detail-tags-col",
            [
                "detail-tags-label",
                "detail-tags-list",
                "detail-tags-add-label",
                "detail-tags-available",
            ],
            PLAIN,
        )
        .card("detail-tags-card", "detail-tags-col");

    let labelled_row = Layout::distributed(Distribution::SpaceBetween);
    builder
        .heading("detail-time-label", "时间信息", UsageHint::H4)
        .text("detail-created-label", "创建时间")
        .text(
            "detail-created-value",
            BoundValue::path("/app/ticket/detail/created_at"),
        )
        .row(
            "detail-created-row",
            ["detail-created-label", "detail-created-value"],
            labelled_row,
        )
        .text("detail-updated-label", "更新时间")
        .text(
            "detail-updated-value",
            BoundValue::path("/app/ticket/detail/updated_at"),
        )
        .row(
            "detail-updated-row",
            ["detail-updated-label", "detail-updated-value"],
            labelled_row,
        )
        .column(
            "detail-time-col",
            ["detail-time-label", "detail-created-row", "detail-updated-row"],
            PLAIN,
        )
        .card("detail-time-card", "detail-time-col");

    builder
        .heading("detail-attach-label", "附件", UsageHint::H4)
        .text("detail-attach-filename", BoundValue::path("filename"))
        .text("detail-attach-size", BoundValue::path("sizeFormatted"))
        .row(
            "detail-attach-info",
            ["detail-attach-filename", "detail-attach-size"],
            labelled_row,
        )
        .text_button(
            "detail-attach-download",
            "下载",
            Action::new("download_attachment").with_context("id", BoundValue::path("id")),
        )
        .row(
            "detail-attach-item",
            ["detail-attach-info", "detail-attach-download"],
            SPREAD,
        )
        .template_list(
            "detail-attach-list",
            "detail-attach-item",
            DETAIL_ATTACHMENTS,
            Direction::Vertical,
        )
        .text("detail-attach-empty", "暂无附件");
    let attachments_body = if attachments.is_empty() {
        "detail-attach-empty"
    } else {
        "detail-attach-list"
    };
    builder
        .column(
            "detail-attach-col",
            ["detail-attach-label", attachments_body],
            PLAIN,
        )
        .card("detail-attach-card", "detail-attach-col");

    builder
        .heading("detail-history-label", "变更历史", UsageHint::H4)
        .text("detail-history-type", BoundValue::path("changeTypeLabel"))
        .text("detail-history-time", BoundValue::path("created_at"))
        .text("detail-history-old", BoundValue::path("old_value"))
        .text("detail-history-arrow", "→")
        .text("detail-history-new", BoundValue::path("new_value"))
        .row(
            "detail-history-change",
            [
                "detail-history-old",
                "detail-history-arrow",
                "detail-history-new",
            ],
            CENTERED,
        )
        .column(
            "detail-history-item",
            [
                "detail-history-type",
                "detail-history-time",
                "detail-history-change",
            ],
            PLAIN,
        )
        .template_list(
            "detail-history-list",
            "detail-history-item",
            DETAIL_HISTORY,
            Direction::Vertical,
        )
        .column(
            "detail-history-col",
            ["detail-history-label", "detail-history-list"],
            PLAIN,
        )
        .card("detail-history-card", "detail-history-col");

    let mut main_cards = vec!["detail-desc-card"];
    if has_resolution {
        main_cards.push("detail-resolution-card");
    }
    main_cards.push("detail-attach-card");
    builder
        .column("detail-main", main_cards, PLAIN)
        .column(
            "detail-sidebar",
            [
                "detail-status-card",
                "detail-priority-card",
                "detail-tags-card",
                "detail-time-card",
                "detail-history-card",
            ],
            PLAIN,
        )
        .row(
            "detail-body",
            ["detail-main", "detail-sidebar"],
            Layout::distributed(Distribution::Start),
        )
        .column("detail-page", ["detail-header", "detail-body"], PLAIN);

    let detail: Vec<(&str, ModelValue)> = vec![
        ("id", ticket.id.as_str().into()),
        ("title", ticket.title.as_str().into()),
        (
            "description",
            ticket
                .description
                .as_deref()
                .filter(|d| !d.is_empty())
                .unwrap_or(NO_DESCRIPTION)
                .into(),
        ),
        ("status", ticket.status.as_str().into()),
        ("statusLabel", ticket.status.label().into()),
        ("priority", ticket.priority.as_str().into()),
        ("priorityLabel", ticket.priority.label().into()),
        (
            "resolution",
            ticket.resolution.as_deref().unwrap_or_default().into(),
        ),
        ("created_at", date_time(&ticket.created_at).into()),
        ("updated_at", date_time(&ticket.updated_at).into()),
    ];
    let available = all_tags
        .iter()
        .filter(|tag| !ticket.tags.iter().any(|own| own.id == tag.id));

    PageOutput::new("detail-page")
        .with_data(DETAIL, value_map_from_entries(detail))
        .with_data(DETAIL_TAGS, indexed_maps("tag", &ticket.tags, tag_fields))
        .with_data(
            DETAIL_AVAILABLE_TAGS,
            indexed_maps("tag", available, tag_fields),
        )
        .with_data(
            DETAIL_ATTACHMENTS,
            indexed_maps("att", attachments, |att| {
                vec![
                    ("id", att.id.as_str().into()),
                    ("filename", att.filename.as_str().into()),
                    ("sizeFormatted", att.size_formatted().into()),
                ]
            }),
        )
        .with_data(
            DETAIL_HISTORY,
            indexed_maps("h", history, |entry| {
                vec![
                    ("changeTypeLabel", change_type_label(&entry.change_type).into()),
                    ("old_value", or_dash(entry.old_value.as_deref()).into()),
                    ("new_value", or_dash(entry.new_value.as_deref()).into()),
                    ("created_at", date_time(&entry.created_at).into()),
                ]
            }),
        )
}

pub fn ticket_create(builder: &mut SurfaceBuilder, tags: &[Tag]) -> PageOutput {
    builder
        .text_button(
            "create-back-btn",
            "← 返回列表",
            Action::navigate("/tickets"),
        )
        .heading("create-title", "新建票据", UsageHint::H1)
        .row("create-header", ["create-back-btn", "create-title"], CENTERED);

    ticket_form_fields(builder, "create", CREATE_FORM);
    let options = tags
        .iter()
        .map(|tag| SelectOption {
            id: tag.id.clone(),
            name: tag.name.clone(),
            color: Some(tag.color.clone()),
        })
        .collect();
    builder
        .heading("create-tags-label", "标签", UsageHint::H4)
        .multi_select(
            "create-tags-select",
            "选择标签",
            options,
            format!("{CREATE_FORM}/tag_ids"),
            None,
        )
        .column(
            "create-form-fields",
            [
                "create-title-label",
                "create-title-input",
                "create-desc-label",
                "create-desc-input",
                "create-priority-label",
                "create-priority-btns",
                "create-tags-label",
                "create-tags-select",
            ],
            PLAIN,
        );

    form_actions(
        builder,
        "create",
        "/tickets",
        "创建票据",
        Action::new("create_ticket").with_context("form", BoundValue::path(CREATE_FORM)),
    );

    PageOutput::new("create-page")
        .with_data(
            CREATE_FORM,
            vec![
                DataEntry::string("title", ""),
                DataEntry::string("description", ""),
                DataEntry::string("priority", Priority::default().as_str()),
                DataEntry::string("tag_ids", ""),
            ],
        )
        .with_data(CREATE_TAG_OPTIONS, indexed_maps("tag", tags, tag_fields))
}

pub fn ticket_edit(builder: &mut SurfaceBuilder, ticket: &Ticket) -> PageOutput {
    let detail_path = format!("/tickets/{}", ticket.id);
    builder
        .text_button(
            "edit-back-btn",
            "← 返回详情",
            Action::navigate(detail_path.as_str()),
        )
        .heading("edit-title", "编辑票据", UsageHint::H1)
        .row("edit-header", ["edit-back-btn", "edit-title"], CENTERED);

    ticket_form_fields(builder, "edit", EDIT_FORM);
    builder.column(
        "edit-form-fields",
        [
            "edit-title-label",
            "edit-title-input",
            "edit-desc-label",
            "edit-desc-input",
            "edit-priority-label",
            "edit-priority-btns",
        ],
        PLAIN,
    );

    form_actions(
        builder,
        "edit",
        &detail_path,
        "保存更改",
        Action::new("update_ticket")
            .with_context("id", BoundValue::string(ticket.id.as_str()))
            .with_context("form", BoundValue::path(EDIT_FORM)),
    );

    PageOutput::new("edit-page").with_data(
        EDIT_FORM,
        vec![
            DataEntry::string("title", ticket.title.as_str()),
            DataEntry::string("description", ticket.description.clone().unwrap_or_default()),
            DataEntry::string("priority", ticket.priority.as_str()),
        ],
    )
}

/// Title, description and priority inputs shared by the create and edit
/// forms, bound under `form_path`.
fn ticket_form_fields(builder: &mut SurfaceBuilder, prefix: &str, form_path: &str) {
    builder
        .heading(format!("{prefix}-title-label"), "标题 *", UsageHint::H4)
        .text_field(
            format!("{prefix}-title-input"),
            "请输入票据标题",
            Some(BoundValue::path(format!("{form_path}/title"))),
            None,
        )
        .heading(format!("{prefix}-desc-label"), "描述", UsageHint::H4)
        .text_field(
            format!("{prefix}-desc-input"),
            "请输入详细描述...",
            Some(BoundValue::path(format!("{form_path}/description"))),
            Some(TextFieldType::Multiline),
        )
        .heading(format!("{prefix}-priority-label"), "优先级", UsageHint::H4);

    let mut buttons = Vec::new();
    for priority in Priority::ALL {
        let id = format!("{prefix}-priority-{}", priority.as_str());
        builder.text_button(
            id.clone(),
            priority.label(),
            Action::new("set_form_priority")
                .with_context("priority", BoundValue::string(priority.as_str())),
        );
        buttons.push(id);
    }
    builder.row(format!("{prefix}-priority-btns"), buttons, CENTERED);
}

fn form_actions(
    builder: &mut SurfaceBuilder,
    prefix: &str,
    cancel_to: &str,
    submit_label: &str,
    submit: Action,
) {
    let cancel = format!("{prefix}-cancel-btn");
    let submit_id = format!("{prefix}-submit-btn");
    let actions = format!("{prefix}-actions");
    let form = format!("{prefix}-form");
    let card = format!("{prefix}-form-card");
    builder
        .divider(format!("{prefix}-divider"))
        .text_button(cancel.clone(), "取消", Action::navigate(cancel_to))
        .text_button(submit_id.clone(), submit_label, submit)
        .row(actions.clone(), [cancel, submit_id], END)
        .column(
            form.clone(),
            [
                format!("{prefix}-form-fields"),
                format!("{prefix}-divider"),
                actions,
            ],
            PLAIN,
        )
        .card(card.clone(), form)
        .column(
            format!("{prefix}-page"),
            [format!("{prefix}-header"), card],
            PLAIN,
        );
}

/// Card with an h4 label over path-bound texts: `<prefix>-label`,
/// `<prefix>-col`, `<prefix>-card`.
fn section(builder: &mut SurfaceBuilder, prefix: &str, label: &str, values: &[(&str, &str)]) {
    let label_id = format!("{prefix}-label");
    builder.heading(label_id.clone(), label, UsageHint::H4);
    let mut children = vec![label_id];
    for (id, path) in values {
        builder.text(*id, BoundValue::path(*path));
        children.push(id.to_string());
    }
    builder
        .column(format!("{prefix}-col"), children, PLAIN)
        .card(format!("{prefix}-card"), format!("{prefix}-col"));
}

fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}
