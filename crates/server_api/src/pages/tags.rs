use shared::{
    builder::{Layout, SurfaceBuilder},
    data_model::DataEntry,
    domain::{Tag, DEFAULT_TAG_COLOR, TAG_COLORS},
    protocol::{Action, BoundValue, Direction, Distribution, UsageHint},
};

use super::{indexed_maps, tag_fields, PageOutput, CENTERED, PLAIN, SPREAD};

pub const TAG_FORM: &str = "/app/tags/form";
pub const PREDEFINED: &str = "/app/tags/predefined";
pub const CUSTOM: &str = "/app/tags/custom";

pub fn tags_page(builder: &mut SurfaceBuilder, tags: &[Tag]) -> PageOutput {
    builder
        .heading("tags-title", "标签管理", UsageHint::H1)
        .text_button(
            "tags-add-btn",
            "+ 新建标签",
            Action::new("show_create_tag_form"),
        )
        .row("tags-header", ["tags-title", "tags-add-btn"], SPREAD);

    builder
        .heading("tag-form-title", "新建标签", UsageHint::H3)
        .heading("tag-form-name-label", "标签名称", UsageHint::H4)
        .text_field(
            "tag-form-name-input",
            "请输入标签名称",
            Some(BoundValue::path(format!("{TAG_FORM}/name"))),
            None,
        )
        .heading("tag-form-color-label", "颜色", UsageHint::H4);

    let mut color_buttons = Vec::new();
    for (key, label, hex) in TAG_COLORS {
        let id = format!("tag-color-{key}");
        builder.text_button(
            id.clone(),
            label,
            Action::new("set_tag_color").with_context("color", BoundValue::string(hex)),
        );
        color_buttons.push(id);
    }

    builder
        .row("tag-color-btns", color_buttons, CENTERED)
        .column(
            "tag-form-fields",
            [
                "tag-form-name-label",
                "tag-form-name-input",
                "tag-form-color-label",
                "tag-color-btns",
            ],
            PLAIN,
        )
        .text_button(
            "tag-form-cancel",
            "取消",
            Action::new("hide_create_tag_form"),
        )
        .text_button(
            "tag-form-submit",
            "创建标签",
            Action::new("create_tag").with_context("form", BoundValue::path(TAG_FORM)),
        )
        .row(
            "tag-form-actions",
            ["tag-form-cancel", "tag-form-submit"],
            Layout::distributed(Distribution::End),
        )
        .column(
            "tag-form-content",
            ["tag-form-title", "tag-form-fields", "tag-form-actions"],
            PLAIN,
        )
        .card("tag-form-card", "tag-form-content");

    builder
        .heading("tags-predefined-label", "预定义标签", UsageHint::H4)
        .text("predefined-tag-name", BoundValue::path("name"))
        .template_list(
            "tags-predefined-list",
            "predefined-tag-name",
            PREDEFINED,
            Direction::Horizontal,
        )
        .column(
            "tags-predefined-section",
            ["tags-predefined-label", "tags-predefined-list"],
            PLAIN,
        )
        .card("tags-predefined-card", "tags-predefined-section");

    let (predefined, custom): (Vec<&Tag>, Vec<&Tag>) =
        tags.iter().partition(|tag| tag.is_predefined);

    builder
        .heading("tags-custom-label", "自定义标签", UsageHint::H4)
        .text("custom-tag-name", BoundValue::path("name"))
        .text_button(
            "custom-tag-delete",
            "删除",
            Action::new("delete_tag").with_context("id", BoundValue::path("id")),
        )
        .row(
            "custom-tag-item",
            ["custom-tag-name", "custom-tag-delete"],
            SPREAD,
        )
        .template_list(
            "tags-custom-list",
            "custom-tag-item",
            CUSTOM,
            Direction::Vertical,
        )
        .text("tags-custom-empty", "暂无自定义标签");
    let custom_body = if custom.is_empty() {
        "tags-custom-empty"
    } else {
        "tags-custom-list"
    };
    builder
        .column(
            "tags-custom-section",
            ["tags-custom-label", custom_body],
            PLAIN,
        )
        .card("tags-custom-card", "tags-custom-section")
        .column(
            "tags-page",
            [
                "tags-header",
                "tag-form-card",
                "tags-predefined-card",
                "tags-custom-card",
            ],
            PLAIN,
        );

    PageOutput::new("tags-page")
        .with_data(
            TAG_FORM,
            vec![
                DataEntry::string("name", ""),
                DataEntry::string("color", DEFAULT_TAG_COLOR),
            ],
        )
        .with_data(PREDEFINED, indexed_maps("tag", predefined, tag_fields))
        .with_data(CUSTOM, indexed_maps("tag", custom, tag_fields))
}
