use shared::{
    builder::SurfaceBuilder,
    protocol::{Action, UsageHint},
};

use super::{PageOutput, CENTERED};

pub fn not_found(builder: &mut SurfaceBuilder) -> PageOutput {
    builder
        .icon("notfound-icon", "error_outline")
        .heading("notfound-title", "404", UsageHint::H1)
        .heading("notfound-subtitle", "页面未找到", UsageHint::H2)
        .text("notfound-desc", "您访问的页面不存在，请检查URL是否正确")
        .icon("notfound-home-icon", "home")
        .text("notfound-home-text", "返回首页")
        .row(
            "notfound-home-content",
            ["notfound-home-icon", "notfound-home-text"],
            CENTERED,
        )
        .button(
            "notfound-home-btn",
            "notfound-home-content",
            Action::navigate("/tickets"),
        )
        .column(
            "notfound-page",
            [
                "notfound-icon",
                "notfound-title",
                "notfound-subtitle",
                "notfound-desc",
                "notfound-home-btn",
            ],
            CENTERED,
        );
    PageOutput::new("notfound-page")
}

pub fn error_page(builder: &mut SurfaceBuilder, message: &str) -> PageOutput {
    builder
        .icon("error-icon", "error")
        .heading("error-title", "出错了", UsageHint::H1)
        .text("error-message", message)
        .icon("error-retry-icon", "refresh")
        .text("error-retry-text", "重试")
        .row(
            "error-retry-content",
            ["error-retry-icon", "error-retry-text"],
            CENTERED,
        )
        .button("error-retry-btn", "error-retry-content", Action::new("retry"))
        .icon("error-home-icon", "home")
        .text("error-home-text", "返回首页")
        .row(
            "error-home-content",
            ["error-home-icon", "error-home-text"],
            CENTERED,
        )
        .button(
            "error-home-btn",
            "error-home-content",
            Action::navigate("/tickets"),
        )
        .row("error-actions", ["error-retry-btn", "error-home-btn"], CENTERED)
        .column(
            "error-page",
            ["error-icon", "error-title", "error-message", "error-actions"],
            CENTERED,
        );
    PageOutput::new("error-page")
}

pub fn loading_state(builder: &mut SurfaceBuilder) -> PageOutput {
    builder
        .icon("loading-icon", "hourglass_empty")
        .text("loading-text", "加载中...")
        .column("loading-state", ["loading-icon", "loading-text"], CENTERED);
    PageOutput::new("loading-state")
}
