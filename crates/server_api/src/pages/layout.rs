use shared::{
    builder::SurfaceBuilder,
    protocol::{Action, UsageHint},
};

use super::{CENTERED, PLAIN, SPREAD};

pub const LAYOUT_ROOT: &str = "app-layout";

/// Wraps `content_id` in the navigation shell and returns the layout root.
pub fn app_layout(builder: &mut SurfaceBuilder, content_id: &str) -> &'static str {
    builder
        .heading("nav-logo-text", "Ticket System", UsageHint::H2)
        .text_button("nav-tickets", "票据管理", Action::navigate("/tickets"))
        .text_button("nav-tags", "标签管理", Action::navigate("/tags"))
        .row("nav-items", ["nav-tickets", "nav-tags"], CENTERED)
        .row("nav-header", ["nav-logo-text", "nav-items"], SPREAD)
        .divider("divider-nav")
        .column(LAYOUT_ROOT, ["nav-header", "divider-nav", content_id], PLAIN);
    LAYOUT_ROOT
}
