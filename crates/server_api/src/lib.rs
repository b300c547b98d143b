//! Page rendering and user-action dispatch for the A2UI surface, independent
//! of the HTTP transport.

use std::sync::Arc;

use backend_client::TicketBackend;

pub mod actions;
pub mod pages;
pub mod render;
pub mod route;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use actions::{handle_action, ActionResponse, ActionResult, DispatchError, UiAction};
pub use render::{render_page, RenderError};

pub const DEFAULT_SURFACE_ID: &str = "main";
pub const DEFAULT_PAGE_SIZE: i64 = 20;

#[derive(Clone)]
pub struct ApiContext {
    pub backend: Arc<dyn TicketBackend>,
    pub surface_id: String,
    pub page_size: i64,
}

impl ApiContext {
    pub fn new(backend: Arc<dyn TicketBackend>) -> Self {
        Self {
            backend,
            surface_id: DEFAULT_SURFACE_ID.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_surface_id(mut self, surface_id: impl Into<String>) -> Self {
        self.surface_id = surface_id.into();
        self
    }

    pub fn with_page_size(mut self, page_size: i64) -> Self {
        self.page_size = page_size.max(1);
        self
    }
}
