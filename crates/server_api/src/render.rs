//! One render cycle: resolve the page, fetch what it needs, assemble it and
//! emit `surfaceUpdate`, the data updates, then `beginRendering`.

use std::collections::HashMap;

use backend_client::BackendError;
use shared::{builder::SurfaceBuilder, domain::Tag, protocol::Message};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    pages::{error, layout, tags, tickets, PageOutput},
    route::{ListQuery, PageRoute},
    ApiContext,
};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Messages for `path`. Failures never escape: they become the error page,
/// assembled on a fresh builder.
pub async fn render_page(
    ctx: &ApiContext,
    path: &str,
    params: &HashMap<String, String>,
) -> Vec<Message> {
    let route = PageRoute::resolve(path);
    debug!(path, ?route, "rendering page");
    match build_route(ctx, &route, params).await {
        Ok(messages) => messages,
        Err(err) => {
            warn!(path, error = %err, "page build failed");
            error_messages(ctx, &err.to_string())
        }
    }
}

async fn build_route(
    ctx: &ApiContext,
    route: &PageRoute,
    params: &HashMap<String, String>,
) -> Result<Vec<Message>, RenderError> {
    let mut builder = SurfaceBuilder::new(ctx.surface_id.clone());
    let output = match route {
        PageRoute::TicketList => {
            let query = ListQuery::from_params(params);
            let page = ctx
                .backend
                .list_tickets(&query.to_ticket_query(ctx.page_size))
                .await?;
            tickets::ticket_list(&mut builder, &page, &query)
        }
        PageRoute::TicketCreate => {
            let (all_tags, warning) = optional_tags(ctx).await;
            with_warning(tickets::ticket_create(&mut builder, &all_tags), warning)
        }
        PageRoute::TicketEdit(id) => {
            let ticket = ctx.backend.get_ticket(id).await?;
            tickets::ticket_edit(&mut builder, &ticket)
        }
        PageRoute::TicketDetail(id) => {
            let backend = &ctx.backend;
            let (core, (all_tags, warning)) = tokio::join!(
                async {
                    tokio::try_join!(
                        backend.get_ticket(id),
                        backend.list_attachments(id),
                        backend.get_ticket_history(id),
                    )
                },
                optional_tags(ctx),
            );
            let (ticket, attachments, history) = core?;
            let output = tickets::ticket_detail(
                &mut builder,
                &ticket,
                &attachments,
                &history.data,
                &all_tags,
            );
            with_warning(output, warning)
        }
        PageRoute::Tags => {
            let all_tags = ctx.backend.list_tags().await?;
            tags::tags_page(&mut builder, &all_tags)
        }
        PageRoute::NotFound => error::not_found(&mut builder),
    };
    Ok(assemble(&mut builder, output))
}

/// Tag choices are an enhancement on the create and detail pages; losing
/// them degrades the page instead of failing it.
async fn optional_tags(ctx: &ApiContext) -> (Vec<Tag>, Option<String>) {
    match ctx.backend.list_tags().await {
        Ok(all_tags) => (all_tags, None),
        Err(err) => (Vec::new(), Some(format!("tag list unavailable: {err}"))),
    }
}

fn with_warning(output: PageOutput, warning: Option<String>) -> PageOutput {
    match warning {
        Some(warning) => output.with_warning(warning),
        None => output,
    }
}

fn assemble(builder: &mut SurfaceBuilder, output: PageOutput) -> Vec<Message> {
    for warning in &output.warnings {
        warn!(surface_id = builder.surface_id(), %warning, "page degraded");
    }
    let root = layout::app_layout(builder, &output.root);
    let mut messages = Vec::with_capacity(output.data.len() + 2);
    messages.push(builder.build_surface_update());
    messages.extend(
        output
            .data
            .into_iter()
            .map(|patch| builder.build_data_model_update(patch.path, patch.contents)),
    );
    messages.push(builder.build_begin_rendering(root));
    messages
}

fn error_messages(ctx: &ApiContext, message: &str) -> Vec<Message> {
    let mut builder = SurfaceBuilder::new(ctx.surface_id.clone());
    let output = error::error_page(&mut builder, message);
    assemble(&mut builder, output)
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
