//! Server-sent event stream for one page view.

use std::{collections::HashMap, convert::Infallible, sync::Arc, time::Duration};

use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use server_api::{render_page, route::split_path_query, ApiContext};
use shared::protocol::Message;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error};

use crate::app_state::AppState;

const CHANNEL_CAPACITY: usize = 32;
const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// `GET /api/a2ui/stream?path=…`. The page is rendered on its own task and
/// emitted one `message` event per A2UI message.
pub(crate) async fn stream_ui(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let raw_path = params.get("path").map(String::as_str).unwrap_or("/");
    let (path, params) = split_path_query(raw_path, &params);
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    tokio::spawn(emit_page(state.api.clone(), path, params, tx));

    Sse::new(ReceiverStream::new(rx)).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL))
}

/// Renders `path` and forwards its messages in order. Stops quietly once
/// the client is gone.
pub(crate) async fn emit_page(
    api: ApiContext,
    path: String,
    params: HashMap<String, String>,
    tx: mpsc::Sender<Result<Event, Infallible>>,
) {
    let messages = render_page(&api, &path, &params).await;
    for message in messages {
        if tx.is_closed() {
            debug!(%path, "client disconnected");
            return;
        }
        let event = match message_event(&message) {
            Ok(event) => event,
            Err(err) => {
                error!(%path, error = %err, "failed to serialize message");
                continue;
            }
        };
        if tx.send(Ok(event)).await.is_err() {
            debug!(%path, "client disconnected");
            return;
        }
    }
}

fn message_event(message: &Message) -> Result<Event, serde_json::Error> {
    Ok(Event::default().event("message").data(message.to_json_line()?))
}

#[cfg(test)]
#[path = "tests/stream_tests.rs"]
mod tests;
