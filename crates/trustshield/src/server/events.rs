use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::server::audit::ApiAuditRecord;
use crate::server::ServerState;

pub(crate) async fn stream_events(
    State(state): State<Arc<ServerState>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let rx = state.engine.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|message| match message {
        Ok(record) => {
            let payload = ApiAuditRecord::from(&record);
            let data = serde_json::to_string(&payload).ok()?;
            Some(Ok(Event::default().event(payload.kind).data(data)))
        }
        Err(error) => {
            tracing::warn!("audit stream subscriber lagged: {error}");
            None
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
