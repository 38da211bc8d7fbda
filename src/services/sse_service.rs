use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::warn;

use crate::{
    dto::{
        phase::VisiblePhase,
        sse::{Handshake, ServerEvent},
    },
    state::SharedState,
};

const EVENT_HANDSHAKE: &str = "handshake";

/// Subscribe to the shared SSE stream.
pub fn subscribe(state: &SharedState) -> broadcast::Receiver<ServerEvent> {
    state.sse().subscribe()
}

/// First event of every stream: degraded flag and the current phase.
pub async fn handshake_event(state: &SharedState) -> Option<ServerEvent> {
    let snapshot = state.snapshot().await;
    let payload = Handshake {
        message: "score stream connected".into(),
        degraded: state.is_degraded(),
        phase: VisiblePhase::from(&snapshot),
    };
    match ServerEvent::json(Some(EVENT_HANDSHAKE.to_string()), &payload) {
        Ok(event) => Some(event),
        Err(err) => {
            warn!(error = %err, "failed to serialize SSE handshake");
            None
        }
    }
}

fn to_event(payload: ServerEvent) -> Event {
    let event = Event::default().data(payload.data);
    match payload.event {
        Some(name) => event.event(name),
        None => event,
    }
}

/// Convert a broadcast receiver into an SSE response, forwarding events and
/// stopping once the client disconnects.
pub fn to_sse_stream(
    mut receiver: broadcast::Receiver<ServerEvent>,
    first: Option<ServerEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        if let Some(payload) = first {
            if tx.send(Ok(to_event(payload))).await.is_err() {
                return;
            }
        }

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            if tx.send(Ok(to_event(payload))).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(skipped)) => {
                            // Skip lagged messages but keep the stream alive.
                            warn!(skipped, "SSE subscriber lagging; events skipped");
                            continue;
                        }
                    }
                }
            }
        }

        tracing::info!("SSE stream disconnected");
    });

    // response stream reads from mpsc; when client disconnects axum drops this stream
    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        services::sse_events,
        state::{model::AppData, testing::state_with},
    };

    #[tokio::test]
    async fn handshake_reports_degraded_idle_backend() {
        let (state, _) = state_with(AppData::default());
        let event = handshake_event(&state).await.unwrap();
        assert_eq!(event.event.as_deref(), Some("handshake"));
        let body: serde_json::Value = serde_json::from_str(&event.data).unwrap();
        assert_eq!(body["degraded"], true);
        assert_eq!(body["phase"], "no_active_round");
    }

    #[tokio::test]
    async fn subscribers_see_named_events() {
        let (state, _) = state_with(AppData::default());
        let mut receiver = subscribe(&state);
        sse_events::broadcast_players_updated(&state, 3);

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.event.as_deref(), Some("players.updated"));
        assert_eq!(event.data, r#"{"count":3}"#);
    }
}
