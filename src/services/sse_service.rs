//! Bridges store subscriptions to SSE responses. Each connection gets a
//! forwarder task reading from the store-side channel and pushing encoded
//! events through a small bounded channel into the response stream; when the
//! client disconnects axum drops the stream and the forwarder winds down.

use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use serde_json::Value;
use tokio::sync::{
    broadcast::error::RecvError,
    mpsc,
    watch,
};
use tokio_stream::wrappers::ReceiverStream;

use crate::{
    dao::doc_store::CollectionChange,
    dto::sse::ServerEvent,
};

/// Convert a per-document watch subscription into an SSE response. The
/// current snapshot is encoded and sent before waiting for changes, so a new
/// subscriber is immediately consistent.
pub fn doc_stream<F>(
    mut receiver: watch::Receiver<Option<Value>>,
    mut encode: F,
    label: &'static str,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    F: FnMut(Option<Value>) -> Option<ServerEvent> + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        loop {
            let snapshot = receiver.borrow_and_update().clone();
            if let Some(payload) = encode(snapshot)
                && tx.send(Ok(to_event(payload))).await.is_err()
            {
                break;
            }

            tokio::select! {
                _ = tx.closed() => break,
                changed = receiver.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        tracing::info!(stream = label, "SSE document stream disconnected");
    });

    sse_response(rx)
}

/// Convert a collection change feed into an SSE response. Lagged receivers
/// skip the missed changes but keep the stream alive.
pub fn feed_stream<F>(
    mut receiver: tokio::sync::broadcast::Receiver<CollectionChange>,
    mut encode: F,
    label: &'static str,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    F: FnMut(CollectionChange) -> Option<ServerEvent> + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(change) => {
                            if let Some(payload) = encode(change)
                                && tx.send(Ok(to_event(payload))).await.is_err()
                            {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(_)) => {
                            // Skip lagged messages but keep the stream alive.
                            continue;
                        }
                    }
                }
            }
        }
        tracing::info!(stream = label, "SSE feed stream disconnected");
    });

    sse_response(rx)
}

fn to_event(payload: ServerEvent) -> Event {
    let mut event = Event::default().data(payload.data);
    if let Some(name) = payload.event {
        event = event.event(name);
    }
    event
}

fn sse_response(
    rx: mpsc::Receiver<Result<Event, Infallible>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
