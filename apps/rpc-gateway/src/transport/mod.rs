// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Port Transport
//!
//! Each WebSocket on `/v1/connect` stands in for one runtime port.
//!
//! | Handshake part | Port field |
//! |----------------|------------|
//! | `?name=` | port name |
//! | `?tab_id=` + `?url=` | sender tab and URL (both or neither) |
//! | `Origin` header | sender origin |
//!
//! Only the `Origin` header is set by the browser; the query is chosen by the
//! caller. The port is classified with origin proof required, so a page whose
//! `url` disagrees with its `Origin` is rejected, and the origin stamped on
//! its requests is its own. Classification runs before the upgrade response
//! is returned.
//!
//! Frames are `{ "name": <substream>, "data": <payload> }` text messages,
//! handled one at a time in arrival order. Only the `metamask-provider`
//! substream reaches the RPC pipeline. Blocked and rejected ports are
//! closed without any reply frame.

use axum::{
    extract::{
        ws::{Message, WebSocketUpgrade},
        Query, State,
    },
    http::{header, HeaderMap},
    response::Response,
};
use futures::{Sink, SinkExt, Stream, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::connection::{
    Connection, ConnectionRouter, PortInfo, PortMessage, Sender, Tab, Wiring,
};
use crate::rpc::types::JSONRPC_VERSION;
use crate::rpc::{JsonRpcRequest, JsonRpcResponse, RpcError, RpcPipeline};
use crate::state::AppState;

/// Substream carrying provider JSON-RPC traffic.
pub const PROVIDER_SUBSTREAM: &str = "metamask-provider";

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectQuery {
    pub name: String,
    pub tab_id: Option<i64>,
    pub url: Option<String>,
}

impl ConnectQuery {
    /// Port description for this handshake, with `origin` taken from the
    /// `Origin` header.
    pub fn into_port(self, origin: Option<String>) -> PortInfo {
        let (tab, url) = match (self.tab_id, self.url) {
            (Some(id), Some(url)) => (Some(Tab { id }), Some(url)),
            _ => (None, None),
        };

        let sender = (origin.is_some() || tab.is_some()).then_some(Sender { origin, tab, url });

        PortInfo {
            name: self.name,
            sender,
        }
    }
}

/// WebSocket upgrade for a new port.
pub async fn connect(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<ConnectQuery>,
    headers: HeaderMap,
) -> Response {
    let origin = headers
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && *v != "null")
        .map(str::to_owned);
    let port = query.into_port(origin);
    let wiring = state.router.connect(&port).await;

    ws.on_upgrade(move |socket| {
        let (outbound, inbound) = socket.split();
        serve_port(inbound, outbound, wiring, state)
    })
}

/// Drive one classified port until the peer leaves or shutdown is requested.
async fn serve_port<R, W>(mut inbound: R, mut outbound: W, wiring: Wiring, state: AppState)
where
    R: Stream<Item = Result<Message, axum::Error>> + Unpin,
    W: Sink<Message> + Unpin,
{
    let connection = wiring.connection;

    if !connection.is_open() {
        let _ = outbound.send(Message::Close(None)).await;
        return;
    }

    if let Some(greeting) = wiring.greeting {
        if send_frame(&mut outbound, &greeting).await.is_err() {
            return;
        }
    }

    loop {
        let message = tokio::select! {
            _ = state.shutdown.cancelled() => {
                let _ = outbound.send(Message::Close(None)).await;
                break;
            }
            message = inbound.next() => message,
        };

        let text = match message {
            Some(Ok(Message::Text(text))) => text,
            Some(Ok(Message::Close(_))) | None => break,
            Some(Ok(_)) => continue,
            Some(Err(e)) => {
                debug!(connection_id = %connection.id(), error = %e, "Port read failed");
                break;
            }
        };

        let reply = handle_frame(&state.router, &state.pipeline, &connection, text.as_str()).await;
        if let Some(reply) = reply {
            if send_frame(&mut outbound, &reply).await.is_err() {
                break;
            }
        }
    }

    info!(
        connection_id = %connection.id(),
        class = connection.classification().label(),
        "Port disconnected"
    );
}

async fn send_frame<W>(outbound: &mut W, frame: &PortMessage) -> Result<(), W::Error>
where
    W: Sink<Message> + Unpin,
{
    let text = match serde_json::to_string(frame) {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "Failed to encode outbound frame");
            return Ok(());
        }
    };
    outbound.send(Message::Text(text.into())).await
}

/// Handle one inbound frame on an open connection.
///
/// Returns the frame to send back, if any.
pub async fn handle_frame(
    router: &ConnectionRouter,
    pipeline: &RpcPipeline,
    connection: &Connection,
    text: &str,
) -> Option<PortMessage> {
    let frame: PortMessage = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(e) => {
            debug!(connection_id = %connection.id(), error = %e, "Ignoring malformed frame");
            return None;
        }
    };

    router.observe(connection, &frame);

    if frame.name.as_deref() != Some(PROVIDER_SUBSTREAM) {
        return None;
    }

    let id = frame.data.get("id").cloned().unwrap_or(Value::Null);
    let response = match serde_json::from_value::<JsonRpcRequest>(frame.data) {
        Ok(mut request) => {
            request.origin = connection.origin().map(str::to_owned);
            pipeline.handle(&request).await
        }
        Err(e) => JsonRpcResponse {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(
                RpcError::InvalidRequest {
                    message: e.to_string(),
                }
                .to_error_object(),
            ),
        },
    };

    match serde_json::to_value(&response) {
        Ok(data) => Some(PortMessage::new(PROVIDER_SUBSTREAM, data)),
        Err(e) => {
            warn!(error = %e, "Failed to encode response");
            None
        }
    }
}
