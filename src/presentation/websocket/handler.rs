//! WebSocket Connection Handler
//!
//! Runs one gateway connection. It authenticates at handshake, auto-joins
//! the user and role channels, then serves heartbeats and Join/Leave until
//! the client goes away or stops heartbeating.

use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::time::interval;
use uuid::Uuid;

use super::gateway::GatewayError;
use super::messages::{
    AckPayload, ChannelRequest, GatewayReceive, GatewaySend, OpCode, ReadyPayload,
};
use super::session::SessionState;
use crate::application::events::Channel;
use crate::application::services::Identity;
use crate::infrastructure::metrics;
use crate::startup::AppState;

/// Handshake query parameters
#[derive(Debug, Deserialize)]
pub struct GatewayQuery {
    pub token: Option<String>,
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<GatewayQuery>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
) -> Response {
    // Header wins over the query parameter
    let token = bearer
        .map(|TypedHeader(Authorization(b))| b.token().to_string())
        .or(query.token);

    ws.max_message_size(state.settings.websocket.max_message_size)
        .on_upgrade(move |socket| handle_socket(socket, state, token))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState, token: Option<String>) {
    let session_id = Uuid::new_v4().to_string();
    let mut session = SessionState::new(session_id.clone());

    tracing::debug!(session_id = %session_id, "New WebSocket connection");

    let (mut sink, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<GatewaySend>(state.settings.websocket.outbound_buffer);

    // Forward queued frames to the socket; close it once every sender is gone
    let sender_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let text = match serde_json::to_string(&frame) {
                Ok(t) => t,
                Err(e) => {
                    tracing::error!("Failed to serialize frame: {}", e);
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                return;
            }
        }
        let _ = sink.send(Message::Close(None)).await;
    });

    let heartbeat_interval_ms = state.gateway.heartbeat_interval();
    if tx.send(GatewaySend::hello(heartbeat_interval_ms)).await.is_err() {
        sender_task.abort();
        return;
    }

    let identity = match authenticate(&mut session, &state, token.as_deref()) {
        Ok(identity) => identity,
        Err(e) => {
            tracing::info!(session_id = %session_id, error = %e, "Gateway handshake rejected");
            let _ = tx.send(GatewaySend::invalid_session()).await;
            session.disconnect();
            drop(tx);
            let _ = sender_task.await;
            return;
        }
    };

    let channels = state
        .gateway
        .register_session(&session_id, identity, tx.clone());
    metrics::gateway_connected();

    let ready = ReadyPayload {
        session_id: session_id.clone(),
        user_id: identity.user_id,
        role: identity.role,
        channels: channels.iter().map(ToString::to_string).collect(),
    };
    let delivered = serde_json::to_value(ready)
        .map_err(|e| GatewayError::Protocol(e.to_string()))
        .and_then(|payload| state.gateway.dispatch_to_session(&session_id, "READY", payload));
    if let Err(e) = delivered {
        tracing::warn!(session_id = %session_id, error = %e, "Failed to send READY");
    }

    tracing::info!(
        user_id = %identity.user_id,
        session_id = %session_id,
        "User connected"
    );

    let liveness_ms = heartbeat_interval_ms + state.settings.websocket.heartbeat_grace_ms;
    let mut heartbeat_check = interval(Duration::from_millis(liveness_ms));
    heartbeat_check.tick().await; // first tick fires immediately

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Err(e) = handle_frame(&text, &mut session, identity, &tx, &state).await {
                            tracing::debug!(session_id = %session_id, error = %e, "Bad frame");
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::debug!(session_id = %session_id, "Connection closed");
                        break;
                    }
                    Some(Err(e)) => {
                        tracing::debug!(session_id = %session_id, error = %e, "WebSocket error");
                        break;
                    }
                    _ => {}
                }
            }

            _ = heartbeat_check.tick() => {
                if !session.is_alive(liveness_ms) {
                    tracing::info!(session_id = %session_id, "Heartbeat timeout, closing connection");
                    break;
                }
            }
        }
    }

    state.gateway.unregister_session(&session_id);
    metrics::gateway_disconnected();
    session.disconnect();
    drop(tx);
    let _ = sender_task.await;

    tracing::info!(
        user_id = %identity.user_id,
        session_id = %session_id,
        "User disconnected"
    );
}

fn authenticate(
    session: &mut SessionState,
    state: &AppState,
    token: Option<&str>,
) -> Result<Identity, GatewayError> {
    session.begin_authentication()?;

    let verified = token
        .ok_or_else(|| GatewayError::Protocol("missing credential".into()))
        .and_then(|t| {
            state
                .verifier
                .verify(t)
                .map_err(|e| GatewayError::Protocol(e.to_string()))
        });

    match verified {
        Ok(identity) => {
            session.authenticated(identity)?;
            Ok(identity)
        }
        Err(e) => {
            session.reject()?;
            Err(e)
        }
    }
}

/// Handle one client frame
async fn handle_frame(
    text: &str,
    session: &mut SessionState,
    identity: Identity,
    tx: &mpsc::Sender<GatewaySend>,
    state: &AppState,
) -> Result<(), GatewayError> {
    let frame: GatewayReceive =
        serde_json::from_str(text).map_err(|e| GatewayError::Protocol(e.to_string()))?;

    let reply = match OpCode::from_u8(frame.op) {
        Some(OpCode::Heartbeat) => {
            session.heartbeat();
            tracing::trace!(session_id = %session.session_id, "Heartbeat received");
            GatewaySend::heartbeat_ack()
        }
        Some(op @ (OpCode::Join | OpCode::Leave)) => {
            let request = frame
                .d
                .and_then(|d| serde_json::from_value::<ChannelRequest>(d).ok());
            let Some(request) = request else {
                send(tx, GatewaySend::ack(AckPayload::failure(op, None, "application_id required"))).await;
                return Err(GatewayError::Protocol("malformed channel request".into()));
            };
            GatewaySend::ack(channel_request(op, request.application_id, session, identity, state).await)
        }
        _ => {
            return Err(GatewayError::Protocol(format!("unsupported opcode {}", frame.op)));
        }
    };

    send(tx, reply).await;
    Ok(())
}

async fn channel_request(
    op: OpCode,
    application_id: Uuid,
    session: &SessionState,
    identity: Identity,
    state: &AppState,
) -> AckPayload {
    let channel = Channel::Application(application_id);

    if op == OpCode::Leave {
        let changed = state.gateway.leave(&session.session_id, &channel);
        return AckPayload::success(op, application_id, changed);
    }

    match state
        .lifecycle
        .authorize_viewer(application_id, identity.user_id)
        .await
    {
        Ok(_) => {
            let changed = state.gateway.join(&session.session_id, channel);
            AckPayload::success(op, application_id, changed)
        }
        Err(e) => {
            tracing::debug!(
                session_id = %session.session_id,
                application_id = %application_id,
                error = %e,
                "Join refused"
            );
            AckPayload::failure(op, Some(application_id), e.to_string())
        }
    }
}

async fn send(tx: &mpsc::Sender<GatewaySend>, frame: GatewaySend) {
    if tx.send(frame).await.is_err() {
        tracing::debug!("Outbound queue closed");
    }
}
