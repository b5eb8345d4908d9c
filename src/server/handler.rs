//! WebSocket connection lifecycle: accept, relay, clean up.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::broadcast::fan_out;
use super::dispatch::dispatch;
use super::protocol::{ClientEnvelope, ServerEvent};
use super::state::AppState;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

pub async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // Register the connection and assign its server-side identity.
    let (tx, mut rx) = mpsc::unbounded_channel();
    let player_id = state.registry.lock().await.register(tx);
    tracing::info!("new client connected: '{}'", player_id);

    // Queue the catch-up snapshot before the writer task starts draining,
    // so it is the first frame the newcomer sees. It is never broadcast.
    {
        let snapshot = state.world.lock().await.snapshot_for_newcomer();
        let init = ServerEvent::initialize(player_id, snapshot);
        if let Err(e) = state.registry.lock().await.push_to(&player_id, init.to_json()) {
            tracing::error!("failed to queue initialize for '{}': {}", player_id, e);
            cleanup(&state, player_id).await;
            return;
        }
    }
    tracing::info!("sent initialize snapshot to '{}'", player_id);

    let state_clone = state.clone();

    // Reader: decode inbound frames, mutate the world, fan events out.
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error for '{}': {}", player_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    let envelope = match ClientEnvelope::parse(&text) {
                        Ok(envelope) => envelope,
                        Err(e) => {
                            // Clients may send transient garbage; drop the
                            // frame, keep the connection open.
                            tracing::warn!(
                                "dropping unparseable frame from '{}': {}",
                                player_id,
                                e
                            );
                            continue;
                        }
                    };

                    let events = {
                        let mut world = state_clone.world.lock().await;
                        dispatch(&mut world, player_id, envelope)
                    };
                    if events.is_empty() {
                        continue;
                    }

                    let payloads: Vec<String> =
                        events.iter().map(ServerEvent::to_json).collect();
                    let targets = state_clone
                        .registry
                        .lock()
                        .await
                        .recipients(Some(player_id));
                    let delivered = fan_out(&targets, &payloads);
                    tracing::debug!(
                        "relayed {} event(s) from '{}' to {} client(s)",
                        payloads.len(),
                        player_id,
                        delivered
                    );
                }
                Message::Ping(_) => {
                    tracing::debug!("received ping");
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!("client '{}' requested close", player_id);
                    break;
                }
                _ => {}
            }
        }
    });

    // Writer: drain queued outbound messages into the socket.
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    // If any one of the tasks completes, abort the other.
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    cleanup(&state, player_id).await;
}

/// Disconnect cleanup: unregister, drop world entries, notify the rest.
///
/// Safe to call from both the error path and the close path; the idempotent
/// unregister guarantees the observable effects happen exactly once.
async fn cleanup(state: &AppState, player_id: Uuid) {
    let removed = state.registry.lock().await.unregister(&player_id);
    if !removed {
        return;
    }
    tracing::info!("client '{}' disconnected and removed from registry", player_id);

    state.world.lock().await.remove_participant(&player_id);

    let targets = state.registry.lock().await.recipients(None);
    let notice = ServerEvent::PlayerDisconnect { id: player_id }.to_json();
    let delivered = fan_out(&targets, &[notice]);
    tracing::info!(
        "broadcast disconnect for '{}', {} client(s) remain ({} reachable)",
        player_id,
        targets.len(),
        delivered
    );
}
