//! HTTP surface: websocket endpoint, session-minting redirect, and static
//! assets.
//!
//! Everything here is thin plumbing around the [`Gateway`]: one task per
//! websocket connection parses inbound envelopes and feeds them to the
//! gateway, while a second task pumps the connection's outbound channel
//! into the socket.

use crate::gateway::{Binding, Gateway};
use crate::wire::{ClientEvent, ServerEvent};
use axum::Router;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect};
use axum::routing::get;
use futures::{SinkExt, StreamExt};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use uuid::Uuid;

use crate::gateway::PeerHandle;

#[derive(Clone)]
struct AppState {
    gateway: Gateway,
    assets: PathBuf,
}

/// Builds the application router.
pub fn router(gateway: Gateway, assets: PathBuf) -> Router {
    let state = AppState {
        gateway,
        assets: assets.clone(),
    };

    Router::new()
        .route("/", get(new_session))
        .route("/game/{session_id}", get(game_page))
        .route("/ws", get(ws_handler))
        .fallback_service(ServeDir::new(assets))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Mints a session and sends the browser to its game page.
async fn new_session(State(state): State<AppState>) -> Redirect {
    let session_id = state.gateway.registry().create();
    Redirect::to(&format!("/game/{session_id}"))
}

/// Serves the client page for any session URL; the page itself joins over
/// the websocket.
async fn game_page(
    State(state): State<AppState>,
    Path(_session_id): Path<String>,
) -> impl IntoResponse {
    match tokio::fs::read_to_string(state.assets.join("index.html")).await {
        Ok(body) => Html(body).into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "index.html not found").into_response(),
    }
}

async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state.gateway, socket))
}

/// Runs one connection: envelope parsing inbound, channel pump outbound,
/// disconnect transition on the way out.
async fn handle_socket(gateway: Gateway, socket: WebSocket) {
    let conn_id = Uuid::new_v4();
    info!(conn = %conn_id, "websocket connected");

    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();
    let peer = PeerHandle::new(conn_id, tx);

    let writer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let Ok(text) = serde_json::to_string(&event) else {
                continue;
            };
            if ws_tx.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    let mut binding: Option<Binding> = None;
    while let Some(Ok(message)) = ws_rx.next().await {
        let Message::Text(text) = message else {
            continue;
        };
        match serde_json::from_str::<ClientEvent>(&text) {
            Ok(event) => gateway.handle(&peer, &mut binding, event),
            Err(err) => debug!(conn = %conn_id, %err, "dropping malformed envelope"),
        }
    }

    info!(conn = %conn_id, "websocket closed");
    gateway.handle_disconnect(conn_id, binding);
    writer.abort();
}
