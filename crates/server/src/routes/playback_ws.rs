//! WebSocket playback route.
//!
//! One connection drives one game: the client sends playback commands and the
//! server answers with snapshots, pushing a new one on every timer tick while
//! playing.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path,
    },
    response::IntoResponse,
    Extension,
};
use chess_core::GameSession;
use futures::{SinkExt, StreamExt};

use crate::config::Config;
use crate::error::AppError;
use crate::playback::{handle_text, handle_tick, ServerMessage, TickScheduler};
use crate::store::GameStore;

/// GET /ws/playback/{id}/{game}
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Extension(store): Extension<Arc<GameStore>>,
    Extension(config): Extension<Config>,
    Path((id, game)): Path<(u64, usize)>,
) -> Result<impl IntoResponse, AppError> {
    let stored = store
        .get(id)?
        .ok_or(AppError::NotFound("Library not found".into()))?;

    let mut library = stored.library.clone();
    if !library.select(game) {
        return Err(AppError::NotFound("Game not found".into()));
    }
    let session = GameSession::from_library(library, config.playback_delay);
    tracing::info!("Playback connection for library {id} game {game}");

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, session)))
}

async fn handle_socket(socket: WebSocket, mut session: GameSession) {
    let (mut sender, mut receiver) = socket.split();
    let mut ticks = TickScheduler::new();

    let initial = session.snapshot();
    if send_msg(&mut sender, &ServerMessage::snapshot(&session, initial))
        .await
        .is_err()
    {
        return;
    }

    loop {
        let reply = tokio::select! {
            msg = receiver.next() => {
                let text = match msg {
                    Some(Ok(Message::Text(t))) => t.to_string(),
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!("Playback socket error: {e}");
                        break;
                    }
                    Some(Ok(_)) => continue,
                };
                handle_text(&mut session, &mut ticks, &text)
            }
            generation = ticks.fired() => {
                handle_tick(&mut session, &mut ticks, generation)
            }
        };

        if let Some(reply) = reply {
            if let Err(e) = send_msg(&mut sender, &reply).await {
                tracing::debug!("Playback client went away: {e}");
                break;
            }
        }
    }

    tracing::debug!("Playback connection closed at ply {}", session.ply());
}

async fn send_msg(
    sender: &mut futures::stream::SplitSink<WebSocket, Message>,
    msg: &ServerMessage,
) -> Result<()> {
    let json = serde_json::to_string(msg)?;
    sender.send(Message::Text(json.into())).await?;
    Ok(())
}
