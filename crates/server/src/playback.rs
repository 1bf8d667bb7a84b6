//! Timer side of playback.
//!
//! The core sequencer decides *whether* a tick is due; this module owns the
//! one tokio timer per connection that delivers it. The scheduler keeps at
//! most one pending sleep, tagged with the sequencer generation it belongs to.

use std::future;
use std::pin::Pin;
use std::time::Duration;

use chess_core::playback::PlaybackState;
use chess_core::{Command, GameSession, GameSnapshot, Sequencer, Update};
use serde::Serialize;
use tokio::time::Sleep;

/// Server → Client messages
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    Snapshot {
        state: PlaybackState,
        progress: u8,
        snapshot: GameSnapshot,
    },
    State {
        state: PlaybackState,
        delay_ms: u64,
    },
    Error {
        message: String,
    },
}

impl ServerMessage {
    pub fn snapshot(session: &GameSession, snapshot: GameSnapshot) -> Self {
        ServerMessage::Snapshot {
            state: session.state(),
            progress: session.sequencer().progress_percent(),
            snapshot,
        }
    }

    pub fn state(session: &GameSession) -> Self {
        ServerMessage::State {
            state: session.state(),
            delay_ms: session.delay().as_millis() as u64,
        }
    }
}

#[derive(Default)]
pub struct TickScheduler {
    pending: Option<(u64, Pin<Box<Sleep>>)>,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any pending tick with one for `generation` after `delay`.
    pub fn schedule(&mut self, generation: u64, delay: Duration) {
        self.pending = Some((generation, Box::pin(tokio::time::sleep(delay))));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn pending_generation(&self) -> Option<u64> {
        self.pending.as_ref().map(|(generation, _)| *generation)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Bring the timer in line with the sequencer: one tick while playing,
    /// none while stopped.
    pub fn sync(&mut self, sequencer: &Sequencer) {
        if !sequencer.is_playing() {
            self.cancel();
            return;
        }
        let generation = sequencer.generation();
        if self.pending_generation() != Some(generation) {
            self.schedule(generation, sequencer.delay());
        }
    }

    /// Wait for the pending tick and return its generation.
    ///
    /// Never resolves while nothing is scheduled. Dropping the future keeps
    /// the tick pending.
    pub async fn fired(&mut self) -> u64 {
        let Some((generation, sleep)) = self.pending.as_mut() else {
            return future::pending().await;
        };
        sleep.as_mut().await;
        let generation = *generation;
        self.pending = None;
        generation
    }
}

/// Apply one client message. Returns the reply to send, if any.
pub fn handle_text(
    session: &mut GameSession,
    ticks: &mut TickScheduler,
    text: &str,
) -> Option<ServerMessage> {
    let command: Command = match serde_json::from_str(text) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Invalid playback message: {e}");
            return Some(ServerMessage::Error {
                message: format!("Invalid message: {}", e),
            });
        }
    };

    let update = session.execute(command);
    ticks.sync(session.sequencer());
    match update {
        Update::Snapshot(snapshot) => Some(ServerMessage::snapshot(session, snapshot)),
        Update::State => Some(ServerMessage::state(session)),
        Update::Ignored => None,
    }
}

/// Deliver a fired tick. Stale ticks produce nothing.
pub fn handle_tick(
    session: &mut GameSession,
    ticks: &mut TickScheduler,
    generation: u64,
) -> Option<ServerMessage> {
    let snapshot = session.tick(generation);
    ticks.sync(session.sequencer());
    snapshot.map(|s| ServerMessage::snapshot(session, s))
}
