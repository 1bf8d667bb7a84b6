//! Snapshot cache for sequential navigation.
//!
//! Keeps one rolling engine advanced a move at a time and remembers every
//! snapshot it produced. Results are identical to [`Replayer::replay`]; the
//! cache is thrown away as a whole when a different move list is loaded.

use tracing::{debug, warn};

use crate::error::IllegalMove;
use crate::replay::{clamp_ply, GameSnapshot, LastMove, Replayer, INITIAL_PLY};
use crate::rules::{RulesEngine, ShakmatyEngine};

#[derive(Debug)]
pub struct SnapshotCache<E = ShakmatyEngine> {
    moves: Vec<String>,
    replayer: Replayer<E>,
    /// `snapshots[k]` is the snapshot at ply `k - 1`.
    snapshots: Vec<GameSnapshot>,
    halted: Option<IllegalMove>,
}

impl SnapshotCache<ShakmatyEngine> {
    pub fn new(moves: Vec<String>) -> Self {
        Self::with_engine(ShakmatyEngine::new(), moves)
    }
}

impl<E: RulesEngine> SnapshotCache<E> {
    pub fn with_engine(engine: E, moves: Vec<String>) -> Self {
        let mut replayer = Replayer::with_engine(engine);
        let initial = replayer.replay(&moves, INITIAL_PLY);
        Self {
            moves,
            replayer,
            snapshots: vec![initial],
            halted: None,
        }
    }

    /// Replace the move list, dropping every cached snapshot.
    pub fn reload(&mut self, moves: Vec<String>) {
        let initial = self.replayer.replay(&moves, INITIAL_PLY);
        self.moves = moves;
        self.snapshots = vec![initial];
        self.halted = None;
    }

    pub fn moves(&self) -> &[String] {
        &self.moves
    }

    /// Snapshot at `target`, clamped to the sequence.
    pub fn snapshot(&mut self, target: isize) -> GameSnapshot {
        let target = clamp_ply(target, self.moves.len());
        while self.reached() < target && self.halted.is_none() {
            self.advance();
        }
        let index = (target.min(self.reached()) + 1) as usize;
        self.snapshots[index].clone()
    }

    /// Highest ply computed so far.
    fn reached(&self) -> isize {
        self.snapshots.len() as isize - 2
    }

    /// The illegal move found so far, if navigation already ran into one.
    pub fn halted(&self) -> Option<&IllegalMove> {
        self.halted.as_ref()
    }

    fn advance(&mut self) {
        let ply = self.snapshots.len() - 1;
        let mut captured = self.snapshots[ply].captured.clone();

        match self.replayer.engine_mut().apply(ply, &self.moves[ply]) {
            Ok(applied) => {
                if let Some(kind) = applied.captured {
                    captured.record(applied.color, kind);
                }
                let last_move = LastMove {
                    from: applied.from,
                    to: applied.to,
                };
                let snapshot = self
                    .replayer
                    .snapshot(ply as isize, Some(last_move), captured);
                self.snapshots.push(snapshot);
                debug!(ply, "Cached snapshot");
            }
            Err(e) => {
                warn!(error = %e, "Replay halted");
                self.halted = Some(e);
            }
        }
    }
}
