//! Game library and viewer session.
//!
//! A [`GameLibrary`] is the result of one successful PGN load. A
//! [`GameSession`] puts a library behind a sequencer and routes every pointer
//! change through the snapshot cache.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cache::SnapshotCache;
use crate::error::{IllegalMove, ParseError};
use crate::evaluation::{evaluation_series, EvaluationPoint};
use crate::game_data::{GameMetadata, ParsedGame};
use crate::pgn::parse_pgn_text;
use crate::playback::{PlaybackState, Sequencer, DEFAULT_DELAY};
use crate::replay::{GameSnapshot, Replayer};

/// Short description of one game in a library.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub index: usize,
    pub display_name: String,
    pub move_count: usize,
    pub result: String,
}

/// All games from one PGN text, plus which one is active.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameLibrary {
    games: Vec<ParsedGame>,
    selected: usize,
}

impl GameLibrary {
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let games = parse_pgn_text(text)?;
        Ok(Self { games, selected: 0 })
    }

    pub fn games(&self) -> &[ParsedGame] {
        &self.games
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ParsedGame> {
        self.games.get(index)
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn active(&self) -> Option<&ParsedGame> {
        self.games.get(self.selected)
    }

    /// Make `index` the active game. Returns false when it does not exist.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.games.len() {
            return false;
        }
        self.selected = index;
        true
    }

    pub fn summaries(&self) -> Vec<GameSummary> {
        self.games
            .iter()
            .enumerate()
            .map(|(index, game)| GameSummary {
                index,
                display_name: game.metadata.display_name(),
                move_count: game.moves.len(),
                result: game.metadata.result_description().to_string(),
            })
            .collect()
    }
}

/// A playback command, as sent by a client.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    Play,
    Pause,
    Reset,
    Next,
    Previous,
    GoToStart,
    GoToEnd,
    GoToPly { ply: isize },
    SetDelay { ms: u64 },
}

/// What a command changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Update {
    /// The pointer moved; here is the new state.
    Snapshot(GameSnapshot),
    /// Only the playback state or delay changed.
    State,
    Ignored,
}

/// One viewer: a library, a sequencer and the snapshots behind it.
#[derive(Debug)]
pub struct GameSession {
    library: Option<GameLibrary>,
    sequencer: Sequencer,
    cache: SnapshotCache,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    /// A session with no game loaded.
    pub fn new() -> Self {
        Self::with_delay(DEFAULT_DELAY)
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            library: None,
            sequencer: Sequencer::with_delay(0, delay),
            cache: SnapshotCache::new(Vec::new()),
        }
    }

    /// A session over an already parsed library.
    pub fn from_library(library: GameLibrary, delay: Duration) -> Self {
        let mut session = Self::with_delay(delay);
        session.install(library);
        session
    }

    /// Parse `text` and replace the whole library with its games.
    ///
    /// On error the session keeps what it had.
    pub fn load(&mut self, text: &str) -> Result<usize, ParseError> {
        let library = GameLibrary::parse(text)?;
        let count = library.len();
        self.install(library);
        info!(games = count, "Loaded PGN");
        Ok(count)
    }

    fn install(&mut self, library: GameLibrary) {
        self.library = Some(library);
        self.activate();
    }

    /// Rebuild playback for the active game, pointer at the initial position.
    fn activate(&mut self) {
        let moves = self
            .library
            .as_ref()
            .and_then(GameLibrary::active)
            .map(|g| g.moves.clone())
            .unwrap_or_default();
        self.sequencer.restart(moves.len());
        self.cache.reload(moves);
    }

    /// Switch to another game of the library.
    pub fn select(&mut self, index: usize) -> Option<GameSnapshot> {
        let library = self.library.as_mut()?;
        if !library.select(index) {
            return None;
        }
        debug!(index, "Selected game");
        self.activate();
        Some(self.snapshot())
    }

    pub fn library(&self) -> Option<&GameLibrary> {
        self.library.as_ref()
    }

    pub fn metadata(&self) -> Option<&GameMetadata> {
        self.library
            .as_ref()
            .and_then(GameLibrary::active)
            .map(|g| &g.metadata)
    }

    pub fn moves(&self) -> &[String] {
        self.cache.moves()
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub fn ply(&self) -> isize {
        self.sequencer.ply()
    }

    pub fn state(&self) -> PlaybackState {
        self.sequencer.state()
    }

    /// Snapshot at the current pointer.
    pub fn snapshot(&mut self) -> GameSnapshot {
        self.cache.snapshot(self.sequencer.ply())
    }

    pub fn evaluation(&self) -> Vec<EvaluationPoint> {
        evaluation_series(self.moves(), self.ply())
    }

    /// First unplayable move of the active game.
    pub fn first_illegal(&self) -> Option<IllegalMove> {
        Replayer::new().first_illegal(self.moves())
    }

    pub fn execute(&mut self, command: Command) -> Update {
        debug!(?command, ply = self.ply(), "Playback command");
        match command {
            Command::Play => {
                if self.sequencer.play() {
                    Update::State
                } else {
                    Update::Ignored
                }
            }
            Command::Pause => {
                self.sequencer.pause();
                Update::State
            }
            Command::SetDelay { ms } => {
                self.sequencer.set_delay(Duration::from_millis(ms));
                Update::State
            }
            Command::Reset => {
                self.sequencer.reset();
                Update::Snapshot(self.snapshot())
            }
            Command::Next => self.moved(Sequencer::next),
            Command::Previous => self.moved(Sequencer::previous),
            Command::GoToStart => self.moved(Sequencer::go_to_start),
            Command::GoToEnd => self.moved(Sequencer::go_to_end),
            Command::GoToPly { ply } => self.moved(|s| s.go_to_ply(ply)),
        }
    }

    fn moved(&mut self, navigate: impl FnOnce(&mut Sequencer) -> bool) -> Update {
        if navigate(&mut self.sequencer) {
            Update::Snapshot(self.snapshot())
        } else {
            Update::Ignored
        }
    }

    /// Deliver a timer tick scheduled at `generation`.
    pub fn tick(&mut self, generation: u64) -> Option<GameSnapshot> {
        if self.sequencer.tick(generation) {
            Some(self.snapshot())
        } else {
            None
        }
    }

    /// Inter-move delay of the running playback.
    pub fn delay(&self) -> Duration {
        self.sequencer.delay()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::STANDARD_START_FEN;

    const TWO_GAMES: &str = r#"[Event "Club"]
[White "Alice"]
[Black "Bob"]
[Result "1-0"]

1. e4 e5 2. Nf3 Nc6 3. Bb5 a6 1-0

[White "Carol"]
[Black "Dan"]
[Round "2"]

1. d4 d5 *
"#;

    #[test]
    fn test_library_summaries_and_selection() {
        let mut library = GameLibrary::parse(TWO_GAMES).unwrap();
        let summaries = library.summaries();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].display_name, "Alice vs Bob (Club)");
        assert_eq!(summaries[0].result, "White wins");
        assert_eq!(summaries[1].display_name, "Carol vs Dan ( - R2)");
        assert_eq!(summaries[1].move_count, 2);
        assert!(library.select(1));
        assert!(!library.select(2));
        assert_eq!(library.selected(), 1);
    }

    #[test]
    fn test_load_is_all_or_nothing() {
        let mut session = GameSession::new();
        assert_eq!(session.load(TWO_GAMES), Ok(2));
        session.execute(Command::GoToPly { ply: 3 });

        assert_eq!(session.load("no moves here"), Err(ParseError::NoValidGames));
        assert_eq!(session.moves().len(), 6);
        assert_eq!(session.ply(), 3);
    }

    #[test]
    fn test_load_resets_pointer() {
        let mut session = GameSession::new();
        session.load(TWO_GAMES).unwrap();
        session.execute(Command::GoToEnd);
        session.load("1. c4 e5").unwrap();
        assert_eq!(session.ply(), -1);
        assert_eq!(session.snapshot().position, STANDARD_START_FEN);
        assert!(session.metadata().unwrap().is_empty());
    }

    #[test]
    fn test_select_switches_game() {
        let mut session = GameSession::new();
        session.load(TWO_GAMES).unwrap();
        session.execute(Command::Next);
        let snap = session.select(1).unwrap();
        assert_eq!(snap.ply, -1);
        assert_eq!(session.moves(), ["d4", "d5"]);
        assert_eq!(session.metadata().unwrap().white.as_deref(), Some("Carol"));
        assert!(session.select(5).is_none());
    }

    #[test]
    fn test_commands_route_through_replay() {
        let mut session = GameSession::new();
        session.load(TWO_GAMES).unwrap();
        let Update::Snapshot(snap) = session.execute(Command::GoToPly { ply: 4 }) else {
            panic!("expected a snapshot");
        };
        assert_eq!(snap, Replayer::new().replay(session.moves(), 4));
        assert_eq!(session.execute(Command::GoToPly { ply: 40 }), Update::Ignored);
        assert_eq!(session.execute(Command::Play), Update::State);
        assert_eq!(session.state(), PlaybackState::Playing);
        assert_eq!(session.execute(Command::Pause), Update::State);
    }

    #[test]
    fn test_ticks_play_to_the_end() {
        let mut session = GameSession::new();
        session.load("1. d4 d5").unwrap();
        session.execute(Command::Play);
        let first = session.tick(session.sequencer().generation()).unwrap();
        assert_eq!(first.ply, 0);
        let second = session.tick(session.sequencer().generation()).unwrap();
        assert_eq!(second.ply, 1);
        assert_eq!(session.state(), PlaybackState::Stopped);
        assert!(session.tick(session.sequencer().generation()).is_none());
    }

    #[test]
    fn test_tick_from_previous_game_is_stale() {
        let mut session = GameSession::new();
        session.load(TWO_GAMES).unwrap();
        session.execute(Command::Play);
        let before_select = session.sequencer().generation();
        session.select(1).unwrap();
        session.execute(Command::Play);
        assert!(session.tick(before_select).is_none());
        assert_eq!(session.ply(), -1);

        let before_load = session.sequencer().generation();
        session.load("1. c4 e5 2. Nc3").unwrap();
        session.execute(Command::Play);
        assert!(session.tick(before_load).is_none());
        assert_eq!(session.ply(), -1);
        assert!(session.tick(session.sequencer().generation()).is_some());
        assert_eq!(session.ply(), 0);
    }

    #[test]
    fn test_from_library_keeps_selection_and_delay() {
        let mut library = GameLibrary::parse(TWO_GAMES).unwrap();
        library.select(1);
        let session = GameSession::from_library(library, Duration::from_millis(300));
        assert_eq!(session.moves(), ["d4", "d5"]);
        assert_eq!(session.delay(), Duration::from_millis(300));
    }

    #[test]
    fn test_empty_session() {
        let mut session = GameSession::new();
        assert_eq!(session.snapshot().ply, -1);
        assert_eq!(session.execute(Command::Play), Update::Ignored);
        assert!(session.evaluation().is_empty());
        assert!(session.first_illegal().is_none());
    }

    #[test]
    fn test_command_json() {
        let cmd: Command = serde_json::from_str(r#"{"type":"go_to_ply","ply":3}"#).unwrap();
        assert_eq!(cmd, Command::GoToPly { ply: 3 });
        let cmd: Command = serde_json::from_str(r#"{"type":"set_delay","ms":500}"#).unwrap();
        assert_eq!(cmd, Command::SetDelay { ms: 500 });
    }
}
