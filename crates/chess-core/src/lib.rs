//! Chess game viewer core: PGN move lists, replay on a rules engine and
//! timer-free playback state.

pub mod cache;
pub mod captured;
pub mod error;
pub mod evaluation;
pub mod game_data;
pub mod pgn;
pub mod playback;
pub mod replay;
pub mod rules;
pub mod session;
pub mod transition;

pub use cache::SnapshotCache;
pub use captured::{captured_pieces, CapturedPieces};
pub use error::{IllegalMove, ParseError};
pub use game_data::{GameMetadata, ParsedGame};
pub use pgn::parse_pgn_text;
pub use playback::{PlaybackState, Sequencer};
pub use replay::{GameSnapshot, LastMove, Replayer, INITIAL_PLY};
pub use rules::{RulesEngine, ShakmatyEngine, Side};
pub use session::{Command, GameLibrary, GameSession, GameSummary, Update};
