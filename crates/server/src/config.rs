use std::env;
use std::path::PathBuf;
use std::time::Duration;

use chess_core::playback::{DEFAULT_DELAY, MIN_DELAY};

/// Default cap on uploaded PGN text.
pub const DEFAULT_MAX_PGN_BYTES: usize = 5 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Directory of `.pgn` files loaded at startup.
    pub pgn_dir: Option<PathBuf>,
    pub playback_delay: Duration,
    pub max_pgn_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            pgn_dir: None,
            playback_delay: DEFAULT_DELAY,
            max_pgn_bytes: DEFAULT_MAX_PGN_BYTES,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            pgn_dir: env::var("PGN_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            playback_delay: env::var("PLAYBACK_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.playback_delay)
                .max(MIN_DELAY),
            max_pgn_bytes: env::var("MAX_PGN_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_pgn_bytes),
        }
    }
}
