//! In-memory library store.
//!
//! Each successful PGN load becomes an immutable [`GameLibrary`] under a fresh
//! numeric id. Playback sessions take a copy of the library they view.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use chess_core::{GameLibrary, GameSummary};
use serde::Serialize;

use crate::error::AppError;

#[derive(Debug)]
pub struct StoredLibrary {
    pub id: u64,
    /// File name for libraries preloaded from disk.
    pub source: Option<String>,
    pub library: GameLibrary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LibrarySummary {
    pub id: u64,
    pub source: Option<String>,
    pub games: Vec<GameSummary>,
}

impl StoredLibrary {
    pub fn summary(&self) -> LibrarySummary {
        LibrarySummary {
            id: self.id,
            source: self.source.clone(),
            games: self.library.summaries(),
        }
    }
}

#[derive(Debug, Default)]
pub struct GameStore {
    libraries: RwLock<HashMap<u64, Arc<StoredLibrary>>>,
    next_id: AtomicU64,
}

impl GameStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &self,
        library: GameLibrary,
        source: Option<String>,
    ) -> Result<Arc<StoredLibrary>, AppError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let stored = Arc::new(StoredLibrary {
            id,
            source,
            library,
        });
        let mut libraries = self
            .libraries
            .write()
            .map_err(|_| AppError::Internal("library store unavailable".into()))?;
        libraries.insert(id, stored.clone());
        Ok(stored)
    }

    pub fn get(&self, id: u64) -> Result<Option<Arc<StoredLibrary>>, AppError> {
        let libraries = self
            .libraries
            .read()
            .map_err(|_| AppError::Internal("library store unavailable".into()))?;
        Ok(libraries.get(&id).cloned())
    }

    /// Library ids in ascending order.
    pub fn ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self
            .libraries
            .read()
            .map(|l| l.keys().copied().collect())
            .unwrap_or_default();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.libraries.read().map(|l| l.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Load every `*.pgn` file of `dir` as its own library.
    ///
    /// Files that fail to read or parse are skipped with a warning. Returns
    /// the number of libraries added.
    pub fn preload_dir(&self, dir: &Path) -> anyhow::Result<usize> {
        let pattern = format!("{}/*.pgn", dir.display());
        let paths: Vec<_> = glob::glob(&pattern)?.filter_map(|p| p.ok()).collect();

        let mut loaded = 0;
        for path in &paths {
            let source = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned());
            let text = match std::fs::read_to_string(path) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", path.display(), e);
                    continue;
                }
            };
            match GameLibrary::parse(&text) {
                Ok(library) => {
                    let games = library.len();
                    let stored = self.insert(library, source)?;
                    tracing::info!(
                        "Preloaded {} games from {} as library {}",
                        games,
                        path.display(),
                        stored.id
                    );
                    loaded += 1;
                }
                Err(e) => tracing::warn!("Skipping {}: {}", path.display(), e),
            }
        }
        Ok(loaded)
    }
}
