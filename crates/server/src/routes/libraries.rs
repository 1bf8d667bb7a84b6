use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use chess_core::evaluation::{evaluation_series, EvaluationPoint};
use chess_core::pgn::move_label;
use chess_core::{GameLibrary, GameSnapshot, ParsedGame, Replayer, INITIAL_PLY};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::config::Config;
use crate::error::AppError;
use crate::store::{GameStore, LibrarySummary, StoredLibrary};

#[derive(Deserialize)]
pub struct UploadBody {
    pub pgn: String,
}

#[derive(Deserialize)]
pub struct PlyQuery {
    pub ply: Option<isize>,
}

fn find_library(store: &GameStore, id: u64) -> Result<Arc<StoredLibrary>, AppError> {
    store
        .get(id)?
        .ok_or(AppError::NotFound("Library not found".into()))
}

fn find_game(stored: &StoredLibrary, game: usize) -> Result<&ParsedGame, AppError> {
    stored
        .library
        .get(game)
        .ok_or(AppError::NotFound("Game not found".into()))
}

/// POST /api/libraries
/// Parse PGN text into a new library. Nothing is stored when parsing fails.
pub async fn create_library(
    Extension(store): Extension<Arc<GameStore>>,
    Extension(config): Extension<Config>,
    Json(body): Json<UploadBody>,
) -> Result<Json<LibrarySummary>, AppError> {
    if body.pgn.len() > config.max_pgn_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "PGN text exceeds {} bytes",
            config.max_pgn_bytes
        )));
    }

    let library = GameLibrary::parse(&body.pgn)?;
    let stored = store.insert(library, None)?;
    tracing::info!(
        "Created library {} with {} games",
        stored.id,
        stored.library.len()
    );
    Ok(Json(stored.summary()))
}

/// GET /api/libraries
pub async fn list_libraries(
    Extension(store): Extension<Arc<GameStore>>,
) -> Result<Json<Vec<LibrarySummary>>, AppError> {
    let mut summaries = Vec::new();
    for id in store.ids() {
        if let Some(stored) = store.get(id)? {
            summaries.push(stored.summary());
        }
    }
    Ok(Json(summaries))
}

/// GET /api/libraries/{id}
pub async fn get_library(
    Extension(store): Extension<Arc<GameStore>>,
    Path(id): Path<u64>,
) -> Result<Json<LibrarySummary>, AppError> {
    let stored = find_library(&store, id)?;
    Ok(Json(stored.summary()))
}

/// GET /api/libraries/{id}/games/{game}
/// Metadata, labelled move list and where replay halts, if it does.
pub async fn get_game(
    Extension(store): Extension<Arc<GameStore>>,
    Path((id, game)): Path<(u64, usize)>,
) -> Result<Json<JsonValue>, AppError> {
    let stored = find_library(&store, id)?;
    let parsed = find_game(&stored, game)?;
    let meta = &parsed.metadata;

    let moves: Vec<JsonValue> = parsed
        .moves
        .iter()
        .enumerate()
        .map(|(index, san)| {
            serde_json::json!({
                "ply": index,
                "san": san,
                "label": move_label(index, san),
            })
        })
        .collect();
    let halt = Replayer::new().first_illegal(&parsed.moves);

    Ok(Json(serde_json::json!({
        "index": game,
        "displayName": meta.display_name(),
        "whiteLabel": meta.white_label(),
        "blackLabel": meta.black_label(),
        "resultDescription": meta.result_description(),
        "metadata": meta,
        "moves": moves,
        "illegalMove": halt,
    })))
}

/// GET /api/libraries/{id}/games/{game}/snapshot?ply=N
/// `ply` defaults to the initial position and is clamped to the game.
pub async fn get_snapshot(
    Extension(store): Extension<Arc<GameStore>>,
    Path((id, game)): Path<(u64, usize)>,
    Query(q): Query<PlyQuery>,
) -> Result<Json<GameSnapshot>, AppError> {
    let stored = find_library(&store, id)?;
    let parsed = find_game(&stored, game)?;
    let ply = q.ply.unwrap_or(INITIAL_PLY);
    tracing::debug!("Snapshot for library {id} game {game} at ply {ply}");
    Ok(Json(Replayer::new().replay(&parsed.moves, ply)))
}

/// GET /api/libraries/{id}/games/{game}/evaluation?ply=N
pub async fn get_evaluation(
    Extension(store): Extension<Arc<GameStore>>,
    Path((id, game)): Path<(u64, usize)>,
    Query(q): Query<PlyQuery>,
) -> Result<Json<Vec<EvaluationPoint>>, AppError> {
    let stored = find_library(&store, id)?;
    let parsed = find_game(&stored, game)?;
    Ok(Json(evaluation_series(
        &parsed.moves,
        q.ply.unwrap_or(INITIAL_PLY),
    )))
}
