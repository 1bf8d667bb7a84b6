//! Lightweight regex-based PGN parser.
//!
//! Handles both a bare movetext (single game) and multi-game files made of
//! tag-pair blocks followed by movetext blocks. Moves come back as SAN-like
//! tokens; legality is checked later, at replay time.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::ParseError;
use crate::game_data::{GameMetadata, ParsedGame};

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*\[(\w+)\s+"([^"]*)"\s*\]\s*$"#).expect("tag pattern"));

static MOVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:O-O-O|O-O|0-0-0|0-0)[+#]?|[KQRBN]?[a-h]?[1-8]?x?[a-h][1-8](?:=?[QRBN])?[+#]?",
    )
    .expect("move pattern")
});

/// Parse raw PGN text into one or more games.
///
/// Text without any well-formed tag pair is treated as a single game and
/// returned with empty metadata. Otherwise every metadata block is paired
/// with the movetext block that follows it.
pub fn parse_pgn_text(text: &str) -> Result<Vec<ParsedGame>, ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let games = if text.lines().any(|l| TAG_RE.is_match(l)) {
        parse_multi_game(text)
    } else {
        let moves = extract_moves(text);
        if moves.is_empty() {
            Vec::new()
        } else {
            vec![ParsedGame {
                metadata: GameMetadata::default(),
                moves,
            }]
        }
    };

    if games.is_empty() {
        return Err(ParseError::NoValidGames);
    }
    debug!(games = games.len(), "Parsed PGN text");
    Ok(games)
}

fn parse_multi_game(text: &str) -> Vec<ParsedGame> {
    let mut games = Vec::new();
    let mut pending: Option<GameMetadata> = None;

    for block in split_blocks(text) {
        let (tag_lines, movetext_lines) = split_block(&block);

        if !tag_lines.is_empty() {
            if pending.is_some() {
                debug!("Discarding metadata block with no movetext");
            }
            pending = Some(parse_tags(&tag_lines));
        }

        if movetext_lines.is_empty() {
            continue;
        }

        let Some(metadata) = pending.take() else {
            debug!("Skipping movetext block with no preceding metadata");
            continue;
        };

        let moves = extract_moves(&movetext_lines.join("\n"));
        if moves.is_empty() {
            debug!("Skipping game with empty movetext");
            continue;
        }
        games.push(ParsedGame { metadata, moves });
    }

    if pending.is_some() {
        debug!("Discarding trailing metadata block with no movetext");
    }
    games
}

/// Group non-blank lines into blocks separated by blank lines.
///
/// Blank lines inside a `{...}` comment do not end a block.
fn split_blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();
    let mut in_comment = false;
    for line in text.lines() {
        if line.trim().is_empty() {
            if !in_comment && !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
            continue;
        }
        in_comment = comment_open_after(line, in_comment);
        current.push(line);
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

/// Whether a brace comment is still open at the end of `line`.
fn comment_open_after(line: &str, mut open: bool) -> bool {
    if !open && line.trim_start().starts_with('[') {
        return false;
    }
    for c in line.chars() {
        match c {
            '{' if !open => open = true,
            '}' if open => open = false,
            ';' if !open => break,
            _ => {}
        }
    }
    open
}

/// Leading `[`-lines of a block are its header; the rest is movetext.
fn split_block<'a>(block: &[&'a str]) -> (Vec<&'a str>, Vec<&'a str>) {
    let header_len = block
        .iter()
        .take_while(|l| l.trim_start().starts_with('['))
        .count();
    (block[..header_len].to_vec(), block[header_len..].to_vec())
}

fn parse_tags(lines: &[&str]) -> GameMetadata {
    let mut metadata = GameMetadata::default();
    for line in lines {
        // Malformed tag lines are skipped
        if let Some(cap) = TAG_RE.captures(line) {
            metadata.set_tag(&cap[1], cap[2].to_string());
        }
    }
    metadata
}

/// Extract SAN moves from movetext (after removing comments and variations).
pub fn extract_moves(movetext: &str) -> Vec<String> {
    let cleaned = strip_annotations(movetext);
    MOVE_RE
        .find_iter(&cleaned)
        .map(|m| m.as_str().replace('0', "O"))
        .collect()
}

/// Drop `{...}` comments, `;` line comments and (nested) `(...)` variations.
fn strip_annotations(movetext: &str) -> String {
    let mut out = String::with_capacity(movetext.len());
    let mut depth = 0usize;
    let mut in_brace = false;
    let mut in_line_comment = false;

    for c in movetext.chars() {
        if in_line_comment {
            if c == '\n' {
                in_line_comment = false;
                out.push(' ');
            }
            continue;
        }
        if in_brace {
            if c == '}' {
                in_brace = false;
                out.push(' ');
            }
            continue;
        }
        match c {
            '{' => in_brace = true,
            ';' => in_line_comment = true,
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                out.push(' ');
            }
            _ if depth > 0 => {}
            _ => out.push(c),
        }
    }
    out
}

/// Move list label: `1. e4`, `1... e5`.
pub fn move_label(index: usize, san: &str) -> String {
    let number = index / 2 + 1;
    if index % 2 == 0 {
        format!("{number}. {san}")
    } else {
        format!("{number}... {san}")
    }
}
