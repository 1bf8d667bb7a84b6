use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameMetadata {
    pub event: Option<String>,
    pub site: Option<String>,
    pub date: Option<String>,
    pub round: Option<String>,
    pub white: Option<String>,
    pub black: Option<String>,
    pub result: Option<String>, // "1-0", "0-1", "1/2-1/2", "*"
    pub white_elo: Option<String>,
    pub black_elo: Option<String>,
    pub eco: Option<String>,
}

impl GameMetadata {
    /// Store a tag pair. Returns false for tags the viewer does not track.
    pub fn set_tag(&mut self, key: &str, value: String) -> bool {
        let slot = match key {
            "Event" => &mut self.event,
            "Site" => &mut self.site,
            "Date" => &mut self.date,
            "Round" => &mut self.round,
            "White" => &mut self.white,
            "Black" => &mut self.black,
            "Result" => &mut self.result,
            "WhiteElo" => &mut self.white_elo,
            "BlackElo" => &mut self.black_elo,
            "ECO" => &mut self.eco,
            _ => return false,
        };
        *slot = Some(value);
        true
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Selector label, e.g. `Carlsen vs Caruana (Norway Chess - R3)`.
    pub fn display_name(&self) -> String {
        let white = non_empty(&self.white).unwrap_or("White");
        let black = non_empty(&self.black).unwrap_or("Black");
        let event = non_empty(&self.event).unwrap_or("");
        let round = non_empty(&self.round);

        let mut name = format!("{white} vs {black}");
        if !event.is_empty() || round.is_some() {
            name.push_str(" (");
            name.push_str(event);
            if let Some(r) = round {
                name.push_str(&format!(" - R{r}"));
            }
            name.push(')');
        }
        name
    }

    pub fn white_label(&self) -> String {
        player_label(self.white.as_deref().unwrap_or(""), self.white_elo.as_deref())
    }

    pub fn black_label(&self) -> String {
        player_label(self.black.as_deref().unwrap_or(""), self.black_elo.as_deref())
    }

    pub fn result_description(&self) -> &'static str {
        match self.result.as_deref() {
            Some("1-0") => "White wins",
            Some("0-1") => "Black wins",
            Some("1/2-1/2") => "Draw",
            _ => "In progress",
        }
    }
}

/// `Name (Elo)` when a rating is known, bare name otherwise.
pub fn player_label(name: &str, elo: Option<&str>) -> String {
    let name = name.trim();
    if name.is_empty() {
        return String::new();
    }
    match elo.map(str::trim).filter(|e| !e.is_empty()) {
        Some(elo) => format!("{name} ({elo})"),
        None => name.to_string(),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedGame {
    pub metadata: GameMetadata,
    pub moves: Vec<String>, // SAN-like, not validated
}
