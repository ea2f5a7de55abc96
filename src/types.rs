//! Core types shared across the crate
//! Pure data types and constants with no game logic attached

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Board dimensions
pub const BOARD_WIDTH: u8 = 10;
pub const BOARD_HEIGHT: u8 = 20;

/// Room limits
pub const ROOM_CAPACITY: usize = 4;
pub const MIN_PLAYERS_TO_START: usize = 2;

/// Gravity tick interval while a room is playing (milliseconds)
pub const GRAVITY_INTERVAL_MS: u64 = 1000;

/// Flat score per cleared line (no multi-line bonus)
pub const POINTS_PER_LINE: u32 = 100;

/// Minimum lines cleared in one lock to earn a power-up
pub const POWER_UP_GRANT_LINES: usize = 2;

/// Piece kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// The color this piece locks onto the board with
    pub fn color(&self) -> CellColor {
        match self {
            PieceKind::I => CellColor::Cyan,
            PieceKind::O => CellColor::Yellow,
            PieceKind::T => CellColor::Purple,
            PieceKind::S => CellColor::Green,
            PieceKind::Z => CellColor::Red,
            PieceKind::J => CellColor::Blue,
            PieceKind::L => CellColor::Orange,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "I",
            PieceKind::O => "O",
            PieceKind::T => "T",
            PieceKind::S => "S",
            PieceKind::Z => "Z",
            PieceKind::J => "J",
            PieceKind::L => "L",
        }
    }
}

/// Color of a locked cell. `Gray` marks garbage injected by power-ups,
/// everything else comes from a locked piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellColor {
    Cyan,
    Yellow,
    Purple,
    Green,
    Red,
    Blue,
    Orange,
    Gray,
}

impl CellColor {
    /// Numeric cell code for snapshots (0 is reserved for empty)
    pub fn code(&self) -> u8 {
        match self {
            CellColor::Cyan => 1,
            CellColor::Yellow => 2,
            CellColor::Purple => 3,
            CellColor::Green => 4,
            CellColor::Red => 5,
            CellColor::Blue => 6,
            CellColor::Orange => 7,
            CellColor::Gray => 8,
        }
    }
}

/// Cell on the board (None = empty, Some = filled)
pub type Cell = Option<CellColor>;

/// Move directions accepted from players
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDir {
    Left,
    Right,
    Down,
}

/// Room lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomState {
    Waiting,
    Playing,
    Finished,
}

impl RoomState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomState::Waiting => "waiting",
            RoomState::Playing => "playing",
            RoomState::Finished => "finished",
        }
    }
}

/// Player identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Room identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub Uuid);

impl RoomId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RoomId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_codes_unique() {
        let colors = [
            CellColor::Cyan,
            CellColor::Yellow,
            CellColor::Purple,
            CellColor::Green,
            CellColor::Red,
            CellColor::Blue,
            CellColor::Orange,
            CellColor::Gray,
        ];
        let mut codes: Vec<u8> = colors.iter().map(|c| c.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), colors.len());
        assert!(!codes.contains(&0));
    }

    #[test]
    fn test_piece_colors_are_not_garbage() {
        for kind in PieceKind::ALL {
            assert_ne!(kind.color(), CellColor::Gray);
        }
    }

    #[test]
    fn test_as_str_matches_wire_names() {
        for kind in PieceKind::ALL {
            let wire = serde_json::to_string(&kind).unwrap();
            assert_eq!(wire, format!("\"{}\"", kind.as_str()));
        }
        for state in [RoomState::Waiting, RoomState::Playing, RoomState::Finished] {
            let wire = serde_json::to_string(&state).unwrap();
            assert_eq!(wire, format!("\"{}\"", state.as_str()));
        }
    }

    #[test]
    fn test_room_state_wire_names() {
        assert_eq!(
            serde_json::to_string(&RoomState::Waiting).unwrap(),
            "\"waiting\""
        );
        assert_eq!(
            serde_json::to_string(&RoomState::Playing).unwrap(),
            "\"playing\""
        );
        assert_eq!(
            serde_json::to_string(&RoomState::Finished).unwrap(),
            "\"finished\""
        );
    }
}
