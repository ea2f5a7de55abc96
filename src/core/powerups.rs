//! Power-up module - catalog, weighted selection, and board effects
//!
//! The catalog is a fixed process-wide table; weights are percentages and must
//! sum to exactly 100, validated at registry construction. Granted instances
//! snapshot the catalog metadata so a later catalog change can never alter an
//! already-granted power-up. Effects here are pure board mutations; the two
//! effects that reach beyond one board (switch-boards, clear-powerups) are
//! resolved by the room.

use serde::{Deserialize, Serialize};

use crate::core::rng::SimpleRng;
use crate::core::Board;
use crate::error::CatalogError;
use crate::types::{Cell, CellColor, BOARD_HEIGHT, BOARD_WIDTH};

/// Power-up kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PowerUpKind {
    GarbageRows,
    RemoveRows,
    Earthquake,
    ShuffleRows,
    ClearPowerUps,
    ClearColumns,
    Gravitation,
    ClearBoard,
    SwitchBoards,
    GarbageMonster,
    MiniBomb,
}

/// Immutable catalog entry
#[derive(Debug, Clone, Copy)]
pub struct PowerUpDef {
    pub kind: PowerUpKind,
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    /// Selection weight as a percentage; catalog weights sum to 100
    pub weight: u32,
}

/// The fixed power-up table. Order matters: weighted selection walks it in
/// catalog order.
pub const CATALOG: [PowerUpDef; 11] = [
    PowerUpDef {
        kind: PowerUpKind::GarbageRows,
        name: "Add Row",
        icon: "📦",
        description: "Adds 2 garbage rows to target",
        weight: 28,
    },
    PowerUpDef {
        kind: PowerUpKind::RemoveRows,
        name: "Remove Row",
        icon: "🗑️",
        description: "Removes 2 rows from target",
        weight: 28,
    },
    PowerUpDef {
        kind: PowerUpKind::Earthquake,
        name: "Earthquake",
        icon: "🌋",
        description: "Shakes the target's board",
        weight: 7,
    },
    PowerUpDef {
        kind: PowerUpKind::ShuffleRows,
        name: "Milkshake",
        icon: "🥤",
        description: "Randomly swaps rows on target's board",
        weight: 4,
    },
    PowerUpDef {
        kind: PowerUpKind::ClearPowerUps,
        name: "Powerups Away",
        icon: "🚫",
        description: "Removes all powerups from target",
        weight: 6,
    },
    PowerUpDef {
        kind: PowerUpKind::ClearColumns,
        name: "Shotgun",
        icon: "🔫",
        description: "Clears 3 random columns",
        weight: 9,
    },
    PowerUpDef {
        kind: PowerUpKind::Gravitation,
        name: "Gravitation",
        icon: "⬇️",
        description: "Makes all pieces fall to bottom",
        weight: 5,
    },
    PowerUpDef {
        kind: PowerUpKind::ClearBoard,
        name: "Clear Arena",
        icon: "🧹",
        description: "Clears the entire board",
        weight: 4,
    },
    PowerUpDef {
        kind: PowerUpKind::SwitchBoards,
        name: "Switch Arena",
        icon: "🔄",
        description: "Switches boards with random player",
        weight: 4,
    },
    PowerUpDef {
        kind: PowerUpKind::GarbageMonster,
        name: "Monster",
        icon: "👾",
        description: "Adds 5 garbage rows to target",
        weight: 1,
    },
    PowerUpDef {
        kind: PowerUpKind::MiniBomb,
        name: "Minibomb",
        icon: "💣",
        description: "Clears a 3x3 area randomly",
        weight: 4,
    },
];

/// A granted power-up: kind plus metadata snapshotted at grant time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerUp {
    #[serde(rename = "type")]
    pub kind: PowerUpKind,
    pub name: String,
    pub icon: String,
    pub description: String,
}

impl From<&PowerUpDef> for PowerUp {
    fn from(def: &PowerUpDef) -> Self {
        Self {
            kind: def.kind,
            name: def.name.to_string(),
            icon: def.icon.to_string(),
            description: def.description.to_string(),
        }
    }
}

/// Verify the catalog weights sum to exactly 100
pub fn validate_catalog() -> Result<(), CatalogError> {
    let sum: u32 = CATALOG.iter().map(|def| def.weight).sum();
    if sum != 100 {
        return Err(CatalogError::BadWeightSum { sum });
    }
    Ok(())
}

/// Weighted random selection: draw r uniform in [0, 100) and walk the catalog
/// accumulating weights until the cumulative sum exceeds r.
pub fn draw(rng: &mut SimpleRng) -> &'static PowerUpDef {
    let r = rng.next_range(100);
    let mut cumulative = 0;
    for def in &CATALOG {
        cumulative += def.weight;
        if r < cumulative {
            return def;
        }
    }
    // Unreachable while the weights sum to 100; the last entry absorbs
    // any remainder if they ever do not.
    &CATALOG[CATALOG.len() - 1]
}

const WIDTH: usize = BOARD_WIDTH as usize;
const HEIGHT: usize = BOARD_HEIGHT as usize;

/// Push `n` garbage rows in from the bottom. Each row is full except for one
/// random hole; the top `n` rows fall off the board.
pub fn add_garbage_rows(board: &mut Board, rng: &mut SimpleRng, n: usize) {
    for _ in 0..n {
        board.shift_rows_up();
        let mut row: [Cell; WIDTH] = [Some(CellColor::Gray); WIDTH];
        let hole = rng.next_range(BOARD_WIDTH as u32) as usize;
        row[hole] = None;
        board.set_row(HEIGHT - 1, row);
    }
}

/// Drop `n` rows off the bottom, inserting empties at the top. No-op once the
/// board is already empty.
pub fn remove_rows(board: &mut Board, n: usize) {
    if board.is_empty() {
        return;
    }
    for _ in 0..n {
        board.shift_rows_down();
    }
}

/// Every row independently rotates one cell left or right, wrapping
pub fn earthquake(board: &mut Board, rng: &mut SimpleRng) {
    for y in 0..HEIGHT {
        if rng.coin_flip() {
            board.rotate_row_right(y);
        } else {
            board.rotate_row_left(y);
        }
    }
}

/// Three uniformly-random row-pair swaps, indices drawn with replacement
pub fn shuffle_rows(board: &mut Board, rng: &mut SimpleRng) {
    for _ in 0..3 {
        let a = rng.next_range(BOARD_HEIGHT as u32) as usize;
        let b = rng.next_range(BOARD_HEIGHT as u32) as usize;
        board.swap_rows(a, b);
    }
}

/// Clear `n` random columns, drawn with replacement
pub fn clear_columns(board: &mut Board, rng: &mut SimpleRng, n: usize) {
    for _ in 0..n {
        let x = rng.next_range(BOARD_WIDTH as u32) as usize;
        board.clear_column(x);
    }
}

/// Compact every column downward
pub fn gravitation(board: &mut Board) {
    board.compact_columns();
}

/// Replace the board with a fresh empty grid
pub fn clear_board(board: &mut Board) {
    board.replace(Board::new());
}

/// Clear a random 3x3 region. The top-left corner is drawn so the region
/// always fits on the board; writes are bound-checked anyway.
pub fn mini_bomb(board: &mut Board, rng: &mut SimpleRng) {
    let x0 = rng.next_range(BOARD_WIDTH as u32 - 2) as i8;
    let y0 = rng.next_range(BOARD_HEIGHT as u32 - 2) as i8;
    for y in y0..y0 + 3 {
        for x in x0..x0 + 3 {
            board.set(x, y, None);
        }
    }
}
