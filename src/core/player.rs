//! Player module - per-player state inside a room
//!
//! A player exclusively owns its board and active piece state. Power-ups are
//! held in a FIFO queue; the oldest is consumed first.

use std::collections::VecDeque;

use crate::core::pieces::{self, Shape};
use crate::core::powerups::PowerUp;
use crate::core::Board;
use crate::types::{PieceKind, PlayerId};

/// One player's complete state. Plain data; the engine and room mutate it.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub board: Board,
    /// Active piece kind; None only before the first spawn
    pub current: Option<PieceKind>,
    /// Look-ahead piece
    pub next: Option<PieceKind>,
    /// Anchor position of the active piece's bounding box
    pub x: i8,
    pub y: i8,
    /// Rotation index, 0..4 clockwise quarter turns
    pub rotation: u8,
    pub score: u32,
    pub lines_cleared: u32,
    pub power_ups: VecDeque<PowerUp>,
    pub game_over: bool,
    pub is_host: bool,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, is_host: bool) -> Self {
        Self {
            id,
            name: name.into(),
            board: Board::new(),
            current: None,
            next: None,
            x: 0,
            y: 0,
            rotation: 0,
            score: 0,
            lines_cleared: 0,
            power_ups: VecDeque::new(),
            game_over: false,
            is_host,
        }
    }

    /// Shape of the active piece at its current rotation
    pub fn current_shape(&self) -> Option<Shape> {
        self.current.map(|kind| pieces::shape_at(kind, self.rotation))
    }

    /// Wipe gameplay state for a fresh round; identity and host flag survive
    pub fn reset_for_start(&mut self) {
        self.board.clear();
        self.current = None;
        self.next = None;
        self.x = 0;
        self.y = 0;
        self.rotation = 0;
        self.score = 0;
        self.lines_cleared = 0;
        self.power_ups.clear();
        self.game_over = false;
    }
}
