//! Error taxonomy for the command surface.
//!
//! Only join and start failures surface as errors to the caller; every other
//! invalid command (wrong lifecycle state, empty power-up queue, unknown room
//! on a gameplay command) degrades to a silent no-op. Catalog validation
//! failures are startup-time and abort registry construction.

use thiserror::Error;

/// Why a join-room command was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum JoinError {
    #[error("room does not exist")]
    RoomNotFound,
    #[error("room is full")]
    RoomFull,
    #[error("game has already started")]
    AlreadyStarted,
}

/// Why a start-game command was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StartError {
    #[error("room does not exist")]
    RoomNotFound,
    #[error("only the host can start the game")]
    NotHost,
    #[error("need at least 2 players to start the game")]
    NotEnoughPlayers,
    #[error("game has already started")]
    AlreadyStarted,
}

/// Power-up catalog misconfiguration, detected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("power-up weights sum to {sum}, expected 100")]
    BadWeightSum { sum: u32 },
}

/// A board query used coordinates outside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("coordinates ({x}, {y}) are outside the board")]
pub struct OutOfBounds {
    pub x: i8,
    pub y: i8,
}
