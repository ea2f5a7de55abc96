//! Authoritative simulation core for a competitive multiplayer falling-block
//! game.
//!
//! The crate is transport-agnostic: callers issue commands through
//! [`registry::RoomRegistry`] and drain resulting [`events::EngineEvent`]s
//! from the channel it returns. All game rules live here; clients only
//! render the serializable views in [`snapshot`].
//!
//! Given a fixed RNG seed and command sequence, a whole game replays
//! identically.

pub mod core;
pub mod error;
pub mod events;
pub mod registry;
pub mod snapshot;
pub mod types;

pub use crate::core::{Board, GameRoom, LockOutcome, Player, PowerUp, PowerUpKind, SimpleRng};
pub use crate::error::{JoinError, StartError};
pub use crate::events::{EngineEvent, EventSender};
pub use crate::registry::RoomRegistry;
pub use crate::snapshot::{GameView, LobbyView, PlayerView, RoomSummary};
pub use crate::types::{MoveDir, PieceKind, PlayerId, RoomId, RoomState};
