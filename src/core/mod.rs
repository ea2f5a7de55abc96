//! Core simulation: boards, pieces, physics, power-ups, and room state.
//!
//! Everything in here is synchronous and deterministic given a seed; the
//! async surface (tickers, channels) lives in the room and registry layers
//! above.

pub mod board;
pub mod engine;
pub mod pieces;
pub mod player;
pub mod powerups;
pub mod rng;
pub mod room;

pub use board::Board;
pub use engine::LockOutcome;
pub use player::Player;
pub use powerups::{PowerUp, PowerUpKind};
pub use rng::SimpleRng;
pub use room::GameRoom;
