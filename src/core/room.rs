//! Room module - session lifecycle and multiplayer rules
//!
//! A room owns its players, its RNG, and its lifecycle state. All methods
//! run under the room lock held by the caller; none of them block. Gravity
//! ticks arrive from a task owned by the registry, which stores its handle
//! here so ending a round can cancel it.
//!
//! Players are keyed in a BTreeMap so iteration order, and therefore host
//! succession, is deterministic: when the host leaves, the remaining player
//! with the lowest id inherits the role.

use std::collections::BTreeMap;
use std::mem;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::core::engine::{self, LockOutcome};
use crate::core::player::Player;
use crate::core::powerups::{self, PowerUp, PowerUpKind};
use crate::core::rng::SimpleRng;
use crate::error::{JoinError, StartError};
use crate::events::{EngineEvent, EventSender};
use crate::snapshot::{GameView, LobbyView};
use crate::types::{
    MoveDir, PlayerId, RoomId, RoomState, MIN_PLAYERS_TO_START, POWER_UP_GRANT_LINES,
    ROOM_CAPACITY,
};

/// One game session and its roster
pub struct GameRoom {
    pub id: RoomId,
    pub name: String,
    host: PlayerId,
    players: BTreeMap<PlayerId, Player>,
    state: RoomState,
    winner: Option<PlayerId>,
    rng: SimpleRng,
    ticker: Option<JoinHandle<()>>,
    events: EventSender,
}

impl GameRoom {
    /// Create an empty room. The first player to join becomes host.
    pub fn new(id: RoomId, name: impl Into<String>, seed: u32, events: EventSender) -> Self {
        Self {
            id,
            name: name.into(),
            host: PlayerId(uuid::Uuid::nil()),
            players: BTreeMap::new(),
            state: RoomState::Waiting,
            winner: None,
            rng: SimpleRng::new(seed),
            ticker: None,
            events,
        }
    }

    pub fn state(&self) -> RoomState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == RoomState::Playing
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    pub fn host(&self) -> PlayerId {
        self.host
    }

    pub fn host_name(&self) -> Option<String> {
        self.players.get(&self.host).map(|p| p.name.clone())
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    /// Direct mutable access to a player, for tests and tooling that need to
    /// stage board states.
    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    /// Add a player to the roster. Rejected once the game has started or the
    /// room is full. The first player in becomes host.
    pub fn add_player(&mut self, id: PlayerId, name: impl Into<String>) -> Result<(), JoinError> {
        if self.state != RoomState::Waiting {
            return Err(JoinError::AlreadyStarted);
        }
        if self.players.len() >= ROOM_CAPACITY {
            return Err(JoinError::RoomFull);
        }

        let is_host = self.players.is_empty();
        let mut player = Player::new(id, name, is_host);
        if is_host {
            self.host = id;
        }
        // Lifecycle guard above makes this unreachable, but a player entering
        // a live game must have a piece.
        if self.is_playing() {
            engine::spawn(&mut player, &mut self.rng);
        }
        debug!(room = %self.id, player = %id, name = %player.name, "player joined");
        self.players.insert(id, player);

        self.events.send(EngineEvent::LobbyUpdate {
            lobby: LobbyView::of(self),
        });
        Ok(())
    }

    /// Remove a player. Returns true when the room is empty afterwards and
    /// should be destroyed. A departing host hands the role to the remaining
    /// player with the lowest id.
    pub fn remove_player(&mut self, id: PlayerId) -> bool {
        if self.players.remove(&id).is_none() {
            return self.players.is_empty();
        }
        debug!(room = %self.id, player = %id, "player left");

        if self.host == id {
            if let Some((&next_host, player)) = self.players.iter_mut().next() {
                self.host = next_host;
                player.is_host = true;
                info!(room = %self.id, host = %next_host, "host role transferred");
            }
        }

        if !self.players.is_empty() {
            self.events.send(EngineEvent::LobbyUpdate {
                lobby: LobbyView::of(self),
            });
        }
        self.players.is_empty()
    }

    /// Begin a round. Only the host may start, only from the waiting state,
    /// and only with enough players. Every player is reset and dealt an
    /// opening piece.
    pub fn start(&mut self, requester: PlayerId) -> Result<(), StartError> {
        if requester != self.host {
            return Err(StartError::NotHost);
        }
        if self.state != RoomState::Waiting {
            return Err(StartError::AlreadyStarted);
        }
        if self.players.len() < MIN_PLAYERS_TO_START {
            return Err(StartError::NotEnoughPlayers);
        }

        let Self { players, rng, .. } = self;
        for player in players.values_mut() {
            player.reset_for_start();
            engine::spawn(player, rng);
        }
        self.state = RoomState::Playing;
        self.winner = None;
        info!(room = %self.id, players = self.players.len(), "game started");

        self.events.send(EngineEvent::GameStarted {
            game: GameView::of(self),
        });
        Ok(())
    }

    /// Store the handle of the gravity task driving this room
    pub fn set_ticker(&mut self, handle: JoinHandle<()>) {
        self.stop_ticker();
        self.ticker = Some(handle);
    }

    /// Cancel the gravity task if one is running. Idempotent.
    pub fn stop_ticker(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }

    /// One gravity step: every live player's piece moves down one cell,
    /// locking where it cannot.
    pub fn tick(&mut self) {
        if !self.is_playing() {
            return;
        }

        let mut outcomes: Vec<(PlayerId, LockOutcome)> = Vec::new();
        let Self { players, rng, .. } = self;
        for player in players.values_mut() {
            if player.game_over {
                continue;
            }
            if let Some(outcome) = engine::try_move(player, MoveDir::Down, rng) {
                outcomes.push((player.id, outcome));
            }
        }
        self.settle(outcomes);
    }

    /// Player command: step the active piece left, right, or down
    pub fn move_piece(&mut self, player_id: PlayerId, dir: MoveDir) {
        if !self.is_playing() {
            return;
        }
        let Self { players, rng, .. } = self;
        let Some(player) = players.get_mut(&player_id) else {
            return;
        };
        let outcome = engine::try_move(player, dir, rng);
        self.settle(outcome.map(|o| (player_id, o)).into_iter().collect());
    }

    /// Player command: rotate the active piece clockwise
    pub fn rotate_piece(&mut self, player_id: PlayerId) {
        if !self.is_playing() {
            return;
        }
        let Some(player) = self.players.get_mut(&player_id) else {
            return;
        };
        engine::rotate(player);
        self.settle(Vec::new());
    }

    /// Player command: drop the active piece to the floor and lock it
    pub fn hard_drop(&mut self, player_id: PlayerId) {
        if !self.is_playing() {
            return;
        }
        let Self { players, rng, .. } = self;
        let Some(player) = players.get_mut(&player_id) else {
            return;
        };
        let outcome = engine::hard_drop(player, rng);
        self.settle(outcome.map(|o| (player_id, o)).into_iter().collect());
    }

    /// Apply lock outcomes: grant power-ups for multi-line clears, evaluate
    /// the end condition on top-outs, and broadcast the new game state.
    fn settle(&mut self, outcomes: Vec<(PlayerId, LockOutcome)>) {
        let mut any_top_out = false;
        for (player_id, outcome) in outcomes {
            any_top_out |= outcome.topped_out;
            if outcome.lines_cleared >= POWER_UP_GRANT_LINES {
                self.grant_power_up(player_id);
            }
        }
        if any_top_out {
            self.check_game_end();
        }
        if self.is_playing() {
            self.events.send(EngineEvent::GameUpdate {
                game: GameView::of(self),
            });
        }
    }

    fn grant_power_up(&mut self, player_id: PlayerId) {
        let def = powerups::draw(&mut self.rng);
        let Some(player) = self.players.get_mut(&player_id) else {
            return;
        };
        let instance = PowerUp::from(def);
        let player_name = player.name.clone();
        player.power_ups.push_back(instance.clone());
        debug!(room = %self.id, player = %player_id, power_up = def.name, "power-up granted");
        self.events.send(EngineEvent::PowerUpAcquired {
            room_id: self.id,
            player_id,
            player_name,
            power_up: instance,
        });
    }

    /// Player command: consume the oldest held power-up. The effect applies
    /// to the requested target if present in the room, otherwise to the
    /// actor; switch-boards always targets a random other player. No-op when
    /// the queue is empty. A topped-out player can still fire what they hold.
    pub fn use_power_up(&mut self, actor: PlayerId, target: Option<PlayerId>) {
        if !self.is_playing() {
            return;
        }
        let Some(player) = self.players.get(&actor) else {
            return;
        };
        let Some(instance) = player.power_ups.front().cloned() else {
            return;
        };

        let target_id = self.resolve_target(actor, target, instance.kind);
        self.apply_effect(actor, target_id, instance.kind);

        // The consumed instance leaves the queue after the effect, so a
        // self-targeted queue wipe removes it along with everything else.
        if let Some(player) = self.players.get_mut(&actor) {
            player.power_ups.pop_front();
        }

        debug!(
            room = %self.id,
            actor = %actor,
            target = %target_id,
            power_up = %instance.name,
            "power-up used"
        );
        let player_name = self
            .players
            .get(&actor)
            .map(|p| p.name.clone())
            .unwrap_or_default();
        let target_name = self
            .players
            .get(&target_id)
            .map(|p| p.name.clone())
            .unwrap_or_default();
        self.events.send(EngineEvent::PowerUpUsed {
            room_id: self.id,
            player_id: actor,
            player_name,
            target_id,
            target_name,
            power_up: instance,
        });
        self.events.send(EngineEvent::GameUpdate {
            game: GameView::of(self),
        });
    }

    fn resolve_target(
        &mut self,
        actor: PlayerId,
        requested: Option<PlayerId>,
        kind: PowerUpKind,
    ) -> PlayerId {
        if kind == PowerUpKind::SwitchBoards {
            // Always a uniformly random other player; the requested target
            // is ignored. With nobody else left it degrades to the actor.
            let others: Vec<PlayerId> = self
                .players
                .keys()
                .copied()
                .filter(|id| *id != actor)
                .collect();
            if others.is_empty() {
                return actor;
            }
            return others[self.rng.next_range(others.len() as u32) as usize];
        }
        match requested {
            Some(id) if self.players.contains_key(&id) => id,
            _ => actor,
        }
    }

    fn apply_effect(&mut self, actor: PlayerId, target_id: PlayerId, kind: PowerUpKind) {
        if kind == PowerUpKind::SwitchBoards {
            if target_id != actor {
                self.swap_boards(actor, target_id);
            }
            return;
        }
        if kind == PowerUpKind::ClearPowerUps {
            if let Some(target) = self.players.get_mut(&target_id) {
                target.power_ups.clear();
            }
            return;
        }

        let Self { players, rng, .. } = self;
        let Some(target) = players.get_mut(&target_id) else {
            return;
        };
        let board = &mut target.board;
        match kind {
            PowerUpKind::GarbageRows => powerups::add_garbage_rows(board, rng, 2),
            PowerUpKind::RemoveRows => powerups::remove_rows(board, 2),
            PowerUpKind::Earthquake => powerups::earthquake(board, rng),
            PowerUpKind::ShuffleRows => powerups::shuffle_rows(board, rng),
            PowerUpKind::ClearColumns => powerups::clear_columns(board, rng, 3),
            PowerUpKind::Gravitation => powerups::gravitation(board),
            PowerUpKind::ClearBoard => powerups::clear_board(board),
            PowerUpKind::GarbageMonster => powerups::add_garbage_rows(board, rng, 5),
            PowerUpKind::MiniBomb => powerups::mini_bomb(board, rng),
            PowerUpKind::SwitchBoards | PowerUpKind::ClearPowerUps => {}
        }
    }

    fn swap_boards(&mut self, a: PlayerId, b: PlayerId) {
        let Some(player_a) = self.players.get_mut(&a) else {
            return;
        };
        let board_a = mem::take(&mut player_a.board);
        let Some(player_b) = self.players.get_mut(&b) else {
            // Put it back; the swap partner vanished.
            if let Some(player_a) = self.players.get_mut(&a) {
                player_a.board = board_a;
            }
            return;
        };
        let board_b = mem::replace(&mut player_b.board, board_a);
        if let Some(player_a) = self.players.get_mut(&a) {
            player_a.board = board_b;
        }
    }

    /// End the round once at most one player is still alive. The survivor
    /// (if any) wins; the gravity task is cancelled and the final state
    /// broadcast.
    fn check_game_end(&mut self) {
        if !self.is_playing() {
            return;
        }
        let alive: Vec<PlayerId> = self
            .players
            .values()
            .filter(|p| !p.game_over)
            .map(|p| p.id)
            .collect();
        if alive.len() > 1 {
            return;
        }

        self.state = RoomState::Finished;
        self.winner = alive.first().copied();
        self.stop_ticker();
        let winner_name = self
            .winner
            .and_then(|id| self.players.get(&id))
            .map(|p| p.name.clone());
        info!(room = %self.id, winner = ?winner_name, "game ended");

        self.events.send(EngineEvent::GameEnded {
            room_id: self.id,
            winner: self.winner,
            winner_name,
            game: GameView::of(self),
        });
    }

}

impl Drop for GameRoom {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}
