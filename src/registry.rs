//! Registry module - the top-level room directory and command surface
//!
//! The registry owns every room behind a read-write locked map; each room
//! sits behind its own async mutex so games never block each other. Gravity
//! runs as one spawned task per playing room; the task re-checks the room's
//! lifecycle state under the lock on every tick and exits on its own once
//! the round is over, with abort as the fast path.
//!
//! Lock order is always registry map first, room second.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::sync::{mpsc, Mutex, RwLock};
use tracing::{info, warn};

use crate::core::powerups;
use crate::core::room::GameRoom;
use crate::error::{JoinError, StartError};
use crate::events::{EngineEvent, EventSender};
use crate::snapshot::RoomSummary;
use crate::types::{MoveDir, PlayerId, RoomId, RoomState, GRAVITY_INTERVAL_MS};

type SharedRoom = Arc<Mutex<GameRoom>>;

/// Directory of all live rooms
pub struct RoomRegistry {
    rooms: RwLock<HashMap<RoomId, SharedRoom>>,
    events: EventSender,
}

impl RoomRegistry {
    /// Build a registry and the event stream it publishes on. Fails if the
    /// power-up catalog is misconfigured.
    pub fn new() -> anyhow::Result<(Arc<Self>, mpsc::UnboundedReceiver<EngineEvent>)> {
        powerups::validate_catalog()?;
        let (events, rx) = EventSender::channel();
        let registry = Arc::new(Self {
            rooms: RwLock::new(HashMap::new()),
            events,
        });
        Ok((registry, rx))
    }

    /// Create a room seeded from the clock, with the creator as host
    pub async fn create_room(
        &self,
        name: impl Into<String>,
        player_id: PlayerId,
        player_name: impl Into<String>,
    ) -> RoomId {
        self.create_room_with_seed(name, player_id, player_name, clock_seed())
            .await
    }

    /// Create a room with an explicit RNG seed, so a whole game can be
    /// reproduced
    pub async fn create_room_with_seed(
        &self,
        name: impl Into<String>,
        player_id: PlayerId,
        player_name: impl Into<String>,
        seed: u32,
    ) -> RoomId {
        let room_id = RoomId::new();
        let mut room = GameRoom::new(room_id, name, seed, self.events.clone());
        if let Err(err) = room.add_player(player_id, player_name) {
            // A fresh empty room accepts its creator unconditionally.
            warn!(room = %room_id, %err, "creator rejected from new room");
        }
        info!(room = %room_id, name = %room.name, host = %player_id, "room created");

        self.rooms
            .write()
            .await
            .insert(room_id, Arc::new(Mutex::new(room)));

        self.events.send(EngineEvent::RoomCreated { room_id, player_id });
        self.broadcast_room_list().await;
        room_id
    }

    /// Join an existing waiting room
    pub async fn join_room(
        &self,
        room_id: RoomId,
        player_id: PlayerId,
        player_name: impl Into<String>,
    ) -> Result<(), JoinError> {
        let Some(room) = self.room(room_id).await else {
            self.reject_join(player_id, JoinError::RoomNotFound);
            return Err(JoinError::RoomNotFound);
        };

        let result = room.lock().await.add_player(player_id, player_name);
        match result {
            Ok(()) => {
                self.events.send(EngineEvent::RoomJoined { room_id, player_id });
                self.broadcast_room_list().await;
                Ok(())
            }
            Err(err) => {
                self.reject_join(player_id, err);
                Err(err)
            }
        }
    }

    fn reject_join(&self, player_id: PlayerId, err: JoinError) {
        self.events.send(EngineEvent::JoinError {
            player_id,
            message: err.to_string(),
        });
    }

    /// Start a round and attach its gravity task
    pub async fn start_game(&self, room_id: RoomId, player_id: PlayerId) -> Result<(), StartError> {
        let Some(room) = self.room(room_id).await else {
            self.reject_start(player_id, StartError::RoomNotFound);
            return Err(StartError::RoomNotFound);
        };

        {
            let mut guard = room.lock().await;
            if let Err(err) = guard.start(player_id) {
                self.reject_start(player_id, err);
                return Err(err);
            }
            guard.set_ticker(spawn_gravity(Arc::clone(&room)));
        }
        self.broadcast_room_list().await;
        Ok(())
    }

    fn reject_start(&self, player_id: PlayerId, err: StartError) {
        self.events.send(EngineEvent::StartError {
            player_id,
            message: err.to_string(),
        });
    }

    /// Gameplay commands. Unknown rooms and players degrade to no-ops; the
    /// room enforces its own lifecycle guards.
    pub async fn move_piece(&self, room_id: RoomId, player_id: PlayerId, dir: MoveDir) {
        if let Some(room) = self.room(room_id).await {
            room.lock().await.move_piece(player_id, dir);
        }
    }

    pub async fn rotate_piece(&self, room_id: RoomId, player_id: PlayerId) {
        if let Some(room) = self.room(room_id).await {
            room.lock().await.rotate_piece(player_id);
        }
    }

    pub async fn hard_drop(&self, room_id: RoomId, player_id: PlayerId) {
        if let Some(room) = self.room(room_id).await {
            room.lock().await.hard_drop(player_id);
        }
    }

    pub async fn use_power_up(
        &self,
        room_id: RoomId,
        player_id: PlayerId,
        target: Option<PlayerId>,
    ) {
        if let Some(room) = self.room(room_id).await {
            room.lock().await.use_power_up(player_id, target);
        }
    }

    /// Remove a player from a room, destroying the room once empty
    pub async fn leave_room(&self, room_id: RoomId, player_id: PlayerId) {
        let Some(room) = self.room(room_id).await else {
            return;
        };
        let empty = room.lock().await.remove_player(player_id);
        if empty {
            self.rooms.write().await.remove(&room_id);
            info!(room = %room_id, "empty room destroyed");
        }
        self.broadcast_room_list().await;
    }

    /// Remove a player from every room they are in; used when a connection
    /// drops without an explicit leave
    pub async fn disconnect(&self, player_id: PlayerId) {
        let rooms: Vec<(RoomId, SharedRoom)> = {
            let map = self.rooms.read().await;
            map.iter().map(|(id, r)| (*id, Arc::clone(r))).collect()
        };

        let mut emptied = Vec::new();
        for (room_id, room) in rooms {
            let mut guard = room.lock().await;
            if guard.player(player_id).is_some() && guard.remove_player(player_id) {
                emptied.push(room_id);
            }
        }
        if !emptied.is_empty() {
            let mut map = self.rooms.write().await;
            for room_id in &emptied {
                map.remove(room_id);
                info!(room = %room_id, "empty room destroyed");
            }
        }
        self.broadcast_room_list().await;
    }

    /// Public room list: only rooms still accepting players
    pub async fn room_list(&self) -> Vec<RoomSummary> {
        let rooms: Vec<SharedRoom> = self.rooms.read().await.values().cloned().collect();
        let mut list = Vec::new();
        for room in rooms {
            let guard = room.lock().await;
            if guard.state() == RoomState::Waiting {
                list.push(RoomSummary::of(&guard));
            }
        }
        list.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        list
    }

    /// Shared handle to one room, for transports and tests
    pub async fn room(&self, room_id: RoomId) -> Option<SharedRoom> {
        self.rooms.read().await.get(&room_id).cloned()
    }

    async fn broadcast_room_list(&self) {
        let rooms = self.room_list().await;
        self.events.send(EngineEvent::RoomListUpdate { rooms });
    }
}

/// Gravity task: ticks the room once per interval until the round stops
/// being playable. The first (immediate) interval tick is consumed so the
/// opening board state survives a full second.
fn spawn_gravity(room: SharedRoom) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(GRAVITY_INTERVAL_MS));
        interval.tick().await;
        loop {
            interval.tick().await;
            let mut guard = room.lock().await;
            if !guard.is_playing() {
                break;
            }
            guard.tick();
        }
    })
}

fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| (d.as_secs() as u32).wrapping_add(d.subsec_nanos()))
        .unwrap_or(0x5eed_1234)
}
