// ============================================================================
// RealtimeHub - room membership and fan-out
// ============================================================================
//
// Each connection registers one bounded outbound channel per room it joins.
// A push is a non-blocking `try_send` on that channel; the connection task
// drains it in order, so pushes to a single connection are never reordered.
// A full queue (client not reading) drops the push. Closed channels are
// skipped and cleaned up when their connection disconnects.
//
// ============================================================================

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use stayhub_types::ServerEvent;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

pub type ConnectionId = u64;
pub type EventSender = mpsc::Sender<ServerEvent>;

/// Private room of a user: every connection that identified as them
pub fn user_room(user_id: Uuid) -> String {
    user_id.to_string()
}

#[derive(Default)]
struct HubState {
    rooms: HashMap<String, HashMap<ConnectionId, EventSender>>,
    memberships: HashMap<ConnectionId, HashSet<String>>,
}

#[derive(Default)]
pub struct RealtimeHub {
    next_id: AtomicU64,
    state: RwLock<HubState>,
}

impl RealtimeHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_connection_id(&self) -> ConnectionId {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Add the connection to `room`. Joining twice is a no-op.
    pub async fn join(&self, conn: ConnectionId, room: &str, tx: EventSender) {
        let mut state = self.state.write().await;
        state
            .rooms
            .entry(room.to_string())
            .or_default()
            .insert(conn, tx);
        state
            .memberships
            .entry(conn)
            .or_default()
            .insert(room.to_string());
    }

    pub async fn leave(&self, conn: ConnectionId, room: &str) {
        let mut state = self.state.write().await;
        remove_member(&mut state.rooms, conn, room);
        if let Some(joined) = state.memberships.get_mut(&conn) {
            joined.remove(room);
            if joined.is_empty() {
                state.memberships.remove(&conn);
            }
        }
    }

    /// Drop every membership of a closed connection
    pub async fn disconnect(&self, conn: ConnectionId) {
        let mut state = self.state.write().await;
        if let Some(joined) = state.memberships.remove(&conn) {
            for room in joined {
                remove_member(&mut state.rooms, conn, &room);
            }
        }
    }

    /// Push to every member of `room`. Returns how many connections accepted it.
    pub async fn broadcast(&self, room: &str, event: &ServerEvent) -> usize {
        self.fan_out(room, None, event).await
    }

    /// Push to every member of `room` except the originating connection
    pub async fn broadcast_except(
        &self,
        room: &str,
        except: ConnectionId,
        event: &ServerEvent,
    ) -> usize {
        self.fan_out(room, Some(except), event).await
    }

    pub async fn send_to_user(&self, user_id: Uuid, event: &ServerEvent) -> usize {
        self.broadcast(&user_room(user_id), event).await
    }

    pub async fn room_size(&self, room: &str) -> usize {
        self.state
            .read()
            .await
            .rooms
            .get(room)
            .map(|members| members.len())
            .unwrap_or(0)
    }

    pub async fn is_member(&self, conn: ConnectionId, room: &str) -> bool {
        self.state
            .read()
            .await
            .memberships
            .get(&conn)
            .is_some_and(|joined| joined.contains(room))
    }

    async fn fan_out(
        &self,
        room: &str,
        except: Option<ConnectionId>,
        event: &ServerEvent,
    ) -> usize {
        let state = self.state.read().await;
        let Some(members) = state.rooms.get(room) else {
            return 0;
        };

        let mut delivered = 0;
        for (conn, tx) in members.iter() {
            if Some(*conn) == except {
                continue;
            }
            match tx.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(
                        connection_id = *conn,
                        room,
                        "Outbound queue full, dropping realtime event"
                    );
                }
                Err(TrySendError::Closed(_)) => {}
            }
        }
        delivered
    }
}

fn remove_member(
    rooms: &mut HashMap<String, HashMap<ConnectionId, EventSender>>,
    conn: ConnectionId,
    room: &str,
) {
    if let Some(members) = rooms.get_mut(room) {
        members.remove(&conn);
        if members.is_empty() {
            rooms.remove(room);
        }
    }
}
