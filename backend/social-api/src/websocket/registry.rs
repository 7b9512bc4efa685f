/// Process-local map of joined users to their current socket
///
/// One entry per user: joining from a new socket replaces the previous
/// entry, and a socket can only remove the entry it still owns.
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use super::messages::{ConnectedUser, ServerEvent};

pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

struct Connection {
    socket_id: Uuid,
    sender: EventSender,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    /// The user was registered under another socket
    Replaced,
    /// Same socket joined twice
    AlreadyJoined,
}

#[derive(Clone, Default)]
pub struct SocketRegistry {
    connections: Arc<RwLock<HashMap<Uuid, Connection>>>,
}

impl SocketRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn join(&self, user_id: Uuid, socket_id: Uuid, sender: EventSender) -> JoinOutcome {
        let mut connections = self.connections.write().await;

        let outcome = match connections.get(&user_id) {
            Some(existing) if existing.socket_id == socket_id => return JoinOutcome::AlreadyJoined,
            Some(_) => JoinOutcome::Replaced,
            None => JoinOutcome::Joined,
        };

        connections.insert(user_id, Connection { socket_id, sender });
        tracing::debug!(%user_id, %socket_id, ?outcome, "Socket joined");
        outcome
    }

    /// Returns `true` if the entry was removed
    pub async fn leave(&self, user_id: Uuid, socket_id: Uuid) -> bool {
        let mut connections = self.connections.write().await;
        match connections.get(&user_id) {
            Some(existing) if existing.socket_id == socket_id => {
                connections.remove(&user_id);
                tracing::debug!(%user_id, %socket_id, "Socket left");
                true
            }
            _ => false,
        }
    }

    /// Returns whether the user had a live socket to receive the event
    pub async fn send_to_user(&self, user_id: Uuid, event: ServerEvent) -> bool {
        let connections = self.connections.read().await;
        match connections.get(&user_id) {
            Some(connection) => connection.sender.send(event).is_ok(),
            None => false,
        }
    }

    #[cfg(test)]
    pub async fn socket_for(&self, user_id: Uuid) -> Option<Uuid> {
        let connections = self.connections.read().await;
        connections.get(&user_id).map(|c| c.socket_id)
    }

    pub async fn connected_users_except(&self, socket_id: Uuid) -> Vec<ConnectedUser> {
        let connections = self.connections.read().await;
        connections
            .iter()
            .filter(|(_, c)| c.socket_id != socket_id)
            .map(|(user_id, c)| ConnectedUser {
                user_id: *user_id,
                socket_id: c.socket_id,
            })
            .collect()
    }

    /// Number of users currently joined, reported by `/health`
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }
}
