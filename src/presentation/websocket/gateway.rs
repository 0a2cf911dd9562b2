//! Chat Gateway
//!
//! Tracks connected sockets and routes server events. A socket joins exactly
//! one conversation room; the account registry spans all of an account's
//! sockets so activity in other conversations can still reach them.

use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::messages::ServerEvent;
use crate::domain::Party;
use crate::infrastructure::metrics;

/// A socket joined to a conversation room
struct RoomMember {
    socket_id: Uuid,
    party: Party,
    sender: mpsc::UnboundedSender<ServerEvent>,
}

/// A socket in the account registry
struct AccountSocket {
    socket_id: Uuid,
    sender: mpsc::UnboundedSender<ServerEvent>,
}

/// Connection registry for the WebSocket channel
#[derive(Default)]
pub struct ChatGateway {
    /// Conversation ID to joined sockets
    rooms: DashMap<i64, Vec<RoomMember>>,
    /// Account to all of its sockets
    accounts: DashMap<Party, Vec<AccountSocket>>,
}

impl ChatGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a socket: joins the conversation room and the account
    /// registry.
    pub fn join(
        &self,
        conversation_id: i64,
        socket_id: Uuid,
        party: Party,
        sender: mpsc::UnboundedSender<ServerEvent>,
    ) {
        self.rooms
            .entry(conversation_id)
            .or_default()
            .push(RoomMember {
                socket_id,
                party,
                sender: sender.clone(),
            });

        self.accounts
            .entry(party)
            .or_default()
            .push(AccountSocket { socket_id, sender });

        self.update_metrics();

        tracing::debug!(
            conversation_id,
            socket_id = %socket_id,
            role = %party.role,
            account_id = party.id,
            "Socket joined room"
        );
    }

    /// Remove a socket from its room and the account registry.
    pub fn leave(&self, conversation_id: i64, socket_id: Uuid, party: Party) {
        if let Some(mut members) = self.rooms.get_mut(&conversation_id) {
            members.retain(|m| m.socket_id != socket_id);
        }
        self.rooms
            .remove_if(&conversation_id, |_, members| members.is_empty());

        if let Some(mut sockets) = self.accounts.get_mut(&party) {
            sockets.retain(|s| s.socket_id != socket_id);
        }
        self.accounts.remove_if(&party, |_, sockets| sockets.is_empty());

        self.update_metrics();

        tracing::debug!(
            conversation_id,
            socket_id = %socket_id,
            "Socket left room"
        );
    }

    /// Send an event to every socket in a room, optionally excluding one.
    pub fn broadcast_to_room(
        &self,
        conversation_id: i64,
        event: ServerEvent,
        exclude: Option<Uuid>,
    ) {
        if let Some(members) = self.rooms.get(&conversation_id) {
            for member in members.iter() {
                if Some(member.socket_id) == exclude {
                    continue;
                }
                // A send failure means the socket is tearing down; its
                // cleanup removes it from the room
                let _ = member.sender.send(event.clone());
            }
        }
    }

    /// Send an event to all of an account's sockets.
    pub fn send_to_account(&self, party: Party, event: ServerEvent) {
        if let Some(sockets) = self.accounts.get(&party) {
            for socket in sockets.iter() {
                let _ = socket.sender.send(event.clone());
            }
        }
    }

    /// Whether any of the account's sockets is joined to the room.
    pub fn room_contains(&self, conversation_id: i64, party: Party) -> bool {
        self.rooms
            .get(&conversation_id)
            .map(|members| members.iter().any(|m| m.party == party))
            .unwrap_or(false)
    }

    /// Total number of joined sockets.
    pub fn socket_count(&self) -> usize {
        self.rooms.iter().map(|entry| entry.value().len()).sum()
    }

    /// Number of rooms with at least one socket.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    fn update_metrics(&self) {
        metrics::set_websocket_connections(self.socket_count() as i64, self.room_count() as i64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    fn channel() -> (
        mpsc::UnboundedSender<ServerEvent>,
        mpsc::UnboundedReceiver<ServerEvent>,
    ) {
        mpsc::unbounded_channel()
    }

    #[test]
    fn test_join_and_leave() {
        let gateway = ChatGateway::new();
        let agent = Party::new(Role::Agent, 1);
        let socket_id = Uuid::new_v4();
        let (tx, _rx) = channel();

        gateway.join(100, socket_id, agent, tx);
        assert!(gateway.room_contains(100, agent));
        assert_eq!(gateway.socket_count(), 1);

        gateway.leave(100, socket_id, agent);
        assert!(!gateway.room_contains(100, agent));
        assert_eq!(gateway.socket_count(), 0);
        assert_eq!(gateway.room_count(), 0);
    }

    #[test]
    fn test_broadcast_excludes_sender() {
        let gateway = ChatGateway::new();
        let agent = Party::new(Role::Agent, 1);
        let buyer = Party::new(Role::Buyer, 2);
        let agent_socket = Uuid::new_v4();
        let buyer_socket = Uuid::new_v4();
        let (agent_tx, mut agent_rx) = channel();
        let (buyer_tx, mut buyer_rx) = channel();

        gateway.join(100, agent_socket, agent, agent_tx);
        gateway.join(100, buyer_socket, buyer, buyer_tx);

        let event = ServerEvent::Typing {
            sender_role: "agent".into(),
            sender_id: "1".into(),
        };
        gateway.broadcast_to_room(100, event, Some(agent_socket));

        assert!(agent_rx.try_recv().is_err());
        assert!(matches!(
            buyer_rx.try_recv().unwrap(),
            ServerEvent::Typing { .. }
        ));
    }

    #[test]
    fn test_broadcast_between_join_and_replay_is_queued() {
        let gateway = ChatGateway::new();
        let buyer = Party::new(Role::Buyer, 2);
        let (tx, mut rx) = channel();

        // A socket joins its room, then a message lands while the history
        // fetch is still in flight, then the replay is queued
        gateway.join(100, Uuid::new_v4(), buyer, tx.clone());
        gateway.broadcast_to_room(
            100,
            ServerEvent::Typing {
                sender_role: "agent".into(),
                sender_id: "1".into(),
            },
            None,
        );
        let _ = tx.send(ServerEvent::History {
            messages: Vec::new(),
        });

        // The live event is queued ahead of the replay, not dropped
        assert!(matches!(rx.try_recv().unwrap(), ServerEvent::Typing { .. }));
        assert!(matches!(rx.try_recv().unwrap(), ServerEvent::History { .. }));
    }

    #[test]
    fn test_send_to_account_reaches_all_sockets() {
        let gateway = ChatGateway::new();
        let buyer = Party::new(Role::Buyer, 2);
        let (tx_a, mut rx_a) = channel();
        let (tx_b, mut rx_b) = channel();

        gateway.join(100, Uuid::new_v4(), buyer, tx_a);
        gateway.join(200, Uuid::new_v4(), buyer, tx_b);

        gateway.send_to_account(
            buyer,
            ServerEvent::Notify {
                conversation_id: "100".into(),
                preview: "hello".into(),
            },
        );

        assert!(matches!(rx_a.try_recv().unwrap(), ServerEvent::Notify { .. }));
        assert!(matches!(rx_b.try_recv().unwrap(), ServerEvent::Notify { .. }));
    }
}
