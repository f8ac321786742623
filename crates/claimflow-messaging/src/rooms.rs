// SPDX-FileCopyrightText: 2026 Claimflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory room registry for real-time message fan-out.
//!
//! A room is scoped to one claim id and holds the outbound senders of every
//! connection currently joined. Membership is per-connection and lives only
//! as long as the connection: nothing here is persisted.

use dashmap::DashMap;
use tokio::sync::mpsc;

/// Registry of claim rooms. One instance is shared by all connections.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: DashMap<String, DashMap<String, mpsc::Sender<String>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Display name of a claim's room.
    pub fn room_name(claim_id: &str) -> String {
        format!("claim-{claim_id}")
    }

    /// Add a connection's outbound sender to a claim's room.
    pub fn join(&self, claim_id: &str, conn_id: &str, tx: mpsc::Sender<String>) {
        self.rooms
            .entry(claim_id.to_string())
            .or_default()
            .insert(conn_id.to_string(), tx);
        tracing::debug!(conn_id, room = %Self::room_name(claim_id), "joined room");
    }

    /// Remove a connection from one room. Empty rooms are pruned.
    pub fn leave(&self, claim_id: &str, conn_id: &str) {
        if let Some(room) = self.rooms.get(claim_id) {
            room.remove(conn_id);
        }
        self.rooms.remove_if(claim_id, |_, room| room.is_empty());
        tracing::debug!(conn_id, room = %Self::room_name(claim_id), "left room");
    }

    /// Remove a connection from every room it joined (disconnect cleanup).
    pub fn leave_all(&self, conn_id: &str) {
        for room in self.rooms.iter() {
            room.value().remove(conn_id);
        }
        self.rooms.retain(|_, room| !room.is_empty());
    }

    /// Number of connections currently in a claim's room.
    pub fn occupancy(&self, claim_id: &str) -> usize {
        self.rooms.get(claim_id).map(|room| room.len()).unwrap_or(0)
    }

    /// Send a payload to every connection in the room, sender included.
    pub async fn broadcast(&self, claim_id: &str, payload: &str) {
        self.fan_out(claim_id, payload, None).await;
    }

    /// Send a payload to every connection in the room except one.
    pub async fn broadcast_except(&self, claim_id: &str, payload: &str, skip_conn: &str) {
        self.fan_out(claim_id, payload, Some(skip_conn)).await;
    }

    async fn fan_out(&self, claim_id: &str, payload: &str, skip_conn: Option<&str>) {
        // Collect senders first so no map lock is held across an await.
        let senders: Vec<mpsc::Sender<String>> = match self.rooms.get(claim_id) {
            Some(room) => room
                .iter()
                .filter(|entry| skip_conn != Some(entry.key().as_str()))
                .map(|entry| entry.value().clone())
                .collect(),
            None => return,
        };
        for tx in senders {
            // A full or closed receiver just misses the event; disconnect
            // cleanup removes it from the registry.
            let _ = tx.send(payload.to_string()).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> (mpsc::Sender<String>, mpsc::Receiver<String>) {
        mpsc::channel(8)
    }

    #[tokio::test]
    async fn broadcast_reaches_every_member_including_sender() {
        let registry = RoomRegistry::new();
        let (tx_a, mut rx_a) = channel();
        let (tx_b, mut rx_b) = channel();
        registry.join("c-1", "conn-a", tx_a);
        registry.join("c-1", "conn-b", tx_b);

        registry.broadcast("c-1", "hello").await;

        assert_eq!(rx_a.recv().await.unwrap(), "hello");
        assert_eq!(rx_b.recv().await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn broadcast_except_skips_the_sender() {
        let registry = RoomRegistry::new();
        let (tx_a, mut rx_a) = channel();
        let (tx_b, mut rx_b) = channel();
        registry.join("c-1", "conn-a", tx_a);
        registry.join("c-1", "conn-b", tx_b);

        registry.broadcast_except("c-1", "typing", "conn-a").await;

        assert_eq!(rx_b.recv().await.unwrap(), "typing");
        assert!(rx_a.try_recv().is_err(), "sender must not receive");
    }

    #[tokio::test]
    async fn rooms_are_isolated_per_claim() {
        let registry = RoomRegistry::new();
        let (tx_a, mut rx_a) = channel();
        let (tx_b, mut rx_b) = channel();
        registry.join("c-1", "conn-a", tx_a);
        registry.join("c-2", "conn-b", tx_b);

        registry.broadcast("c-1", "only c-1").await;

        assert_eq!(rx_a.recv().await.unwrap(), "only c-1");
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn leave_and_disconnect_prune_membership() {
        let registry = RoomRegistry::new();
        let (tx_a, _rx_a) = channel();
        let (tx_b, _rx_b) = channel();
        registry.join("c-1", "conn-a", tx_a.clone());
        registry.join("c-1", "conn-b", tx_b);
        registry.join("c-2", "conn-a", tx_a);
        assert_eq!(registry.occupancy("c-1"), 2);

        registry.leave("c-1", "conn-a");
        assert_eq!(registry.occupancy("c-1"), 1);

        // Disconnect cleanup removes the connection everywhere.
        registry.leave_all("conn-a");
        assert_eq!(registry.occupancy("c-2"), 0);

        registry.leave_all("conn-b");
        assert_eq!(registry.occupancy("c-1"), 0);
    }

    #[tokio::test]
    async fn broadcast_to_unknown_room_is_a_no_op() {
        let registry = RoomRegistry::new();
        registry.broadcast("nowhere", "lost").await;
    }
}
