//! Matchmaking queue implementation

use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::ws::connection::Connection;

/// Connection parked in the queue
#[derive(Debug, Clone)]
pub struct QueuedPlayer {
    pub conn: Connection,
    pub queued_at: Instant,
}

impl QueuedPlayer {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            queued_at: Instant::now(),
        }
    }

    /// How long this player has been waiting
    pub fn wait_time(&self) -> Duration {
        self.queued_at.elapsed()
    }
}

/// The matchmaking queue. A duel needs two players, so at most one ever waits.
///
/// Not synchronized on its own; the session manager owns it behind a lock.
#[derive(Debug, Default)]
pub struct MatchmakingQueue {
    waiting: Option<QueuedPlayer>,
}

impl MatchmakingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Park `conn`, or hand back whoever was already waiting so the caller can
    /// pair them. The slot is empty afterwards in the pairing case.
    pub fn offer(&mut self, conn: Connection) -> Option<QueuedPlayer> {
        match self.waiting.take() {
            Some(waiting) => Some(waiting),
            None => {
                self.waiting = Some(QueuedPlayer::new(conn));
                None
            }
        }
    }

    /// Clear the slot if `conn_id` is the one waiting
    pub fn withdraw(&mut self, conn_id: Uuid) -> Option<QueuedPlayer> {
        if self.contains(conn_id) {
            self.waiting.take()
        } else {
            None
        }
    }

    pub fn contains(&self, conn_id: Uuid) -> bool {
        self.waiting
            .as_ref()
            .is_some_and(|p| p.conn.id() == conn_id)
    }

    pub fn waiting(&self) -> Option<&QueuedPlayer> {
        self.waiting.as_ref()
    }

    pub fn len(&self) -> usize {
        usize::from(self.waiting.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_offer_pairs_with_first() {
        let mut queue = MatchmakingQueue::new();
        let (a, _a_rx) = Connection::channel();
        let (b, _b_rx) = Connection::channel();

        assert!(queue.offer(a.clone()).is_none());
        assert_eq!(queue.len(), 1);
        assert!(queue.contains(a.id()));

        let paired = queue.offer(b.clone()).expect("pairs with waiting player");
        assert_eq!(paired.conn, a);
        assert!(queue.is_empty());
        assert!(!queue.contains(b.id()));
    }

    #[test]
    fn withdraw_only_clears_matching_connection() {
        let mut queue = MatchmakingQueue::new();
        let (a, _a_rx) = Connection::channel();
        let (b, _b_rx) = Connection::channel();
        queue.offer(a.clone());

        assert!(queue.withdraw(b.id()).is_none());
        assert_eq!(queue.len(), 1);

        assert_eq!(queue.withdraw(a.id()).map(|p| p.conn), Some(a));
        assert!(queue.is_empty());
        assert!(queue.offer(b).is_none());
    }
}
