//! # Sync Transport
//!
//! Opaque bidirectional channel carrying replica updates for one chapter.
//! Sessions only connect and destroy; what travels over the wire is
//! [`SyncMessage`].
//!
//! [`LocalHub`] relays messages between sessions in one process, each
//! message going to every other member of the chapter's room. Deliveries
//! queue per member without bound, so a relay never waits on a slow reader
//! and two peers flooding each other cannot block in a cycle.

use crate::error::CollabError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, trace};

const CHANNEL_CAPACITY: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncMessage {
    /// "This is what I have": peers answer with the missing updates.
    StateVector(Vec<u8>),
    Update(Vec<u8>),
}

/// A connected chapter channel.
#[derive(Debug)]
pub struct SyncChannel {
    pub outgoing: mpsc::Sender<SyncMessage>,
    pub incoming: mpsc::Receiver<SyncMessage>,
}

#[async_trait]
pub trait SyncTransport: Send + Sync {
    async fn connect(&self, chapter_id: &str) -> Result<SyncChannel, CollabError>;

    async fn destroy(&self, chapter_id: &str) -> Result<(), CollabError>;
}

#[derive(Debug, Clone)]
struct HubClient {
    client_id: u64,
    sender: mpsc::UnboundedSender<SyncMessage>,
}

/// In-process relay between sessions of the same chapter.
#[derive(Debug, Default)]
pub struct LocalHub {
    rooms: Mutex<HashMap<String, Vec<HubClient>>>,
    next_client: AtomicU64,
}

impl LocalHub {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A transport for one peer.
    pub fn transport(self: &Arc<Self>) -> HubTransport {
        HubTransport {
            hub: Arc::clone(self),
            client_id: self.next_client.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub async fn member_count(&self, chapter_id: &str) -> usize {
        self.rooms
            .lock()
            .await
            .get(chapter_id)
            .map_or(0, |clients| clients.len())
    }

    async fn join(&self, chapter_id: &str, client: HubClient) {
        let mut rooms = self.rooms.lock().await;
        let clients = rooms.entry(chapter_id.to_string()).or_default();
        // Reconnects replace the previous channel
        clients.retain(|c| c.client_id != client.client_id);
        clients.push(client);
    }

    async fn leave(&self, chapter_id: &str, client_id: u64) {
        let mut rooms = self.rooms.lock().await;
        if let Some(clients) = rooms.get_mut(chapter_id) {
            clients.retain(|c| c.client_id != client_id);
            if clients.is_empty() {
                rooms.remove(chapter_id);
            }
        }
    }

    /// Send to every member of the room except the origin.
    async fn broadcast(&self, chapter_id: &str, message: SyncMessage, origin: u64) {
        let recipients: Vec<HubClient> = {
            let rooms = self.rooms.lock().await;
            rooms
                .get(chapter_id)
                .map(|clients| {
                    clients
                        .iter()
                        .filter(|c| c.client_id != origin)
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        };
        trace!(chapter = %chapter_id, origin, recipients = recipients.len(), "relaying");
        for client in recipients {
            // Ignore send errors (the peer may have closed)
            let _ = client.sender.send(message.clone());
        }
    }
}

/// One peer's handle on a [`LocalHub`].
#[derive(Debug, Clone)]
pub struct HubTransport {
    hub: Arc<LocalHub>,
    client_id: u64,
}

#[async_trait]
impl SyncTransport for HubTransport {
    async fn connect(&self, chapter_id: &str) -> Result<SyncChannel, CollabError> {
        let (to_peer, incoming) = mpsc::channel(CHANNEL_CAPACITY);
        let (queued, mut queue) = mpsc::unbounded_channel::<SyncMessage>();
        let (outgoing, mut from_peer) = mpsc::channel::<SyncMessage>(CHANNEL_CAPACITY);

        self.hub
            .join(
                chapter_id,
                HubClient {
                    client_id: self.client_id,
                    sender: queued,
                },
            )
            .await;

        tokio::spawn(async move {
            while let Some(message) = queue.recv().await {
                if to_peer.send(message).await.is_err() {
                    break;
                }
            }
        });

        let hub = Arc::clone(&self.hub);
        let chapter = chapter_id.to_string();
        let origin = self.client_id;
        tokio::spawn(async move {
            while let Some(message) = from_peer.recv().await {
                hub.broadcast(&chapter, message, origin).await;
            }
            debug!(chapter = %chapter, client = origin, "relay ended");
        });

        debug!(chapter = %chapter_id, client = self.client_id, "joined hub");
        Ok(SyncChannel { outgoing, incoming })
    }

    async fn destroy(&self, chapter_id: &str) -> Result<(), CollabError> {
        self.hub.leave(chapter_id, self.client_id).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_relay_excludes_origin() {
        let hub = LocalHub::new();
        let one = hub.transport();
        let two = hub.transport();
        let three = hub.transport();

        let mut ch_one = one.connect("c").await.unwrap();
        let mut ch_two = two.connect("c").await.unwrap();
        let mut ch_other = three.connect("elsewhere").await.unwrap();

        ch_one
            .outgoing
            .send(SyncMessage::Update(vec![1, 2]))
            .await
            .unwrap();

        assert_eq!(
            ch_two.incoming.recv().await,
            Some(SyncMessage::Update(vec![1, 2]))
        );
        assert!(ch_one.incoming.try_recv().is_err());
        assert!(ch_other.incoming.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_peers_flooding_each_other_do_not_stall() {
        let hub = LocalHub::new();
        let mut one = hub.transport().connect("c").await.unwrap();
        let mut two = hub.transport().connect("c").await.unwrap();
        let count = CHANNEL_CAPACITY * 3;

        let flood = |outgoing: mpsc::Sender<SyncMessage>, tag: u8| async move {
            for n in 0..count {
                outgoing
                    .send(SyncMessage::Update(vec![tag, (n % 256) as u8]))
                    .await
                    .unwrap();
            }
        };
        // Neither side reads while sending
        tokio::time::timeout(
            std::time::Duration::from_secs(5),
            async {
                tokio::join!(flood(one.outgoing.clone(), 1), flood(two.outgoing.clone(), 2));
            },
        )
        .await
        .unwrap();

        for n in 0..count {
            assert_eq!(
                two.incoming.recv().await,
                Some(SyncMessage::Update(vec![1, (n % 256) as u8]))
            );
            assert_eq!(
                one.incoming.recv().await,
                Some(SyncMessage::Update(vec![2, (n % 256) as u8]))
            );
        }
    }

    #[tokio::test]
    async fn test_destroy_leaves_room() {
        let hub = LocalHub::new();
        let one = hub.transport();
        let _channel = one.connect("c").await.unwrap();
        assert_eq!(hub.member_count("c").await, 1);

        one.destroy("c").await.unwrap();
        assert_eq!(hub.member_count("c").await, 0);
    }
}
