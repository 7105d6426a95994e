use crate::config::Peer;
use crate::message::Message;
use crate::transport::Transport;
use anyhow::bail;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Sent {
    peer: Peer,
    message: Message,
    at: Instant,
}

/// transport keeping the messages in memory, in sending order
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    sent: Arc<Mutex<Vec<Sent>>>,
    failing: Arc<HashSet<Peer>>,
    stall: Duration,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// sending to any of `peers` fails
    pub fn failing<I>(peers: I) -> Self
    where
        I: IntoIterator<Item = Peer>,
    {
        Self::stalling(peers, Duration::ZERO)
    }

    /// sending to any of `peers` hangs for `stall` then fails
    pub fn stalling<I>(peers: I, stall: Duration) -> Self
    where
        I: IntoIterator<Item = Peer>,
    {
        Self {
            sent: Arc::default(),
            failing: Arc::new(peers.into_iter().collect()),
            stall,
        }
    }

    pub fn sent(&self) -> Vec<(Peer, Message)> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|sent| (sent.peer.clone(), sent.message.clone()))
            .collect()
    }

    pub fn sent_to(&self, peer: &Peer) -> Vec<Message> {
        self.sent()
            .into_iter()
            .filter(|(to, _)| to == peer)
            .map(|(_, message)| message)
            .collect()
    }

    /// when the messages to `peer` were delivered
    pub fn sent_at(&self, peer: &Peer) -> Vec<Instant> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|sent| &sent.peer == peer)
            .map(|sent| sent.at)
            .collect()
    }
}

#[async_trait::async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, peer: &Peer, message: &Message) -> anyhow::Result<()> {
        if self.failing.contains(peer) {
            tokio::time::sleep(self.stall).await;
            bail!("{peer} is unreachable");
        }
        self.sent.lock().unwrap().push(Sent {
            peer: peer.clone(),
            message: message.clone(),
            at: Instant::now(),
        });
        Ok(())
    }
}
