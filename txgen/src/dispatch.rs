use crate::config::Peer;
use crate::message::Message;
use crate::transport::Transport;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, warn, Instrument};

/// what the dispatcher did over its lifetime
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchStats {
    /// messages taken off the queue
    pub messages: usize,
    /// successful sends, one per peer
    pub deliveries: usize,
    /// failed sends, one per peer
    pub failures: usize,
}

struct Outgoing {
    peers: Vec<Peer>,
    message: Message,
}

/// outbound queue of the generator
///
/// enqueueing never blocks the scheduler. A background task routes every
/// message to one worker per peer: a peer receives its messages in the
/// order they were enqueued, and a slow or unreachable peer only delays
/// its own messages.
pub struct DispatchQueue {
    queue: mpsc::UnboundedSender<Outgoing>,
    worker: JoinHandle<DispatchStats>,
}

impl DispatchQueue {
    /// start the dispatching task, must be called within a tokio runtime
    pub fn spawn(transport: Arc<dyn Transport>) -> Self {
        let (queue, requests) = mpsc::unbounded_channel();
        let worker = tokio::spawn(
            dispatcher(transport, requests).instrument(tracing::info_span!("dispatcher")),
        );
        Self { queue, worker }
    }

    pub fn send(&self, peer: Peer, message: Message) {
        self.broadcast(vec![peer], message)
    }

    pub fn broadcast(&self, peers: Vec<Peer>, message: Message) {
        let kind = message.kind();
        if self.queue.send(Outgoing { peers, message }).is_err() {
            warn!(kind, "dispatcher stopped, message discarded");
        }
    }

    /// close the queue and wait for every enqueued message to be handed
    /// to the transport
    pub async fn shutdown(self) -> anyhow::Result<DispatchStats> {
        std::mem::drop(self.queue);
        Ok(self.worker.await?)
    }
}

async fn dispatcher(
    transport: Arc<dyn Transport>,
    mut requests: mpsc::UnboundedReceiver<Outgoing>,
) -> DispatchStats {
    let mut stats = DispatchStats::default();
    let mut peers: HashMap<Peer, mpsc::UnboundedSender<Arc<Message>>> = HashMap::new();
    let mut workers = JoinSet::new();

    while let Some(Outgoing {
        peers: recipients,
        message,
    }) = requests.recv().await
    {
        stats.messages += 1;
        let message = Arc::new(message);

        for peer in recipients {
            let queue = peers.entry(peer.clone()).or_insert_with(|| {
                let (queue, messages) = mpsc::unbounded_channel();
                let span = tracing::info_span!("peer", %peer);
                workers.spawn(peer_worker(transport.clone(), peer, messages).instrument(span));
                queue
            });
            if queue.send(message.clone()).is_err() {
                stats.failures += 1;
            }
        }
    }

    // closing the peer queues lets the workers finish their backlog
    std::mem::drop(peers);
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok(worker) => {
                stats.deliveries += worker.deliveries;
                stats.failures += worker.failures;
            }
            Err(error) => warn!(%error, "peer worker terminated abruptly"),
        }
    }

    stats
}

async fn peer_worker(
    transport: Arc<dyn Transport>,
    peer: Peer,
    mut messages: mpsc::UnboundedReceiver<Arc<Message>>,
) -> DispatchStats {
    let mut stats = DispatchStats::default();

    while let Some(message) = messages.recv().await {
        stats.messages += 1;
        match transport.send(&peer, &message).await {
            Ok(()) => {
                debug!(kind = message.kind(), "message delivered");
                stats.deliveries += 1;
            }
            Err(error) => {
                warn!(kind = message.kind(), error = ?error, "failed to send message");
                stats.failures += 1;
            }
        }
    }

    stats
}
