use crate::message::Message;
use crate::pending::PendingCrossTxs;
use crate::pool::PoolManager;
use anyhow::Context as _;
use shardbench_core::StoppableService;
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn, Instrument};

/// the listening side of the generator
///
/// the leaders push the blocks they accept, the pools are kept up to date
/// with them. Finality proofs of cross shard transactions are fed to the
/// pending table.
pub struct Listener {
    listener: TcpListener,
    pools: PoolManager,
    pending: Option<PendingCrossTxs>,
}

/// the running listener, see [`Listener::bind`]
#[derive(Debug)]
pub struct ListenerHandle {
    local_addr: SocketAddr,
    task: JoinHandle<()>,
}

impl Listener {
    /// bind `address` and start serving in the background
    pub async fn bind(
        address: SocketAddr,
        pools: PoolManager,
        pending: Option<PendingCrossTxs>,
    ) -> anyhow::Result<ListenerHandle> {
        let listener = TcpListener::bind(address)
            .await
            .with_context(|| format!("cannot listen on {address}"))?;
        let local_addr = listener.local_addr()?;
        info!(%local_addr, "listening for blocks");

        let listener = Self {
            listener,
            pools,
            pending,
        };
        let task = tokio::spawn(listener.serve().instrument(tracing::info_span!("listener")));

        Ok(ListenerHandle { local_addr, task })
    }

    async fn serve(self) {
        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let pools = self.pools.clone();
                        let pending = self.pending.clone();
                        connections.spawn(async move {
                            if let Err(error) = handle_connection(stream, pools, pending).await {
                                warn!(%peer, error = ?error, "connection closed on error");
                            }
                        });
                    }
                    Err(error) => warn!(%error, "failed to accept connection"),
                },
                Some(_) = connections.join_next() => (),
            }
        }
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    pools: PoolManager,
    pending: Option<PendingCrossTxs>,
) -> anyhow::Result<()> {
    while let Some(message) = Message::read_from(&mut stream).await? {
        match message {
            Message::BlockList(blocks) => {
                let report = pools.apply_blocks(&blocks).await;
                info!(
                    blocks = blocks.len(),
                    added = report.added,
                    removed = report.removed,
                    missing = report.missing,
                    "blocks applied"
                );
            }
            Message::ProofList(proofs) => {
                let Some(pending) = pending.as_ref() else {
                    debug!(proofs = proofs.len(), "no pending table, proofs ignored");
                    continue;
                };
                for proof in proofs {
                    if let Some(reconciled) = pending.record_proof(proof).await {
                        info!(
                            transaction = %reconciled.transaction.id,
                            accepted = reconciled.accepted,
                            "cross shard transaction reconciled"
                        );
                    }
                }
            }
            other => debug!(kind = other.kind(), "unexpected message ignored"),
        }
    }

    Ok(())
}

impl ListenerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

#[async_trait::async_trait]
impl StoppableService for ListenerHandle {
    async fn stop(self) -> anyhow::Result<()> {
        self.task.abort();
        match self.task.await {
            Err(error) if !error.is_cancelled() => Err(error.into()),
            _ => Ok(()),
        }
    }
}
