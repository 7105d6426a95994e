use crate::config::Peer;
use crate::message::Message;
use anyhow::Context as _;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

/// best effort delivery of messages to the nodes
///
/// nothing is acknowledged and nothing is retried: a failure is reported
/// to the caller and that is all.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, peer: &Peer, message: &Message) -> anyhow::Result<()>;
}

/// one connection per message: connect, write the frame, close
#[derive(Debug, Clone)]
pub struct TcpTransport {
    connect_timeout: Duration,
}

impl TcpTransport {
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CONNECT_TIMEOUT)
    }
}

#[async_trait::async_trait]
impl Transport for TcpTransport {
    async fn send(&self, peer: &Peer, message: &Message) -> anyhow::Result<()> {
        let endpoint = peer.to_string();
        let connect = TcpStream::connect(endpoint.as_str());
        let mut stream = tokio::time::timeout(self.connect_timeout, connect)
            .await
            .with_context(|| format!("connection to {endpoint} timed out"))?
            .with_context(|| format!("cannot connect to {endpoint}"))?;

        message
            .write_to(&mut stream)
            .await
            .with_context(|| format!("cannot send {} to {endpoint}", message.kind()))?;
        stream.shutdown().await?;
        Ok(())
    }
}
