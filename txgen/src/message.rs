//! Messages exchanged with the nodes of the network.
//!
//! A message travels as a frame: a 4 bytes big endian length followed by
//! the JSON encoding of the message.
//!
//! ```text
//! [length: u32 BE][json body: length bytes]
//! ```

use crate::pending::CrossShardProof;
use serde::{Deserialize, Serialize};
use shardbench_core::tx::Transaction;
use shardbench_core::Block;
use std::io;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// largest body accepted or emitted
pub const MAX_FRAME_SIZE: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Message {
    /// transactions for a leader to include in its shard
    TransactionList(Vec<Transaction>),
    /// end of the benchmark
    Stop,
    /// blocks accepted by the leaders
    BlockList(Vec<Block>),
    /// finality reports on cross shard transactions
    ProofList(Vec<CrossShardProof>),
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("I/O error")]
    Io(#[from] io::Error),
    #[error("Invalid message encoding")]
    Json(#[from] serde_json::Error),
    #[error("Frame of {size} bytes exceeds the limit of {max} bytes", max = MAX_FRAME_SIZE)]
    FrameTooLarge { size: usize },
}

impl Message {
    /// short name of the message, for the logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TransactionList(_) => "transaction_list",
            Self::Stop => "stop",
            Self::BlockList(_) => "block_list",
            Self::ProofList(_) => "proof_list",
        }
    }

    /// the complete frame: length prefix and body
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        let body = serde_json::to_vec(self)?;
        let size = u32::try_from(body.len())
            .ok()
            .filter(|size| (*size as usize) <= MAX_FRAME_SIZE)
            .ok_or(CodecError::FrameTooLarge { size: body.len() })?;

        let mut frame = Vec::with_capacity(4 + body.len());
        frame.extend_from_slice(&size.to_be_bytes());
        frame.extend_from_slice(&body);
        Ok(frame)
    }

    pub async fn write_to<W>(&self, writer: &mut W) -> Result<(), CodecError>
    where
        W: AsyncWrite + Unpin,
    {
        let frame = self.encode()?;
        writer.write_all(&frame).await?;
        writer.flush().await?;
        Ok(())
    }

    /// read the next message of the stream
    ///
    /// returns `None` if the stream ends before a new frame starts. A stream
    /// ending within a frame, length prefix included, is an error.
    pub async fn read_from<R>(reader: &mut R) -> Result<Option<Self>, CodecError>
    where
        R: AsyncRead + Unpin,
    {
        let mut size = [0; 4];
        if reader.read(&mut size[..1]).await? == 0 {
            return Ok(None);
        }
        reader.read_exact(&mut size[1..]).await?;

        let size = u32::from_be_bytes(size) as usize;
        if size > MAX_FRAME_SIZE {
            return Err(CodecError::FrameTooLarge { size });
        }

        let mut body = vec![0; size];
        reader.read_exact(&mut body).await?;
        Ok(Some(serde_json::from_slice(&body)?))
    }
}
