// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Framing shared by the handshake and the envelope transport.
//!
//! A frame is a `u32` body length in network byte order followed by that
//! many bytes of JSON. The same framing carries handshake requests and
//! responses and, after `Connected`, every envelope in either direction.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Framing and decoding failures.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("connection I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("frame body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("frame of {size} bytes exceeds the {max} byte limit")]
    MessageTooLarge { size: usize, max: usize },

    #[error("peer closed the connection")]
    ConnectionClosed,

    #[error("timed out waiting for a frame")]
    Timeout,
}

/// Largest frame body either side will send or accept (64 MiB).
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024;

/// Read/write deadline for handshake frames.
pub const DEFAULT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

const PREFIX_LEN: usize = 4;

/// Serialize a frame body; the length prefix is added by [`write_message`].
pub fn encode<T: Serialize>(msg: &T) -> Result<Vec<u8>, ProtocolError> {
    let body = serde_json::to_vec(msg)?;
    check_size(body.len())?;
    Ok(body)
}

pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(body)?)
}

fn check_size(size: usize) -> Result<(), ProtocolError> {
    if size > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size,
            max: MAX_MESSAGE_SIZE,
        });
    }
    Ok(())
}

/// Read one frame body.
///
/// End of stream on a frame boundary is [`ProtocolError::ConnectionClosed`].
/// End of stream anywhere else, including part way through the length
/// prefix, is a truncated frame and surfaces as [`ProtocolError::Io`].
pub async fn read_message<R: AsyncReadExt + Unpin>(
    reader: &mut R,
) -> Result<Vec<u8>, ProtocolError> {
    let mut prefix = [0u8; PREFIX_LEN];
    let mut filled = 0;
    while filled < PREFIX_LEN {
        let n = reader.read(&mut prefix[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Err(ProtocolError::ConnectionClosed);
            }
            return Err(ProtocolError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("stream ended after {filled} of {PREFIX_LEN} length bytes"),
            )));
        }
        filled += n;
    }

    let len = u32::from_be_bytes(prefix) as usize;
    check_size(len)?;

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;
    Ok(body)
}

/// Write one frame and flush it.
pub async fn write_message<W: AsyncWriteExt + Unpin>(
    writer: &mut W,
    body: &[u8],
) -> Result<(), ProtocolError> {
    check_size(body.len())?;
    writer.write_all(&(body.len() as u32).to_be_bytes()).await?;
    writer.write_all(body).await?;
    writer.flush().await?;
    Ok(())
}

/// Read and decode one frame, failing with `Timeout` after `timeout`.
pub async fn read_frame<T: DeserializeOwned, R: AsyncReadExt + Unpin>(
    reader: &mut R,
    timeout: std::time::Duration,
) -> Result<T, ProtocolError> {
    let body = tokio::time::timeout(timeout, read_message(reader))
        .await
        .map_err(|_| ProtocolError::Timeout)??;
    decode(&body)
}

/// Encode and write one frame, failing with `Timeout` after `timeout`.
pub async fn write_frame<T: Serialize, W: AsyncWriteExt + Unpin>(
    writer: &mut W,
    msg: &T,
    timeout: std::time::Duration,
) -> Result<(), ProtocolError> {
    let body = encode(msg)?;
    tokio::time::timeout(timeout, write_message(writer, &body))
        .await
        .map_err(|_| ProtocolError::Timeout)?
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
