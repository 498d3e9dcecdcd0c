// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Full-duplex envelope transport over one persistent connection.
//!
//! The connection is split into two independent directions. Outbound
//! envelopes go through an unbounded queue drained by a single writer task,
//! so sends never block the caller and arrive in the order they were
//! queued. The inbound direction yields decoded envelopes until the peer
//! closes cleanly (`Ok(None)`) or the stream fails (`Err`).

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use gantry_core::Envelope;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use crate::codec::{self, ProtocolError};

/// Errors from transport operations.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport closed")]
    Closed,

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Process-unique id of one accepted/opened connection.
pub type ConnectionId = u64;

static NEXT_CONNECTION: AtomicU64 = AtomicU64::new(1);

enum Outbound {
    Frame(Envelope),
    Close,
}

/// Both directions of a freshly wrapped connection.
pub struct Transport {
    pub sender: TransportSender,
    pub receiver: TransportReceiver,
}

impl Transport {
    /// Wrap `stream`, spawning its writer task on the current runtime.
    pub fn new<S>(stream: S) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let id = NEXT_CONNECTION.fetch_add(1, Ordering::Relaxed);
        let (reader, writer) = tokio::io::split(stream);
        let (tx, rx) = mpsc::unbounded_channel();
        let closed = Arc::new(AtomicBool::new(false));

        tokio::spawn(write_loop(id, writer, rx, Arc::clone(&closed)));

        Self {
            sender: TransportSender { id, tx, closed },
            receiver: TransportReceiver {
                id,
                reader: Box::new(reader),
                finished: false,
            },
        }
    }

    pub fn into_split(self) -> (TransportSender, TransportReceiver) {
        (self.sender, self.receiver)
    }
}

/// Send direction. Cheap to clone; all clones share one ordered queue.
#[derive(Clone)]
pub struct TransportSender {
    id: ConnectionId,
    tx: mpsc::UnboundedSender<Outbound>,
    closed: Arc<AtomicBool>,
}

impl TransportSender {
    pub fn connection_id(&self) -> ConnectionId {
        self.id
    }

    /// Queue an envelope for writing.
    pub fn send(&self, envelope: Envelope) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        self.tx
            .send(Outbound::Frame(envelope))
            .map_err(|_| TransportError::Closed)
    }

    /// Flush already-queued envelopes and shut the write side down.
    ///
    /// Safe to call any number of times from any clone.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            tracing::debug!(connection = self.id, "closing transport");
            let _ = self.tx.send(Outbound::Close);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire) || self.tx.is_closed()
    }
}

impl std::fmt::Debug for TransportSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportSender")
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Receive direction.
pub struct TransportReceiver {
    id: ConnectionId,
    reader: Box<dyn AsyncRead + Send + Unpin>,
    finished: bool,
}

impl TransportReceiver {
    pub fn connection_id(&self) -> ConnectionId {
        self.id
    }

    /// Wait for the next envelope.
    ///
    /// Returns `Ok(None)` once the peer has closed cleanly. After either
    /// terminal result every further call returns `Ok(None)`.
    pub async fn recv(&mut self) -> Result<Option<Envelope>, TransportError> {
        if self.finished {
            return Ok(None);
        }
        let result = match codec::read_message(&mut self.reader).await {
            Ok(bytes) => codec::decode::<Envelope>(&bytes).map(Some),
            Err(ProtocolError::ConnectionClosed) => Ok(None),
            Err(e) => Err(e),
        };
        match result {
            Ok(Some(envelope)) => Ok(Some(envelope)),
            Ok(None) => {
                self.finished = true;
                Ok(None)
            }
            Err(e) => {
                self.finished = true;
                Err(e.into())
            }
        }
    }
}

async fn write_loop<W>(
    id: ConnectionId,
    mut writer: W,
    mut rx: mpsc::UnboundedReceiver<Outbound>,
    closed: Arc<AtomicBool>,
) where
    W: AsyncWrite + Unpin,
{
    while let Some(outbound) = rx.recv().await {
        match outbound {
            Outbound::Frame(envelope) => {
                let data = match codec::encode(&envelope) {
                    Ok(data) => data,
                    Err(e) => {
                        tracing::warn!(connection = id, action = %envelope.action, error = %e, "dropping unencodable envelope");
                        continue;
                    }
                };
                if let Err(e) = codec::write_message(&mut writer, &data).await {
                    tracing::debug!(connection = id, error = %e, "write failed");
                    break;
                }
            }
            Outbound::Close => break,
        }
    }
    closed.store(true, Ordering::Release);
    rx.close();
    let _ = writer.shutdown().await;
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
