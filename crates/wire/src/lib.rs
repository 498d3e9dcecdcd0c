// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gantry-wire: framing, handshake, and the agent transport

pub mod codec;
pub mod protocol;
pub mod transport;

pub use codec::{ProtocolError, DEFAULT_TIMEOUT, MAX_MESSAGE_SIZE};
pub use protocol::{Registration, Request, Response, STATUS_OK};
pub use transport::{ConnectionId, Transport, TransportError, TransportReceiver, TransportSender};
