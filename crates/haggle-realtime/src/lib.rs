// SPDX-FileCopyrightText: 2026 Haggle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live socket transport for the Haggle chat core.
//!
//! One connection per open conversation, carrying tagged JSON frames for
//! messages, typing indicators, and read receipts. The transport never
//! reconnects on its own; a dropped connection is reported as an event and
//! the caller decides whether to open a fresh one.

pub mod connection;
pub mod frames;

pub use connection::{Connection, WsConnector};
pub use frames::{InboundFrame, OutboundFrame};
