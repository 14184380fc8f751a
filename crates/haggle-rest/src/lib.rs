// SPDX-FileCopyrightText: 2026 Haggle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat REST resource client for the Haggle chat core.
//!
//! Implements [`haggle_core::ChatApi`] over HTTP via reqwest: directory
//! listing, idempotent conversation starts, history pages, the REST send
//! fallback, read receipts, and the unread badge endpoint.

pub mod client;
pub mod types;

pub use client::RestChatApi;
