// SPDX-FileCopyrightText: 2026 Haggle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Unread accounting: the single source of truth for the badge count.
//!
//! Two feeds keep it honest: [`UnreadBadge::recompute_from_directory`] when
//! the directory is already in memory, and a periodic REST poll of the
//! dedicated count endpoint that reconciles any drift from missed realtime
//! events. In steady state both agree.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use haggle_core::error::HaggleError;
use haggle_core::traits::ChatApi;

use crate::directory::SessionDirectory;

/// The aggregated unread count, observable through a watch channel.
pub struct UnreadBadge {
    api: Arc<dyn ChatApi>,
    total_tx: watch::Sender<u64>,
}

impl UnreadBadge {
    pub fn new(api: Arc<dyn ChatApi>) -> Self {
        let (total_tx, _) = watch::channel(0);
        Self { api, total_tx }
    }

    /// The current badge count.
    pub fn total(&self) -> u64 {
        *self.total_tx.borrow()
    }

    /// Subscribes to badge changes (for UI surfaces).
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.total_tx.subscribe()
    }

    /// Polls the dedicated count endpoint and replaces the badge value.
    pub async fn refresh(&self) -> Result<u64, HaggleError> {
        let total = self.api.unread_count().await?;
        self.total_tx.send_replace(total);
        Ok(total)
    }

    /// Replaces the badge value with the directory's per-conversation sum,
    /// avoiding a redundant request when the directory is loaded.
    pub fn recompute_from_directory(&self, directory: &SessionDirectory) -> u64 {
        let total = directory.total_unread();
        self.total_tx.send_replace(total);
        total
    }

    /// Spawns the periodic reconciliation poll. The first tick fires
    /// immediately; failures are logged and retried on the next tick.
    /// Cancel the returned token to stop the loop.
    pub fn spawn_refresh_loop(&self, interval: Duration) -> CancellationToken {
        let api = self.api.clone();
        let total_tx = self.total_tx.clone();
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        match api.unread_count().await {
                            Ok(total) => {
                                total_tx.send_replace(total);
                            }
                            Err(e) => {
                                warn!(error = %e, "unread refresh failed (non-fatal)");
                            }
                        }
                    }
                }
            }
        });

        cancel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haggle_test_utils::MockChatApi;

    #[tokio::test]
    async fn refresh_polls_the_count_endpoint() {
        let api = Arc::new(MockChatApi::new());
        api.set_unread_total(5).await;

        let badge = UnreadBadge::new(api.clone());
        assert_eq!(badge.total(), 0);
        assert_eq!(badge.refresh().await.unwrap(), 5);
        assert_eq!(badge.total(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_loop_reconciles_on_its_interval() {
        let api = Arc::new(MockChatApi::new());
        api.set_unread_total(2).await;

        let badge = UnreadBadge::new(api.clone());
        let guard = badge.spawn_refresh_loop(Duration::from_secs(30));
        let mut updates = badge.subscribe();

        // First tick fires immediately.
        updates.changed().await.unwrap();
        assert_eq!(badge.total(), 2);

        // A missed realtime event bumps the server count; the next tick
        // catches the drift.
        api.set_unread_total(7).await;
        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(badge.total(), 7);

        guard.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_loop_stops_when_cancelled() {
        let api = Arc::new(MockChatApi::new());
        api.set_unread_total(1).await;

        let badge = UnreadBadge::new(api.clone());
        let guard = badge.spawn_refresh_loop(Duration::from_secs(30));

        let mut updates = badge.subscribe();
        updates.changed().await.unwrap();
        guard.cancel();

        api.set_unread_total(9).await;
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(badge.total(), 1, "cancelled loop must not keep polling");
    }
}
