// SPDX-FileCopyrightText: 2026 Haggle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sender-side typing indicator debounce.
//!
//! The peer should see at most one `typing: true` per burst of keystrokes,
//! and a `typing: false` no later than the idle window after the last one.
//! Frames are emitted on edges only; repeated `set_typing(true)` calls
//! renew the idle timer without re-sending.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use haggle_core::traits::ConnectionHandle;

#[derive(Default)]
struct DebounceState {
    is_typing: bool,
    timer: Option<JoinHandle<()>>,
}

/// Edge-triggered typing signal with an idle auto-clear.
#[derive(Clone)]
pub struct TypingDebouncer {
    connection: Arc<dyn ConnectionHandle>,
    idle_window: Duration,
    state: Arc<Mutex<DebounceState>>,
}

impl TypingDebouncer {
    pub fn new(connection: Arc<dyn ConnectionHandle>, idle_window: Duration) -> Self {
        Self {
            connection,
            idle_window,
            state: Arc::new(Mutex::new(DebounceState::default())),
        }
    }

    /// Signals the typing state. Emits a frame only on a true→false or
    /// false→true edge; a `true` also arms (or renews) the idle timer that
    /// fires `typing: false` once the user stops.
    pub async fn set_typing(&self, is_typing: bool) {
        let mut st = self.state.lock().await;
        if is_typing {
            if !st.is_typing {
                st.is_typing = true;
                let _ = self.connection.send_typing(true).await;
            }
            if let Some(timer) = st.timer.take() {
                timer.abort();
            }
            st.timer = Some(tokio::spawn(auto_clear(
                self.state.clone(),
                self.connection.clone(),
                self.idle_window,
            )));
        } else {
            if let Some(timer) = st.timer.take() {
                timer.abort();
            }
            if st.is_typing {
                st.is_typing = false;
                let _ = self.connection.send_typing(false).await;
            }
        }
    }

    /// Clears the pending timer and resets the edge without emitting a
    /// frame. Sending a message supersedes the typing signal.
    pub async fn reset(&self) {
        let mut st = self.state.lock().await;
        if let Some(timer) = st.timer.take() {
            timer.abort();
        }
        st.is_typing = false;
    }
}

async fn auto_clear(
    state: Arc<Mutex<DebounceState>>,
    connection: Arc<dyn ConnectionHandle>,
    idle_window: Duration,
) {
    tokio::time::sleep(idle_window).await;
    let mut st = state.lock().await;
    st.timer = None;
    if st.is_typing {
        st.is_typing = false;
        let _ = connection.send_typing(false).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haggle_core::traits::RealtimeConnector;
    use haggle_core::types::ConversationId;
    use haggle_test_utils::{MockConnector, SentFrame};

    const IDLE: Duration = Duration::from_secs(2);

    async fn debouncer() -> (TypingDebouncer, Arc<haggle_test_utils::MockConnection>) {
        let connector = MockConnector::new();
        let live = connector
            .open(&ConversationId("c-1".into()))
            .await
            .unwrap();
        let conn = connector.last().await.unwrap();
        (TypingDebouncer::new(live.handle, IDLE), conn)
    }

    #[tokio::test(start_paused = true)]
    async fn idle_window_emits_exactly_one_pair() {
        let (typing, conn) = debouncer().await;

        typing.set_typing(true).await;
        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert_eq!(
            conn.sent_frames().await,
            vec![SentFrame::Typing(true), SentFrame::Typing(false)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn renewals_do_not_re_emit_and_extend_the_window() {
        let (typing, conn) = debouncer().await;

        typing.set_typing(true).await;
        tokio::time::sleep(Duration::from_millis(1500)).await;
        typing.set_typing(true).await;
        tokio::time::sleep(Duration::from_millis(1500)).await;

        // 3 s since the first edge, but only 1.5 s since the renewal.
        assert_eq!(conn.sent_frames().await, vec![SentFrame::Typing(true)]);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(
            conn.sent_frames().await,
            vec![SentFrame::Typing(true), SentFrame::Typing(false)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn explicit_stop_cancels_the_timer() {
        let (typing, conn) = debouncer().await;

        typing.set_typing(true).await;
        typing.set_typing(false).await;
        tokio::time::sleep(Duration::from_secs(5)).await;

        // The explicit edge emitted the pair; the timer must not add more.
        assert_eq!(
            conn.sent_frames().await,
            vec![SentFrame::Typing(true), SentFrame::Typing(false)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stop_without_start_emits_nothing() {
        let (typing, conn) = debouncer().await;
        typing.set_typing(false).await;
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(conn.sent_frames().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn reset_clears_without_a_frame() {
        let (typing, conn) = debouncer().await;

        typing.set_typing(true).await;
        typing.reset().await;
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(conn.sent_frames().await, vec![SentFrame::Typing(true)]);
    }
}
