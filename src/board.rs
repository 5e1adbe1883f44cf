//! A mounted announcement board.
//!
//! Mounting loads the dismissed set from the store, fetches once, then
//! re-fetches on a fixed interval until the board is unmounted or dropped.
//! Every state change bumps a revision counter that subscribers can watch to
//! know when to re-render.
//!
//! Each tick spawns its own fetch. A slow fetch is not guarded against
//! overlapping a later one; whichever response resolves last wins.
//! Unmounting stops the timer but does not cancel fetches already in flight.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use announcements_core::render::{render_board_html, render_board_text};
use announcements_core::{Announcement, BoardState, DismissedSet, KeyValueStore};
use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::client::AnnouncementSource;
use crate::config::DEFAULT_POLL_INTERVAL;

struct Shared {
    state: Mutex<BoardState>,
    store: Arc<dyn KeyValueStore>,
    /// Serializes dismissals so each persisted set includes every earlier one.
    persist_lock: Mutex<()>,
    revision: watch::Sender<u64>,
}

impl Shared {
    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    async fn refresh(&self, source: &dyn AnnouncementSource) {
        match source.fetch_announcements().await {
            Ok(announcements) => {
                tracing::debug!("Fetched {} announcements", announcements.len());
                self.state
                    .lock()
                    .expect("board lock poisoned")
                    .replace_announcements(announcements);
                self.bump();
            }
            Err(e) => {
                tracing::error!("Error getting announcements: {}", e);
            }
        }
    }
}

/// Handle to a mounted board. Dropping it unmounts the board.
pub struct Board {
    shared: Arc<Shared>,
    source: Arc<dyn AnnouncementSource>,
    timer: JoinHandle<()>,
}

impl Board {
    /// Mount a board and start polling `source` every `poll_interval`.
    ///
    /// A zero interval falls back to [`DEFAULT_POLL_INTERVAL`].
    /// Must be called from within a Tokio runtime.
    pub fn mount(
        source: impl AnnouncementSource,
        store: Arc<dyn KeyValueStore>,
        poll_interval: Duration,
    ) -> Self {
        let poll_interval = if poll_interval.is_zero() {
            tracing::warn!("Poll interval must be positive, using {:?}", DEFAULT_POLL_INTERVAL);
            DEFAULT_POLL_INTERVAL
        } else {
            poll_interval
        };

        let dismissed = DismissedSet::load(store.as_ref());
        let (revision, _) = watch::channel(0);
        let shared = Arc::new(Shared {
            state: Mutex::new(BoardState::new(dismissed)),
            store,
            persist_lock: Mutex::new(()),
            revision,
        });
        let source: Arc<dyn AnnouncementSource> = Arc::new(source);

        let timer = tokio::spawn(poll(shared.clone(), source.clone(), poll_interval));
        tracing::info!("Mounted announcement board, polling every {:?}", poll_interval);

        Self {
            shared,
            source,
            timer,
        }
    }

    /// Fetch immediately, outside the regular schedule.
    pub async fn refresh(&self) {
        self.shared.refresh(self.source.as_ref()).await;
    }

    /// Hide every card with this timestamp and persist the dismissal.
    ///
    /// The store is written without holding the state lock, so fetches and
    /// renders are not blocked by storage I/O.
    pub fn dismiss(&self, timestamp: &str) {
        let _persist = self.shared.persist_lock.lock().expect("board lock poisoned");

        let current = self
            .shared
            .state
            .lock()
            .expect("board lock poisoned")
            .dismissed
            .clone();
        let next = current.dismiss(self.shared.store.as_ref(), timestamp);
        self.shared.state.lock().expect("board lock poisoned").dismissed = next;

        tracing::info!("Dismissed announcement {}", timestamp);
        self.shared.bump();
    }

    /// Receiver that changes whenever the board needs re-rendering.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }

    pub fn snapshot(&self) -> BoardState {
        self.shared.state.lock().expect("board lock poisoned").clone()
    }

    /// Undismissed announcements in list order.
    pub fn visible(&self) -> Vec<Announcement> {
        let state = self.shared.state.lock().expect("board lock poisoned");
        state.visible().into_iter().cloned().collect()
    }

    /// HTML markup for the board, `None` when nothing is visible.
    pub fn render_html(&self) -> Option<String> {
        render_board_html(&self.snapshot(), Utc::now())
    }

    /// Terminal rendering of the board, `None` when nothing is visible.
    pub fn render_text(&self) -> Option<String> {
        render_board_text(&self.snapshot(), Utc::now())
    }

    /// Stop polling. Equivalent to dropping the handle.
    pub fn unmount(self) {
        drop(self);
    }
}

impl Drop for Board {
    fn drop(&mut self) {
        self.timer.abort();
        tracing::debug!("Unmounted announcement board");
    }
}

async fn poll(shared: Arc<Shared>, source: Arc<dyn AnnouncementSource>, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        // First tick completes immediately: fetch on mount.
        ticker.tick().await;
        let shared = shared.clone();
        let source = source.clone();
        tokio::spawn(async move {
            shared.refresh(source.as_ref()).await;
        });
    }
}
