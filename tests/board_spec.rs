use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use announcements_core::{Announcement, KeyValueStore, MemoryStore, StoreError, DISMISSED_KEY};
use async_trait::async_trait;
use hub_announcements::board::Board;
use hub_announcements::client::{AnnouncementSource, ClientError};
use hub_announcements::config::DEFAULT_POLL_INTERVAL;

/// Source that returns a configurable list and counts calls.
#[derive(Clone, Default)]
struct StubSource {
    calls: Arc<AtomicUsize>,
    response: Arc<Mutex<Option<Vec<Announcement>>>>,
}

impl StubSource {
    fn returning(announcements: Vec<Announcement>) -> Self {
        let source = Self::default();
        source.set(Some(announcements));
        source
    }

    /// `None` makes every following fetch fail.
    fn set(&self, response: Option<Vec<Announcement>>) {
        *self.response.lock().unwrap() = response;
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnnouncementSource for StubSource {
    async fn fetch_announcements(&self) -> Result<Vec<Announcement>, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ClientError::Server("503 Service Unavailable".to_string()))
    }
}

fn sample() -> Vec<Announcement> {
    vec![
        Announcement::new("2024-03-01T09:00:00", "Maintenance **tonight**"),
        Announcement::new("2024-03-02T09:00:00", "New GPU nodes\\See the docs"),
        Announcement::new("2024-03-03T09:00:00", "Quota reset"),
    ]
}

/// Mount with an in-memory store and the default interval.
fn mount(source: StubSource) -> Board {
    Board::mount(source, Arc::new(MemoryStore::new()), DEFAULT_POLL_INTERVAL)
}

/// Store that reads the board back while a dismissal is being written.
#[derive(Default)]
struct ReadingStore {
    inner: MemoryStore,
    board: OnceLock<Board>,
    visible_during_set: AtomicUsize,
}

impl KeyValueStore for ReadingStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if let Some(board) = self.board.get() {
            self.visible_during_set
                .store(board.visible().len(), Ordering::SeqCst);
        }
        self.inner.set(key, value)
    }
}

/// Let the timer task and the fetches it spawned run to completion.
async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

mod mounting {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn fetches_once_on_mount() {
        let source = StubSource::returning(sample());
        let board = mount(source.clone());

        settle().await;

        assert_eq!(source.calls(), 1);
        assert_eq!(board.visible().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn renders_one_card_per_announcement() {
        let source = StubSource::returning(sample());
        let board = mount(source);
        settle().await;

        let html = board.render_html().expect("board should render");
        assert_eq!(html.matches("class=\"toast show").count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn notifies_subscribers_after_fetch() {
        let source = StubSource::returning(sample());
        let board = mount(source);
        let mut changes = board.subscribe();

        changes.changed().await.expect("board dropped");
        assert_eq!(board.snapshot().announcements.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn renders_nothing_for_an_empty_list() {
        let source = StubSource::returning(vec![]);
        let board = mount(source);
        settle().await;

        assert!(board.render_html().is_none());
        assert!(board.render_text().is_none());
    }
}

mod polling {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn refetches_every_interval() {
        let source = StubSource::returning(sample());
        let _board = mount(source.clone());
        settle().await;
        assert_eq!(source.calls(), 1);

        tokio::time::advance(DEFAULT_POLL_INTERVAL - Duration::from_secs(1)).await;
        settle().await;
        assert_eq!(source.calls(), 1);

        tokio::time::advance(Duration::from_secs(1)).await;
        settle().await;
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn replaces_the_list_on_each_fetch() {
        let source = StubSource::returning(sample());
        let board = mount(source.clone());
        settle().await;

        source.set(Some(vec![Announcement::new("2024-04-01T00:00:00", "Only one")]));
        tokio::time::advance(DEFAULT_POLL_INTERVAL).await;
        settle().await;

        let visible = board.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].announcement, "Only one");
    }

    #[tokio::test(start_paused = true)]
    async fn failed_fetch_keeps_previous_list() {
        let source = StubSource::returning(sample());
        let board = mount(source.clone());
        settle().await;

        source.set(None);
        tokio::time::advance(DEFAULT_POLL_INTERVAL).await;
        settle().await;

        assert_eq!(source.calls(), 2);
        assert_eq!(board.visible().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn unmount_stops_the_timer() {
        let source = StubSource::returning(sample());
        let board = mount(source.clone());
        settle().await;
        tokio::time::advance(DEFAULT_POLL_INTERVAL).await;
        settle().await;
        assert_eq!(source.calls(), 2);

        board.unmount();
        tokio::time::advance(DEFAULT_POLL_INTERVAL * 3).await;
        settle().await;

        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_board_stops_the_timer() {
        let source = StubSource::returning(sample());
        {
            let _board = mount(source.clone());
            settle().await;
        }
        tokio::time::advance(DEFAULT_POLL_INTERVAL * 2).await;
        settle().await;

        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_falls_back_to_default() {
        let source = StubSource::returning(sample());
        let _board = Board::mount(source.clone(), Arc::new(MemoryStore::new()), Duration::ZERO);
        settle().await;
        assert_eq!(source.calls(), 1);

        tokio::time::advance(DEFAULT_POLL_INTERVAL).await;
        settle().await;
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_refresh_fetches_immediately() {
        let source = StubSource::returning(sample());
        let board = mount(source.clone());
        settle().await;

        board.refresh().await;
        assert_eq!(source.calls(), 2);
    }
}

mod dismissal {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn removes_exactly_one_card() {
        let source = StubSource::returning(sample());
        let board = mount(source);
        settle().await;

        board.dismiss("2024-03-02T09:00:00");

        let remaining: Vec<_> = board.visible().into_iter().map(|a| a.timestamp).collect();
        assert_eq!(remaining, vec!["2024-03-01T09:00:00", "2024-03-03T09:00:00"]);
    }

    #[tokio::test(start_paused = true)]
    async fn persists_the_dismissed_set() {
        let store = Arc::new(MemoryStore::new());
        let board = Board::mount(
            StubSource::returning(sample()),
            store.clone(),
            DEFAULT_POLL_INTERVAL,
        );
        settle().await;

        board.dismiss("2024-03-01T09:00:00");

        let stored = store.get(DISMISSED_KEY).unwrap().expect("dismissals not persisted");
        let stored: Vec<String> = serde_json::from_str(&stored).unwrap();
        assert_eq!(stored, vec!["2024-03-01T09:00:00"]);
    }

    #[tokio::test(start_paused = true)]
    async fn remount_hides_previously_dismissed_cards() {
        let store = Arc::new(MemoryStore::new());
        let board = Board::mount(
            StubSource::returning(sample()),
            store.clone(),
            DEFAULT_POLL_INTERVAL,
        );
        settle().await;
        board.dismiss("2024-03-01T09:00:00");
        board.unmount();

        let board = Board::mount(
            StubSource::returning(sample()),
            store,
            DEFAULT_POLL_INTERVAL,
        );
        settle().await;

        assert_eq!(board.visible().len(), 2);
        assert!(board.snapshot().dismissed.contains("2024-03-01T09:00:00"));
    }

    #[tokio::test(start_paused = true)]
    async fn dismissing_everything_renders_nothing() {
        let board = mount(StubSource::returning(sample()));
        settle().await;

        for announcement in sample() {
            board.dismiss(&announcement.timestamp);
        }

        assert!(board.render_html().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn dismissal_notifies_subscribers() {
        let board = mount(StubSource::returning(sample()));
        settle().await;
        let mut changes = board.subscribe();
        changes.borrow_and_update();

        board.dismiss("2024-03-01T09:00:00");

        assert!(changes.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_stored_value_starts_empty() {
        let store = Arc::new(MemoryStore::with_entry(DISMISSED_KEY, "{oops"));
        let board = Board::mount(
            StubSource::returning(sample()),
            store,
            DEFAULT_POLL_INTERVAL,
        );
        settle().await;

        assert_eq!(board.visible().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_timestamps_share_a_dismissal() {
        let source = StubSource::returning(vec![
            Announcement::new("2024-03-01T09:00:00", "first"),
            Announcement::new("2024-03-01T09:00:00", "repeat"),
        ]);
        let board = mount(source);
        settle().await;
        assert_eq!(board.visible().len(), 2);

        board.dismiss("2024-03-01T09:00:00");
        assert!(board.visible().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn board_stays_readable_while_persisting() {
        let store = Arc::new(ReadingStore::default());
        let board = Board::mount(
            StubSource::returning(sample()),
            store.clone(),
            DEFAULT_POLL_INTERVAL,
        );
        settle().await;
        assert!(store.board.set(board).is_ok());

        store.board.get().unwrap().dismiss("2024-03-01T09:00:00");

        assert_eq!(store.visible_during_set.load(Ordering::SeqCst), 3);
        assert_eq!(store.board.get().unwrap().visible().len(), 2);
    }
}
