use crate::dismissed::DismissedSet;
use crate::models::Announcement;

/// View state owned by one mounted board.
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    /// Latest list as returned by the service, in service order.
    pub announcements: Vec<Announcement>,
    pub dismissed: DismissedSet,
}

impl BoardState {
    pub fn new(dismissed: DismissedSet) -> Self {
        Self {
            announcements: Vec::new(),
            dismissed,
        }
    }

    /// Announcements whose timestamp has not been dismissed.
    ///
    /// Duplicate timestamps are kept; each yields its own card.
    pub fn visible(&self) -> Vec<&Announcement> {
        self.announcements
            .iter()
            .filter(|a| !self.dismissed.contains(&a.timestamp))
            .collect()
    }

    pub fn replace_announcements(&mut self, announcements: Vec<Announcement>) {
        self.announcements = announcements;
    }
}
