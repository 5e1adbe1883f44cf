use chrono::{DateTime, Utc};

use super::{escape_html, markdown, relative_time::format_relative_time};
use crate::models::Announcement;
use crate::state::BoardState;

const ICON: &str = "📢";
const LABEL: &str = "Announcement";

/// One visible announcement, ready to render.
#[derive(Debug, Clone)]
pub struct Card<'a> {
    /// Position in the fetched list. Keeps duplicate timestamps distinct.
    pub index: usize,
    pub announcement: &'a Announcement,
    pub relative_time: String,
}

impl<'a> Card<'a> {
    pub fn key(&self) -> String {
        format!("toast-{}", self.index)
    }

    pub fn to_html(&self) -> String {
        let ts = escape_html(&self.announcement.timestamp);
        let mut output = String::new();

        output.push_str(&format!(
            "<div class=\"toast show mb-1\" role=\"alert\" style=\"width: 100%\" data-key=\"{}\" data-timestamp=\"{}\">\n",
            self.key(),
            ts
        ));
        output.push_str("<div class=\"toast-header\">\n");
        output.push_str(&format!(
            "<strong class=\"me-auto\"><span class=\"announcement-icon\" aria-hidden=\"true\">{}</span>  {}</strong>\n",
            ICON, LABEL
        ));
        output.push_str(&format!(
            "<small title=\"{}\">{}</small>\n",
            ts,
            escape_html(&self.relative_time)
        ));
        output.push_str(&format!(
            "<button type=\"button\" class=\"btn-close\" aria-label=\"Close\" data-dismiss-announcement=\"{}\"></button>\n",
            ts
        ));
        output.push_str("</div>\n");

        output.push_str("<div class=\"toast-body\">\n");
        for (i, segment) in markdown::render_segments(&self.announcement.announcement)
            .iter()
            .enumerate()
        {
            output.push_str(&format!(
                "<div class=\"announcement-segment\" data-key=\"ann-{}-{}\">\n",
                ts, i
            ));
            output.push_str(segment);
            output.push_str("</div>\n");
        }
        output.push_str("</div>\n");
        output.push_str("</div>\n");
        output
    }

    /// Render as a boxed block for terminal output.
    ///
    /// ```text
    /// ┌ 📢 Announcement · 5 minutes ago
    /// │ Hub maintenance tonight
    /// └ 2024-03-01T09:30:00
    /// ```
    pub fn to_text(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("┌ {} {} · {}", ICON, LABEL, self.relative_time));
        if let Some(user) = &self.announcement.user {
            output.push_str(&format!(" (by {})", user));
        }
        output.push('\n');

        for segment in markdown::split_segments(&self.announcement.announcement) {
            for line in markdown::render_text(&segment).lines() {
                output.push_str("│ ");
                output.push_str(line);
                output.push('\n');
            }
        }

        output.push_str("└ ");
        output.push_str(&self.announcement.timestamp);
        output.push('\n');
        output
    }
}

/// Cards for every undismissed announcement, in list order.
pub fn cards(state: &BoardState, now: DateTime<Utc>) -> Vec<Card<'_>> {
    state
        .announcements
        .iter()
        .enumerate()
        .filter(|(_, a)| !state.dismissed.contains(&a.timestamp))
        .map(|(index, announcement)| Card {
            index,
            announcement,
            relative_time: format_relative_time(&announcement.timestamp, now),
        })
        .collect()
}

/// Render the board container, or `None` when no card is visible.
pub fn render_board_html(state: &BoardState, now: DateTime<Utc>) -> Option<String> {
    let cards = cards(state, now);
    if cards.is_empty() {
        return None;
    }

    let mut output = String::from(
        "<div aria-live=\"polite\" aria-atomic=\"true\" class=\"mb-3 position-relative\">\n",
    );
    for card in &cards {
        output.push_str(&card.to_html());
    }
    output.push_str("</div>\n");
    Some(output)
}

/// Render the board for a terminal, or `None` when no card is visible.
pub fn render_board_text(state: &BoardState, now: DateTime<Utc>) -> Option<String> {
    let cards = cards(state, now);
    if cards.is_empty() {
        return None;
    }
    Some(
        cards
            .iter()
            .map(Card::to_text)
            .collect::<Vec<_>>()
            .join("\n"),
    )
}
