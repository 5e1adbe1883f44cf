//! Projection of board state into cards.

mod card;
pub mod markdown;
mod relative_time;

pub use card::{cards, render_board_html, render_board_text, Card};
pub use relative_time::format_relative_time;

/// Escape text for use in HTML content and double-quoted attributes.
pub fn escape_html(raw: &str) -> String {
    let mut output = String::with_capacity(raw.len());
    // Writing into a String cannot fail.
    pulldown_cmark_escape::escape_html(&mut output, raw).unwrap_or(());
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">&</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;"
        );
        assert_eq!(escape_html("2024-03-01T09:00:00"), "2024-03-01T09:00:00");
    }
}
