//! Markdown rendering of announcement bodies.
//!
//! Each backslash-delimited segment is parsed on its own, so Markdown
//! structure never spans a separator. GFM tables, strikethrough and task
//! lists are enabled; raw HTML in the source is passed through untouched.

use pulldown_cmark::{html, Event, Options, Parser, Tag, TagEnd};

use crate::models::SEGMENT_SEPARATOR;

fn options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Split a body into segments with the separator stripped.
pub fn split_segments(body: &str) -> Vec<String> {
    body.split(SEGMENT_SEPARATOR)
        .map(|segment| segment.replace(SEGMENT_SEPARATOR, ""))
        .collect()
}

/// Render one segment to HTML.
pub fn render_html(segment: &str) -> String {
    let mut output = String::new();
    html::push_html(&mut output, Parser::new_ext(segment, options()));
    output
}

/// Render every segment of `body` to HTML, one string per segment.
pub fn render_segments(body: &str) -> Vec<String> {
    split_segments(body)
        .iter()
        .map(|segment| render_html(segment))
        .collect()
}

/// Render one segment to plain text for terminal output.
///
/// Block elements end with a newline, list items get a bullet, table cells
/// are joined with `|`. Raw HTML is dropped.
pub fn render_text(segment: &str) -> String {
    let mut output = String::new();
    for event in Parser::new_ext(segment, options()) {
        match event {
            Event::Text(text) | Event::Code(text) => output.push_str(&text),
            Event::SoftBreak | Event::HardBreak => output.push('\n'),
            Event::Start(Tag::Item) => output.push_str("• "),
            Event::TaskListMarker(done) => output.push_str(if done { "[x] " } else { "[ ] " }),
            Event::Rule => output.push_str("---\n"),
            Event::End(TagEnd::TableCell) => output.push_str(" | "),
            Event::End(
                TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::Item
                | TagEnd::CodeBlock
                | TagEnd::TableHead
                | TagEnd::TableRow,
            ) => {
                if output.ends_with(" | ") {
                    output.truncate(output.len() - 3);
                }
                if !output.ends_with('\n') {
                    output.push('\n');
                }
            }
            _ => {}
        }
    }
    output
}
