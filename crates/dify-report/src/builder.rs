//! Builder-style helper for assembling **plain-text terminal reports**.
//!
//! Every method returns `self`, enabling call-chaining:
//!
//! ```rust
//! use dify_report::builder::ReportBuilder;
//!
//! let text = ReportBuilder::new()
//!     .add_heading("Answer")
//!     .add_line("Rust is a systems programming language.")
//!     .add_rule()
//!     .add_key_value("Message ID", "m1")
//!     .add_key_value_opt("Conversation ID", None::<&str>)
//!     .finalize();
//!
//! assert!(text.starts_with("[Answer]\n"));
//! assert!(text.contains("Conversation ID: N/A"));
//! ```
//!
//! The builder does no wrapping or alignment: lines are emitted exactly as
//! requested. Writing into the `String` buffer is `expect`ed to succeed.

use std::fmt::{Display, Write as _};

/// Width of rules and banners.
pub const RULE_WIDTH: usize = 60;

/// Placeholder printed for values the server did not send.
pub const MISSING: &str = "N/A";

pub struct ReportBuilder {
    buffer: String,
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    /// Title framed by two `=` rules.
    pub fn add_banner(self, title: impl Display) -> Self {
        let rule = "=".repeat(RULE_WIDTH);
        self.add_line(&rule).add_line(title).add_line(&rule)
    }

    /// Section title in brackets: `[title]`.
    pub fn add_heading(self, title: impl Display) -> Self {
        self.add_line(format_args!("[{title}]"))
    }

    /// A `-` rule.
    pub fn add_rule(self) -> Self {
        self.add_line("-".repeat(RULE_WIDTH))
    }

    pub fn add_line(mut self, line: impl Display) -> Self {
        writeln!(self.buffer, "{line}").expect("failed to write buffer");
        self
    }

    pub fn add_blank_line(mut self) -> Self {
        self.buffer.push('\n');
        self
    }

    /// `key: value`
    pub fn add_key_value(self, key: impl Display, value: impl Display) -> Self {
        self.add_line(format_args!("{key}: {value}"))
    }

    /// `key: value`, or `key: N/A` when the value is missing.
    pub fn add_key_value_opt<V: Display>(self, key: impl Display, value: Option<V>) -> Self {
        match value {
            Some(value) => self.add_key_value(key, value),
            None => self.add_key_value(key, MISSING),
        }
    }

    /// Indented bullet: `  - line`.
    pub fn add_item(self, line: impl Display) -> Self {
        self.add_line(format_args!("  - {line}"))
    }

    /// `label: <first max_chars characters>...`
    pub fn add_preview(self, label: impl Display, content: &str, max_chars: usize) -> Self {
        self.add_key_value(label, preview(content, max_chars))
    }

    /// Retrieve the accumulated text and consume the builder.
    pub fn finalize(self) -> String {
        self.buffer
    }
}

/// Cut `content` to at most `max_chars` characters, appending `...` when
/// something was cut. Counts characters, not bytes.
pub fn preview(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_keeps_short_content() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("exactly10!", 10), "exactly10!");
    }

    #[test]
    fn preview_cuts_on_char_boundaries() {
        assert_eq!(preview("人工智能是什么", 4), "人工智能...");
        assert_eq!(preview("abcdef", 3), "abc...");
    }

    #[test]
    fn banner_and_rule_widths() {
        let text = ReportBuilder::new().add_banner("Title").add_rule().finalize();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "=".repeat(RULE_WIDTH));
        assert_eq!(lines[1], "Title");
        assert_eq!(lines[3], "-".repeat(RULE_WIDTH));
    }

    #[test]
    fn items_and_blank_lines() {
        let text = ReportBuilder::new()
            .add_item("one")
            .add_blank_line()
            .add_item("two")
            .finalize();
        assert_eq!(text, "  - one\n\n  - two\n");
    }
}
