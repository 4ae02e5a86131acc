//! Output envelopes from the remote shell and their rendering.
//!
//! Envelopes are decoded once at the channel boundary into
//! [`OutputEnvelope`]; decoding never fails; anything that does not
//! conform becomes plain text. [`format`] turns an envelope into a
//! display-ready string with ANSI styling.

use serde::Deserialize;
use serde_json::Value;
use unicode_width::UnicodeWidthStr;

// ANSI styles
const ERROR_STYLE: &str = "\x1b[91m";
const DIR_STYLE: &str = "\x1b[1;34m";
const EXEC_STYLE: &str = "\x1b[1;32m";
const RESET: &str = "\x1b[0m";

/// Number of columns in a rendered listing.
pub const LISTING_COLUMNS: usize = 4;
/// Display width each listing entry is padded to.
pub const LISTING_COLUMN_WIDTH: usize = 20;

/// Kinds decoded by [`TaggedEnvelope`].
const KNOWN_KINDS: [&str; 3] = ["text", "error", "listing"];

const EXECUTABLE_SUFFIXES: [&str; 3] = [".exe", ".sh", ".bat"];

/// A decoded message from the shell backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputEnvelope {
    Text(String),
    Error(String),
    Listing(Vec<String>),
    /// Unrecognised kind; shown as-is.
    Raw(String),
}

/// Wire shape for the kinds we know how to render.
#[derive(Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
enum TaggedEnvelope {
    Text(String),
    Error(String),
    Listing(Vec<String>),
}

/// Wire shape for any other kind that still carries string content.
#[derive(Deserialize)]
struct UntaggedEnvelope {
    #[serde(rename = "type")]
    kind: String,
    content: String,
}

impl OutputEnvelope {
    /// Decode a raw payload from the output channel.
    pub fn decode(payload: &str) -> Self {
        // Only JSON objects are envelopes; serde would also accept arrays.
        let value = match serde_json::from_str::<Value>(payload) {
            Ok(value @ Value::Object(_)) => value,
            _ => return OutputEnvelope::Text(payload.to_string()),
        };

        if let Ok(tagged) = TaggedEnvelope::deserialize(&value) {
            return match tagged {
                TaggedEnvelope::Text(s) => OutputEnvelope::Text(s),
                TaggedEnvelope::Error(s) => OutputEnvelope::Error(s),
                TaggedEnvelope::Listing(entries) => OutputEnvelope::Listing(entries),
            };
        }

        match UntaggedEnvelope::deserialize(&value) {
            // A known kind with the wrong content shape is malformed
            Ok(other) if !KNOWN_KINDS.contains(&other.kind.as_str()) => {
                OutputEnvelope::Raw(other.content)
            }
            _ => OutputEnvelope::Text(payload.to_string()),
        }
    }
}

/// Render an envelope for the terminal.
pub fn format(envelope: &OutputEnvelope) -> String {
    match envelope {
        OutputEnvelope::Text(s) | OutputEnvelope::Raw(s) => s.clone(),
        OutputEnvelope::Error(s) => format!("{ERROR_STYLE}{s}{RESET}"),
        OutputEnvelope::Listing(entries) => format_listing(entries),
    }
}

/// Decode and render a raw payload in one step.
pub fn format_payload(payload: &str) -> String {
    format(&OutputEnvelope::decode(payload))
}

fn format_listing(entries: &[String]) -> String {
    entries
        .chunks(LISTING_COLUMNS)
        .map(|row| row.iter().map(|name| format_entry(name)).collect::<String>())
        .collect::<Vec<_>>()
        .join("\r\n")
}

fn format_entry(name: &str) -> String {
    let padding = " ".repeat(LISTING_COLUMN_WIDTH.saturating_sub(name.width()));
    match entry_style(name) {
        Some(style) => format!("{style}{name}{RESET}{padding}"),
        None => format!("{name}{padding}"),
    }
}

fn entry_style(name: &str) -> Option<&'static str> {
    if name.ends_with('/') {
        Some(DIR_STYLE)
    } else if EXECUTABLE_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
        Some(EXEC_STYLE)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_known_kinds() {
        assert_eq!(
            OutputEnvelope::decode(r#"{"type":"text","content":"hello"}"#),
            OutputEnvelope::Text("hello".to_string())
        );
        assert_eq!(
            OutputEnvelope::decode(r#"{"type":"error","content":"boom"}"#),
            OutputEnvelope::Error("boom".to_string())
        );
        assert_eq!(
            OutputEnvelope::decode(r#"{"type":"listing","content":["a","b/"]}"#),
            OutputEnvelope::Listing(vec!["a".to_string(), "b/".to_string()])
        );
    }

    #[test]
    fn unknown_kind_decodes_as_raw() {
        assert_eq!(
            OutputEnvelope::decode(r#"{"type":"progress","content":"50%"}"#),
            OutputEnvelope::Raw("50%".to_string())
        );
    }

    #[test]
    fn malformed_payloads_fall_back_to_text() {
        for payload in [
            "not json",
            r#"{"type":"listing","content":"oops"}"#,
            r#"{"type":"text","content":["a"]}"#,
            r#"{"content":"no type"}"#,
            r#"["text","hi"]"#,
            r#"{"type":"status","content":42}"#,
        ] {
            assert_eq!(
                OutputEnvelope::decode(payload),
                OutputEnvelope::Text(payload.to_string()),
                "payload: {}",
                payload
            );
        }
    }

    #[test]
    fn known_kind_with_wrong_content_shows_whole_payload() {
        let payload = r#"{"type":"listing","content":"oops"}"#;
        assert_eq!(format_payload(payload), payload);

        let payload = r#"{"type":"error","content":{"code":1}}"#;
        assert_eq!(format_payload(payload), payload);
    }

    #[test]
    fn non_json_passes_through_unchanged() {
        assert_eq!(format_payload("not json"), "not json");
    }

    #[test]
    fn error_is_wrapped_in_single_style() {
        assert_eq!(
            format_payload(r#"{"type":"error","content":"boom"}"#),
            "\x1b[91mboom\x1b[0m"
        );
    }

    #[test]
    fn text_and_raw_pass_through() {
        let text = "line1\nline2 \x1b[1mbold\x1b[0m";
        assert_eq!(format(&OutputEnvelope::Text(text.to_string())), text);
        assert_eq!(format(&OutputEnvelope::Raw(text.to_string())), text);
    }

    #[test]
    fn listing_styles_and_pads_entries() {
        let rendered = format_payload(r#"{"type":"listing","content":["a.txt","bin/","run.sh"]}"#);

        let expected = format!(
            "a.txt{}\x1b[1;34mbin/\x1b[0m{}\x1b[1;32mrun.sh\x1b[0m{}",
            " ".repeat(15),
            " ".repeat(16),
            " ".repeat(14)
        );
        assert_eq!(rendered, expected);
        assert!(!rendered.contains("\r\n"));
    }

    #[test]
    fn listing_wraps_after_four_columns() {
        let entries: Vec<String> = (1..=6).map(|i| format!("f{}", i)).collect();
        let rendered = format(&OutputEnvelope::Listing(entries));

        let rows: Vec<&str> = rendered.split("\r\n").collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 4 * LISTING_COLUMN_WIDTH);
        assert_eq!(rows[1].len(), 2 * LISTING_COLUMN_WIDTH);
        assert!(rows[1].starts_with("f5"));
    }

    #[test]
    fn executable_suffixes_are_recognised() {
        for name in ["setup.exe", "install.sh", "build.bat"] {
            assert_eq!(entry_style(name), Some(EXEC_STYLE));
        }
        assert_eq!(entry_style("notes.shx"), None);
    }

    #[test]
    fn long_names_are_not_truncated() {
        let name = "a-very-long-file-name-indeed.txt";
        assert_eq!(format_entry(name), name);
    }

    #[test]
    fn empty_listing_renders_nothing() {
        assert_eq!(format(&OutputEnvelope::Listing(Vec::new())), "");
    }
}
