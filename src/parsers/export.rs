//! Structured exports: line-oriented chat exports and CSV.

use regex::Regex;
use std::sync::LazyLock;

use super::timestamp::{parse_datetime, parse_time};
use super::RawMessage;

/// `[1/2/24, 10:15:30 PM] Alice: hi`
static BRACKET_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\u{200e}?\[(?P<ts>[^\]]{6,40})\]\s*(?P<sender>[^:]{1,60}?):\s?(?P<text>.*)$")
        .unwrap()
});

/// `1/2/24, 10:15 PM - Alice: hi`
static DASH_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<ts>\d{1,4}[./-]\d{1,2}[./-]\d{1,4},?\s+\d{1,2}:\d{2}(?::\d{2})?(?:[\s\u{202f}]?[APap][Mm])?)\s+[-–]\s+(?P<sender>[^:]{1,60}?):\s?(?P<text>.*)$",
    )
    .unwrap()
});

/// A timestamped line without a sender: group notices, encryption banners.
static SYSTEM_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\u{200e}?\[[^\]]{6,40}\]|\d{1,4}[./-]\d{1,2}[./-]\d{1,4},?\s+\d{1,2}:\d{2}\S*(?:\s?[APap][Mm])?\s+[-–])\s")
        .unwrap()
});

const SENDER_COLUMNS: &[&str] = &["sender", "from", "author", "name"];
const TEXT_COLUMNS: &[&str] = &["message", "text", "content", "body"];
const TIME_COLUMNS: &[&str] = &["timestamp", "time", "date", "datetime"];

/// One export line, classified.
pub(super) enum ExportLine {
    Message(RawMessage),
    System,
    Other,
}

/// Classify a single line against the export dialects.
pub(super) fn classify_line(line: &str) -> ExportLine {
    for pattern in [&*BRACKET_LINE, &*DASH_LINE] {
        if let Some(caps) = pattern.captures(line) {
            let sender = caps["sender"].trim().to_string();
            if sender.is_empty() {
                continue;
            }
            let timestamp = parse_datetime(&caps["ts"]);
            return ExportLine::Message(RawMessage {
                sender,
                content: caps["text"].trim().to_string(),
                clock: timestamp.is_none().then(|| parse_time(&caps["ts"])).flatten(),
                timestamp,
            });
        }
    }
    if SYSTEM_LINE.is_match(line) {
        return ExportLine::System;
    }
    ExportLine::Other
}

/// Line-oriented export. Lines that match no dialect continue the previous message.
pub(super) fn parse_lines(raw: &str) -> Vec<RawMessage> {
    let mut messages: Vec<RawMessage> = Vec::new();
    let mut last_was_system = false;

    for line in raw.lines() {
        let trimmed = line.trim_end();
        if trimmed.trim().is_empty() {
            continue;
        }
        match classify_line(trimmed) {
            ExportLine::Message(msg) => {
                messages.push(msg);
                last_was_system = false;
            }
            ExportLine::System => last_was_system = true,
            ExportLine::Other => {
                if last_was_system {
                    continue;
                }
                if let Some(prev) = messages.last_mut() {
                    prev.content.push('\n');
                    prev.content.push_str(trimmed.trim());
                }
            }
        }
    }

    messages
}

/// CSV export with a header row. Returns `None` when the header doesn't name a sender and
/// a text column, so the caller can fall back to line parsing.
pub(super) fn parse_csv(raw: &str) -> Option<Vec<RawMessage>> {
    let mut records = split_csv(raw).into_iter();
    let header: Vec<String> = records
        .next()?
        .into_iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let find = |names: &[&str]| header.iter().position(|h| names.contains(&h.as_str()));
    let sender_col = find(SENDER_COLUMNS)?;
    let text_col = find(TEXT_COLUMNS)?;
    let time_col = find(TIME_COLUMNS);

    let messages = records
        .filter_map(|record| {
            let sender = record.get(sender_col)?.trim().to_string();
            if sender.is_empty() {
                return None;
            }
            Some(RawMessage {
                sender,
                content: record.get(text_col).map(|t| t.trim().to_string()).unwrap_or_default(),
                timestamp: time_col
                    .and_then(|c| record.get(c))
                    .and_then(|t| parse_datetime(t)),
                clock: None,
            })
        })
        .collect();

    Some(messages)
}

/// RFC-4180 style record splitting: quoted fields may contain commas, doubled quotes and
/// newlines. Blank lines are skipped.
fn split_csv(raw: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                if record.iter().any(|f| !f.trim().is_empty()) {
                    records.push(std::mem::take(&mut record));
                } else {
                    record.clear();
                }
            }
            _ => field.push(c),
        }
    }
    record.push(field);
    if record.iter().any(|f| !f.trim().is_empty()) {
        records.push(record);
    }

    records
}
