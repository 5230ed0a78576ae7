//! Freeform pasted chat logs.

use regex::Regex;
use std::sync::LazyLock;

use super::export::{classify_line, ExportLine};
use super::timestamp::{parse_datetime, parse_time};
use super::RawMessage;

/// Optional leading `[...]` stamp, or a bare clock time followed by a separator.
static LEADING_STAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\[(?P<bracket>[^\]]{3,40})\]|(?P<clock>\d{1,2}:\d{2}(?::\d{2})?(?:\s?[APap][Mm])?)\s*[-–|]?)\s*")
        .unwrap()
});

/// `Name: message`. Names are short and don't look like URLs or clock times.
static SPEAKER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<sender>[\p{L}\p{N}][\p{L}\p{N} ._'\-]{0,38}?)\s*:\s+(?P<text>\S.*)$").unwrap()
});

/// Maximum words in a sender label before a `Word: ...` line is treated as prose.
const MAX_SENDER_WORDS: usize = 4;

/// Split `Name: text`, rejecting labels that are really prose or links.
pub(super) fn split_speaker(line: &str) -> Option<(String, String)> {
    let caps = SPEAKER_LINE.captures(line)?;
    let sender = caps["sender"].trim();
    if sender.split_whitespace().count() > MAX_SENDER_WORDS {
        return None;
    }
    let lower = sender.to_lowercase();
    if lower.starts_with("http") || lower.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some((sender.to_string(), caps["text"].trim().to_string()))
}

pub(super) fn parse(raw: &str) -> Vec<RawMessage> {
    let mut messages: Vec<RawMessage> = Vec::new();

    for line in raw.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        // Pasted exports keep their own dialect.
        match classify_line(trimmed) {
            ExportLine::Message(msg) => {
                messages.push(msg);
                continue;
            }
            ExportLine::System => continue,
            ExportLine::Other => {}
        }

        let (timestamp, clock, rest) = match LEADING_STAMP.captures(trimmed) {
            Some(caps) => {
                let end = caps.get(0).map(|m| m.end()).unwrap_or(0);
                let timestamp = caps.name("bracket").and_then(|m| parse_datetime(m.as_str()));
                let clock = caps
                    .name("bracket")
                    .filter(|_| timestamp.is_none())
                    .or_else(|| caps.name("clock"))
                    .and_then(|m| parse_time(m.as_str()));
                (timestamp, clock, &trimmed[end..])
            }
            None => (None, None, trimmed),
        };

        match split_speaker(rest) {
            Some((sender, content)) => messages.push(RawMessage {
                sender,
                content,
                timestamp,
                clock,
            }),
            None => {
                if let Some(prev) = messages.last_mut() {
                    prev.content.push('\n');
                    prev.content.push_str(rest);
                }
            }
        }
    }

    messages
}
