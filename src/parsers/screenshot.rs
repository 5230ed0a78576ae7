//! OCR text from chat screenshots. Timestamps are never trusted here; the caller
//! synthesizes them.

use regex::Regex;
use std::sync::LazyLock;

use super::freeform::split_speaker;
use super::RawMessage;

/// Messenger chrome that OCR picks up between bubbles. Only whole-line shapes: a status
/// word alone or followed by a time or date, never a word that merely opens a sentence.
static CHROME_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)^(?:
            (?:delivered|read|seen)
              (?:\s+(?:at\s+)?(?:\d{1,2}:\d{2}(?:\s?[ap]m)?|today|yesterday|\d{1,2}[./]\d{1,2}(?:[./]\d{2,4})?))?
          | sent | edited
          | imessage | text\ message | sms
          | (?:today|yesterday|(?:mon|tues?|wed(?:nes)?|thu(?:rs)?|fri|sat(?:ur)?|sun)(?:day)?)
              (?:,?\s+(?:at\s+)?(?:\d{1,2}:\d{2}(?:\s?[ap]m)?|[a-z]{3,9}\.?\s+\d{1,2}|\d{1,2}[./]\d{1,2}(?:[./]\d{2,4})?))*
          | \d{1,2}:\d{2}(?:\s?[ap]m)?
          | \d{1,3}\s?%
          | (?:lte|5g|4g|3g|wi-?fi)
          | type\ a\ message.* | imessage\ message.*
        )$",
    )
    .unwrap()
});

/// Glyphs OCR hallucinates from bubble edges and bullets.
const OCR_JUNK: &[char] = &['|', '»', '«', '•', '·', '>', '~'];

/// Labels for unlabeled bubbles, in alternation order starting with the first bubble.
/// "Me" resolves as the analysis subject unless a declared name says otherwise.
pub const UNLABELED_SPEAKERS: [&str; 2] = ["Them", "Me"];

fn clean_line(line: &str) -> &str {
    line.trim()
        .trim_start_matches(|c: char| OCR_JUNK.contains(&c) || c.is_whitespace())
        .trim_end_matches(|c: char| c == '|' || c.is_whitespace())
}

pub(super) fn parse(raw: &str) -> Vec<RawMessage> {
    let lines: Vec<&str> = raw
        .lines()
        .map(clean_line)
        .filter(|l| !l.is_empty() && !CHROME_LINE.is_match(l))
        .collect();

    if lines.iter().all(|l| split_speaker(l).is_none()) {
        return alternate(&lines);
    }

    let mut messages: Vec<RawMessage> = Vec::new();
    for line in lines {
        match split_speaker(line) {
            Some((sender, content)) => messages.push(RawMessage {
                sender,
                content,
                timestamp: None,
                clock: None,
            }),
            None => {
                if let Some(prev) = messages.last_mut() {
                    prev.content.push('\n');
                    prev.content.push_str(line);
                }
            }
        }
    }

    messages
}

/// No bubble carries a name: treat each line as one bubble and alternate speakers.
fn alternate(lines: &[&str]) -> Vec<RawMessage> {
    tracing::debug!(count = lines.len(), "no speaker labels in screenshot text, alternating");
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| RawMessage {
            sender: UNLABELED_SPEAKERS[i % 2].to_string(),
            content: line.to_string(),
            timestamp: None,
            clock: None,
        })
        .collect()
}
