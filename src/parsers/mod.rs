pub mod export;
pub mod freeform;
pub mod screenshot;
pub mod timestamp;

use chrono::{DateTime, Duration, NaiveTime, Utc};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::types::{ConversationStats, Direction, InputFormat, ParsedMessage, Personalization};

/// Placeholder base for transcripts whose first message has no usable timestamp.
const PLACEHOLDER_EPOCH: DateTime<Utc> = DateTime::<Utc>::UNIX_EPOCH;

/// Spacing between synthesized timestamps.
const PLACEHOLDER_STEP_SECS: i64 = 1;

/// A message as read from the source, before direction and time are resolved.
#[derive(Debug, Clone)]
pub struct RawMessage {
    pub sender: String,
    pub content: String,
    pub timestamp: Option<DateTime<Utc>>,
    /// Bare clock time when the source only had "10:15 PM"
    pub clock: Option<NaiveTime>,
}

/// Parse raw transcript text into the ordered message list.
pub fn parse(
    raw: &str,
    format: InputFormat,
    personalization: &Personalization,
    config: &EngineConfig,
) -> Result<Vec<ParsedMessage>, EngineError> {
    let raw_messages: Vec<RawMessage> = read_raw(raw, format)
        .into_iter()
        .filter(|m| !m.content.trim().is_empty())
        .collect();

    if raw_messages.is_empty() {
        return Err(EngineError::Format {
            format: format.to_string(),
        });
    }

    let senders = distinct_senders(&raw_messages);
    if senders.len() > 2 {
        return Err(EngineError::UnsupportedParticipantCount {
            count: senders.len(),
            senders,
        });
    }

    let self_sender = resolve_self(&senders, personalization, config);
    tracing::debug!(
        ?senders,
        self_sender = self_sender.as_deref().unwrap_or("<none>"),
        "resolved conversation participants"
    );

    let messages = finalize(raw_messages, format, self_sender.as_deref());
    tracing::debug!(count = messages.len(), %format, "parsed messages");
    Ok(messages)
}

fn read_raw(raw: &str, format: InputFormat) -> Vec<RawMessage> {
    match format {
        InputFormat::Paste => freeform::parse(raw),
        InputFormat::File => match export::parse_csv(raw) {
            Some(messages) if !messages.is_empty() => messages,
            _ => {
                let lines = export::parse_lines(raw);
                if lines.is_empty() {
                    freeform::parse(raw)
                } else {
                    lines
                }
            }
        },
        InputFormat::Screenshot => screenshot::parse(raw),
    }
}

fn sender_key(sender: &str) -> String {
    sender.trim().to_lowercase()
}

/// Distinct senders in order of first appearance (case-insensitive).
fn distinct_senders(messages: &[RawMessage]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for msg in messages {
        let key = sender_key(&msg.sender);
        if !seen.iter().any(|s| sender_key(s) == key) {
            seen.push(msg.sender.trim().to_string());
        }
    }
    seen
}

/// Decide which sender is the analysis subject.
///
/// Order: declared name, then "the other one" of a declared counterpart, then a self
/// alias ("me"), then the first sender to appear. A declared name that matches nobody in a
/// one-sender transcript leaves that sender as the counterpart.
fn resolve_self(
    senders: &[String],
    personalization: &Personalization,
    config: &EngineConfig,
) -> Option<String> {
    let matches = |declared: &Option<String>| {
        declared.as_ref().and_then(|name| {
            let key = sender_key(name);
            senders.iter().find(|s| sender_key(s) == key).cloned()
        })
    };

    if let Some(you) = matches(&personalization.your_name) {
        return Some(you);
    }

    if let Some(them) = matches(&personalization.counterpart_name) {
        return senders
            .iter()
            .find(|s| sender_key(s) != sender_key(&them))
            .cloned();
    }

    if let Some(alias) = senders.iter().find(|s| config.is_self_alias(s)) {
        return Some(alias.clone());
    }

    if personalization.your_name.is_some() && senders.len() == 1 {
        tracing::warn!(
            sender = %senders[0],
            "declared name not found; treating the only sender as the counterpart"
        );
        return None;
    }

    if personalization.your_name.is_some() || personalization.counterpart_name.is_some() {
        tracing::warn!("declared names match no sender; assuming the first sender is you");
    }
    senders.first().cloned()
}

/// Assign directions and timestamps, enforce ordering, derive lengths and gaps.
fn finalize(
    raw_messages: Vec<RawMessage>,
    format: InputFormat,
    self_sender: Option<&str>,
) -> Vec<ParsedMessage> {
    let self_key = self_sender.map(sender_key);
    let trust_times = format != InputFormat::Screenshot;

    // Resolve bare clock times against the running date.
    let mut resolved: Vec<(RawMessage, Option<DateTime<Utc>>)> = Vec::with_capacity(raw_messages.len());
    let mut last_known: Option<DateTime<Utc>> = None;
    for msg in raw_messages {
        let ts = if !trust_times {
            None
        } else if let Some(ts) = msg.timestamp {
            Some(ts)
        } else {
            msg.clock.and_then(|c| timestamp::anchor_time(c, last_known))
        };
        if ts.is_some() {
            last_known = ts;
        }
        resolved.push((msg, ts));
    }

    let all_timed = resolved.iter().all(|(_, ts)| ts.is_some());
    if all_timed {
        // Stable: equal timestamps keep source order.
        resolved.sort_by_key(|(_, ts)| *ts);
    } else {
        let missing = resolved.iter().filter(|(_, ts)| ts.is_none()).count();
        tracing::warn!(
            missing,
            total = resolved.len(),
            "timestamps missing or unparseable; keeping input order with placeholders"
        );
    }

    let mut messages: Vec<ParsedMessage> = Vec::with_capacity(resolved.len());
    for (msg, ts) in resolved {
        let previous = messages.last();
        let (timestamp, inferred) = match (ts, previous) {
            (Some(t), Some(p)) if t >= p.timestamp => (t, false),
            (Some(t), None) => (t, false),
            (_, Some(p)) => (p.timestamp + Duration::seconds(PLACEHOLDER_STEP_SECS), true),
            (None, None) => (PLACEHOLDER_EPOCH, true),
        };

        let time_since_last = previous.and_then(|p| {
            if inferred || p.timestamp_inferred {
                None
            } else {
                Some((timestamp - p.timestamp).num_seconds().max(0))
            }
        });

        let direction = match &self_key {
            Some(key) if sender_key(&msg.sender) == *key => Direction::Sent,
            _ => Direction::Received,
        };
        let content = msg.content.trim().to_string();

        messages.push(ParsedMessage {
            length: content.chars().count(),
            content,
            direction,
            sender: msg.sender.trim().to_string(),
            timestamp,
            timestamp_inferred: inferred,
            time_since_last,
        });
    }

    messages
}

/// Aggregate counts over a parsed transcript.
pub fn stats(messages: &[ParsedMessage]) -> ConversationStats {
    let sent: Vec<&ParsedMessage> = messages.iter().filter(|m| m.direction == Direction::Sent).collect();
    let received: Vec<&ParsedMessage> = messages
        .iter()
        .filter(|m| m.direction == Direction::Received)
        .collect();

    let average = |items: &[&ParsedMessage]| {
        if items.is_empty() {
            0.0
        } else {
            round1(items.iter().map(|m| m.length as f64).sum::<f64>() / items.len() as f64)
        }
    };

    let timestamps_inferred = messages.iter().any(|m| m.timestamp_inferred);
    let (start, end) = if timestamps_inferred {
        (None, None)
    } else {
        (
            messages.first().map(|m| m.timestamp),
            messages.last().map(|m| m.timestamp),
        )
    };

    let all: Vec<&ParsedMessage> = messages.iter().collect();
    ConversationStats {
        total_messages: messages.len(),
        sent_messages: sent.len(),
        received_messages: received.len(),
        start,
        end,
        average_length: average(&all),
        average_sent_length: average(&sent),
        average_received_length: average(&received),
        timestamps_inferred,
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
