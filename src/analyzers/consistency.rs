//! Drift between the first and second half of each person's messages, and the two risks
//! built on it: ghosting (effort falling away) and breadcrumbing (low-effort contact
//! without commitment).

use serde::{Deserialize, Serialize};

use super::scoring::{compare, linear, median, percent, round1, Balance, Level, Pair};
use super::{AnalysisResult, Analyzer, Conversation};
use crate::types::Direction;

/// Messages at or under this many characters count as short replies.
pub const SHORT_REPLY_CHARS: usize = 10;
/// Each person needs at least this many messages per half to measure drift.
const MIN_HALF: usize = 2;
/// Latency drift beyond this percentage is not counted further.
const LATENCY_DRIFT_CAP: f64 = 200.0;
const NEUTRAL_SCORE: f64 = 50.0;
/// Effort change (percent) within which a person counts as stable.
const STABLE_WITHIN: f64 = 20.0;

/// How one person's behavior moved from the first half to the second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drift {
    /// Percent change in average length
    pub length: f64,
    /// Change in short-reply rate, in percentage points
    pub short_replies: f64,
    /// Percent change in median reply latency; `None` without reliable timestamps
    pub latency: Option<f64>,
}

impl Drift {
    /// Positive when effort grew, negative when it fell away.
    pub fn effort_change(&self) -> f64 {
        self.length - self.short_replies
    }

    fn latency_increase(&self) -> f64 {
        self.latency.unwrap_or(0.0).clamp(0.0, LATENCY_DRIFT_CAP)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Stable,
    Rising,
    Declining,
    Insufficient,
}

fn pct_change(before: f64, after: f64) -> f64 {
    if before <= 0.0 {
        0.0
    } else {
        round1((after - before) / before * 100.0)
    }
}

fn short_rate(lengths: &[usize]) -> f64 {
    let short = lengths.iter().filter(|l| **l <= SHORT_REPLY_CHARS).count();
    percent(short as f64, lengths.len() as f64)
}

/// First-half versus second-half drift for one person, or `None` when they sent too few
/// messages to split.
pub fn drift(conv: &Conversation<'_>, direction: Direction) -> Option<Drift> {
    let own: Vec<usize> = conv.by(direction).map(|(i, _)| i).collect();
    if own.len() < MIN_HALF * 2 {
        return None;
    }
    let (first, second) = own.split_at(own.len() / 2);
    let messages = conv.messages();

    let lengths = |idx: &[usize]| -> Vec<usize> { idx.iter().map(|i| messages[*i].length).collect() };
    let avg = |l: &[usize]| l.iter().sum::<usize>() as f64 / l.len().max(1) as f64;
    let (first_len, second_len) = (lengths(first), lengths(second));

    let latency = if conv.timestamps_inferred() {
        None
    } else {
        let replies = |idx: &[usize]| -> Vec<f64> {
            idx.iter()
                .filter(|i| **i > 0 && messages[**i - 1].direction != direction)
                .filter_map(|i| messages[*i].time_since_last)
                .map(|s| s as f64)
                .collect()
        };
        match (median(&replies(first)), median(&replies(second))) {
            (Some(before), Some(after)) => Some(pct_change(before, after)),
            _ => None,
        }
    };

    Some(Drift {
        length: pct_change(avg(&first_len), avg(&second_len)),
        short_replies: round1(short_rate(&second_len) - short_rate(&first_len)),
        latency,
    })
}

fn trend(drift: &Option<Drift>) -> Trend {
    match drift {
        None => Trend::Insufficient,
        Some(d) if d.effort_change().abs() < STABLE_WITHIN => Trend::Stable,
        Some(d) if d.effort_change() > 0.0 => Trend::Rising,
        Some(_) => Trend::Declining,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyResult {
    pub score: f64,
    pub scores: Pair<f64>,
    pub drift: Pair<Option<Drift>>,
    pub trend: Pair<Trend>,
    pub summary: String,
}

pub struct ConsistencyAnalyzer;

impl Analyzer for ConsistencyAnalyzer {
    fn id(&self) -> &'static str {
        "consistency"
    }

    fn label(&self) -> &'static str {
        "Behavioral Consistency"
    }

    fn analyze(&self, conv: &Conversation<'_>) -> AnalysisResult {
        let drift = Pair::from_fn(|d| drift(conv, d));
        let scores = drift.map(|d| match d {
            Some(d) => linear(
                100.0,
                &[
                    (-0.5, d.length.abs()),
                    (-0.5, d.short_replies.abs()),
                    (-0.2, d.latency.unwrap_or(0.0).abs().min(LATENCY_DRIFT_CAP)),
                ],
            ),
            None => NEUTRAL_SCORE,
        });
        let trend = drift.map(trend);

        let describe = |t: Trend| match t {
            Trend::Stable => "steady",
            Trend::Rising => "picking up",
            Trend::Declining => "tapering off",
            Trend::Insufficient => "too short to judge",
        };
        let summary = format!(
            "Your messaging is {} and theirs is {} over the course of the conversation.",
            describe(trend.you),
            describe(trend.them)
        );

        AnalysisResult::Consistency(ConsistencyResult {
            score: scores.mean(),
            scores,
            drift,
            trend,
            summary,
        })
    }
}

const EXIT: &[&str] = &["ghosting.exit"];
const LOW_INTEREST: &[&str] = &["interest.low"];
const GHOST_BASE: f64 = 10.0;
const GHOST_EXIT_PER_HIT: f64 = 8.0;
const GHOST_LOW_INTEREST_PER_HIT: f64 = 5.0;
/// Risk difference within which neither side is singled out.
const GHOST_BALANCED_WITHIN: f64 = 10.0;
const GHOST_MODERATE_AT: f64 = 30.0;
const GHOST_HIGH_AT: f64 = 60.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GhostingRiskResult {
    /// The higher of the two risks
    pub score: f64,
    pub risk: Pair<f64>,
    pub level: Level,
    /// Who shows more signs of pulling away
    pub more_at_risk: Balance,
    /// Effort change between halves (negative means a drop); 0 when too short to split
    pub effort_change: Pair<f64>,
    pub exit_phrases: Pair<u32>,
    pub summary: String,
}

pub struct GhostingRiskAnalyzer;

impl Analyzer for GhostingRiskAnalyzer {
    fn id(&self) -> &'static str {
        "ghostingRisk"
    }

    fn label(&self) -> &'static str {
        "Ghosting Risk"
    }

    fn analyze(&self, conv: &Conversation<'_>) -> AnalysisResult {
        let drift = Pair::from_fn(|d| drift(conv, d));
        // Length, short-reply and latency drift, before any phrase hits.
        let fade = Pair::from_fn(|d| match drift.get(d) {
            Some(x) => (
                (-x.length).max(0.0),
                x.short_replies.max(0.0),
                x.latency_increase(),
            ),
            None => (0.0, 0.0, 0.0),
        });
        let risk = Pair::from_fn(|d| {
            if conv.count(d) == 0 {
                return 0.0;
            }
            let (drop, shorter, slower) = *fade.get(d);
            linear(
                GHOST_BASE,
                &[
                    (0.5, drop),
                    (0.5, shorter),
                    (0.2, slower),
                    (GHOST_EXIT_PER_HIT, conv.rate(d, EXIT)),
                    (GHOST_LOW_INTEREST_PER_HIT, conv.rate(d, LOW_INTEREST)),
                ],
            )
        });
        let score = risk.max();
        let level = Level::from_score(score, GHOST_MODERATE_AT, GHOST_HIGH_AT);
        let more_at_risk = compare(&risk, GHOST_BALANCED_WITHIN);

        let summary = match (level, more_at_risk.side()) {
            (Level::Low, _) => "Neither of you shows signs of pulling away.".to_string(),
            (_, None) => format!(
                "Ghosting risk is {}: both of you show similar signs of pulling away.",
                level
            ),
            (_, Some(d)) => {
                let whose = match d {
                    Direction::Sent => "your",
                    Direction::Received => "their",
                };
                let (drop, shorter, slower) = *fade.get(d);
                if drop + shorter + slower > 0.0 {
                    format!(
                        "Ghosting risk is {}: {} effort drops noticeably later in the conversation.",
                        level, whose
                    )
                } else {
                    format!(
                        "Ghosting risk is {}: {} messages lean on exit lines and low-interest replies.",
                        level, whose
                    )
                }
            }
        };

        AnalysisResult::GhostingRisk(GhostingRiskResult {
            score,
            risk,
            level,
            more_at_risk,
            effort_change: drift.map(|d| d.as_ref().map(|d| round1(d.effort_change())).unwrap_or(0.0)),
            exit_phrases: Pair::from_fn(|d| conv.hits(d, EXIT)),
            summary,
        })
    }
}

const VAGUE: &[&str] = &["commitment.vague"];
const COMMITMENT: &[&str] = &["future.commitment", "future.plans"];
const CRUMB_VAGUE_PER_HIT: f64 = 10.0;
const CRUMB_SHORT_WEIGHT: f64 = 0.4;
const CRUMB_LOW_INTEREST_PER_HIT: f64 = 8.0;
const CRUMB_COMMITMENT_PER_HIT: f64 = 10.0;
const CRUMB_BALANCED_WITHIN: f64 = 10.0;
const CRUMB_MODERATE_AT: f64 = 30.0;
const CRUMB_HIGH_AT: f64 = 60.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreadcrumbingResult {
    /// The higher of the two risks
    pub score: f64,
    pub risk: Pair<f64>,
    pub level: Level,
    /// Who sends more of the noncommittal contact
    pub more_noncommittal: Balance,
    pub vague_commitments: Pair<u32>,
    /// Percent of messages at or under the short-reply length
    pub short_reply_rate: Pair<f64>,
    pub summary: String,
}

pub struct BreadcrumbingAnalyzer;

impl Analyzer for BreadcrumbingAnalyzer {
    fn id(&self) -> &'static str {
        "breadcrumbing"
    }

    fn label(&self) -> &'static str {
        "Breadcrumbing Detection"
    }

    fn analyze(&self, conv: &Conversation<'_>) -> AnalysisResult {
        let short_reply_rate = Pair::from_fn(|d| {
            percent(
                conv.by(d).filter(|(_, m)| m.length <= SHORT_REPLY_CHARS).count() as f64,
                conv.count(d) as f64,
            )
        });
        let risk = Pair::from_fn(|d| {
            linear(
                0.0,
                &[
                    (CRUMB_VAGUE_PER_HIT, conv.rate(d, VAGUE)),
                    (CRUMB_SHORT_WEIGHT, *short_reply_rate.get(d)),
                    (CRUMB_LOW_INTEREST_PER_HIT, conv.rate(d, LOW_INTEREST)),
                    (-CRUMB_COMMITMENT_PER_HIT, conv.rate(d, COMMITMENT)),
                ],
            )
        });
        let score = risk.max();
        let level = Level::from_score(score, CRUMB_MODERATE_AT, CRUMB_HIGH_AT);
        let more_noncommittal = compare(&risk, CRUMB_BALANCED_WITHIN);
        let summary = match (level, more_noncommittal) {
            (Level::Low, _) => "Contact comes with real substance and follow-through.".to_string(),
            (_, Balance::Balanced) => format!(
                "Breadcrumbing risk is {}: both of you send short, noncommittal messages.",
                level
            ),
            (_, side) => format!(
                "Breadcrumbing risk is {}: frequent short, noncommittal messages from {}.",
                level,
                if side == Balance::You { "you" } else { "them" }
            ),
        };

        AnalysisResult::Breadcrumbing(BreadcrumbingResult {
            score,
            risk,
            level,
            more_noncommittal,
            vague_commitments: Pair::from_fn(|d| conv.hits(d, VAGUE)),
            short_reply_rate,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::test_support::{messages_of, run};
    use crate::types::Direction::{Received, Sent};

    fn fading() -> Vec<crate::types::ParsedMessage> {
        messages_of(&[
            (Sent, "how did the presentation go? i kept thinking about it all morning"),
            (Received, "it went really well, they loved the demo and asked great questions"),
            (Sent, "that's amazing, i'm so proud of you. want to celebrate tonight?"),
            (Received, "yes! let's get dinner at the new place downtown around seven"),
            (Sent, "perfect, i'll book a table for us and meet you there"),
            (Received, "k"),
            (Sent, "how was your day today, anything exciting happen at work?"),
            (Received, "busy"),
        ])
    }

    #[test]
    fn effort_drop_is_detected() {
        let messages = fading();
        let r = match run(&ConsistencyAnalyzer, &messages) {
            AnalysisResult::Consistency(r) => r,
            other => panic!("unexpected result {:?}", other),
        };
        assert_eq!(r.trend.them, Trend::Declining);
        assert_eq!(r.trend.you, Trend::Stable);
        assert!(r.scores.them < r.scores.you);
    }

    #[test]
    fn ghosting_risk_follows_effort_drop() {
        let messages = fading();
        let r = match run(&GhostingRiskAnalyzer, &messages) {
            AnalysisResult::GhostingRisk(r) => r,
            other => panic!("unexpected result {:?}", other),
        };
        assert!(r.risk.them > r.risk.you);
        assert_eq!(r.level, Level::High);
        assert_eq!(r.more_at_risk, Balance::Them);
        assert_eq!(r.exit_phrases.them, 1);
    }

    #[test]
    fn matching_exit_lines_blame_neither_side() {
        let lines: Vec<_> = (0..12)
            .map(|i| (if i % 2 == 0 { Sent } else { Received }, "gotta go ttyl busy"))
            .collect();
        let messages = messages_of(&lines);
        let r = match run(&GhostingRiskAnalyzer, &messages) {
            AnalysisResult::GhostingRisk(r) => r,
            other => panic!("unexpected result {:?}", other),
        };
        assert_eq!(r.risk.you, r.risk.them);
        assert_ne!(r.level, Level::Low);
        assert_eq!(r.more_at_risk, Balance::Balanced);
        assert!(r.summary.contains("both of you"), "{}", r.summary);
        assert!(!r.summary.contains("effort drops"), "{}", r.summary);
    }

    #[test]
    fn exit_lines_without_drift_are_not_called_an_effort_drop() {
        let messages = messages_of(&[
            (Sent, "how was the concert last night?"),
            (Received, "gotta go"),
            (Sent, "did you get home ok?"),
            (Received, "busy, ttyl"),
        ]);
        let r = match run(&GhostingRiskAnalyzer, &messages) {
            AnalysisResult::GhostingRisk(r) => r,
            other => panic!("unexpected result {:?}", other),
        };
        assert_eq!(r.more_at_risk, Balance::Them);
        assert!(r.summary.contains("exit lines"), "{}", r.summary);
    }

    #[test]
    fn short_transcript_is_insufficient() {
        let messages = messages_of(&[(Sent, "hi"), (Received, "hello")]);
        let r = match run(&ConsistencyAnalyzer, &messages) {
            AnalysisResult::Consistency(r) => r,
            other => panic!("unexpected result {:?}", other),
        };
        assert_eq!(r.trend, Pair::new(Trend::Insufficient, Trend::Insufficient));
        assert_eq!(r.score, 50.0);
    }

    #[test]
    fn vague_low_effort_contact_is_breadcrumbing() {
        let messages = messages_of(&[
            (Received, "hey stranger"),
            (Sent, "hey! want to get dinner this weekend?"),
            (Received, "maybe"),
            (Sent, "how about saturday at seven?"),
            (Received, "we'll see"),
            (Sent, "ok let me know"),
            (Received, "wyd"),
        ]);
        let r = match run(&BreadcrumbingAnalyzer, &messages) {
            AnalysisResult::Breadcrumbing(r) => r,
            other => panic!("unexpected result {:?}", other),
        };
        assert_eq!(r.vague_commitments.them, 4);
        assert!(r.risk.them > r.risk.you);
        assert_ne!(r.level, Level::Low);
        assert_eq!(r.more_noncommittal, Balance::Them);
    }

    #[test]
    fn equal_breadcrumbing_names_both_sides() {
        let messages = messages_of(&[
            (Sent, "maybe"),
            (Received, "maybe"),
            (Sent, "we'll see"),
            (Received, "we'll see"),
        ]);
        let r = match run(&BreadcrumbingAnalyzer, &messages) {
            AnalysisResult::Breadcrumbing(r) => r,
            other => panic!("unexpected result {:?}", other),
        };
        assert_eq!(r.more_noncommittal, Balance::Balanced);
        assert!(r.summary.contains("both of you"), "{}", r.summary);
    }
}
