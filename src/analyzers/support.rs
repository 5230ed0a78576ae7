//! Responsiveness to the other person: support, validation, listening and recall.

use serde::{Deserialize, Serialize};

use super::scoring::{compare, linear, mean, percent, Balance, Level, Pair};
use super::{AnalysisResult, Analyzer, Conversation};
use crate::types::Direction;

const SUPPORTIVE: &[&str] = &["support.emotional", "support.practical"];
const DISMISSIVE: &[&str] = &["support.dismissive"];
const SUPPORT_BASE: f64 = 50.0;
const SUPPORT_PER_HIT: f64 = 15.0;
const DISMISS_PER_HIT: f64 = 25.0;
const SUPPORT_BALANCED_WITHIN: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportQualityResult {
    pub score: f64,
    pub scores: Pair<f64>,
    pub emotional: Pair<u32>,
    pub practical: Pair<u32>,
    pub dismissive: Pair<u32>,
    pub more_supportive: Balance,
    pub summary: String,
}

pub struct SupportQualityAnalyzer;

impl Analyzer for SupportQualityAnalyzer {
    fn id(&self) -> &'static str {
        "supportQuality"
    }

    fn label(&self) -> &'static str {
        "Support Quality"
    }

    fn analyze(&self, conv: &Conversation<'_>) -> AnalysisResult {
        let scores = Pair::from_fn(|d| {
            linear(
                SUPPORT_BASE,
                &[
                    (SUPPORT_PER_HIT, conv.rate(d, SUPPORTIVE)),
                    (-DISMISS_PER_HIT, conv.rate(d, DISMISSIVE)),
                ],
            )
        });
        let dismissive = Pair::from_fn(|d| conv.hits(d, DISMISSIVE));
        let more_supportive = compare(&scores, SUPPORT_BALANCED_WITHIN);
        let mut summary = match more_supportive {
            Balance::Balanced => "Support is offered in similar measure by both of you.".to_string(),
            side => format!("{} offer more support when it's needed.", match side {
                Balance::You => "You",
                _ => "They",
            }),
        };
        if dismissive.you + dismissive.them > 0 {
            summary.push_str(" Some replies brush concerns aside.");
        }

        AnalysisResult::SupportQuality(SupportQualityResult {
            score: scores.mean(),
            scores,
            emotional: Pair::from_fn(|d| conv.hits(d, &["support.emotional"])),
            practical: Pair::from_fn(|d| conv.hits(d, &["support.practical"])),
            dismissive,
            more_supportive,
            summary,
        })
    }
}

const VALIDATION_BASE: f64 = 50.0;
const AFFIRM_PER_HIT: f64 = 20.0;
const INVALIDATE_PER_HIT: f64 = 25.0;
const VALIDATION_MODERATE_AT: f64 = 40.0;
const VALIDATION_HIGH_AT: f64 = 60.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub score: f64,
    pub scores: Pair<f64>,
    pub affirmations: Pair<u32>,
    pub invalidations: Pair<u32>,
    pub levels: Pair<Level>,
    pub summary: String,
}

pub struct ValidationAnalyzer;

impl Analyzer for ValidationAnalyzer {
    fn id(&self) -> &'static str {
        "validation"
    }

    fn label(&self) -> &'static str {
        "Validation Patterns"
    }

    fn analyze(&self, conv: &Conversation<'_>) -> AnalysisResult {
        let scores = Pair::from_fn(|d| {
            linear(
                VALIDATION_BASE,
                &[
                    (AFFIRM_PER_HIT, conv.rate(d, &["validation.affirm"])),
                    (-INVALIDATE_PER_HIT, conv.rate(d, &["validation.invalidate"])),
                ],
            )
        });
        let levels = scores.map(|s| Level::from_score(*s, VALIDATION_MODERATE_AT, VALIDATION_HIGH_AT));
        let invalidations = Pair::from_fn(|d| conv.hits(d, &["validation.invalidate"]));
        let summary = if invalidations.you + invalidations.them > 0 {
            format!(
                "Feelings get dismissed at times ({} invalidating message(s)).",
                invalidations.you + invalidations.them
            )
        } else {
            format!("Validation is {} from you and {} from them.", levels.you, levels.them)
        };

        AnalysisResult::Validation(ValidationResult {
            score: scores.mean(),
            scores,
            affirmations: Pair::from_fn(|d| conv.hits(d, &["validation.affirm"])),
            invalidations,
            levels,
            summary,
        })
    }
}

const ACKNOWLEDGE: &[&str] = &["listening.acknowledge"];
const LISTENING_BASE: f64 = 20.0;
const ACK_PER_HIT: f64 = 15.0;
const FOLLOW_UP_POINTS: f64 = 40.0;
const LENGTH_MATCH_POINTS: f64 = 25.0;
const LISTENING_BALANCED_WITHIN: f64 = 15.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListeningResult {
    pub score: f64,
    pub scores: Pair<f64>,
    pub acknowledgements: Pair<u32>,
    /// Percent of replies that ask a question back
    pub follow_up_rate: Pair<f64>,
    /// Mean reply length relative to the message being answered, capped at 1
    pub reply_length_ratio: Pair<f64>,
    pub better_listener: Balance,
    pub summary: String,
}

struct ReplyStats {
    follow_up: f64,
    length_ratio: f64,
}

fn reply_stats(conv: &Conversation<'_>, direction: Direction) -> Option<ReplyStats> {
    let messages = conv.messages();
    let replies: Vec<usize> = conv
        .by(direction)
        .map(|(i, _)| i)
        .filter(|i| *i > 0 && messages[i - 1].direction != direction)
        .collect();
    if replies.is_empty() {
        return None;
    }
    let follow_ups = replies.iter().filter(|i| messages[**i].content.contains('?')).count();
    let ratios: Vec<f64> = replies
        .iter()
        .map(|i| {
            let asked = messages[i - 1].length.max(1) as f64;
            (messages[*i].length as f64 / asked).min(1.0)
        })
        .collect();
    Some(ReplyStats {
        follow_up: follow_ups as f64 / replies.len() as f64,
        length_ratio: mean(&ratios).unwrap_or(0.0),
    })
}

pub struct ListeningAnalyzer;

impl Analyzer for ListeningAnalyzer {
    fn id(&self) -> &'static str {
        "listening"
    }

    fn label(&self) -> &'static str {
        "Listening Quality"
    }

    fn analyze(&self, conv: &Conversation<'_>) -> AnalysisResult {
        let stats = Pair::from_fn(|d| reply_stats(conv, d));
        let scores = Pair::from_fn(|d| {
            let (follow_up, length_ratio) = stats
                .get(d)
                .as_ref()
                .map(|s| (s.follow_up, s.length_ratio))
                .unwrap_or((0.0, 0.0));
            linear(
                LISTENING_BASE,
                &[
                    (ACK_PER_HIT, conv.rate(d, ACKNOWLEDGE)),
                    (FOLLOW_UP_POINTS, follow_up),
                    (LENGTH_MATCH_POINTS, length_ratio),
                ],
            )
        });
        let better_listener = compare(&scores, LISTENING_BALANCED_WITHIN);
        let summary = match better_listener {
            Balance::Balanced => "You both engage with what the other says.".to_string(),
            side => format!(
                "{} engage more with what the other says, asking follow-ups and answering in kind.",
                match side {
                    Balance::You => "You",
                    _ => "They",
                }
            ),
        };

        AnalysisResult::Listening(ListeningResult {
            score: scores.mean(),
            scores,
            acknowledgements: Pair::from_fn(|d| conv.hits(d, ACKNOWLEDGE)),
            follow_up_rate: stats.map(|s| s.as_ref().map(|s| percent(s.follow_up, 1.0)).unwrap_or(0.0)),
            reply_length_ratio: stats.map(|s| {
                s.as_ref()
                    .map(|s| super::scoring::round2(s.length_ratio))
                    .unwrap_or(0.0)
            }),
            better_listener,
            summary,
        })
    }
}

const RECALL: &[&str] = &["memory.recall"];
/// Points per unit fraction of messages that call back to something shared earlier.
const RECALL_SCALE: f64 = 150.0;
const MEMORY_BALANCED_WITHIN: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryResult {
    pub score: f64,
    pub scores: Pair<f64>,
    pub recalls: Pair<u32>,
    pub better_memory: Balance,
    pub summary: String,
}

pub struct MemoryAnalyzer;

impl Analyzer for MemoryAnalyzer {
    fn id(&self) -> &'static str {
        "memory"
    }

    fn label(&self) -> &'static str {
        "Memory & Recall"
    }

    fn analyze(&self, conv: &Conversation<'_>) -> AnalysisResult {
        let scores = Pair::from_fn(|d| linear(0.0, &[(RECALL_SCALE, conv.matching_fraction(d, RECALL))]));
        let recalls = Pair::from_fn(|d| conv.hits(d, RECALL));
        let better_memory = compare(&scores, MEMORY_BALANCED_WITHIN);
        let summary = if recalls.you + recalls.them == 0 {
            "Neither of you refers back to earlier details.".to_string()
        } else {
            format!(
                "You recall shared details {} time(s) and they do {} time(s).",
                recalls.you, recalls.them
            )
        };

        AnalysisResult::Memory(MemoryResult {
            score: scores.mean(),
            scores,
            recalls,
            better_memory,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::test_support::{messages_of, run};
    use crate::types::Direction::{Received, Sent};

    #[test]
    fn dismissive_support() {
        let messages = messages_of(&[
            (Sent, "i'm here for you, can i help?"),
            (Received, "get over it"),
        ]);
        let r = match run(&SupportQualityAnalyzer, &messages) {
            AnalysisResult::SupportQuality(r) => r,
            other => panic!("unexpected result {:?}", other),
        };
        assert_eq!(r.more_supportive, Balance::You);
        assert_eq!(r.dismissive.them, 1);
        assert!(r.summary.ends_with("Some replies brush concerns aside."));
    }

    #[test]
    fn validation_and_invalidation() {
        let messages = messages_of(&[
            (Sent, "that makes sense, you're right"),
            (Received, "you're overreacting"),
        ]);
        let r = match run(&ValidationAnalyzer, &messages) {
            AnalysisResult::Validation(r) => r,
            other => panic!("unexpected result {:?}", other),
        };
        assert_eq!(r.affirmations.you, 2);
        assert_eq!(r.invalidations.them, 1);
        assert_eq!(r.levels.you, Level::High);
        assert_eq!(r.levels.them, Level::Low);
    }

    #[test]
    fn follow_up_questions_mark_better_listener() {
        let messages = messages_of(&[
            (Received, "my interview went badly today"),
            (Sent, "oh no, i hear you. what happened in there?"),
            (Received, "k"),
            (Sent, "that must have been rough for you"),
            (Received, "yeah"),
        ]);
        let r = match run(&ListeningAnalyzer, &messages) {
            AnalysisResult::Listening(r) => r,
            other => panic!("unexpected result {:?}", other),
        };
        assert_eq!(r.follow_up_rate.you, 50.0);
        assert_eq!(r.follow_up_rate.them, 0.0);
        assert_eq!(r.better_listener, Balance::You);
    }

    #[test]
    fn recall_of_earlier_details() {
        let messages = messages_of(&[
            (Sent, "how did the dentist go? you mentioned you were nervous"),
            (Received, "fine"),
        ]);
        let r = match run(&MemoryAnalyzer, &messages) {
            AnalysisResult::Memory(r) => r,
            other => panic!("unexpected result {:?}", other),
        };
        assert_eq!(r.recalls.you, 2);
        assert_eq!(r.scores.you, 100.0);
        assert_eq!(r.better_memory, Balance::You);
    }
}
