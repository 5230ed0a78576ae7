//! Consecutive same-direction messages ("double texting") and what they say about
//! investment.

use serde::{Deserialize, Serialize};

use super::scoring::{compare, linear, percent, share, Balance, Pair};
use super::{AnalysisResult, Analyzer, Conversation};
use crate::types::Direction;

const SHARE_WEIGHT: f64 = 0.6;
const STREAK_WEIGHT: f64 = 0.4;
const INVESTMENT_BALANCED_WITHIN: f64 = 15.0;

/// Streaks of one person. A streak is two or more consecutive messages before the other
/// side replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakCounts {
    pub total: usize,
    pub double: usize,
    pub triple: usize,
    pub quad_plus: usize,
    pub longest: usize,
    /// Messages sent beyond the first of each streak
    pub extra_messages: usize,
}

impl StreakCounts {
    fn record(&mut self, len: usize) {
        if len < 2 {
            return;
        }
        self.total += 1;
        match len {
            2 => self.double += 1,
            3 => self.triple += 1,
            _ => self.quad_plus += 1,
        }
        self.longest = self.longest.max(len);
        self.extra_messages += len - 1;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoubleTextResult {
    /// Percent of all messages that extend a streak
    pub score: f64,
    pub streaks: Pair<StreakCounts>,
    pub longest_streak: usize,
    /// Percent of each person's messages that extend a streak
    pub double_text_rate: Pair<f64>,
    /// Blend of message share and streak rate
    pub investment: Pair<f64>,
    pub investment_gap: f64,
    pub more_invested: Balance,
    pub summary: String,
}

/// Run lengths per direction over the full message sequence.
pub fn streaks(conv: &Conversation<'_>) -> Pair<StreakCounts> {
    let mut counts = Pair::new(StreakCounts::default(), StreakCounts::default());
    let mut current: Option<(Direction, usize)> = None;

    for message in conv.messages() {
        current = match current {
            Some((direction, len)) if direction == message.direction => Some((direction, len + 1)),
            Some((direction, len)) => {
                counts_for(&mut counts, direction).record(len);
                Some((message.direction, 1))
            }
            None => Some((message.direction, 1)),
        };
    }
    if let Some((direction, len)) = current {
        counts_for(&mut counts, direction).record(len);
    }
    counts
}

fn counts_for(counts: &mut Pair<StreakCounts>, direction: Direction) -> &mut StreakCounts {
    match direction {
        Direction::Sent => &mut counts.you,
        Direction::Received => &mut counts.them,
    }
}

pub struct DoubleTextAnalyzer;

impl Analyzer for DoubleTextAnalyzer {
    fn id(&self) -> &'static str {
        "doubleText"
    }

    fn label(&self) -> &'static str {
        "Double Texting"
    }

    fn analyze(&self, conv: &Conversation<'_>) -> AnalysisResult {
        let streaks = streaks(conv);
        let double_text_rate = Pair::from_fn(|d| {
            percent(streaks.get(d).extra_messages as f64, conv.count(d) as f64)
        });
        let message_share = share(
            conv.count(Direction::Sent) as f64,
            conv.count(Direction::Received) as f64,
        );
        let investment = Pair::from_fn(|d| {
            linear(
                0.0,
                &[
                    (SHARE_WEIGHT, *message_share.get(d)),
                    (STREAK_WEIGHT, *double_text_rate.get(d)),
                ],
            )
        });
        let more_invested = compare(&investment, INVESTMENT_BALANCED_WITHIN);
        let longest_streak = streaks.you.longest.max(streaks.them.longest);
        let extra = (streaks.you.extra_messages + streaks.them.extra_messages) as f64;

        let summary = if streaks.you.total + streaks.them.total == 0 {
            "Messages alternate cleanly; nobody double texts.".to_string()
        } else {
            format!(
                "You double texted {} time(s) and they did {} time(s); the longest run was {} messages. {}",
                streaks.you.total,
                streaks.them.total,
                longest_streak,
                match more_invested {
                    Balance::Balanced => "Investment looks even.".to_string(),
                    Balance::You => "You appear more invested.".to_string(),
                    Balance::Them => "They appear more invested.".to_string(),
                }
            )
        };

        AnalysisResult::DoubleText(DoubleTextResult {
            score: linear(0.0, &[(100.0, extra / conv.len().max(1) as f64)]),
            streaks,
            longest_streak,
            double_text_rate,
            investment,
            investment_gap: investment.gap(),
            more_invested,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::test_support::{messages_of, run};
    use crate::types::Direction::{Received, Sent};

    fn double_text(lines: &[(Direction, &str)]) -> DoubleTextResult {
        match run(&DoubleTextAnalyzer, &messages_of(lines)) {
            AnalysisResult::DoubleText(r) => r,
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn four_in_a_row_then_reply() {
        let r = double_text(&[
            (Sent, "hey"),
            (Sent, "you there?"),
            (Sent, "hello??"),
            (Sent, "ok call me"),
            (Received, "sorry was asleep"),
        ]);
        assert_eq!(r.streaks.you.total, 1);
        assert_eq!(r.streaks.you.quad_plus, 1);
        assert_eq!(r.streaks.you.longest, 4);
        assert_eq!(r.streaks.them.total, 0);
        assert_eq!(r.longest_streak, 4);
        assert_eq!(r.more_invested, Balance::You);
    }

    #[test]
    fn alternating_has_no_streaks() {
        let r = double_text(&[(Sent, "a"), (Received, "b"), (Sent, "c"), (Received, "d")]);
        assert_eq!(r.streaks.you, StreakCounts::default());
        assert_eq!(r.longest_streak, 0);
        assert_eq!(r.score, 0.0);
        assert_eq!(r.more_invested, Balance::Balanced);
    }

    #[test]
    fn trailing_streak_is_counted() {
        let r = double_text(&[(Sent, "a"), (Received, "b"), (Received, "c"), (Received, "d")]);
        assert_eq!(r.streaks.them.triple, 1);
        assert_eq!(r.streaks.them.extra_messages, 2);
    }
}
