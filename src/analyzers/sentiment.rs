//! Emotional tone per person from the tiered positive and negative lexicons.

use serde::{Deserialize, Serialize};

use super::scoring::{compare, linear, percent, Balance, Pair};
use super::{AnalysisResult, Analyzer, Conversation};

pub const POSITIVE: &[&str] = &[
    "sentiment.positive.strong",
    "sentiment.positive.moderate",
    "sentiment.positive.weak",
];
pub const NEGATIVE: &[&str] = &[
    "sentiment.negative.strong",
    "sentiment.negative.moderate",
    "sentiment.negative.weak",
];

/// Score with no lexicon hits at all.
const BASE: f64 = 50.0;
/// Points per weighted hit per message.
const PER_HIT: f64 = 15.0;
const POSITIVE_AT: f64 = 60.0;
const NEGATIVE_AT: f64 = 40.0;
const BALANCED_WITHIN: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Neutral,
    Negative,
}

impl Polarity {
    pub fn from_score(score: f64) -> Self {
        if score >= POSITIVE_AT {
            Polarity::Positive
        } else if score <= NEGATIVE_AT {
            Polarity::Negative
        } else {
            Polarity::Neutral
        }
    }
}

impl std::fmt::Display for Polarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Polarity::Positive => write!(f, "positive"),
            Polarity::Neutral => write!(f, "neutral"),
            Polarity::Negative => write!(f, "negative"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentResult {
    /// Mean of both sides
    pub score: f64,
    pub scores: Pair<f64>,
    pub polarity: Pair<Polarity>,
    pub overall: Polarity,
    pub positive_hits: Pair<u32>,
    pub negative_hits: Pair<u32>,
    /// Percent of each person's messages that net out positive
    pub positive_message_share: Pair<f64>,
    pub more_positive: Balance,
    pub summary: String,
}

pub struct SentimentAnalyzer;

impl Analyzer for SentimentAnalyzer {
    fn id(&self) -> &'static str {
        "sentiment"
    }

    fn label(&self) -> &'static str {
        "Sentiment Analysis"
    }

    fn analyze(&self, conv: &Conversation<'_>) -> AnalysisResult {
        let scores = Pair::from_fn(|d| {
            linear(
                BASE,
                &[(PER_HIT, conv.rate(d, POSITIVE)), (-PER_HIT, conv.rate(d, NEGATIVE))],
            )
        });
        let positive_message_share = Pair::from_fn(|d| {
            let net_positive = conv
                .by(d)
                .filter(|(i, _)| conv.message_weighted(*i, POSITIVE) > conv.message_weighted(*i, NEGATIVE))
                .count();
            percent(net_positive as f64, conv.count(d) as f64)
        });

        let score = scores.mean();
        let polarity = scores.map(|s| Polarity::from_score(*s));
        let more_positive = compare(&scores, BALANCED_WITHIN);

        let summary = format!(
            "Your messages read {} ({:.0}/100) and theirs read {} ({:.0}/100); {}.",
            polarity.you,
            scores.you,
            polarity.them,
            scores.them,
            match more_positive {
                Balance::Balanced => "the emotional tone is evenly matched".to_string(),
                side => format!("{} bring noticeably more positivity", side.who()),
            }
        );

        AnalysisResult::Sentiment(SentimentResult {
            score,
            scores,
            polarity,
            overall: Polarity::from_score(score),
            positive_hits: Pair::from_fn(|d| conv.hits(d, POSITIVE)),
            negative_hits: Pair::from_fn(|d| conv.hits(d, NEGATIVE)),
            positive_message_share,
            more_positive,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::test_support::{messages_of, run};
    use crate::types::Direction::{Received, Sent};

    fn sentiment(lines: &[(crate::types::Direction, &str)]) -> SentimentResult {
        match run(&SentimentAnalyzer, &messages_of(lines)) {
            AnalysisResult::Sentiment(r) => r,
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn affectionate_versus_dismissive() {
        let r = sentiment(&[
            (Sent, "i love you"),
            (Received, "stop texting so much"),
            (Sent, "thank you for today"),
            (Received, "whatever"),
        ]);
        assert_eq!(r.polarity.you, Polarity::Positive);
        assert_eq!(r.polarity.them, Polarity::Negative);
        assert_eq!(r.more_positive, Balance::You);
        assert_eq!(r.positive_message_share.you, 100.0);
    }

    #[test]
    fn silent_side_is_neutral() {
        let r = sentiment(&[(Sent, "hello"), (Sent, "anyone there")]);
        assert_eq!(r.scores.them, 50.0);
        assert_eq!(r.polarity.them, Polarity::Neutral);
    }

    #[test]
    fn plain_messages_are_balanced() {
        let r = sentiment(&[(Sent, "on my way"), (Received, "see you at six")]);
        assert_eq!(r.more_positive, Balance::Balanced);
        assert_eq!(r.score, 50.0);
    }
}
