//! Structural engagement (length, questions, emoji, exclamations) and lexical interest.

use serde::{Deserialize, Serialize};

use super::scoring::{
    clamp_score, compare, contains_emoji, linear, percent, share, Balance, Level, Pair,
};
use super::{AnalysisResult, Analyzer, Conversation};

const ENGAGEMENT_BASE: f64 = 20.0;
/// Average length (chars) at which the length component saturates.
const LENGTH_SATURATION: f64 = 80.0;
const LENGTH_POINTS: f64 = 35.0;
const QUESTION_POINTS: f64 = 25.0;
const EMOJI_POINTS: f64 = 10.0;
const EXCLAMATION_POINTS: f64 = 10.0;
const ENGAGEMENT_BALANCED_WITHIN: f64 = 15.0;
const ENGAGEMENT_MODERATE_AT: f64 = 35.0;
const ENGAGEMENT_HIGH_AT: f64 = 65.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementResult {
    /// Mean of both sides
    pub score: f64,
    pub scores: Pair<f64>,
    pub level: Level,
    /// Percent of messages containing a question mark
    pub question_rate: Pair<f64>,
    pub emoji_rate: Pair<f64>,
    pub exclamation_rate: Pair<f64>,
    pub average_length: Pair<f64>,
    /// Percent of all messages sent by each side
    pub message_share: Pair<f64>,
    pub more_engaged: Balance,
    pub summary: String,
}

pub struct EngagementAnalyzer;

impl Analyzer for EngagementAnalyzer {
    fn id(&self) -> &'static str {
        "engagement"
    }

    fn label(&self) -> &'static str {
        "Engagement Analysis"
    }

    fn analyze(&self, conv: &Conversation<'_>) -> AnalysisResult {
        let question = Pair::from_fn(|d| conv.fraction(d, |m| m.content.contains('?')));
        let emoji = Pair::from_fn(|d| conv.fraction(d, |m| contains_emoji(&m.content)));
        let exclamation = Pair::from_fn(|d| conv.fraction(d, |m| m.content.contains('!')));
        let average_length = Pair::from_fn(|d| conv.average_length(d));

        let scores = Pair::from_fn(|d| {
            if conv.count(d) == 0 {
                return 0.0;
            }
            let length = (average_length.get(d) / LENGTH_SATURATION).min(1.0);
            linear(
                ENGAGEMENT_BASE,
                &[
                    (LENGTH_POINTS, length),
                    (QUESTION_POINTS, *question.get(d)),
                    (EMOJI_POINTS, *emoji.get(d)),
                    (EXCLAMATION_POINTS, *exclamation.get(d)),
                ],
            )
        });

        let score = scores.mean();
        let level = Level::from_score(score, ENGAGEMENT_MODERATE_AT, ENGAGEMENT_HIGH_AT);
        let more_engaged = compare(&scores, ENGAGEMENT_BALANCED_WITHIN);
        let summary = format!(
            "Engagement is {} ({:.0}/100); {}.",
            level,
            score,
            match more_engaged {
                Balance::Balanced => "effort is evenly shared".to_string(),
                side => format!("{} put in visibly more effort per message", side.who()),
            }
        );

        AnalysisResult::Engagement(EngagementResult {
            score,
            scores,
            level,
            question_rate: question.map(|f| clamp_score(f * 100.0)),
            emoji_rate: emoji.map(|f| clamp_score(f * 100.0)),
            exclamation_rate: exclamation.map(|f| clamp_score(f * 100.0)),
            average_length: average_length.map(|l| super::scoring::round1(*l)),
            message_share: share(
                conv.count(crate::types::Direction::Sent) as f64,
                conv.count(crate::types::Direction::Received) as f64,
            ),
            more_engaged,
            summary,
        })
    }
}

const HIGH_INTEREST: &[&str] = &["interest.high"];
const LOW_INTEREST: &[&str] = &["interest.low"];

const INTEREST_BASE: f64 = 40.0;
const INTEREST_PER_HIT: f64 = 15.0;
const INTEREST_QUESTION_POINTS: f64 = 30.0;
const INTEREST_LENGTH_POINTS: f64 = 15.0;
const INTEREST_LENGTH_SATURATION: f64 = 60.0;
const INTEREST_BALANCED_WITHIN: f64 = 15.0;
const INTEREST_MODERATE_AT: f64 = 30.0;
const INTEREST_HIGH_AT: f64 = 60.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestResult {
    pub score: f64,
    pub scores: Pair<f64>,
    pub levels: Pair<Level>,
    pub high_signals: Pair<u32>,
    pub low_signals: Pair<u32>,
    pub question_rate: Pair<f64>,
    pub more_interested: Balance,
    pub summary: String,
}

pub struct InterestAnalyzer;

impl Analyzer for InterestAnalyzer {
    fn id(&self) -> &'static str {
        "interest"
    }

    fn label(&self) -> &'static str {
        "Interest Level"
    }

    fn analyze(&self, conv: &Conversation<'_>) -> AnalysisResult {
        let question = Pair::from_fn(|d| conv.fraction(d, |m| m.content.contains('?')));
        let scores = Pair::from_fn(|d| {
            if conv.count(d) == 0 {
                return INTEREST_BASE;
            }
            let length = (conv.average_length(d) / INTEREST_LENGTH_SATURATION).min(1.0);
            linear(
                INTEREST_BASE,
                &[
                    (INTEREST_PER_HIT, conv.rate(d, HIGH_INTEREST)),
                    (-INTEREST_PER_HIT, conv.rate(d, LOW_INTEREST)),
                    (INTEREST_QUESTION_POINTS, *question.get(d)),
                    (INTEREST_LENGTH_POINTS, length),
                ],
            )
        });
        let levels = scores.map(|s| Level::from_score(*s, INTEREST_MODERATE_AT, INTEREST_HIGH_AT));
        let more_interested = compare(&scores, INTEREST_BALANCED_WITHIN);

        let summary = match more_interested {
            Balance::Balanced => format!(
                "Interest looks mutual: you {} and them {}.",
                levels.you, levels.them
            ),
            side => format!(
                "Interest is uneven: {} show more curiosity (you {:.0}, them {:.0}).",
                side.who(),
                scores.you,
                scores.them
            ),
        };

        AnalysisResult::Interest(InterestResult {
            score: scores.mean(),
            scores,
            levels,
            high_signals: Pair::from_fn(|d| conv.hits(d, HIGH_INTEREST)),
            low_signals: Pair::from_fn(|d| conv.hits(d, LOW_INTEREST)),
            question_rate: question.map(|f| percent(*f, 1.0)),
            more_interested,
            summary,
        })
    }
}
