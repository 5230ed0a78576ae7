//! Bonding signals: trust, shared plans, humor, affection and a growth mindset.

use serde::{Deserialize, Serialize};

use super::scoring::{compare, linear, Balance, Level, Pair};
use super::{AnalysisResult, Analyzer, Conversation};

const TRUST_BASE: f64 = 60.0;
const TRUST_PER_HIT: f64 = 20.0;
const DISTRUST_PER_HIT: f64 = 25.0;
const ACCUSATION_PER_HIT: f64 = 10.0;
const TRUST_MODERATE_AT: f64 = 40.0;
const TRUST_HIGH_AT: f64 = 70.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustResult {
    pub score: f64,
    pub scores: Pair<f64>,
    pub positive: Pair<u32>,
    pub negative: Pair<u32>,
    pub level: Level,
    pub summary: String,
}

pub struct TrustAnalyzer;

impl Analyzer for TrustAnalyzer {
    fn id(&self) -> &'static str {
        "trust"
    }

    fn label(&self) -> &'static str {
        "Trust Indicators"
    }

    fn analyze(&self, conv: &Conversation<'_>) -> AnalysisResult {
        let scores = Pair::from_fn(|d| {
            linear(
                TRUST_BASE,
                &[
                    (TRUST_PER_HIT, conv.rate(d, &["trust.positive"])),
                    (-DISTRUST_PER_HIT, conv.rate(d, &["trust.negative"])),
                    (-ACCUSATION_PER_HIT, conv.rate(d, &["jealousy.accusation"])),
                ],
            )
        });
        let score = scores.mean();
        let level = Level::from_score(score, TRUST_MODERATE_AT, TRUST_HIGH_AT);
        let negative = Pair::from_fn(|d| conv.hits(d, &["trust.negative"]));
        let summary = if negative.you + negative.them > 0 {
            format!("Trust is {}; some messages question honesty.", level)
        } else {
            format!("Trust is {} with no signs of suspicion.", level)
        };

        AnalysisResult::Trust(TrustResult {
            score,
            scores,
            positive: Pair::from_fn(|d| conv.hits(d, &["trust.positive"])),
            negative,
            level,
            summary,
        })
    }
}

const FUTURE: &[&str] = &["future.plans", "future.commitment"];
const FUTURE_PER_HIT: f64 = 40.0;
const PLANNER_BALANCED_WITHIN: f64 = 15.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuturePlanningResult {
    pub score: f64,
    pub scores: Pair<f64>,
    pub plans: Pair<u32>,
    pub commitments: Pair<u32>,
    pub planner: Balance,
    pub summary: String,
}

pub struct FuturePlanningAnalyzer;

impl Analyzer for FuturePlanningAnalyzer {
    fn id(&self) -> &'static str {
        "futurePlanning"
    }

    fn label(&self) -> &'static str {
        "Future Planning"
    }

    fn analyze(&self, conv: &Conversation<'_>) -> AnalysisResult {
        let scores = Pair::from_fn(|d| linear(0.0, &[(FUTURE_PER_HIT, conv.rate(d, FUTURE))]));
        let plans = Pair::from_fn(|d| conv.hits(d, &["future.plans"]));
        let commitments = Pair::from_fn(|d| conv.hits(d, &["future.commitment"]));
        let planner = compare(&scores, PLANNER_BALANCED_WITHIN);
        let summary = match (plans.you + plans.them + commitments.you + commitments.them, planner) {
            (0, _) => "The conversation stays in the present; no plans come up.".to_string(),
            (_, Balance::Balanced) => "You both talk about what's ahead together.".to_string(),
            (_, side) => format!("{} bring up future plans more often.", match side {
                Balance::You => "You",
                _ => "They",
            }),
        };

        AnalysisResult::FuturePlanning(FuturePlanningResult {
            score: scores.mean(),
            scores,
            plans,
            commitments,
            planner,
            summary,
        })
    }
}

const HUMOR: &[&str] = &["humor.laughter", "humor.playful"];
const HUMOR_PER_HIT: f64 = 60.0;
/// Compatibility when neither side jokes at all.
const NO_HUMOR_COMPATIBILITY: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumorResult {
    /// Humor compatibility: matched playfulness scores high
    pub score: f64,
    /// How much each side jokes and laughs
    pub scores: Pair<f64>,
    pub laughter: Pair<u32>,
    pub playful: Pair<u32>,
    pub shared: bool,
    pub summary: String,
}

pub struct HumorAnalyzer;

impl Analyzer for HumorAnalyzer {
    fn id(&self) -> &'static str {
        "humor"
    }

    fn label(&self) -> &'static str {
        "Humor Compatibility"
    }

    fn analyze(&self, conv: &Conversation<'_>) -> AnalysisResult {
        let scores = Pair::from_fn(|d| linear(0.0, &[(HUMOR_PER_HIT, conv.rate(d, HUMOR))]));
        let shared = scores.you > 0.0 && scores.them > 0.0;
        let score = if scores.you == 0.0 && scores.them == 0.0 {
            NO_HUMOR_COMPATIBILITY
        } else {
            scores.balance()
        };
        let summary = if shared {
            format!("You both share a sense of humor (compatibility {:.0}/100).", score)
        } else if scores.you + scores.them > 0.0 {
            "Humor mostly comes from one side.".to_string()
        } else {
            "The conversation is mostly serious.".to_string()
        };

        AnalysisResult::Humor(HumorResult {
            score,
            scores,
            laughter: Pair::from_fn(|d| conv.hits(d, &["humor.laughter"])),
            playful: Pair::from_fn(|d| conv.hits(d, &["humor.playful"])),
            shared,
            summary,
        })
    }
}

const AFFECTION: &[&str] = &["love.words", "love.touch"];
const AFFECTION_PER_HIT: f64 = 60.0;
const AFFECTION_BALANCED_WITHIN: f64 = 15.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectionResult {
    pub score: f64,
    pub scores: Pair<f64>,
    pub expressions: Pair<u32>,
    /// 100 when both express affection equally
    pub reciprocity: f64,
    pub more_affectionate: Balance,
    pub summary: String,
}

pub struct AffectionAnalyzer;

impl Analyzer for AffectionAnalyzer {
    fn id(&self) -> &'static str {
        "affection"
    }

    fn label(&self) -> &'static str {
        "Affection Expression"
    }

    fn analyze(&self, conv: &Conversation<'_>) -> AnalysisResult {
        let scores = Pair::from_fn(|d| linear(0.0, &[(AFFECTION_PER_HIT, conv.rate(d, AFFECTION))]));
        let more_affectionate = compare(&scores, AFFECTION_BALANCED_WITHIN);
        let summary = match more_affectionate {
            Balance::Balanced if scores.max() == 0.0 => "Little open affection is expressed.".to_string(),
            Balance::Balanced => "Affection is expressed in equal measure.".to_string(),
            side => format!("{} express affection more openly (you {:.0}, them {:.0}).", match side {
                Balance::You => "You",
                _ => "They",
            }, scores.you, scores.them),
        };

        AnalysisResult::Affection(AffectionResult {
            score: scores.mean(),
            scores,
            expressions: Pair::from_fn(|d| conv.hits(d, AFFECTION)),
            reciprocity: scores.balance(),
            more_affectionate,
            summary,
        })
    }
}

const GROWTH_BASE: f64 = 50.0;
const LEARNING_PER_HIT: f64 = 20.0;
const FIXED_PER_HIT: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mindset {
    Growth,
    Neutral,
    Fixed,
}

impl Mindset {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Growth => "growth",
            Self::Neutral => "neutral",
            Self::Fixed => "fixed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthMindsetResult {
    pub score: f64,
    pub scores: Pair<f64>,
    pub learning: Pair<u32>,
    pub fixed: Pair<u32>,
    pub mindset: Pair<Mindset>,
    pub summary: String,
}

pub struct GrowthMindsetAnalyzer;

impl Analyzer for GrowthMindsetAnalyzer {
    fn id(&self) -> &'static str {
        "growthMindset"
    }

    fn label(&self) -> &'static str {
        "Growth Mindset"
    }

    fn analyze(&self, conv: &Conversation<'_>) -> AnalysisResult {
        let scores = Pair::from_fn(|d| {
            linear(
                GROWTH_BASE,
                &[
                    (LEARNING_PER_HIT, conv.rate(d, &["growth.learning"])),
                    (-FIXED_PER_HIT, conv.rate(d, &["growth.fixed"])),
                ],
            )
        });
        let mindset = scores.map(|s| {
            if *s >= 60.0 {
                Mindset::Growth
            } else if *s <= 40.0 {
                Mindset::Fixed
            } else {
                Mindset::Neutral
            }
        });
        let summary = format!(
            "Your outlook reads as {} and theirs as {}.",
            mindset.you.as_str(),
            mindset.them.as_str()
        );

        AnalysisResult::GrowthMindset(GrowthMindsetResult {
            score: scores.mean(),
            scores,
            learning: Pair::from_fn(|d| conv.hits(d, &["growth.learning"])),
            fixed: Pair::from_fn(|d| conv.hits(d, &["growth.fixed"])),
            mindset,
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
    fn suspicion_lowers_trust() {
        let messages = messages_of(&[(Sent, "i trust you"), (Received, "are you lying? prove it")]);
        let r = match run(&TrustAnalyzer, &messages) {
            AnalysisResult::Trust(r) => r,
            other => panic!("unexpected result {:?}", other),
        };
        assert_eq!(r.scores.you, 100.0);
        assert_eq!(r.negative.them, 2);
        assert_eq!(r.scores.them, 0.0);
    }

    #[test]
    fn shared_plans() {
        let messages = messages_of(&[
            (Sent, "we should plan a trip next month"),
            (Received, "yes! let's plan it this weekend"),
        ]);
        let r = match run(&FuturePlanningAnalyzer, &messages) {
            AnalysisResult::FuturePlanning(r) => r,
            other => panic!("unexpected result {:?}", other),
        };
        assert_eq!(r.plans.you, 2);
        assert_eq!(r.plans.them, 2);
        assert_eq!(r.planner, Balance::Balanced);
    }

    #[test]
    fn one_sided_humor() {
        let messages = messages_of(&[(Sent, "haha you're funny 😂"), (Received, "ok")]);
        let r = match run(&HumorAnalyzer, &messages) {
            AnalysisResult::Humor(r) => r,
            other => panic!("unexpected result {:?}", other),
        };
        assert!(!r.shared);
        assert_eq!(r.score, 0.0);
        assert_eq!(r.laughter.you, 2);
    }

    #[test]
    fn serious_conversation_is_neutral_humor() {
        let messages = messages_of(&[(Sent, "the bill is due"), (Received, "paid it")]);
        let r = match run(&HumorAnalyzer, &messages) {
            AnalysisResult::Humor(r) => r,
            other => panic!("unexpected result {:?}", other),
        };
        assert_eq!(r.score, 50.0);
    }

    #[test]
    fn affection_reciprocity() {
        let messages = messages_of(&[(Sent, "love you, hug"), (Received, "love you too")]);
        let r = match run(&AffectionAnalyzer, &messages) {
            AnalysisResult::Affection(r) => r,
            other => panic!("unexpected result {:?}", other),
        };
        assert_eq!(r.expressions, Pair::new(2, 1));
        assert_eq!(r.scores, Pair::new(100.0, 60.0));
        assert_eq!(r.more_affectionate, Balance::You);
    }

    fn affection(lines: &[(crate::types::Direction, &str)]) -> AffectionResult {
        match run(&AffectionAnalyzer, &messages_of(lines)) {
            AnalysisResult::Affection(r) => r,
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn no_affection_on_either_side_is_little() {
        let r = affection(&[(Sent, "the bill is due"), (Received, "paid it")]);
        assert_eq!(r.scores.max(), 0.0);
        assert_eq!(r.summary, "Little open affection is expressed.");
    }

    #[test]
    fn slight_affection_from_one_side_is_not_called_little() {
        let r = affection(&[
            (Sent, "the bill is due"),
            (Received, "paid it"),
            (Sent, "ok"),
            (Received, "thank you"),
            (Sent, "sure"),
            (Received, "done"),
            (Sent, "cool"),
            (Received, "ok"),
            (Sent, "bye"),
            (Received, "bye"),
        ]);
        assert_eq!(r.scores, Pair::new(0.0, 12.0));
        assert_eq!(r.more_affectionate, Balance::Balanced);
        assert_eq!(r.summary, "Affection is expressed in equal measure.");
    }

    #[test]
    fn fixed_versus_growth_mindset() {
        let messages = messages_of(&[
            (Sent, "i'll work on it, i want to grow"),
            (Received, "that's just how i am"),
        ]);
        let r = match run(&GrowthMindsetAnalyzer, &messages) {
            AnalysisResult::GrowthMindset(r) => r,
            other => panic!("unexpected result {:?}", other),
        };
        assert_eq!(r.mindset, Pair::new(Mindset::Growth, Mindset::Fixed));
        assert_eq!(r.summary, "Your outlook reads as growth and theirs as fixed.");
    }
}
