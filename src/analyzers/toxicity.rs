//! Insults, hostility and gaslighting, with severe phrases as an immediate floor.

use serde::{Deserialize, Serialize};

use super::scoring::{clamp_score, linear, Pair};
use super::{AnalysisResult, Analyzer, Conversation};

const SEVERE: &[&str] = &["toxicity.severe"];
const INSULT: &[&str] = &["toxicity.insult"];
const HOSTILE: &[&str] = &["toxicity.hostile"];
const GASLIGHTING: &[&str] = &["toxicity.gaslighting"];
const WEIGHTED: &[&str] = &["toxicity.insult", "toxicity.hostile", "toxicity.gaslighting"];

/// Points per weighted hit per message.
const PER_HIT: f64 = 12.0;
/// Any severe phrase puts a person at least here.
const SEVERE_FLOOR: f64 = 75.0;
/// Each further severe phrase adds this much on top of the floor.
const SEVERE_STEP: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToxicityLevel {
    None,
    Low,
    Moderate,
    High,
    Severe,
}

impl ToxicityLevel {
    /// Cut points: 10, 25, 50, 75.
    pub fn from_score(score: f64) -> Self {
        if score < 10.0 {
            ToxicityLevel::None
        } else if score < 25.0 {
            ToxicityLevel::Low
        } else if score < 50.0 {
            ToxicityLevel::Moderate
        } else if score < 75.0 {
            ToxicityLevel::High
        } else {
            ToxicityLevel::Severe
        }
    }
}

impl std::fmt::Display for ToxicityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ToxicityLevel::None => "none",
            ToxicityLevel::Low => "low",
            ToxicityLevel::Moderate => "moderate",
            ToxicityLevel::High => "high",
            ToxicityLevel::Severe => "severe",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToxicityResult {
    /// The more toxic side's score
    pub score: f64,
    pub scores: Pair<f64>,
    pub level: ToxicityLevel,
    pub levels: Pair<ToxicityLevel>,
    pub severe: Pair<u32>,
    pub insults: Pair<u32>,
    pub hostile: Pair<u32>,
    pub gaslighting: Pair<u32>,
    pub flagged_messages: Pair<usize>,
    pub summary: String,
}

pub struct ToxicityAnalyzer;

impl Analyzer for ToxicityAnalyzer {
    fn id(&self) -> &'static str {
        "toxicity"
    }

    fn label(&self) -> &'static str {
        "Toxicity Detection"
    }

    fn analyze(&self, conv: &Conversation<'_>) -> AnalysisResult {
        let severe = Pair::from_fn(|d| conv.hits(d, SEVERE));
        let scores = Pair::from_fn(|d| {
            let base = linear(0.0, &[(PER_HIT, conv.rate(d, WEIGHTED))]);
            match *severe.get(d) {
                0 => base,
                n => clamp_score(base.max(SEVERE_FLOOR + SEVERE_STEP * (n - 1) as f64)),
            }
        });
        let score = scores.max();
        let level = ToxicityLevel::from_score(score);
        let levels = scores.map(|s| ToxicityLevel::from_score(*s));
        let gaslighting = Pair::from_fn(|d| conv.hits(d, GASLIGHTING));

        let mut summary = match level {
            ToxicityLevel::None => "No toxic language detected.".to_string(),
            _ => format!(
                "Toxicity is {} overall (you {:.0}, them {:.0}).",
                level, scores.you, scores.them
            ),
        };
        if severe.you + severe.them > 0 {
            summary.push_str(" Severe phrases were found and need attention.");
        }
        if gaslighting.you + gaslighting.them > 0 {
            summary.push_str(" Some messages deny or rewrite the other person's experience.");
        }

        AnalysisResult::Toxicity(ToxicityResult {
            score,
            scores,
            level,
            levels,
            severe,
            insults: Pair::from_fn(|d| conv.hits(d, INSULT)),
            hostile: Pair::from_fn(|d| conv.hits(d, HOSTILE)),
            gaslighting,
            flagged_messages: Pair::from_fn(|d| conv.matching(d, &[SEVERE, WEIGHTED].concat())),
            summary,
        })
    }
}
