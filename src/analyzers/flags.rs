//! Red flags (manipulation, isolation, control, disrespect, gaslighting) against green
//! flags (respect, support, growth, trust, affection).

use serde::{Deserialize, Serialize};

use super::scoring::{clamp_score, linear, pairing, top_two, Level, Pair};
use super::{AnalysisResult, Analyzer, Conversation};
use crate::types::Direction;

const RED: [(&str, &str); 5] = [
    ("manipulation", "flags.manipulation"),
    ("isolation", "flags.isolation"),
    ("control", "power.controlling"),
    ("disrespect", "toxicity.insult"),
    ("gaslighting", "toxicity.gaslighting"),
];
const GREEN: [(&str, &str); 5] = [
    ("respect", "boundary.respect"),
    ("support", "support.emotional"),
    ("growth", "growth.learning"),
    ("trust", "trust.positive"),
    ("affection", "love.words"),
];

const RED_PER_HIT: f64 = 12.0;
const GREEN_PER_HIT: f64 = 4.0;
const RISK_MODERATE_AT: f64 = 25.0;
const RISK_HIGH_AT: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagCounts {
    /// Hits per flag, in declared order
    pub by_kind: Vec<(String, u32)>,
    pub total: u32,
    /// Most frequent flag; earlier kinds win ties
    pub primary: Option<String>,
    pub secondary: Option<String>,
}

fn count(conv: &Conversation<'_>, direction: Direction, kinds: &[(&str, &str)]) -> FlagCounts {
    let by_kind: Vec<(String, u32)> = kinds
        .iter()
        .map(|(name, cat)| (name.to_string(), conv.hits(direction, &[*cat])))
        .collect();
    let weights: Vec<(&str, f64)> = by_kind.iter().map(|(name, n)| (name.as_str(), *n as f64)).collect();
    let (primary, secondary) = top_two(&weights);
    FlagCounts {
        total: by_kind.iter().map(|(_, n)| n).sum(),
        primary: primary.map(str::to_string),
        secondary: secondary.map(str::to_string),
        by_kind,
    }
}

/// Where one person's flags land overall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagStance {
    /// Green flags and no red ones
    Green,
    /// Red flags, but at least as many green ones
    Mixed,
    /// More red flags than green
    Red,
    /// No flags either way
    Neutral,
}

impl FlagStance {
    fn of(red: &FlagCounts, green: &FlagCounts) -> Self {
        match (red.total, green.total) {
            (0, 0) => FlagStance::Neutral,
            (0, _) => FlagStance::Green,
            (r, g) if r > g => FlagStance::Red,
            _ => FlagStance::Mixed,
        }
    }
}

/// Risk floor for each pair of stances. A single red side stays under the moderate cut;
/// red flags on both sides do not.
const PAIRING: &[((FlagStance, FlagStance), f64)] = {
    use FlagStance::*;
    &[
        ((Green, Green), 0.0),
        ((Green, Neutral), 0.0),
        ((Neutral, Neutral), 0.0),
        ((Mixed, Green), 10.0),
        ((Mixed, Neutral), 15.0),
        ((Red, Green), 20.0),
        ((Red, Neutral), 20.0),
        ((Mixed, Mixed), 30.0),
        ((Red, Mixed), 40.0),
        ((Red, Red), 70.0),
    ]
};

pub fn pairing_risk(a: FlagStance, b: FlagStance) -> f64 {
    pairing(PAIRING, a, b).unwrap_or(0.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagsResult {
    /// The higher of the riskier side's risk and the pairing risk
    pub score: f64,
    pub risk: Pair<f64>,
    pub pairing_risk: f64,
    pub level: Level,
    pub stance: Pair<FlagStance>,
    pub red: Pair<FlagCounts>,
    pub green: Pair<FlagCounts>,
    pub summary: String,
}

pub struct FlagsAnalyzer;

impl Analyzer for FlagsAnalyzer {
    fn id(&self) -> &'static str {
        "flags"
    }

    fn label(&self) -> &'static str {
        "Red & Green Flags"
    }

    fn analyze(&self, conv: &Conversation<'_>) -> AnalysisResult {
        let red_cats: Vec<&str> = RED.iter().map(|(_, c)| *c).collect();
        let green_cats: Vec<&str> = GREEN.iter().map(|(_, c)| *c).collect();

        let risk = Pair::from_fn(|d| {
            linear(
                0.0,
                &[
                    (RED_PER_HIT, conv.rate(d, &red_cats)),
                    (-GREEN_PER_HIT, conv.rate(d, &green_cats)),
                ],
            )
        });
        let red = Pair::from_fn(|d| count(conv, d, &RED));
        let green = Pair::from_fn(|d| count(conv, d, &GREEN));
        let stance = Pair::from_fn(|d| FlagStance::of(red.get(d), green.get(d)));
        let pairing_risk = pairing_risk(stance.you, stance.them);
        let score = clamp_score(risk.max().max(pairing_risk));
        let level = Level::from_score(score, RISK_MODERATE_AT, RISK_HIGH_AT);

        let red_total = red.you.total + red.them.total;
        let green_total = green.you.total + green.them.total;
        let summary = match (red_total, level) {
            (0, _) => format!("No red flags found and {} green flag(s).", green_total),
            (_, Level::Low) => format!(
                "{} minor red flag(s), outweighed by {} green flag(s).",
                red_total, green_total
            ),
            _ => format!(
                "Red flag risk is {}: {} red flag(s) against {} green flag(s).",
                level, red_total, green_total
            ),
        };

        AnalysisResult::Flags(FlagsResult {
            score,
            risk,
            pairing_risk,
            level,
            stance,
            red,
            green,
            summary,
        })
    }
}
