//! How disagreements are handled: conflict style, apologies, lingering resentment and
//! respect for boundaries.

use serde::{Deserialize, Serialize};

use super::scoring::{compare, linear, Balance, Level, Pair};
use super::{AnalysisResult, Analyzer, Conversation};
use crate::types::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConflictStyle {
    Constructive,
    Avoidant,
    Aggressive,
    PassiveAggressive,
    /// No conflict language at all
    None,
}

impl ConflictStyle {
    /// Classification order; earlier styles win ties.
    const RANKED: [(ConflictStyle, &'static str); 4] = [
        (ConflictStyle::Constructive, "conflict.constructive"),
        (ConflictStyle::Avoidant, "conflict.avoidant"),
        (ConflictStyle::Aggressive, "conflict.aggressive"),
        (ConflictStyle::PassiveAggressive, "conflict.passive_aggressive"),
    ];

    pub fn describe(self) -> &'static str {
        match self {
            ConflictStyle::Constructive => "constructive",
            ConflictStyle::Avoidant => "avoidant",
            ConflictStyle::Aggressive => "aggressive",
            ConflictStyle::PassiveAggressive => "passive-aggressive",
            ConflictStyle::None => "not visible",
        }
    }
}

const CONFLICT_BASE: f64 = 70.0;
const CONSTRUCTIVE_PER_HIT: f64 = 10.0;
const AVOIDANT_PER_HIT: f64 = 5.0;
const AGGRESSIVE_PER_HIT: f64 = 15.0;
const PASSIVE_PER_HIT: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictStyleResult {
    /// Mean conflict health; higher is healthier
    pub score: f64,
    pub scores: Pair<f64>,
    pub styles: Pair<ConflictStyle>,
    pub constructive: Pair<u32>,
    pub avoidant: Pair<u32>,
    pub aggressive: Pair<u32>,
    pub passive_aggressive: Pair<u32>,
    pub summary: String,
}

fn style(conv: &Conversation<'_>, direction: Direction) -> ConflictStyle {
    let mut best: Option<(ConflictStyle, f64)> = None;
    for (style, cat) in ConflictStyle::RANKED {
        let w = conv.weighted(direction, &[cat]);
        if w > 0.0 && best.map_or(true, |(_, b)| w > b) {
            best = Some((style, w));
        }
    }
    best.map(|(s, _)| s).unwrap_or(ConflictStyle::None)
}

pub struct ConflictStyleAnalyzer;

impl Analyzer for ConflictStyleAnalyzer {
    fn id(&self) -> &'static str {
        "conflictStyle"
    }

    fn label(&self) -> &'static str {
        "Conflict Style"
    }

    fn analyze(&self, conv: &Conversation<'_>) -> AnalysisResult {
        let scores = Pair::from_fn(|d| {
            linear(
                CONFLICT_BASE,
                &[
                    (CONSTRUCTIVE_PER_HIT, conv.rate(d, &["conflict.constructive"])),
                    (-AVOIDANT_PER_HIT, conv.rate(d, &["conflict.avoidant"])),
                    (-AGGRESSIVE_PER_HIT, conv.rate(d, &["conflict.aggressive"])),
                    (-PASSIVE_PER_HIT, conv.rate(d, &["conflict.passive_aggressive"])),
                ],
            )
        });
        let styles = Pair::from_fn(|d| style(conv, d));
        let summary = if styles.you == styles.them {
            format!("You both handle friction in a {} way.", styles.you.describe())
        } else {
            format!(
                "Your conflict style is {}; theirs is {}.",
                styles.you.describe(),
                styles.them.describe()
            )
        };

        AnalysisResult::ConflictStyle(ConflictStyleResult {
            score: scores.mean(),
            scores,
            styles,
            constructive: Pair::from_fn(|d| conv.hits(d, &["conflict.constructive"])),
            avoidant: Pair::from_fn(|d| conv.hits(d, &["conflict.avoidant"])),
            aggressive: Pair::from_fn(|d| conv.hits(d, &["conflict.aggressive"])),
            passive_aggressive: Pair::from_fn(|d| conv.hits(d, &["conflict.passive_aggressive"])),
            summary,
        })
    }
}

const APOLOGY_BASE: f64 = 50.0;
const SINCERE_SCALE: f64 = 150.0;
const CONDITIONAL_SCALE: f64 = 200.0;
/// More than this fraction of messages apologizing, with at least `EXCESSIVE_MIN`
/// apologies, reads as over-apologizing.
const EXCESSIVE_FRACTION: f64 = 0.3;
const EXCESSIVE_MIN: u32 = 3;
const APOLOGY_BALANCED_WITHIN: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApologyPattern {
    None,
    Accountable,
    Deflecting,
    Excessive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApologyResult {
    /// Mean accountability
    pub score: f64,
    pub scores: Pair<f64>,
    pub apologies: Pair<u32>,
    pub sincere: Pair<u32>,
    pub conditional: Pair<u32>,
    pub patterns: Pair<ApologyPattern>,
    pub more_accountable: Balance,
    pub summary: String,
}

pub struct ApologyAnalyzer;

impl Analyzer for ApologyAnalyzer {
    fn id(&self) -> &'static str {
        "apology"
    }

    fn label(&self) -> &'static str {
        "Apology Patterns"
    }

    fn analyze(&self, conv: &Conversation<'_>) -> AnalysisResult {
        let apologies = Pair::from_fn(|d| conv.hits(d, &["apology.any"]));
        let conditional = Pair::from_fn(|d| conv.hits(d, &["apology.conditional"]));
        let sincere = Pair::from_fn(|d| apologies.get(d).saturating_sub(*conditional.get(d)));

        let scores = Pair::from_fn(|d| {
            let n = conv.count(d).max(1) as f64;
            linear(
                APOLOGY_BASE,
                &[
                    (SINCERE_SCALE, *sincere.get(d) as f64 / n),
                    (-CONDITIONAL_SCALE, *conditional.get(d) as f64 / n),
                ],
            )
        });
        let patterns = Pair::from_fn(|d| {
            let total = *apologies.get(d);
            let fraction = total as f64 / conv.count(d).max(1) as f64;
            if total == 0 {
                ApologyPattern::None
            } else if total >= EXCESSIVE_MIN && fraction > EXCESSIVE_FRACTION {
                ApologyPattern::Excessive
            } else if conditional.get(d) >= sincere.get(d) {
                ApologyPattern::Deflecting
            } else {
                ApologyPattern::Accountable
            }
        });
        let more_accountable = compare(&scores, APOLOGY_BALANCED_WITHIN);

        let summary = match (apologies.you + apologies.them, more_accountable) {
            (0, _) => "No apologies were exchanged.".to_string(),
            (_, Balance::Balanced) => format!(
                "Apologies are balanced: you {} and them {}.",
                apologies.you, apologies.them
            ),
            (_, side) => format!(
                "{} take more ownership when things go wrong ({} vs {} apologies).",
                match side {
                    Balance::You => "You",
                    _ => "They",
                },
                apologies.you.max(apologies.them),
                apologies.you.min(apologies.them)
            ),
        };

        AnalysisResult::Apology(ApologyResult {
            score: scores.mean(),
            scores,
            apologies,
            sincere,
            conditional,
            patterns,
            more_accountable,
            summary,
        })
    }
}

const RESENTMENT: &[&str] = &["resentment.grievance", "resentment.scorekeeping"];
const RESENTMENT_PER_HIT: f64 = 20.0;
const RESENTMENT_MODERATE_AT: f64 = 25.0;
const RESENTMENT_HIGH_AT: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResentmentResult {
    /// The more resentful side's score
    pub score: f64,
    pub scores: Pair<f64>,
    pub grievances: Pair<u32>,
    pub scorekeeping: Pair<u32>,
    pub level: Level,
    pub summary: String,
}

pub struct ResentmentAnalyzer;

impl Analyzer for ResentmentAnalyzer {
    fn id(&self) -> &'static str {
        "resentment"
    }

    fn label(&self) -> &'static str {
        "Resentment"
    }

    fn analyze(&self, conv: &Conversation<'_>) -> AnalysisResult {
        let scores = Pair::from_fn(|d| linear(0.0, &[(RESENTMENT_PER_HIT, conv.rate(d, RESENTMENT))]));
        let score = scores.max();
        let level = Level::from_score(score, RESENTMENT_MODERATE_AT, RESENTMENT_HIGH_AT);
        let summary = match level {
            Level::Low => "Little sign of old grievances resurfacing.".to_string(),
            _ => format!(
                "Resentment is {}: past hurts and score-keeping come up repeatedly.",
                level
            ),
        };

        AnalysisResult::Resentment(ResentmentResult {
            score,
            scores,
            grievances: Pair::from_fn(|d| conv.hits(d, &["resentment.grievance"])),
            scorekeeping: Pair::from_fn(|d| conv.hits(d, &["resentment.scorekeeping"])),
            level,
            summary,
        })
    }
}

const BOUNDARY_BASE: f64 = 80.0;
const RESPECT_PER_HIT: f64 = 10.0;
const VIOLATION_PER_HIT: f64 = 30.0;
const CONTROL_PER_HIT: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryRespectResult {
    /// Mean respect; higher is more respectful
    pub score: f64,
    pub scores: Pair<f64>,
    pub boundaries_set: Pair<u32>,
    pub respectful: Pair<u32>,
    pub violations: Pair<u32>,
    pub summary: String,
}

pub struct BoundaryRespectAnalyzer;

impl Analyzer for BoundaryRespectAnalyzer {
    fn id(&self) -> &'static str {
        "boundaryRespect"
    }

    fn label(&self) -> &'static str {
        "Boundary Respect"
    }

    fn analyze(&self, conv: &Conversation<'_>) -> AnalysisResult {
        let scores = Pair::from_fn(|d| {
            linear(
                BOUNDARY_BASE,
                &[
                    (RESPECT_PER_HIT, conv.rate(d, &["boundary.respect"])),
                    (-VIOLATION_PER_HIT, conv.rate(d, &["boundary.violation"])),
                    (-CONTROL_PER_HIT, conv.rate(d, &["power.controlling"])),
                ],
            )
        });
        let violations = Pair::from_fn(|d| conv.hits(d, &["boundary.violation"]));
        let boundaries_set = Pair::from_fn(|d| conv.hits(d, &["boundary.setting"]));

        let summary = if violations.you + violations.them == 0 {
            format!(
                "Boundaries are respected ({} set during the conversation).",
                boundaries_set.you + boundaries_set.them
            )
        } else {
            format!(
                "Boundaries were pushed {} time(s) by you and {} time(s) by them.",
                violations.you, violations.them
            )
        };

        AnalysisResult::BoundaryRespect(BoundaryRespectResult {
            score: scores.mean(),
            scores,
            boundaries_set,
            respectful: Pair::from_fn(|d| conv.hits(d, &["boundary.respect"])),
            violations,
            summary,
        })
    }
}
