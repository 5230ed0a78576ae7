//! Directive versus deferential phrasing, classified per person and scored by how the two
//! styles pair up.

use serde::{Deserialize, Serialize};

use super::scoring::{compare, linear, pairing, top_two, Balance, Pair};
use super::{AnalysisResult, Analyzer, Conversation};
use crate::types::Direction;

const CONTROLLING: &[&str] = &["power.controlling"];
const SUBMISSIVE: &[&str] = &["power.submissive"];
const COLLABORATIVE: &[&str] = &["power.collaborative"];

const DOMINANCE_BASE: f64 = 50.0;
const CONTROL_PER_HIT: f64 = 20.0;
const SUBMIT_PER_HIT: f64 = 15.0;
const BALANCED_WITHIN: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerStyle {
    Controlling,
    Submissive,
    Collaborative,
    /// No power language at all
    Undetermined,
}

impl PowerStyle {
    /// Classification order; earlier styles win ties.
    const RANKED: [(PowerStyle, &'static str); 3] = [
        (PowerStyle::Controlling, "power.controlling"),
        (PowerStyle::Submissive, "power.submissive"),
        (PowerStyle::Collaborative, "power.collaborative"),
    ];
}

impl std::fmt::Display for PowerStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PowerStyle::Controlling => "controlling",
            PowerStyle::Submissive => "submissive",
            PowerStyle::Collaborative => "collaborative",
            PowerStyle::Undetermined => "undetermined",
        };
        write!(f, "{}", s)
    }
}

/// How even the dynamic is for each pair of primary styles; 100 is fully even.
const PAIRING: &[((PowerStyle, PowerStyle), f64)] = {
    use PowerStyle::*;
    &[
        ((Collaborative, Collaborative), 100.0),
        ((Undetermined, Undetermined), 100.0),
        ((Collaborative, Undetermined), 90.0),
        ((Submissive, Collaborative), 75.0),
        ((Submissive, Undetermined), 75.0),
        ((Submissive, Submissive), 70.0),
        ((Controlling, Collaborative), 55.0),
        ((Controlling, Undetermined), 50.0),
        ((Controlling, Controlling), 35.0),
        ((Controlling, Submissive), 20.0),
    ]
};
const UNLISTED_PAIRING: f64 = 50.0;

pub fn pairing_score(a: PowerStyle, b: PowerStyle) -> f64 {
    pairing(PAIRING, a, b).unwrap_or(UNLISTED_PAIRING)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerProfile {
    pub primary: PowerStyle,
    pub secondary: Option<PowerStyle>,
}

fn profile(conv: &Conversation<'_>, direction: Direction) -> PowerProfile {
    let weights: Vec<(PowerStyle, f64)> = PowerStyle::RANKED
        .iter()
        .map(|(style, cat)| (*style, conv.weighted(direction, &[*cat])))
        .collect();
    let (primary, secondary) = top_two(&weights);
    PowerProfile {
        primary: primary.unwrap_or(PowerStyle::Undetermined),
        secondary,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerResult {
    /// Pairing score of the two primary styles; 100 is an even, collaborative dynamic
    pub score: f64,
    pub profiles: Pair<PowerProfile>,
    /// 50 is neutral; higher means more directive language
    pub dominance: Pair<f64>,
    pub controlling: Pair<u32>,
    pub submissive: Pair<u32>,
    pub collaborative: Pair<u32>,
    pub dominant: Balance,
    pub summary: String,
}

pub struct PowerAnalyzer;

impl Analyzer for PowerAnalyzer {
    fn id(&self) -> &'static str {
        "power"
    }

    fn label(&self) -> &'static str {
        "Power Dynamics"
    }

    fn analyze(&self, conv: &Conversation<'_>) -> AnalysisResult {
        let profiles = Pair::from_fn(|d| profile(conv, d));
        let dominance = Pair::from_fn(|d| {
            linear(
                DOMINANCE_BASE,
                &[
                    (CONTROL_PER_HIT, conv.rate(d, CONTROLLING)),
                    (-SUBMIT_PER_HIT, conv.rate(d, SUBMISSIVE)),
                ],
            )
        });
        let score = pairing_score(profiles.you.primary, profiles.them.primary);
        let dominant = compare(&dominance, BALANCED_WITHIN);

        let summary = match dominant {
            Balance::Balanced => format!(
                "Decision-making language is evenly balanced ({} and {}).",
                profiles.you.primary, profiles.them.primary
            ),
            side => format!(
                "{} tend to steer the conversation with more directive language (you {:.0}, them {:.0}).",
                match side {
                    Balance::You => "You",
                    _ => "They",
                },
                dominance.you,
                dominance.them
            ),
        };

        AnalysisResult::Power(PowerResult {
            score,
            profiles,
            dominance,
            controlling: Pair::from_fn(|d| conv.hits(d, CONTROLLING)),
            submissive: Pair::from_fn(|d| conv.hits(d, SUBMISSIVE)),
            collaborative: Pair::from_fn(|d| conv.hits(d, COLLABORATIVE)),
            dominant,
            summary,
        })
    }
}
