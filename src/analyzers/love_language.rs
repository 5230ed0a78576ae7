//! The five love-language expressions per person and how well the two primaries line up.

use serde::{Deserialize, Serialize};

use super::scoring::{Level, Pair};
use super::{AnalysisResult, Analyzer, Conversation};
use crate::types::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LoveLanguage {
    Words,
    Acts,
    Gifts,
    Time,
    Touch,
}

impl LoveLanguage {
    /// Classification order; earlier languages win ties.
    const RANKED: [(LoveLanguage, &'static str); 5] = [
        (LoveLanguage::Words, "love.words"),
        (LoveLanguage::Acts, "love.acts"),
        (LoveLanguage::Gifts, "love.gifts"),
        (LoveLanguage::Time, "love.time"),
        (LoveLanguage::Touch, "love.touch"),
    ];

    pub fn describe(self) -> &'static str {
        match self {
            LoveLanguage::Words => "words of affirmation",
            LoveLanguage::Acts => "acts of service",
            LoveLanguage::Gifts => "gifts",
            LoveLanguage::Time => "quality time",
            LoveLanguage::Touch => "physical touch",
        }
    }
}

const SAME_PRIMARY: f64 = 90.0;
const CROSSED_SECONDARY: f64 = 70.0;
const UNKNOWN: f64 = 50.0;
const MISMATCH: f64 = 40.0;
const COMPATIBILITY_MODERATE_AT: f64 = 45.0;
const COMPATIBILITY_HIGH_AT: f64 = 70.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoveProfile {
    pub primary: Option<LoveLanguage>,
    pub secondary: Option<LoveLanguage>,
    pub words: u32,
    pub acts: u32,
    pub gifts: u32,
    pub time: u32,
    pub touch: u32,
}

fn profile(conv: &Conversation<'_>, direction: Direction) -> LoveProfile {
    let counts: Vec<(LoveLanguage, u32)> = LoveLanguage::RANKED
        .iter()
        .map(|(lang, cat)| (*lang, conv.hits(direction, &[*cat])))
        .collect();
    let mut ranked: Vec<(LoveLanguage, u32)> = counts.iter().copied().filter(|(_, n)| *n > 0).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    LoveProfile {
        primary: ranked.first().map(|(l, _)| *l),
        secondary: ranked.get(1).map(|(l, _)| *l),
        words: counts[0].1,
        acts: counts[1].1,
        gifts: counts[2].1,
        time: counts[3].1,
        touch: counts[4].1,
    }
}

/// Alignment of two profiles; order of the arguments doesn't matter.
pub fn alignment(a: &LoveProfile, b: &LoveProfile) -> f64 {
    match (a.primary, b.primary) {
        (Some(x), Some(y)) if x == y => SAME_PRIMARY,
        (Some(x), Some(y)) if b.secondary == Some(x) || a.secondary == Some(y) => CROSSED_SECONDARY,
        (Some(_), Some(_)) => MISMATCH,
        _ => UNKNOWN,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoveLanguageResult {
    /// How well the two primary languages line up
    pub score: f64,
    pub profiles: Pair<LoveProfile>,
    pub compatibility: Level,
    pub summary: String,
}

pub struct LoveLanguageAnalyzer;

impl Analyzer for LoveLanguageAnalyzer {
    fn id(&self) -> &'static str {
        "loveLanguage"
    }

    fn label(&self) -> &'static str {
        "Love Languages"
    }

    fn analyze(&self, conv: &Conversation<'_>) -> AnalysisResult {
        let profiles = Pair::from_fn(|d| profile(conv, d));
        let score = alignment(&profiles.you, &profiles.them);
        let compatibility = Level::from_score(score, COMPATIBILITY_MODERATE_AT, COMPATIBILITY_HIGH_AT);

        let name = |p: &LoveProfile| p.primary.map(|l| l.describe()).unwrap_or("no clear language");
        let summary = if score == SAME_PRIMARY {
            format!("You both express affection through {}.", name(&profiles.you))
        } else {
            format!(
                "You mostly express affection through {}, they through {}.",
                name(&profiles.you),
                name(&profiles.them)
            )
        };

        AnalysisResult::LoveLanguage(LoveLanguageResult {
            score,
            profiles,
            compatibility,
            summary,
        })
    }
}
