//! Possessive, comparison and accusation phrasing. Mutual jealousy escalates, so the risk
//! also reads the pairing of both sides' primary kinds.

use serde::{Deserialize, Serialize};

use super::scoring::{clamp_score, linear, pairing, top_two, Level, Pair};
use super::{AnalysisResult, Analyzer, Conversation};
use crate::types::Direction;

const ALL: &[&str] = &[
    "jealousy.possessive",
    "jealousy.comparison",
    "jealousy.accusation",
];

const PER_HIT: f64 = 15.0;
const MODERATE_AT: f64 = 25.0;
const HIGH_AT: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JealousyKind {
    Possessive,
    Comparison,
    Accusation,
}

impl JealousyKind {
    /// Classification order; earlier kinds win ties.
    const RANKED: [(JealousyKind, &'static str); 3] = [
        (JealousyKind::Possessive, "jealousy.possessive"),
        (JealousyKind::Comparison, "jealousy.comparison"),
        (JealousyKind::Accusation, "jealousy.accusation"),
    ];
}

/// Risk floor for each pair of primary kinds; `None` is a side with no jealous language.
/// One-sided rows stay under the moderate cut so a lone remark is judged on intensity.
const PAIRING: &[((Option<JealousyKind>, Option<JealousyKind>), f64)] = {
    use JealousyKind::*;
    &[
        ((None, None), 0.0),
        ((Some(Comparison), None), 15.0),
        ((Some(Possessive), None), 20.0),
        ((Some(Accusation), None), 20.0),
        ((Some(Comparison), Some(Comparison)), 45.0),
        ((Some(Possessive), Some(Comparison)), 55.0),
        ((Some(Comparison), Some(Accusation)), 60.0),
        ((Some(Possessive), Some(Possessive)), 65.0),
        ((Some(Possessive), Some(Accusation)), 75.0),
        ((Some(Accusation), Some(Accusation)), 85.0),
    ]
};

pub fn pairing_risk(a: Option<JealousyKind>, b: Option<JealousyKind>) -> f64 {
    pairing(PAIRING, a, b).unwrap_or(0.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JealousyProfile {
    pub primary: Option<JealousyKind>,
    pub secondary: Option<JealousyKind>,
    pub possessive: u32,
    pub comparison: u32,
    pub accusation: u32,
}

fn profile(conv: &Conversation<'_>, direction: Direction) -> JealousyProfile {
    let hits: Vec<(JealousyKind, u32)> = JealousyKind::RANKED
        .iter()
        .map(|(kind, cat)| (*kind, conv.hits(direction, &[*cat])))
        .collect();
    let weights: Vec<(JealousyKind, f64)> = hits.iter().map(|(k, n)| (*k, *n as f64)).collect();
    let (primary, secondary) = top_two(&weights);
    JealousyProfile {
        primary,
        secondary,
        possessive: hits[0].1,
        comparison: hits[1].1,
        accusation: hits[2].1,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JealousyResult {
    /// The higher of the more jealous side's intensity and the pairing risk
    pub score: f64,
    /// Per-person intensity
    pub scores: Pair<f64>,
    pub pairing_risk: f64,
    pub level: Level,
    pub profiles: Pair<JealousyProfile>,
    pub summary: String,
}

pub struct JealousyAnalyzer;

impl Analyzer for JealousyAnalyzer {
    fn id(&self) -> &'static str {
        "jealousy"
    }

    fn label(&self) -> &'static str {
        "Jealousy Patterns"
    }

    fn analyze(&self, conv: &Conversation<'_>) -> AnalysisResult {
        let scores = Pair::from_fn(|d| linear(0.0, &[(PER_HIT, conv.rate(d, ALL))]));
        let profiles = Pair::from_fn(|d| profile(conv, d));
        let pairing_risk = pairing_risk(profiles.you.primary, profiles.them.primary);

        let score = clamp_score(scores.max().max(pairing_risk));
        let level = Level::from_score(score, MODERATE_AT, HIGH_AT);
        let mutual = profiles.you.primary.is_some() && profiles.them.primary.is_some();
        let summary = match level {
            Level::Low if score == 0.0 => "No jealous or possessive language detected.".to_string(),
            Level::Low => "Occasional jealous remarks, nothing sustained.".to_string(),
            _ if mutual => format!(
                "Jealousy is {} and runs both ways (you {:.0}, them {:.0}); mutual suspicion tends to escalate.",
                level, scores.you, scores.them
            ),
            _ => format!(
                "Jealousy is {} (you {:.0}, them {:.0}); watch for possessive or accusatory messages.",
                level, scores.you, scores.them
            ),
        };

        AnalysisResult::Jealousy(JealousyResult {
            score,
            scores,
            pairing_risk,
            level,
            profiles,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::test_support::{messages_of, run};
    use crate::types::Direction::{Received, Sent};

    fn jealousy(lines: &[(Direction, &str)]) -> JealousyResult {
        match run(&JealousyAnalyzer, &messages_of(lines)) {
            AnalysisResult::Jealousy(r) => r,
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn accusations_and_possessiveness() {
        let r = jealousy(&[
            (Sent, "who are you texting? are you cheating"),
            (Received, "my sister"),
            (Sent, "you're mine"),
            (Received, "ok"),
        ]);
        assert_eq!(r.profiles.you.accusation, 2);
        assert_eq!(r.profiles.you.possessive, 1);
        assert_eq!(r.profiles.you.primary, Some(JealousyKind::Accusation));
        assert_eq!(r.profiles.you.secondary, Some(JealousyKind::Possessive));
        assert_eq!(r.profiles.them.primary, None);
        assert_eq!(r.pairing_risk, 20.0);
        assert_eq!(r.level, Level::High);
    }

    #[test]
    fn mutual_accusations_read_the_pairing_row() {
        let r = jealousy(&[
            (Sent, "are you cheating"),
            (Received, "are you cheating"),
            (Sent, "fine"),
            (Received, "fine"),
            (Sent, "sure"),
            (Received, "sure"),
            (Sent, "see you later"),
            (Received, "see you later"),
        ]);
        // each side alone: 2.5 per 4 messages, well under the pairing floor
        assert_eq!(r.scores.you, 9.4);
        assert_eq!(r.pairing_risk, 85.0);
        assert_eq!(r.score, 85.0);
        assert_eq!(r.level, Level::High);
        assert!(r.summary.contains("both ways"));
    }

    #[test]
    fn pairing_table_is_symmetric() {
        use JealousyKind::*;
        let all = [None, Some(Possessive), Some(Comparison), Some(Accusation)];
        for a in all {
            for b in all {
                assert!(pairing(PAIRING, a, b).is_some());
                assert_eq!(pairing_risk(a, b), pairing_risk(b, a));
            }
        }
    }
}
