//! Emotional labor, vulnerability, availability and emotional intelligence.

use serde::{Deserialize, Serialize};

use super::scoring::{compare, linear, share, Balance, Level, Pair};
use super::{AnalysisResult, Analyzer, Conversation};
use crate::types::Direction;

const LABOR: &[&str] = &[
    "support.emotional",
    "support.practical",
    "feelings.inquiry",
    "ei.empathy",
];
const LABOR_BALANCED_WITHIN: f64 = 15.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionalLaborResult {
    /// 100 when the work is shared evenly
    pub score: f64,
    /// Percent of the emotional work each side carries
    pub labor_share: Pair<f64>,
    pub support_offered: Pair<u32>,
    pub feeling_checks: Pair<u32>,
    pub carrier: Balance,
    pub summary: String,
}

pub struct EmotionalLaborAnalyzer;

impl Analyzer for EmotionalLaborAnalyzer {
    fn id(&self) -> &'static str {
        "emotionalLabor"
    }

    fn label(&self) -> &'static str {
        "Emotional Labor"
    }

    fn analyze(&self, conv: &Conversation<'_>) -> AnalysisResult {
        let labor_share = share(
            conv.weighted(Direction::Sent, LABOR),
            conv.weighted(Direction::Received, LABOR),
        );
        let carrier = compare(&labor_share, LABOR_BALANCED_WITHIN);
        let summary = match carrier {
            Balance::Balanced => "Emotional support flows both ways.".to_string(),
            side => format!(
                "{} carry most of the emotional work ({:.0}% of check-ins and support).",
                match side {
                    Balance::You => "You",
                    _ => "They",
                },
                labor_share.you.max(labor_share.them)
            ),
        };

        AnalysisResult::EmotionalLabor(EmotionalLaborResult {
            score: labor_share.balance(),
            labor_share,
            support_offered: Pair::from_fn(|d| {
                conv.hits(d, &["support.emotional", "support.practical"])
            }),
            feeling_checks: Pair::from_fn(|d| conv.hits(d, &["feelings.inquiry"])),
            carrier,
            summary,
        })
    }
}

const DISCLOSURE: &[&str] = &["vulnerability.disclosure"];
/// Points per unit fraction of messages that disclose something personal.
const DISCLOSURE_SCALE: f64 = 250.0;
const VULNERABILITY_BALANCED_WITHIN: f64 = 15.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VulnerabilityResult {
    pub score: f64,
    pub scores: Pair<f64>,
    pub disclosures: Pair<u32>,
    /// 100 when both open up equally
    pub reciprocity: f64,
    pub more_open: Balance,
    pub summary: String,
}

pub struct VulnerabilityAnalyzer;

impl Analyzer for VulnerabilityAnalyzer {
    fn id(&self) -> &'static str {
        "vulnerability"
    }

    fn label(&self) -> &'static str {
        "Vulnerability"
    }

    fn analyze(&self, conv: &Conversation<'_>) -> AnalysisResult {
        let scores = Pair::from_fn(|d| {
            linear(0.0, &[(DISCLOSURE_SCALE, conv.matching_fraction(d, DISCLOSURE))])
        });
        let more_open = compare(&scores, VULNERABILITY_BALANCED_WITHIN);
        let disclosures = Pair::from_fn(|d| conv.hits(d, DISCLOSURE));
        let summary = match (disclosures.you + disclosures.them, more_open) {
            (0, _) => "Neither of you shares much about feelings here.".to_string(),
            (_, Balance::Balanced) => "Openness is mutual; you both share personal feelings.".to_string(),
            (_, side) => format!("{} open up noticeably more than the other.", match side {
                Balance::You => "You",
                _ => "They",
            }),
        };

        AnalysisResult::Vulnerability(VulnerabilityResult {
            score: scores.mean(),
            reciprocity: scores.balance(),
            scores,
            disclosures,
            more_open,
            summary,
        })
    }
}

const OPEN: &[&str] = &["vulnerability.disclosure", "feelings.inquiry", "ei.empathy"];
const DEFLECT: &[&str] = &["availability.deflect"];
const AVAILABILITY_BASE: f64 = 50.0;
const OPEN_PER_HIT: f64 = 15.0;
const DEFLECT_PER_HIT: f64 = 20.0;
const AVAILABLE_MODERATE_AT: f64 = 40.0;
const AVAILABLE_HIGH_AT: f64 = 65.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionalAvailabilityResult {
    pub score: f64,
    pub scores: Pair<f64>,
    pub levels: Pair<Level>,
    pub openings: Pair<u32>,
    pub deflections: Pair<u32>,
    pub summary: String,
}

pub struct EmotionalAvailabilityAnalyzer;

impl Analyzer for EmotionalAvailabilityAnalyzer {
    fn id(&self) -> &'static str {
        "emotionalAvailability"
    }

    fn label(&self) -> &'static str {
        "Emotional Availability"
    }

    fn analyze(&self, conv: &Conversation<'_>) -> AnalysisResult {
        let scores = Pair::from_fn(|d| {
            linear(
                AVAILABILITY_BASE,
                &[
                    (OPEN_PER_HIT, conv.rate(d, OPEN)),
                    (-DEFLECT_PER_HIT, conv.rate(d, DEFLECT)),
                ],
            )
        });
        let levels = scores.map(|s| Level::from_score(*s, AVAILABLE_MODERATE_AT, AVAILABLE_HIGH_AT));
        let summary = format!(
            "Emotional availability: you {}, them {}.",
            levels.you, levels.them
        );

        AnalysisResult::EmotionalAvailability(EmotionalAvailabilityResult {
            score: scores.mean(),
            scores,
            levels,
            openings: Pair::from_fn(|d| conv.hits(d, OPEN)),
            deflections: Pair::from_fn(|d| conv.hits(d, DEFLECT)),
            summary,
        })
    }
}

const EI_POSITIVE: &[&str] = &[
    "ei.empathy",
    "ei.self_awareness",
    "validation.affirm",
    "feelings.inquiry",
];
const EI_NEGATIVE: &[&str] = &["validation.invalidate", "support.dismissive"];
const EI_BASE: f64 = 30.0;
const EI_POSITIVE_PER_HIT: f64 = 20.0;
const EI_NEGATIVE_PER_HIT: f64 = 15.0;
const EI_MODERATE_AT: f64 = 40.0;
const EI_HIGH_AT: f64 = 65.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionalIntelligenceResult {
    pub score: f64,
    pub scores: Pair<f64>,
    pub empathy: Pair<u32>,
    pub self_awareness: Pair<u32>,
    pub dismissals: Pair<u32>,
    pub level: Level,
    pub summary: String,
}

pub struct EmotionalIntelligenceAnalyzer;

impl Analyzer for EmotionalIntelligenceAnalyzer {
    fn id(&self) -> &'static str {
        "emotionalIntelligence"
    }

    fn label(&self) -> &'static str {
        "Emotional Intelligence"
    }

    fn analyze(&self, conv: &Conversation<'_>) -> AnalysisResult {
        let scores = Pair::from_fn(|d| {
            linear(
                EI_BASE,
                &[
                    (EI_POSITIVE_PER_HIT, conv.rate(d, EI_POSITIVE)),
                    (-EI_NEGATIVE_PER_HIT, conv.rate(d, EI_NEGATIVE)),
                ],
            )
        });
        let score = scores.mean();
        let level = Level::from_score(score, EI_MODERATE_AT, EI_HIGH_AT);

        AnalysisResult::EmotionalIntelligence(EmotionalIntelligenceResult {
            score,
            scores,
            empathy: Pair::from_fn(|d| conv.hits(d, &["ei.empathy"])),
            self_awareness: Pair::from_fn(|d| conv.hits(d, &["ei.self_awareness"])),
            dismissals: Pair::from_fn(|d| conv.hits(d, EI_NEGATIVE)),
            level,
            summary: format!(
                "Emotional intelligence shown in the conversation is {} (you {:.0}, them {:.0}).",
                level, scores.you, scores.them
            ),
        })
    }
}
