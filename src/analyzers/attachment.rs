//! Attachment-style language per person and how the two styles pair up.

use serde::{Deserialize, Serialize};

use super::scoring::{percent, Level, Pair};
use super::{AnalysisResult, Analyzer, Conversation};
use crate::types::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentStyle {
    Secure,
    Anxious,
    Avoidant,
    Disorganized,
    /// No attachment language at all
    Undetermined,
}

impl AttachmentStyle {
    /// Classification order; earlier styles win ties.
    const RANKED: [(AttachmentStyle, &'static str); 4] = [
        (AttachmentStyle::Secure, "attachment.secure"),
        (AttachmentStyle::Anxious, "attachment.anxious"),
        (AttachmentStyle::Avoidant, "attachment.avoidant"),
        (AttachmentStyle::Disorganized, "attachment.disorganized"),
    ];
}

impl std::fmt::Display for AttachmentStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AttachmentStyle::Secure => "secure",
            AttachmentStyle::Anxious => "anxious",
            AttachmentStyle::Avoidant => "avoidant",
            AttachmentStyle::Disorganized => "disorganized",
            AttachmentStyle::Undetermined => "undetermined",
        };
        write!(f, "{}", s)
    }
}

const COMPATIBILITY_MODERATE_AT: f64 = 40.0;
const COMPATIBILITY_HIGH_AT: f64 = 70.0;

/// Compatibility of two styles. Order of the arguments doesn't matter.
pub fn pairing_score(a: AttachmentStyle, b: AttachmentStyle) -> f64 {
    use AttachmentStyle::*;
    match (a, b) {
        (Undetermined, _) | (_, Undetermined) => 50.0,
        (Secure, Secure) => 90.0,
        (Secure, Anxious) | (Anxious, Secure) => 70.0,
        (Secure, Avoidant) | (Avoidant, Secure) => 60.0,
        (Secure, Disorganized) | (Disorganized, Secure) => 50.0,
        (Avoidant, Avoidant) => 40.0,
        (Anxious, Anxious) => 45.0,
        (Anxious, Disorganized) | (Disorganized, Anxious) => 30.0,
        (Avoidant, Disorganized) | (Disorganized, Avoidant) => 30.0,
        (Anxious, Avoidant) | (Avoidant, Anxious) => 25.0,
        (Disorganized, Disorganized) => 20.0,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentProfile {
    pub primary: AttachmentStyle,
    pub secondary: Option<AttachmentStyle>,
    pub secure: u32,
    pub anxious: u32,
    pub avoidant: u32,
    pub disorganized: u32,
    /// Percent of this person's attachment language that is secure
    pub security: f64,
}

fn profile(conv: &Conversation<'_>, direction: Direction) -> AttachmentProfile {
    let weighted: Vec<(AttachmentStyle, f64)> = AttachmentStyle::RANKED
        .iter()
        .map(|(style, cat)| (*style, conv.weighted(direction, &[*cat])))
        .collect();
    let total: f64 = weighted.iter().map(|(_, w)| w).sum();

    let mut ranked: Vec<&(AttachmentStyle, f64)> = weighted.iter().filter(|(_, w)| *w > 0.0).collect();
    // stable: ties keep the declared order
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let hits = |i: usize| conv.hits(direction, &[AttachmentStyle::RANKED[i].1]);
    AttachmentProfile {
        primary: ranked.first().map(|(s, _)| *s).unwrap_or(AttachmentStyle::Undetermined),
        secondary: ranked.get(1).map(|(s, _)| *s),
        secure: hits(0),
        anxious: hits(1),
        avoidant: hits(2),
        disorganized: hits(3),
        security: percent(weighted[0].1, total),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentResult {
    /// Pairing compatibility of the two primary styles
    pub score: f64,
    pub profiles: Pair<AttachmentProfile>,
    pub compatibility: Level,
    pub summary: String,
}

pub struct AttachmentAnalyzer;

impl Analyzer for AttachmentAnalyzer {
    fn id(&self) -> &'static str {
        "attachment"
    }

    fn label(&self) -> &'static str {
        "Attachment Style"
    }

    fn analyze(&self, conv: &Conversation<'_>) -> AnalysisResult {
        let profiles = Pair::from_fn(|d| profile(conv, d));
        let score = pairing_score(profiles.you.primary, profiles.them.primary);
        let compatibility = Level::from_score(score, COMPATIBILITY_MODERATE_AT, COMPATIBILITY_HIGH_AT);

        let mut summary = format!(
            "Your language leans {} and theirs leans {}; that pairing has {} compatibility.",
            profiles.you.primary, profiles.them.primary, compatibility
        );
        for (who, p) in [("your", &profiles.you), ("their", &profiles.them)] {
            if p.primary == AttachmentStyle::Avoidant && p.avoidant > 0 {
                summary.push_str(&format!(
                    " {} messages include {} avoidant indicator(s).",
                    capitalize(who),
                    p.avoidant
                ));
            }
        }

        AnalysisResult::Attachment(AttachmentResult {
            score,
            profiles,
            compatibility,
            summary,
        })
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
