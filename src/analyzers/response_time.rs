//! Reply latency, measured only where the conversation changes hands.

use serde::{Deserialize, Serialize};

use super::scoring::{clamp_score, compare, mean, median, round1, std_dev, Balance, Pair};
use super::{AnalysisResult, Analyzer, Conversation};
use crate::types::Direction;

/// Responsiveness when there is nothing to measure.
const NEUTRAL_SCORE: f64 = 50.0;
/// A median reply at or under a minute scores 100; at a day or more it scores 0, on a log
/// scale in between.
const FAST_SECS: f64 = 60.0;
const SLOW_SECS: f64 = 86_400.0;
const CONSISTENT_CV: f64 = 0.5;
const VARIABLE_CV: f64 = 1.0;
const BALANCED_WITHIN: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Consistency {
    Consistent,
    Variable,
    Erratic,
    /// Fewer than two samples
    Insufficient,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatencyStats {
    pub samples: usize,
    pub mean_secs: f64,
    pub median_secs: f64,
    pub min_secs: f64,
    pub max_secs: f64,
    /// Coefficient of variation (std dev / mean)
    pub variation: f64,
    pub consistency: Consistency,
}

impl LatencyStats {
    fn from_samples(samples: &[f64]) -> Option<Self> {
        let mean_secs = mean(samples)?;
        let median_secs = median(samples)?;
        let std = std_dev(samples)?;
        let variation = if mean_secs > 0.0 { std / mean_secs } else { 0.0 };
        let consistency = if samples.len() < 2 {
            Consistency::Insufficient
        } else if variation < CONSISTENT_CV {
            Consistency::Consistent
        } else if variation < VARIABLE_CV {
            Consistency::Variable
        } else {
            Consistency::Erratic
        };
        Some(Self {
            samples: samples.len(),
            mean_secs: round1(mean_secs),
            median_secs: round1(median_secs),
            min_secs: samples.iter().copied().fold(f64::INFINITY, f64::min),
            max_secs: samples.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            variation: super::scoring::round2(variation),
            consistency,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseTimeResult {
    /// Mean responsiveness of both sides
    pub score: f64,
    pub scores: Pair<f64>,
    /// `None` when timestamps were synthesized or a side never replied
    pub stats: Pair<Option<LatencyStats>>,
    /// Timestamps were synthesized; latency is not reported
    pub low_confidence: bool,
    pub faster: Balance,
    pub summary: String,
}

/// Reply latencies (seconds) of each side: the gap before a message whose predecessor came
/// from the other side.
pub fn reply_latencies(conv: &Conversation<'_>) -> Pair<Vec<f64>> {
    let mut latencies = Pair::new(Vec::new(), Vec::new());
    for pair in conv.messages().windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        if prev.direction == cur.direction {
            continue;
        }
        if let Some(secs) = cur.time_since_last {
            match cur.direction {
                Direction::Sent => latencies.you.push(secs as f64),
                Direction::Received => latencies.them.push(secs as f64),
            }
        }
    }
    latencies
}

/// Log-scaled responsiveness from a median latency.
pub fn responsiveness(median_secs: f64) -> f64 {
    if median_secs <= FAST_SECS {
        return 100.0;
    }
    let span = (SLOW_SECS / FAST_SECS).ln();
    clamp_score(100.0 * (1.0 - (median_secs / FAST_SECS).ln() / span))
}

fn describe(secs: f64) -> String {
    if secs < 60.0 {
        format!("{:.0}s", secs)
    } else if secs < 3600.0 {
        format!("{:.0} min", secs / 60.0)
    } else {
        format!("{:.1} h", secs / 3600.0)
    }
}

pub struct ResponseTimeAnalyzer;

impl Analyzer for ResponseTimeAnalyzer {
    fn id(&self) -> &'static str {
        "responseTime"
    }

    fn label(&self) -> &'static str {
        "Response Time"
    }

    fn analyze(&self, conv: &Conversation<'_>) -> AnalysisResult {
        if conv.timestamps_inferred() {
            return AnalysisResult::ResponseTime(ResponseTimeResult {
                score: NEUTRAL_SCORE,
                scores: Pair::new(NEUTRAL_SCORE, NEUTRAL_SCORE),
                stats: Pair::new(None, None),
                low_confidence: true,
                faster: Balance::Balanced,
                summary: "Timestamps were missing, so reply times were not measured.".into(),
            });
        }

        let latencies = reply_latencies(conv);
        let stats = latencies.map(|l| LatencyStats::from_samples(l));
        let scores = stats.map(|s| {
            s.as_ref()
                .map(|s| responsiveness(s.median_secs))
                .unwrap_or(NEUTRAL_SCORE)
        });
        let faster = compare(&scores, BALANCED_WITHIN);

        let summary = match (&stats.you, &stats.them) {
            (Some(you), Some(them)) => format!(
                "Your typical reply takes {} and theirs takes {}; {}.",
                describe(you.median_secs),
                describe(them.median_secs),
                match faster {
                    Balance::Balanced => "reply pace is similar".to_string(),
                    side => format!("{} reply noticeably faster", side.who()),
                }
            ),
            _ => "Not enough back-and-forth to measure reply times.".to_string(),
        };

        AnalysisResult::ResponseTime(ResponseTimeResult {
            score: scores.mean(),
            scores,
            stats,
            low_confidence: false,
            faster,
            summary,
        })
    }
}
