//! Who starts conversations. A conversation starts with the first message of the
//! transcript and again after any silence longer than the configured gap.

use serde::{Deserialize, Serialize};

use super::scoring::{compare, share, Balance, Pair};
use super::{AnalysisResult, Analyzer, Conversation};
use crate::types::Direction;

const BALANCED_WITHIN: f64 = 15.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiationResult {
    /// 100 when both start conversations equally often
    pub score: f64,
    pub initiations: Pair<usize>,
    /// Percent of initiations by each side
    pub share: Pair<f64>,
    pub conversations: usize,
    pub initiator: Balance,
    /// Timestamps were synthesized, so only the opening message counts
    pub low_confidence: bool,
    pub summary: String,
}

/// Indices of messages that open a conversation.
pub fn initiation_points(conv: &Conversation<'_>) -> Vec<usize> {
    let gap = conv.initiation_gap_secs();
    conv.messages()
        .iter()
        .enumerate()
        .filter(|(i, m)| *i == 0 || m.time_since_last.is_some_and(|secs| secs > gap))
        .map(|(i, _)| i)
        .collect()
}

pub struct InitiationAnalyzer;

impl Analyzer for InitiationAnalyzer {
    fn id(&self) -> &'static str {
        "initiation"
    }

    fn label(&self) -> &'static str {
        "Initiation Balance"
    }

    fn analyze(&self, conv: &Conversation<'_>) -> AnalysisResult {
        let points = initiation_points(conv);
        let initiations = Pair::from_fn(|d: Direction| {
            points
                .iter()
                .filter(|i| conv.messages()[**i].direction == d)
                .count()
        });
        let share = share(initiations.you as f64, initiations.them as f64);
        let initiator = compare(&share, BALANCED_WITHIN);

        let summary = match initiator {
            Balance::Balanced => format!(
                "Across {} conversation(s), both of you reach out about equally.",
                points.len()
            ),
            side => format!(
                "Across {} conversation(s), {} start most of them ({:.0}% vs {:.0}%).",
                points.len(),
                side.who(),
                share.you.max(share.them),
                share.you.min(share.them)
            ),
        };

        AnalysisResult::Initiation(InitiationResult {
            score: share.balance(),
            initiations,
            share,
            conversations: points.len(),
            initiator,
            low_confidence: conv.timestamps_inferred(),
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::test_support::{run, timed_messages};
    use crate::types::Direction::{Received, Sent};

    #[test]
    fn gaps_over_threshold_start_new_conversations() {
        let hour = 3600;
        let messages = timed_messages(&[
            (Sent, "morning", 0),
            (Received, "morning!", 60),
            (Received, "lunch?", 3 * hour),
            (Sent, "sure", 3 * hour + 60),
            (Sent, "home yet?", 4 * hour),
            (Received, "yep", 4 * hour + 60),
            (Received, "night", 9 * hour),
        ]);
        let r = match run(&InitiationAnalyzer, &messages) {
            AnalysisResult::Initiation(r) => r,
            other => panic!("unexpected result {:?}", other),
        };
        // "home yet?" follows "sure" by under an hour
        assert_eq!(r.conversations, 3);
        assert_eq!(r.initiations, Pair::new(1, 2));
        assert_eq!(r.initiator, Balance::Them);
        assert!(!r.low_confidence);
    }

    #[test]
    fn single_opening_is_one_sided() {
        let messages = timed_messages(&[(Sent, "hi", 0), (Received, "hey", 30)]);
        let r = match run(&InitiationAnalyzer, &messages) {
            AnalysisResult::Initiation(r) => r,
            other => panic!("unexpected result {:?}", other),
        };
        assert_eq!(r.initiations, Pair::new(1, 0));
        assert_eq!(r.score, 0.0);
    }
}
