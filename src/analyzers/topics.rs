//! Which everyday topics each person brings up and how much the two overlap.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::scoring::{percent, Pair};
use super::{AnalysisResult, Analyzer, Conversation};
use crate::lexicon::TOPIC_PREFIX;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicDiversityResult {
    /// Percent of known topics the conversation touches
    pub score: f64,
    pub scores: Pair<f64>,
    /// Topics each person brings up, sorted by name
    pub topics: Pair<Vec<String>>,
    pub shared_topics: Vec<String>,
    /// Most mentioned topic; ties go to the alphabetically first
    pub dominant_topic: Option<String>,
    pub summary: String,
}

pub struct TopicDiversityAnalyzer;

impl Analyzer for TopicDiversityAnalyzer {
    fn id(&self) -> &'static str {
        "topicDiversity"
    }

    fn label(&self) -> &'static str {
        "Topic Diversity"
    }

    fn analyze(&self, conv: &Conversation<'_>) -> AnalysisResult {
        let lexicon = conv.lexicon();
        let categories: Vec<&str> = lexicon
            .ids_with_prefix(TOPIC_PREFIX)
            .into_iter()
            .map(|id| lexicon.name(id))
            .collect();
        let known = categories.len() as f64;

        let mentions = Pair::from_fn(|d| {
            categories
                .iter()
                .filter_map(|cat| {
                    let n = conv.hits(d, &[*cat]);
                    (n > 0).then(|| (topic_name(cat), n))
                })
                .collect::<BTreeMap<String, u32>>()
        });

        let mut totals: BTreeMap<&str, u32> = BTreeMap::new();
        for (topic, n) in mentions.you.iter().chain(mentions.them.iter()) {
            *totals.entry(topic.as_str()).or_default() += n;
        }
        let dominant_topic = totals
            .iter()
            .fold(None::<(&str, u32)>, |best, (topic, n)| match best {
                Some((_, b)) if b >= *n => best,
                _ => Some((*topic, *n)),
            })
            .map(|(topic, _)| topic.to_string());

        let shared_topics: Vec<String> = mentions
            .you
            .keys()
            .filter(|t| mentions.them.contains_key(*t))
            .cloned()
            .collect();
        let score = percent(totals.len() as f64, known);
        let scores = mentions.map(|m| percent(m.len() as f64, known));
        let topics = mentions.map(|m| m.keys().cloned().collect::<Vec<_>>());

        let summary = match &dominant_topic {
            None => "No recurring topics stand out; the conversation stays on logistics or small talk."
                .to_string(),
            Some(top) => format!(
                "The conversation covers {} of {} topic areas, most often {}; {} shared.",
                totals.len(),
                categories.len(),
                top,
                match shared_topics.len() {
                    0 => "none are".to_string(),
                    1 => "1 is".to_string(),
                    n => format!("{} are", n),
                }
            ),
        };

        AnalysisResult::TopicDiversity(TopicDiversityResult {
            score,
            scores,
            topics,
            shared_topics,
            dominant_topic,
            summary,
        })
    }
}

fn topic_name(category: &str) -> String {
    category
        .strip_prefix(TOPIC_PREFIX)
        .unwrap_or(category)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::test_support::{messages_of, run};
    use crate::types::Direction::{Received, Sent};

    #[test]
    fn shared_and_dominant_topics() {
        let messages = messages_of(&[
            (Sent, "my boss moved the deadline again"),
            (Received, "ugh work. dinner later?"),
            (Sent, "yes, pizza after the meeting"),
        ]);
        let r = match run(&TopicDiversityAnalyzer, &messages) {
            AnalysisResult::TopicDiversity(r) => r,
            other => panic!("unexpected result {:?}", other),
        };
        assert_eq!(r.topics.you, vec!["food".to_string(), "work".to_string()]);
        assert_eq!(r.topics.them, vec!["food".to_string(), "work".to_string()]);
        assert_eq!(r.shared_topics, vec!["food".to_string(), "work".to_string()]);
        assert_eq!(r.dominant_topic.as_deref(), Some("work"));
        assert_eq!(r.score, 25.0);
    }

    #[test]
    fn small_talk_has_no_topics() {
        let messages = messages_of(&[(Sent, "hey"), (Received, "hi")]);
        let r = match run(&TopicDiversityAnalyzer, &messages) {
            AnalysisResult::TopicDiversity(r) => r,
            other => panic!("unexpected result {:?}", other),
        };
        assert_eq!(r.score, 0.0);
        assert!(r.dominant_topic.is_none());
        assert!(r.shared_topics.is_empty());
    }
}
