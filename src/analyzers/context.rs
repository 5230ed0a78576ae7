use rayon::prelude::*;

use crate::config::EngineConfig;
use crate::lexicon::{CategoryId, Hits, Lexicon};
use crate::types::{Direction, ParsedMessage};

/// Immutable analysis context shared by every analyzer in a run.
///
/// The lexicon is applied to each message exactly once, up front; analyzers only read the
/// resulting hit table.
pub struct Conversation<'a> {
    messages: &'a [ParsedMessage],
    lexicon: &'a Lexicon,
    hits: Vec<Hits>,
    initiation_gap_secs: i64,
    timestamps_inferred: bool,
}

impl<'a> Conversation<'a> {
    pub fn new(messages: &'a [ParsedMessage], lexicon: &'a Lexicon, config: &EngineConfig) -> Self {
        let hits: Vec<Hits> = messages
            .par_iter()
            .map(|m| lexicon.scan(&m.content))
            .collect();
        Self {
            messages,
            lexicon,
            hits,
            initiation_gap_secs: config.initiation_gap_minutes.saturating_mul(60),
            timestamps_inferred: messages.iter().any(|m| m.timestamp_inferred),
        }
    }

    pub fn messages(&self) -> &'a [ParsedMessage] {
        self.messages
    }

    pub fn lexicon(&self) -> &'a Lexicon {
        self.lexicon
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// At least one timestamp is a placeholder; latency-derived metrics are unreliable.
    pub fn timestamps_inferred(&self) -> bool {
        self.timestamps_inferred
    }

    pub fn initiation_gap_secs(&self) -> i64 {
        self.initiation_gap_secs
    }

    /// Messages of one direction with their index in the full sequence.
    pub fn by(&self, direction: Direction) -> impl Iterator<Item = (usize, &'a ParsedMessage)> + 'a {
        self.messages
            .iter()
            .enumerate()
            .filter(move |(_, m)| m.direction == direction)
    }

    pub fn count(&self, direction: Direction) -> usize {
        self.by(direction).count()
    }

    pub fn lengths(&self, direction: Direction) -> Vec<f64> {
        self.by(direction).map(|(_, m)| m.length as f64).collect()
    }

    pub fn average_length(&self, direction: Direction) -> f64 {
        super::scoring::mean(&self.lengths(direction)).unwrap_or(0.0)
    }

    fn ids(&self, categories: &[&str]) -> Vec<CategoryId> {
        categories.iter().filter_map(|c| self.lexicon.id(c)).collect()
    }

    /// Raw hits of `categories` in the message at `index`.
    pub fn message_hits(&self, index: usize, categories: &[&str]) -> u32 {
        let ids = self.ids(categories);
        self.hits_for(index, &ids)
    }

    fn hits_for(&self, index: usize, ids: &[CategoryId]) -> u32 {
        match self.hits.get(index) {
            Some(hits) => ids.iter().map(|id| hits.get(*id)).sum(),
            None => 0,
        }
    }

    /// Weighted hits of `categories` in the message at `index`.
    pub fn message_weighted(&self, index: usize, categories: &[&str]) -> f64 {
        let ids = self.ids(categories);
        self.weighted_for(index, &ids)
    }

    fn weighted_for(&self, index: usize, ids: &[CategoryId]) -> f64 {
        match self.hits.get(index) {
            Some(hits) => ids
                .iter()
                .map(|id| hits.get(*id) as f64 * self.lexicon.weight(*id))
                .sum(),
            None => 0.0,
        }
    }

    /// Total raw hits for one person.
    pub fn hits(&self, direction: Direction, categories: &[&str]) -> u32 {
        let ids = self.ids(categories);
        self.by(direction).map(|(i, _)| self.hits_for(i, &ids)).sum()
    }

    /// Total weighted hits for one person.
    pub fn weighted(&self, direction: Direction, categories: &[&str]) -> f64 {
        let ids = self.ids(categories);
        self.by(direction).map(|(i, _)| self.weighted_for(i, &ids)).sum()
    }

    /// Weighted hits per message for one person; 0 when they sent nothing.
    pub fn rate(&self, direction: Direction, categories: &[&str]) -> f64 {
        let n = self.count(direction);
        if n == 0 {
            0.0
        } else {
            self.weighted(direction, categories) / n as f64
        }
    }

    /// Number of one person's messages with at least one hit in `categories`.
    pub fn matching(&self, direction: Direction, categories: &[&str]) -> usize {
        let ids = self.ids(categories);
        self.by(direction)
            .filter(|(i, _)| self.hits_for(*i, &ids) > 0)
            .count()
    }

    /// Fraction (0..=1) of one person's messages with a hit in `categories`.
    pub fn matching_fraction(&self, direction: Direction, categories: &[&str]) -> f64 {
        let n = self.count(direction);
        if n == 0 {
            0.0
        } else {
            self.matching(direction, categories) as f64 / n as f64
        }
    }

    /// Fraction (0..=1) of one person's messages satisfying `pred`.
    pub fn fraction(&self, direction: Direction, pred: impl Fn(&ParsedMessage) -> bool) -> f64 {
        let n = self.count(direction);
        if n == 0 {
            0.0
        } else {
            self.by(direction).filter(|(_, m)| pred(m)).count() as f64 / n as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::test_support::conversation_of;

    #[test]
    fn rates_are_per_message_and_per_person() {
        let (messages, lexicon, config) = conversation_of(&[
            (Direction::Sent, "thank you, thanks"),
            (Direction::Sent, "ok"),
            (Direction::Received, "whatever"),
        ]);
        let conv = Conversation::new(&messages, &lexicon, &config);
        assert_eq!(conv.count(Direction::Sent), 2);
        assert_eq!(conv.hits(Direction::Sent, &["sentiment.positive.moderate"]), 2);
        // two moderate hits at weight 2 over two messages
        assert_eq!(conv.rate(Direction::Sent, &["sentiment.positive.moderate"]), 2.0);
        assert_eq!(conv.matching(Direction::Received, &["toxicity.hostile"]), 1);
        assert_eq!(conv.matching_fraction(Direction::Sent, &["sentiment.positive.moderate"]), 0.5);
    }

    #[test]
    fn empty_partition_rates_are_zero() {
        let (messages, lexicon, config) = conversation_of(&[(Direction::Sent, "hi there")]);
        let conv = Conversation::new(&messages, &lexicon, &config);
        assert_eq!(conv.rate(Direction::Received, &["sentiment.positive.weak"]), 0.0);
        assert_eq!(conv.fraction(Direction::Received, |_| true), 0.0);
        assert_eq!(conv.average_length(Direction::Received), 0.0);
    }
}
