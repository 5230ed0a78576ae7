//! Report aggregation: health score, ranked insights and recommendations, summary text.

pub mod render;
mod rules;

use std::cmp::Reverse;

use crate::analyzers::scoring::{clamp_score, Balance};
use crate::analyzers::Analyses;
use crate::types::{ConversationStats, KeyInsight, Personalization, Recommendation};

const SENTIMENT_WEIGHT: f64 = 0.4;
const ENGAGEMENT_WEIGHT: f64 = 0.3;
const SAFETY_WEIGHT: f64 = 0.3;
/// Stand-in for a component whose analyzer produced nothing.
const NEUTRAL: f64 = 50.0;

/// Everything the aggregator derives from the analyzer outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub health_score: f64,
    pub summary: String,
    pub insights: Vec<KeyInsight>,
    pub recommendations: Vec<Recommendation>,
}

/// Inputs shared by every rule.
pub(crate) struct Context<'a> {
    pub analyses: &'a Analyses,
    pub stats: &'a ConversationStats,
    pub personalization: &'a Personalization,
    pub health: f64,
}

impl Context<'_> {
    /// Display name for the side a comparison favors.
    pub fn name_of(&self, side: Balance) -> &str {
        match side {
            Balance::You => self.personalization.you(),
            Balance::Them => self.personalization.them(),
            Balance::Balanced => "Both of you",
        }
    }
}

/// Blend of the less positive side's sentiment, mean engagement and inverted toxicity.
/// Every component is symmetric in the two parties, so the score is too.
pub fn health_score(analyses: &Analyses) -> f64 {
    let sentiment = analyses
        .sentiment
        .as_ref()
        .map(|s| s.scores.you.min(s.scores.them))
        .unwrap_or(NEUTRAL);
    let engagement = analyses.engagement.as_ref().map(|e| e.score).unwrap_or(NEUTRAL);
    let safety = analyses
        .toxicity
        .as_ref()
        .map(|t| 100.0 - t.score)
        .unwrap_or(NEUTRAL);
    clamp_score(
        SENTIMENT_WEIGHT * sentiment + ENGAGEMENT_WEIGHT * engagement + SAFETY_WEIGHT * safety,
    )
}

pub fn health_label(score: f64) -> &'static str {
    if score >= 75.0 {
        "strong"
    } else if score >= 55.0 {
        "mixed"
    } else if score >= 35.0 {
        "strained"
    } else {
        "struggling"
    }
}

/// Derive the report-level fields. Pure: the same inputs always give the same output,
/// in the same order.
pub fn aggregate(
    analyses: &Analyses,
    stats: &ConversationStats,
    personalization: &Personalization,
) -> Aggregate {
    let ctx = Context {
        analyses,
        stats,
        personalization,
        health: health_score(analyses),
    };

    let mut insights: Vec<KeyInsight> = rules::INSIGHTS.iter().filter_map(|rule| rule(&ctx)).collect();
    // Stable: equal importance keeps rule order.
    insights.sort_by_key(|i| Reverse(i.importance));

    let mut recommendations: Vec<Recommendation> = rules::RECOMMENDATIONS
        .iter()
        .filter_map(|rule| rule(&ctx))
        .collect();
    if recommendations.is_empty() {
        recommendations.push(rules::keep_going());
    }
    recommendations.sort_by_key(|r| Reverse(r.priority));

    let summary = summarize(&ctx, &insights);
    tracing::debug!(
        health = ctx.health,
        insights = insights.len(),
        recommendations = recommendations.len(),
        "report aggregated"
    );

    Aggregate {
        health_score: ctx.health,
        summary,
        insights,
        recommendations,
    }
}

fn summarize(ctx: &Context<'_>, insights: &[KeyInsight]) -> String {
    let p = ctx.personalization;
    let mut sentences = vec![format!(
        "{} and {} exchanged {} messages ({} from {}, {} from {}).",
        p.you(),
        p.them(),
        ctx.stats.total_messages,
        ctx.stats.sent_messages,
        p.you(),
        ctx.stats.received_messages,
        p.them(),
    )];
    sentences.push(format!(
        "Overall communication health is {:.0}/100, which reads as {}.",
        ctx.health,
        health_label(ctx.health)
    ));

    if let Some(s) = &ctx.analyses.sentiment {
        sentences.push(match s.more_positive {
            Balance::Balanced => "The emotional tone is similar on both sides.".to_string(),
            side => format!("{} set the more positive tone.", ctx.name_of(side)),
        });
    }
    if let Some(d) = &ctx.analyses.double_text {
        if d.more_invested != Balance::Balanced {
            sentences.push(format!(
                "{} appear more invested in keeping the conversation going.",
                ctx.name_of(d.more_invested)
            ));
        }
    }
    if let Some(top) = insights.first() {
        sentences.push(format!("Key finding: {}", top.insight));
    }
    if let Some(goal) = p.stated_goal.as_deref().map(str::trim).filter(|g| !g.is_empty()) {
        sentences.push(format!("Read these findings with your goal in mind: \"{}\".", goal));
    }
    if ctx.stats.timestamps_inferred {
        sentences.push("Some timestamps were missing, so timing-based results are approximate.".to_string());
    }
    sentences.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::test_support::messages_of;
    use crate::analyzers::{Conversation, Registry};
    use crate::config::EngineConfig;
    use crate::lexicon::Lexicon;
    use crate::parsers;
    use crate::types::{Direction, Importance, ParsedMessage};

    fn analyses_for(messages: &[ParsedMessage]) -> Analyses {
        let lexicon = Lexicon::builtin().unwrap();
        let config = EngineConfig::default();
        let conv = Conversation::new(messages, &lexicon, &config);
        let mut analyses = Analyses::default();
        for analyzer in Registry::builtin().iter() {
            analyses.insert(analyzer.analyze(&conv));
        }
        analyses
    }

    fn lopsided() -> Vec<ParsedMessage> {
        messages_of(&[
            (Direction::Sent, "hey! how was your day?"),
            (Direction::Sent, "did the meeting go okay?"),
            (Direction::Sent, "miss you, call me when you can"),
            (Direction::Sent, "hello??"),
            (Direction::Received, "busy"),
        ])
    }

    #[test]
    fn investment_gap_is_a_high_insight_naming_the_invested_side() {
        let messages = lopsided();
        let analyses = analyses_for(&messages);
        let personalization = Personalization {
            your_name: Some("Alex".into()),
            counterpart_name: Some("Sam".into()),
            stated_goal: None,
        };
        let agg = aggregate(&analyses, &parsers::stats(&messages), &personalization);
        let investment = agg
            .insights
            .iter()
            .find(|i| i.category == "Investment Level")
            .expect("investment insight");
        assert_eq!(investment.importance, Importance::High);
        assert!(investment.insight.starts_with("Alex"));
    }

    #[test]
    fn insights_and_recommendations_are_ranked_high_first() {
        let messages = lopsided();
        let agg = aggregate(
            &analyses_for(&messages),
            &parsers::stats(&messages),
            &Personalization::default(),
        );
        assert!(agg.insights.windows(2).all(|w| w[0].importance >= w[1].importance));
        assert!(agg
            .recommendations
            .windows(2)
            .all(|w| w[0].priority >= w[1].priority));
        assert!(!agg.recommendations.is_empty());
    }

    #[test]
    fn aggregation_is_idempotent() {
        let messages = lopsided();
        let analyses = analyses_for(&messages);
        let stats = parsers::stats(&messages);
        let p = Personalization::default();
        assert_eq!(aggregate(&analyses, &stats, &p), aggregate(&analyses, &stats, &p));
    }

    #[test]
    fn missing_components_score_neutral() {
        assert_eq!(health_score(&Analyses::default()), 50.0);
    }

    #[test]
    fn goal_is_echoed_in_summary() {
        let messages = lopsided();
        let personalization = Personalization {
            stated_goal: Some("figure out if they're still interested".into()),
            ..Personalization::default()
        };
        let agg = aggregate(
            &analyses_for(&messages),
            &parsers::stats(&messages),
            &personalization,
        );
        assert!(agg.summary.contains("figure out if they're still interested"));
        assert!(agg.summary.starts_with("You and Them exchanged 5 messages"));
    }
}
