//! Fixed insight and recommendation rules. Each rule looks at the analyzer outputs on its
//! own; declaration order is the tie-break when ranking.

use super::Context;
use crate::analyzers::conflict::ConflictStyle;
use crate::analyzers::scoring::{Balance, Level};
use crate::analyzers::toxicity::ToxicityLevel;
use crate::types::{Importance, KeyInsight, Recommendation};

pub(super) type InsightRule = fn(&Context<'_>) -> Option<KeyInsight>;
pub(super) type RecommendationRule = fn(&Context<'_>) -> Option<Recommendation>;

const INVESTMENT_GAP: f64 = 20.0;
const SENTIMENT_GAP: f64 = 25.0;
const INITIATION_SHARE: f64 = 70.0;
const LOW_ENGAGEMENT: f64 = 35.0;
const LOW_HEALTH: f64 = 40.0;
const GOOD_HEALTH: f64 = 70.0;

pub(super) const INSIGHTS: &[InsightRule] = &[
    investment_level,
    toxicity,
    red_flags,
    ghosting,
    sentiment_gap,
    initiation,
    power,
    emotional_labor,
    attachment,
    jealousy,
    breadcrumbing,
    response_time,
    strengths,
];

pub(super) const RECOMMENDATIONS: &[RecommendationRule] = &[
    address_toxicity,
    candid_conversation,
    ghosting_check_in,
    rebalance_effort,
    deepen_engagement,
    conflict_repair,
    validate_feelings,
    stated_goal,
    keep_strengths,
];

fn insight(category: &str, importance: Importance, text: String) -> Option<KeyInsight> {
    Some(KeyInsight {
        category: category.to_string(),
        insight: text,
        importance,
    })
}

fn recommend(priority: Importance, action: &str, details: String) -> Option<Recommendation> {
    Some(Recommendation {
        priority,
        action: action.to_string(),
        details,
    })
}

fn investment_level(ctx: &Context<'_>) -> Option<KeyInsight> {
    let d = ctx.analyses.double_text.as_ref()?;
    if d.investment_gap <= INVESTMENT_GAP || d.more_invested == Balance::Balanced {
        return None;
    }
    insight(
        "Investment Level",
        Importance::High,
        format!(
            "{} put noticeably more effort into the conversation (investment {:.0} vs {:.0}).",
            ctx.name_of(d.more_invested),
            d.investment.you.max(d.investment.them),
            d.investment.you.min(d.investment.them)
        ),
    )
}

fn toxicity(ctx: &Context<'_>) -> Option<KeyInsight> {
    let t = ctx.analyses.toxicity.as_ref()?;
    let importance = match t.level {
        ToxicityLevel::None => return None,
        ToxicityLevel::Low => Importance::Medium,
        _ => Importance::High,
    };
    insight(
        "Toxicity",
        importance,
        format!(
            "Hurtful language shows up at a {} level across {} message(s).",
            t.level,
            t.flagged_messages.you + t.flagged_messages.them
        ),
    )
}

fn red_flags(ctx: &Context<'_>) -> Option<KeyInsight> {
    let f = ctx.analyses.flags.as_ref()?;
    let importance = match f.level {
        Level::Low => return None,
        Level::Moderate => Importance::Medium,
        Level::High => Importance::High,
    };
    insight(
        "Red Flags",
        importance,
        format!(
            "{} red flag(s) detected against {} green flag(s).",
            f.red.you.total + f.red.them.total,
            f.green.you.total + f.green.them.total
        ),
    )
}

fn ghosting(ctx: &Context<'_>) -> Option<KeyInsight> {
    let g = ctx.analyses.ghosting_risk.as_ref()?;
    if g.level != Level::High {
        return None;
    }
    insight(
        "Ghosting Risk",
        Importance::High,
        format!(
            "Replies are thinning out; ghosting risk is high ({:.0}/100).",
            g.score
        ),
    )
}

fn sentiment_gap(ctx: &Context<'_>) -> Option<KeyInsight> {
    let s = ctx.analyses.sentiment.as_ref()?;
    if s.scores.gap() <= SENTIMENT_GAP || s.more_positive == Balance::Balanced {
        return None;
    }
    insight(
        "Emotional Tone",
        Importance::Medium,
        format!(
            "{} write far more warmly than the other side (sentiment gap of {:.0} points).",
            ctx.name_of(s.more_positive),
            s.scores.gap()
        ),
    )
}

fn initiation(ctx: &Context<'_>) -> Option<KeyInsight> {
    let i = ctx.analyses.initiation.as_ref()?;
    if i.low_confidence || i.initiator == Balance::Balanced || i.share.you.max(i.share.them) < INITIATION_SHARE {
        return None;
    }
    insight(
        "Initiation",
        Importance::Medium,
        format!(
            "{} start most conversations ({:.0}% of {}).",
            ctx.name_of(i.initiator),
            i.share.you.max(i.share.them),
            i.conversations
        ),
    )
}

fn power(ctx: &Context<'_>) -> Option<KeyInsight> {
    let p = ctx.analyses.power.as_ref()?;
    if p.dominant == Balance::Balanced {
        return None;
    }
    insight(
        "Power Dynamics",
        Importance::Medium,
        format!("{} tend to steer decisions in this conversation.", ctx.name_of(p.dominant)),
    )
}

fn emotional_labor(ctx: &Context<'_>) -> Option<KeyInsight> {
    let e = ctx.analyses.emotional_labor.as_ref()?;
    if e.carrier == Balance::Balanced {
        return None;
    }
    insight(
        "Emotional Labor",
        Importance::Medium,
        format!(
            "{} carry most of the emotional check-ins and support.",
            ctx.name_of(e.carrier)
        ),
    )
}

fn attachment(ctx: &Context<'_>) -> Option<KeyInsight> {
    let a = ctx.analyses.attachment.as_ref()?;
    if a.compatibility != Level::Low {
        return None;
    }
    insight(
        "Attachment",
        Importance::Medium,
        format!(
            "Attachment styles pull in different directions ({} and {}).",
            a.profiles.you.primary, a.profiles.them.primary
        ),
    )
}

fn jealousy(ctx: &Context<'_>) -> Option<KeyInsight> {
    let j = ctx.analyses.jealousy.as_ref()?;
    let importance = match j.level {
        Level::Low => return None,
        Level::Moderate => Importance::Medium,
        Level::High => Importance::High,
    };
    insight(
        "Jealousy",
        importance,
        format!("Jealous or possessive language is {}.", j.level),
    )
}

fn breadcrumbing(ctx: &Context<'_>) -> Option<KeyInsight> {
    let b = ctx.analyses.breadcrumbing.as_ref()?;
    if b.level != Level::High {
        return None;
    }
    insight(
        "Breadcrumbing",
        Importance::Medium,
        "Vague, noncommittal replies outnumber concrete plans.".to_string(),
    )
}

fn response_time(ctx: &Context<'_>) -> Option<KeyInsight> {
    let r = ctx.analyses.response_time.as_ref()?;
    if r.low_confidence || r.faster == Balance::Balanced {
        return None;
    }
    insight(
        "Response Time",
        Importance::Low,
        format!("{} reply noticeably faster.", ctx.name_of(r.faster)),
    )
}

fn strengths(ctx: &Context<'_>) -> Option<KeyInsight> {
    let trust = ctx.analyses.trust.as_ref()?;
    let toxicity = ctx.analyses.toxicity.as_ref()?;
    if trust.level != Level::High || toxicity.level != ToxicityLevel::None {
        return None;
    }
    insight(
        "Strengths",
        Importance::Low,
        "Trust is high and the conversation is free of hurtful language.".to_string(),
    )
}

fn address_toxicity(ctx: &Context<'_>) -> Option<Recommendation> {
    let t = ctx.analyses.toxicity.as_ref()?;
    if t.level < ToxicityLevel::Moderate {
        return None;
    }
    recommend(
        Importance::High,
        "Address hurtful language directly",
        format!(
            "Toxicity is {}. Name the specific messages that hurt and agree on what is off-limits; \
             if insults or threats continue, consider talking to someone you trust.",
            t.level
        ),
    )
}

fn candid_conversation(ctx: &Context<'_>) -> Option<Recommendation> {
    if ctx.health >= LOW_HEALTH {
        return None;
    }
    recommend(
        Importance::High,
        "Have a candid conversation about where things stand",
        format!(
            "Overall health is {:.0}/100. Talk about what each of you needs instead of reading into short replies.",
            ctx.health
        ),
    )
}

fn ghosting_check_in(ctx: &Context<'_>) -> Option<Recommendation> {
    let g = ctx.analyses.ghosting_risk.as_ref()?;
    if g.level != Level::High {
        return None;
    }
    recommend(
        Importance::High,
        "Check in once, then give space",
        "Send one clear, low-pressure message and wait for a reply rather than following up repeatedly."
            .to_string(),
    )
}

fn rebalance_effort(ctx: &Context<'_>) -> Option<Recommendation> {
    let d = ctx.analyses.double_text.as_ref()?;
    if d.investment_gap <= INVESTMENT_GAP {
        return None;
    }
    let details = match d.more_invested {
        Balance::You => format!(
            "You send most of the messages. Try waiting for {} to reply before sending another.",
            ctx.personalization.them()
        ),
        _ => format!(
            "{} send most of the messages. Matching their effort shows you're invested too.",
            ctx.personalization.them()
        ),
    };
    recommend(Importance::Medium, "Rebalance the effort", details)
}

fn deepen_engagement(ctx: &Context<'_>) -> Option<Recommendation> {
    let e = ctx.analyses.engagement.as_ref()?;
    if e.score >= LOW_ENGAGEMENT {
        return None;
    }
    recommend(
        Importance::Medium,
        "Invest in deeper conversations",
        format!(
            "Engagement is {:.0}/100. Ask open questions and share a little more than the minimum.",
            e.score
        ),
    )
}

fn conflict_repair(ctx: &Context<'_>) -> Option<Recommendation> {
    let c = ctx.analyses.conflict_style.as_ref()?;
    let harsh = |s: ConflictStyle| matches!(s, ConflictStyle::Aggressive | ConflictStyle::PassiveAggressive);
    if !harsh(c.styles.you) && !harsh(c.styles.them) {
        return None;
    }
    recommend(
        Importance::Medium,
        "Slow disagreements down",
        "Pause heated exchanges and come back with \"I feel\" statements instead of blame.".to_string(),
    )
}

fn validate_feelings(ctx: &Context<'_>) -> Option<Recommendation> {
    let v = ctx.analyses.validation.as_ref()?;
    if v.levels.you != Level::Low && v.levels.them != Level::Low {
        return None;
    }
    recommend(
        Importance::Low,
        "Acknowledge feelings before solving",
        "A short \"that makes sense\" before advice helps the other person feel heard.".to_string(),
    )
}

fn stated_goal(ctx: &Context<'_>) -> Option<Recommendation> {
    let goal = ctx.personalization.stated_goal.as_deref()?.trim();
    if goal.is_empty() {
        return None;
    }
    recommend(
        Importance::Low,
        "Keep your goal in view",
        format!("You said you want to {}. Use the insights above as a starting point.", goal),
    )
}

fn keep_strengths(ctx: &Context<'_>) -> Option<Recommendation> {
    if ctx.health < GOOD_HEALTH {
        return None;
    }
    recommend(
        Importance::Low,
        "Keep doing what works",
        format!(
            "Health is {:.0}/100. Keep the warmth and responsiveness that got you here.",
            ctx.health
        ),
    )
}

/// Fallback when no rule fires.
pub(super) fn keep_going() -> Recommendation {
    Recommendation {
        priority: Importance::Low,
        action: "Keep communicating openly".to_string(),
        details: "Nothing here calls for a change; keep checking in with each other.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::Analyses;
    use crate::types::{ConversationStats, Personalization};

    fn empty_stats() -> ConversationStats {
        ConversationStats {
            total_messages: 0,
            sent_messages: 0,
            received_messages: 0,
            start: None,
            end: None,
            average_length: 0.0,
            average_sent_length: 0.0,
            average_received_length: 0.0,
            timestamps_inferred: false,
        }
    }

    #[test]
    fn no_analyses_fires_only_goal_rule() {
        let analyses = Analyses::default();
        let stats = empty_stats();
        let personalization = Personalization {
            stated_goal: Some("reconnect".into()),
            ..Personalization::default()
        };
        let ctx = Context {
            analyses: &analyses,
            stats: &stats,
            personalization: &personalization,
            health: 50.0,
        };
        assert!(INSIGHTS.iter().all(|rule| rule(&ctx).is_none()));
        let recs: Vec<_> = RECOMMENDATIONS.iter().filter_map(|rule| rule(&ctx)).collect();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].action, "Keep your goal in view");
        assert!(recs[0].details.contains("reconnect"));
    }

    #[test]
    fn low_health_asks_for_candid_conversation() {
        let analyses = Analyses::default();
        let stats = empty_stats();
        let personalization = Personalization::default();
        let ctx = Context {
            analyses: &analyses,
            stats: &stats,
            personalization: &personalization,
            health: 20.0,
        };
        let rec = candid_conversation(&ctx).unwrap();
        assert_eq!(rec.priority, Importance::High);
        assert!(keep_strengths(&ctx).is_none());
    }
}
