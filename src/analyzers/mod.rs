pub mod attachment;
pub mod conflict;
pub mod connection;
pub mod consistency;
pub mod context;
pub mod double_text;
pub mod emotional;
pub mod engagement;
pub mod flags;
pub mod initiation;
pub mod jealousy;
pub mod love_language;
pub mod power;
pub mod response_time;
pub mod scoring;
pub mod sentiment;
pub mod support;
pub mod topics;
pub mod toxicity;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

pub use context::Conversation;
pub use scoring::{Balance, Level, Pair};

use attachment::{AttachmentAnalyzer, AttachmentResult};
use conflict::{
    ApologyAnalyzer, ApologyResult, BoundaryRespectAnalyzer, BoundaryRespectResult,
    ConflictStyleAnalyzer, ConflictStyleResult, ResentmentAnalyzer, ResentmentResult,
};
use connection::{
    AffectionAnalyzer, AffectionResult, FuturePlanningAnalyzer, FuturePlanningResult,
    GrowthMindsetAnalyzer, GrowthMindsetResult, HumorAnalyzer, HumorResult, TrustAnalyzer,
    TrustResult,
};
use consistency::{
    BreadcrumbingAnalyzer, BreadcrumbingResult, ConsistencyAnalyzer, ConsistencyResult,
    GhostingRiskAnalyzer, GhostingRiskResult,
};
use double_text::{DoubleTextAnalyzer, DoubleTextResult};
use emotional::{
    EmotionalAvailabilityAnalyzer, EmotionalAvailabilityResult, EmotionalIntelligenceAnalyzer,
    EmotionalIntelligenceResult, EmotionalLaborAnalyzer, EmotionalLaborResult,
    VulnerabilityAnalyzer, VulnerabilityResult,
};
use engagement::{EngagementAnalyzer, EngagementResult, InterestAnalyzer, InterestResult};
use flags::{FlagsAnalyzer, FlagsResult};
use initiation::{InitiationAnalyzer, InitiationResult};
use jealousy::{JealousyAnalyzer, JealousyResult};
use love_language::{LoveLanguageAnalyzer, LoveLanguageResult};
use power::{PowerAnalyzer, PowerResult};
use response_time::{ResponseTimeAnalyzer, ResponseTimeResult};
use sentiment::{SentimentAnalyzer, SentimentResult};
use support::{
    ListeningAnalyzer, ListeningResult, MemoryAnalyzer, MemoryResult, SupportQualityAnalyzer,
    SupportQualityResult, ValidationAnalyzer, ValidationResult,
};
use topics::{TopicDiversityAnalyzer, TopicDiversityResult};
use toxicity::{ToxicityAnalyzer, ToxicityResult};

/// A pure scoring pass over one conversation.
///
/// Implementations hold no state between calls and must return a neutral result, never
/// panic, when a partition is empty or the input is degenerate.
pub trait Analyzer: Send + Sync {
    /// Stable key; matches the report field the result lands in.
    fn id(&self) -> &'static str;
    /// Human-readable name used in progress events.
    fn label(&self) -> &'static str;
    fn analyze(&self, conv: &Conversation<'_>) -> AnalysisResult;
}

/// Declares the result enum and the report's per-analyzer fields from one list so the
/// two can't drift apart.
macro_rules! analyses {
    ($($field:ident: $variant:ident($result:ty)),+ $(,)?) => {
        /// Output of one analyzer.
        #[derive(Debug, Clone, PartialEq, Serialize)]
        #[serde(untagged)]
        pub enum AnalysisResult {
            $($variant($result)),+
        }

        /// Every analyzer's result. All `None` on a failed report.
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct Analyses {
            $(pub $field: Option<$result>,)+
        }

        impl Analyses {
            pub const FIELD_COUNT: usize = [$(stringify!($field)),+].len();

            pub fn insert(&mut self, result: AnalysisResult) {
                match result {
                    $(AnalysisResult::$variant(r) => self.$field = Some(r),)+
                }
            }

            /// Number of populated fields.
            pub fn defined(&self) -> usize {
                [$(self.$field.is_some()),+].iter().filter(|d| **d).count()
            }
        }
    };
}

analyses! {
    sentiment: Sentiment(SentimentResult),
    toxicity: Toxicity(ToxicityResult),
    engagement: Engagement(EngagementResult),
    double_text: DoubleText(DoubleTextResult),
    response_time: ResponseTime(ResponseTimeResult),
    apology: Apology(ApologyResult),
    attachment: Attachment(AttachmentResult),
    love_language: LoveLanguage(LoveLanguageResult),
    power: Power(PowerResult),
    emotional_labor: EmotionalLabor(EmotionalLaborResult),
    breadcrumbing: Breadcrumbing(BreadcrumbingResult),
    interest: Interest(InterestResult),
    flags: Flags(FlagsResult),
    vulnerability: Vulnerability(VulnerabilityResult),
    trust: Trust(TrustResult),
    jealousy: Jealousy(JealousyResult),
    future_planning: FuturePlanning(FuturePlanningResult),
    humor: Humor(HumorResult),
    topic_diversity: TopicDiversity(TopicDiversityResult),
    consistency: Consistency(ConsistencyResult),
    ghosting_risk: GhostingRisk(GhostingRiskResult),
    emotional_availability: EmotionalAvailability(EmotionalAvailabilityResult),
    conflict_style: ConflictStyle(ConflictStyleResult),
    affection: Affection(AffectionResult),
    resentment: Resentment(ResentmentResult),
    boundary_respect: BoundaryRespect(BoundaryRespectResult),
    emotional_intelligence: EmotionalIntelligence(EmotionalIntelligenceResult),
    listening: Listening(ListeningResult),
    memory: Memory(MemoryResult),
    initiation: Initiation(InitiationResult),
    support_quality: SupportQuality(SupportQualityResult),
    validation: Validation(ValidationResult),
    growth_mindset: GrowthMindset(GrowthMindsetResult),
}

/// Fixed, ordered analyzer list. Order drives progress events only; results don't depend
/// on it.
pub struct Registry {
    analyzers: Vec<Box<dyn Analyzer>>,
}

impl Registry {
    pub fn new(analyzers: Vec<Box<dyn Analyzer>>) -> Self {
        Self { analyzers }
    }

    /// All built-in analyzers in declared order.
    pub fn builtin() -> Self {
        Self::new(vec![
            Box::new(SentimentAnalyzer),
            Box::new(ToxicityAnalyzer),
            Box::new(EngagementAnalyzer),
            Box::new(DoubleTextAnalyzer),
            Box::new(ResponseTimeAnalyzer),
            Box::new(ApologyAnalyzer),
            Box::new(AttachmentAnalyzer),
            Box::new(LoveLanguageAnalyzer),
            Box::new(PowerAnalyzer),
            Box::new(EmotionalLaborAnalyzer),
            Box::new(BreadcrumbingAnalyzer),
            Box::new(InterestAnalyzer),
            Box::new(FlagsAnalyzer),
            Box::new(VulnerabilityAnalyzer),
            Box::new(TrustAnalyzer),
            Box::new(JealousyAnalyzer),
            Box::new(FuturePlanningAnalyzer),
            Box::new(HumorAnalyzer),
            Box::new(TopicDiversityAnalyzer),
            Box::new(ConsistencyAnalyzer),
            Box::new(GhostingRiskAnalyzer),
            Box::new(EmotionalAvailabilityAnalyzer),
            Box::new(ConflictStyleAnalyzer),
            Box::new(AffectionAnalyzer),
            Box::new(ResentmentAnalyzer),
            Box::new(BoundaryRespectAnalyzer),
            Box::new(EmotionalIntelligenceAnalyzer),
            Box::new(ListeningAnalyzer),
            Box::new(MemoryAnalyzer),
            Box::new(InitiationAnalyzer),
            Box::new(SupportQualityAnalyzer),
            Box::new(ValidationAnalyzer),
            Box::new(GrowthMindsetAnalyzer),
        ])
    }

    pub fn len(&self) -> usize {
        self.analyzers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.analyzers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Analyzer> {
        self.analyzers.iter().map(|a| a.as_ref())
    }

    /// Evaluate every analyzer on the rayon pool. Results come back in registry order.
    pub fn par_analyze(&self, conv: &Conversation<'_>) -> Vec<AnalysisResult> {
        self.analyzers.par_iter().map(|a| a.analyze(conv)).collect()
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.iter().map(|a| a.id()).collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn registry_covers_every_report_field_once() {
        let registry = Registry::builtin();
        assert_eq!(registry.len(), Analyses::FIELD_COUNT);
        let ids: HashSet<&str> = registry.ids().into_iter().collect();
        assert_eq!(ids.len(), registry.len());
    }

    #[test]
    fn registry_ids_match_report_keys() {
        let value = serde_json::to_value(Analyses::default()).unwrap();
        let keys: HashSet<String> = value.as_object().unwrap().keys().cloned().collect();
        for id in Registry::builtin().ids() {
            assert!(keys.contains(id), "no report field for analyzer '{}'", id);
        }
    }
}
