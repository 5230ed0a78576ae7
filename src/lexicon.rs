//! Phrase tables shared by every analyzer.
//!
//! The tables are data (`lexicon/default.yaml`, embedded at build time) and can be
//! replaced from a file. Each category compiles into one alternation regex, so a message
//! is scanned once per category regardless of how many phrases the category holds, and
//! the whole transcript is scanned once per run (see [`crate::analyzers::Conversation`]).

use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::error::EngineError;

const BUILTIN_LEXICON: &str = include_str!("../lexicon/default.yaml");

/// Categories the built-in analyzers read. A replacement lexicon must define all of them.
pub const REQUIRED_CATEGORIES: &[&str] = &[
    "sentiment.positive.strong",
    "sentiment.positive.moderate",
    "sentiment.positive.weak",
    "sentiment.negative.strong",
    "sentiment.negative.moderate",
    "sentiment.negative.weak",
    "toxicity.severe",
    "toxicity.insult",
    "toxicity.hostile",
    "toxicity.gaslighting",
    "interest.high",
    "interest.low",
    "attachment.secure",
    "attachment.anxious",
    "attachment.avoidant",
    "attachment.disorganized",
    "love.words",
    "love.acts",
    "love.gifts",
    "love.time",
    "love.touch",
    "power.controlling",
    "power.submissive",
    "power.collaborative",
    "support.emotional",
    "support.practical",
    "support.dismissive",
    "feelings.inquiry",
    "validation.affirm",
    "validation.invalidate",
    "flags.manipulation",
    "flags.isolation",
    "vulnerability.disclosure",
    "availability.deflect",
    "trust.positive",
    "trust.negative",
    "jealousy.possessive",
    "jealousy.comparison",
    "jealousy.accusation",
    "future.plans",
    "future.commitment",
    "humor.laughter",
    "humor.playful",
    "growth.learning",
    "growth.fixed",
    "conflict.constructive",
    "conflict.avoidant",
    "conflict.aggressive",
    "conflict.passive_aggressive",
    "apology.any",
    "apology.conditional",
    "resentment.grievance",
    "resentment.scorekeeping",
    "boundary.setting",
    "boundary.respect",
    "boundary.violation",
    "ei.empathy",
    "ei.self_awareness",
    "listening.acknowledge",
    "memory.recall",
    "commitment.vague",
    "ghosting.exit",
];

/// Prefix shared by every topic category; topic diversity counts distinct matches.
pub const TOPIC_PREFIX: &str = "topics.";

#[derive(Debug, Clone, Deserialize)]
struct LexiconFile {
    version: String,
    categories: BTreeMap<String, CategorySpec>,
}

#[derive(Debug, Clone, Deserialize)]
struct CategorySpec {
    #[serde(default = "default_weight")]
    weight: f64,
    phrases: Vec<String>,
}

fn default_weight() -> f64 {
    1.0
}

#[derive(Debug)]
struct CompiledCategory {
    name: String,
    weight: f64,
    pattern: Regex,
}

/// Index of a category inside a compiled [`Lexicon`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CategoryId(usize);

/// Per-message hit counts, indexed by [`CategoryId`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hits(Vec<u32>);

impl Hits {
    pub fn get(&self, id: CategoryId) -> u32 {
        self.0.get(id.0).copied().unwrap_or(0)
    }
}

/// Compiled, immutable phrase tables.
#[derive(Debug)]
pub struct Lexicon {
    version: String,
    categories: Vec<CompiledCategory>,
    index: HashMap<String, CategoryId>,
}

impl Lexicon {
    /// The lexicon embedded in the binary.
    pub fn builtin() -> Result<Self, EngineError> {
        Self::from_yaml(BUILTIN_LEXICON)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EngineError::Lexicon(format!("failed to read '{}': {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, EngineError> {
        let file: LexiconFile = serde_yaml::from_str(content)
            .map_err(|e| EngineError::Lexicon(format!("invalid lexicon YAML: {}", e)))?;

        if file.version.trim().is_empty() {
            return Err(EngineError::Lexicon("lexicon version is empty".into()));
        }

        for required in REQUIRED_CATEGORIES {
            if !file.categories.contains_key(*required) {
                return Err(EngineError::Lexicon(format!(
                    "missing required category '{}'",
                    required
                )));
            }
        }

        let mut categories = Vec::with_capacity(file.categories.len());
        let mut index = HashMap::with_capacity(file.categories.len());

        for (name, spec) in file.categories {
            if !spec.weight.is_finite() || spec.weight < 0.0 {
                return Err(EngineError::Lexicon(format!(
                    "category '{}' has invalid weight {}",
                    name, spec.weight
                )));
            }
            let pattern = compile_phrases(&spec.phrases).map_err(|e| {
                EngineError::Lexicon(format!("category '{}': {}", name, e))
            })?;
            index.insert(name.clone(), CategoryId(categories.len()));
            categories.push(CompiledCategory {
                name,
                weight: spec.weight,
                pattern,
            });
        }

        tracing::debug!(
            version = %file.version,
            categories = categories.len(),
            "lexicon compiled"
        );

        Ok(Self {
            version: file.version,
            categories,
            index,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn id(&self, name: &str) -> Option<CategoryId> {
        self.index.get(name).copied()
    }

    pub fn weight(&self, id: CategoryId) -> f64 {
        self.categories.get(id.0).map(|c| c.weight).unwrap_or(0.0)
    }

    /// Category ids whose name starts with `prefix`, in name order.
    pub fn ids_with_prefix(&self, prefix: &str) -> Vec<CategoryId> {
        self.categories
            .iter()
            .enumerate()
            .filter(|(_, c)| c.name.starts_with(prefix))
            .map(|(i, _)| CategoryId(i))
            .collect()
    }

    pub fn name(&self, id: CategoryId) -> &str {
        self.categories
            .get(id.0)
            .map(|c| c.name.as_str())
            .unwrap_or("")
    }

    /// Count hits of every category in one message.
    pub fn scan(&self, text: &str) -> Hits {
        let normalized = normalize(text);
        Hits(
            self.categories
                .iter()
                .map(|c| c.pattern.find_iter(&normalized).count() as u32)
                .collect(),
        )
    }
}

/// Lower-case and fold typographic quotes so "I’m" matches "i'm".
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .replace(['\u{2019}', '\u{2018}'], "'")
        .replace(['\u{201c}', '\u{201d}'], "\"")
}

/// Build one alternation for a phrase list. Longer phrases go first so the leftmost match
/// is also the longest; word boundaries are only added next to word characters so emoji
/// and punctuation-terminated phrases still match.
fn compile_phrases(phrases: &[String]) -> Result<Regex, regex::Error> {
    let mut cleaned: Vec<String> = phrases
        .iter()
        .map(|p| normalize(p.trim()))
        .filter(|p| !p.is_empty())
        .collect();
    cleaned.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
    cleaned.dedup();

    if cleaned.is_empty() {
        // Matches nothing.
        return Regex::new(r"\b\B");
    }

    let alternatives: Vec<String> = cleaned
        .iter()
        .map(|p| {
            let starts_word = p.chars().next().is_some_and(is_word_char);
            let ends_word = p.chars().last().is_some_and(is_word_char);
            format!(
                "{}{}{}",
                if starts_word { r"\b" } else { "" },
                regex::escape(p),
                if ends_word { r"\b" } else { "" }
            )
        })
        .collect();

    Regex::new(&alternatives.join("|"))
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lexicon_compiles_with_all_required_categories() {
        let lexicon = Lexicon::builtin().unwrap();
        for name in REQUIRED_CATEGORIES {
            assert!(lexicon.id(name).is_some(), "missing {}", name);
        }
        assert!(!lexicon.ids_with_prefix(TOPIC_PREFIX).is_empty());
    }

    #[test]
    fn phrases_respect_word_boundaries() {
        let lexicon = Lexicon::builtin().unwrap();
        let hate = lexicon.id("sentiment.negative.strong").unwrap();
        assert_eq!(lexicon.scan("I hate mondays").get(hate), 1);
        assert_eq!(lexicon.scan("whatever, chateau").get(hate), 0);
    }

    #[test]
    fn emoji_match_without_boundaries() {
        let lexicon = Lexicon::builtin().unwrap();
        let laughter = lexicon.id("humor.laughter").unwrap();
        assert_eq!(lexicon.scan("that was great😂😂").get(laughter), 2);
    }

    #[test]
    fn curly_apostrophes_are_folded() {
        let lexicon = Lexicon::builtin().unwrap();
        let support = lexicon.id("support.emotional").unwrap();
        assert!(lexicon.scan("I’m here for you").get(support) >= 1);
    }

    #[test]
    fn missing_required_category_is_rejected() {
        let yaml = "version: \"1\"\ncategories:\n  sentiment.positive.strong:\n    phrases: [great]\n";
        let err = Lexicon::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("missing required category"));
    }

    #[test]
    fn empty_phrase_list_matches_nothing() {
        let pattern = compile_phrases(&[]).unwrap();
        assert!(!pattern.is_match("anything at all"));
    }
}
