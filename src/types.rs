use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analyzers::Analyses;

/// Who authored a message, relative to the analysis subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Written by the analysis subject ("you").
    Sent,
    /// Written by the counterpart ("them").
    Received,
}

impl Direction {
    pub fn flip(self) -> Self {
        match self {
            Direction::Sent => Direction::Received,
            Direction::Received => Direction::Sent,
        }
    }
}

/// Raw input shape handed over by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// Freeform pasted chat log
    Paste,
    /// Structured export (line-oriented chat export or CSV)
    File,
    /// OCR-extracted screenshot text
    Screenshot,
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputFormat::Paste => write!(f, "paste"),
            InputFormat::File => write!(f, "file"),
            InputFormat::Screenshot => write!(f, "screenshot"),
        }
    }
}

impl std::str::FromStr for InputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "paste" => Ok(InputFormat::Paste),
            "file" => Ok(InputFormat::File),
            "screenshot" => Ok(InputFormat::Screenshot),
            _ => Err(format!(
                "invalid format '{}': expected paste, file, or screenshot",
                s
            )),
        }
    }
}

/// Caller-supplied names and goal, echoed back in the report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Personalization {
    pub your_name: Option<String>,
    pub counterpart_name: Option<String>,
    pub stated_goal: Option<String>,
}

impl Personalization {
    /// Display name for the analysis subject
    pub fn you(&self) -> &str {
        self.your_name.as_deref().unwrap_or("You")
    }

    /// Display name for the counterpart
    pub fn them(&self) -> &str {
        self.counterpart_name.as_deref().unwrap_or("Them")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedMessage {
    pub content: String,
    pub direction: Direction,
    /// Sender label as it appeared in the source
    pub sender: String,
    pub timestamp: DateTime<Utc>,
    /// True when `timestamp` is a synthesized placeholder
    pub timestamp_inferred: bool,
    /// Character count of `content`
    pub length: usize,
    /// Seconds since the previous message in the full sequence. `None` for the first
    /// message and whenever either endpoint timestamp was synthesized.
    pub time_since_last: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationStats {
    pub total_messages: usize,
    pub sent_messages: usize,
    pub received_messages: usize,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub average_length: f64,
    pub average_sent_length: f64,
    pub average_received_length: f64,
    /// At least one timestamp was synthesized; time-based metrics are low confidence
    pub timestamps_inferred: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Importance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Importance::Low => write!(f, "low"),
            Importance::Medium => write!(f, "medium"),
            Importance::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyInsight {
    pub category: String,
    pub insight: String,
    pub importance: Importance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub priority: Importance,
    pub action: String,
    pub details: String,
}

/// Machine-readable failure classification for a non-successful report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InsufficientData,
    Format,
    UnsupportedParticipantCount,
}

/// Terminal output of an analysis run. Callers must check `success` before reading
/// analyzer fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub success: bool,
    pub error: Option<String>,
    pub error_kind: Option<ErrorKind>,
    pub stats: Option<ConversationStats>,
    pub health_score: Option<f64>,
    pub analyses: Analyses,
    pub summary: String,
    pub insights: Vec<KeyInsight>,
    pub recommendations: Vec<Recommendation>,
    pub personalization: Personalization,
    pub lexicon_version: String,
}

impl Report {
    /// Failure form: no analyzer fields, no insights.
    pub fn failed(
        kind: ErrorKind,
        error: String,
        stats: Option<ConversationStats>,
        personalization: Personalization,
        lexicon_version: String,
    ) -> Self {
        Self {
            success: false,
            error: Some(error),
            error_kind: Some(kind),
            stats,
            health_score: None,
            analyses: Analyses::default(),
            summary: String::new(),
            insights: Vec::new(),
            recommendations: Vec::new(),
            personalization,
            lexicon_version,
        }
    }
}
