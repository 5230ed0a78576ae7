//! Engine error taxonomy.

use thiserror::Error;

use crate::types::{ErrorKind, Personalization, Report};

#[derive(Debug, Error)]
pub enum EngineError {
    /// No message boundaries could be detected at all.
    #[error("no messages could be detected in {format} input")]
    Format { format: String },

    /// Fewer messages than the engine needs to say anything meaningful.
    #[error("not enough messages to analyze: found {found}, need at least {required}")]
    InsufficientData { found: usize, required: usize },

    /// Group chats are not supported.
    #[error("expected a two-person conversation, found {count} senders: {}", senders.join(", "))]
    UnsupportedParticipantCount { count: usize, senders: Vec<String> },

    #[error("analysis cancelled")]
    Cancelled,

    #[error("lexicon error: {0}")]
    Lexicon(String),

    #[error("config error: {0}")]
    Config(String),
}

impl EngineError {
    /// Report-level classification, for errors a UI can render as a failed report.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            EngineError::Format { .. } => Some(ErrorKind::Format),
            EngineError::InsufficientData { .. } => Some(ErrorKind::InsufficientData),
            EngineError::UnsupportedParticipantCount { .. } => {
                Some(ErrorKind::UnsupportedParticipantCount)
            }
            EngineError::Cancelled | EngineError::Lexicon(_) | EngineError::Config(_) => None,
        }
    }

    /// Stable snake_case name, carried by the closing progress event of a failed run.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Format { .. } => "format",
            EngineError::InsufficientData { .. } => "insufficient_data",
            EngineError::UnsupportedParticipantCount { .. } => "unsupported_participant_count",
            EngineError::Cancelled => "cancelled",
            EngineError::Lexicon(_) => "lexicon",
            EngineError::Config(_) => "config",
        }
    }
}

impl Report {
    /// Failure report for callers that always want a `Report`. Returns `None` for
    /// cancellation and setup errors, which have no report form.
    pub fn from_error(
        err: &EngineError,
        personalization: Personalization,
        lexicon_version: &str,
    ) -> Option<Self> {
        let kind = err.kind()?;
        Some(Report::failed(
            kind,
            err.to_string(),
            None,
            personalization,
            lexicon_version.to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participant_error_lists_senders() {
        let err = EngineError::UnsupportedParticipantCount {
            count: 3,
            senders: vec!["Ann".into(), "Bo".into(), "Cy".into()],
        };
        assert_eq!(
            err.to_string(),
            "expected a two-person conversation, found 3 senders: Ann, Bo, Cy"
        );
    }

    #[test]
    fn cancelled_has_no_report_form() {
        assert!(Report::from_error(&EngineError::Cancelled, Personalization::default(), "1").is_none());
    }

    #[test]
    fn format_error_becomes_failed_report() {
        let err = EngineError::Format { format: "paste".into() };
        let report = Report::from_error(&err, Personalization::default(), "1").unwrap();
        assert!(!report.success);
        assert_eq!(report.error_kind, Some(ErrorKind::Format));
        assert!(report.analyses.sentiment.is_none());
    }
}
