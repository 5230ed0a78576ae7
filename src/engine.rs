//! Orchestrator: parse, run the analyzer registry, aggregate.
//!
//! A run walks `Idle → Parsing → Running(i) → Aggregating → Done`, or stops at `Failed`
//! when there is too little to analyze. Every step emits a [`Progress`] event through a
//! plain callback; the last event of a successful run is `"Complete"` at 1.0, and a failed
//! run closes with a `Failed` event named after the error.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::analyzers::{Analyses, Conversation, Registry};
use crate::config::{EngineConfig, ExecutionMode};
use crate::error::EngineError;
use crate::lexicon::Lexicon;
use crate::parsers;
use crate::report;
use crate::types::{ErrorKind, InputFormat, Personalization, Report};

/// Orchestrator state. `Running` carries the registry index of the current analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    Idle,
    Parsing,
    Running(usize),
    Aggregating,
    Done,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub stage: Stage,
    /// Human-readable step name, e.g. "Sentiment Analysis" or "Complete". A `Failed` event
    /// carries the error code instead, e.g. "insufficient_data"
    pub classifier: String,
    /// Monotonically increasing from 0.0 to 1.0
    pub fraction: f64,
}

/// Cooperative cancellation flag, checked between steps.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), EngineError> {
        if self.is_cancelled() {
            Err(EngineError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Progress bookkeeping for one run.
struct Run<'a> {
    stage: Stage,
    /// Fraction of the last event sent
    fraction: f64,
    /// parse + one step per analyzer + aggregate
    steps: usize,
    on_progress: &'a mut dyn FnMut(&Progress),
}

impl<'a> Run<'a> {
    fn new(analyzers: usize, on_progress: &'a mut dyn FnMut(&Progress)) -> Self {
        Self {
            stage: Stage::Idle,
            fraction: 0.0,
            steps: analyzers + 2,
            on_progress,
        }
    }

    fn enter(&mut self, stage: Stage, classifier: &str) {
        let fraction = match stage {
            Stage::Idle | Stage::Parsing => 0.0,
            Stage::Running(i) => (i + 1) as f64 / self.steps as f64,
            Stage::Aggregating => (self.steps - 1) as f64 / self.steps as f64,
            Stage::Done => 1.0,
            // a failed run stays where it stopped
            Stage::Failed => self.fraction,
        };
        tracing::debug!(?stage, classifier, fraction, "progress");
        self.stage = stage;
        self.fraction = fraction;
        (self.on_progress)(&Progress {
            stage,
            classifier: classifier.to_string(),
            fraction,
        });
    }

    /// Close the run with a `Failed` event and hand the error back.
    fn fail(&mut self, err: EngineError) -> EngineError {
        tracing::debug!(from = ?self.stage, error = err.code(), "run failed");
        self.enter(Stage::Failed, err.code());
        err
    }
}

/// Holds everything a run needs that can be built once: the compiled lexicon, the
/// analyzer registry and the engine knobs.
pub struct Engine {
    lexicon: Lexicon,
    registry: Registry,
    config: EngineConfig,
}

impl Engine {
    /// Validate `config` and load the lexicon it points at, or the built-in one.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let lexicon = match &config.lexicon_path {
            Some(path) => Lexicon::load_from_file(path)?,
            None => Lexicon::builtin()?,
        };
        Ok(Self::with_parts(lexicon, Registry::builtin(), config))
    }

    pub fn with_parts(lexicon: Lexicon, registry: Registry, config: EngineConfig) -> Self {
        Self {
            lexicon,
            registry,
            config,
        }
    }

    pub fn lexicon_version(&self) -> &str {
        self.lexicon.version()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the full pipeline over one transcript.
    ///
    /// Too few messages is not an error: it yields `Ok` with a failed report carrying the
    /// conversation stats. Unparseable input, group chats and cancellation are `Err`.
    pub fn analyze(
        &self,
        raw: &str,
        format: InputFormat,
        personalization: &Personalization,
        on_progress: &mut dyn FnMut(&Progress),
        cancel: &CancelToken,
    ) -> Result<Report, EngineError> {
        let mut run = Run::new(self.registry.len(), on_progress);
        tracing::info!(
            %format,
            bytes = raw.len(),
            lexicon = self.lexicon.version(),
            "analysis started"
        );

        cancel.check().map_err(|e| run.fail(e))?;
        run.enter(Stage::Parsing, "Parsing messages");
        let messages =
            parsers::parse(raw, format, personalization, &self.config).map_err(|e| run.fail(e))?;
        let stats = parsers::stats(&messages);

        if messages.len() < self.config.min_messages {
            let err = run.fail(EngineError::InsufficientData {
                found: messages.len(),
                required: self.config.min_messages,
            });
            tracing::info!(found = messages.len(), "not enough messages to analyze");
            return Ok(Report::failed(
                ErrorKind::InsufficientData,
                err.to_string(),
                Some(stats),
                personalization.clone(),
                self.lexicon.version().to_string(),
            ));
        }

        let conv = Conversation::new(&messages, &self.lexicon, &self.config);
        let analyses = self
            .run_analyzers(&conv, &mut run, cancel)
            .map_err(|e| run.fail(e))?;

        cancel.check().map_err(|e| run.fail(e))?;
        run.enter(Stage::Aggregating, "Generating insights");
        let aggregate = report::aggregate(&analyses, &stats, personalization);
        run.enter(Stage::Done, "Complete");

        tracing::info!(
            messages = stats.total_messages,
            health = aggregate.health_score,
            insights = aggregate.insights.len(),
            "analysis complete"
        );

        Ok(Report {
            success: true,
            error: None,
            error_kind: None,
            stats: Some(stats),
            health_score: Some(aggregate.health_score),
            analyses,
            summary: aggregate.summary,
            insights: aggregate.insights,
            recommendations: aggregate.recommendations,
            personalization: personalization.clone(),
            lexicon_version: self.lexicon.version().to_string(),
        })
    }

    fn run_analyzers(
        &self,
        conv: &Conversation<'_>,
        run: &mut Run<'_>,
        cancel: &CancelToken,
    ) -> Result<Analyses, EngineError> {
        let mut analyses = Analyses::default();
        match self.config.execution {
            ExecutionMode::Sequential => {
                for (i, analyzer) in self.registry.iter().enumerate() {
                    cancel.check()?;
                    run.enter(Stage::Running(i), analyzer.label());
                    analyses.insert(analyzer.analyze(conv));
                }
            }
            ExecutionMode::Parallel => {
                cancel.check()?;
                let results = self.registry.par_analyze(conv);
                cancel.check()?;
                for (i, (analyzer, result)) in self.registry.iter().zip(results).enumerate() {
                    run.enter(Stage::Running(i), analyzer.label());
                    analyses.insert(result);
                }
            }
        }
        Ok(analyses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHORT_CHAT: &str = "Me: hey, how was the interview?\nSam: it went great, thanks!\n";

    fn engine(execution: ExecutionMode) -> Engine {
        Engine::new(EngineConfig {
            execution,
            ..EngineConfig::default()
        })
        .unwrap()
    }

    fn collect(engine: &Engine, raw: &str) -> (Result<Report, EngineError>, Vec<Progress>) {
        let mut events = Vec::new();
        let result = engine.analyze(
            raw,
            InputFormat::Paste,
            &Personalization::default(),
            &mut |p: &Progress| events.push(p.clone()),
            &CancelToken::new(),
        );
        (result, events)
    }

    #[test]
    fn progress_is_monotonic_and_ends_complete() {
        let (report, events) = collect(&engine(ExecutionMode::Sequential), SHORT_CHAT);
        assert!(report.unwrap().success);
        assert_eq!(events.len(), Analyses::FIELD_COUNT + 3);
        assert!(events.windows(2).all(|w| w[0].fraction <= w[1].fraction));
        let last = events.last().unwrap();
        assert_eq!(last.classifier, "Complete");
        assert_eq!(last.fraction, 1.0);
        assert_eq!(last.stage, Stage::Done);
        assert_eq!(events[0].stage, Stage::Parsing);
        assert_eq!(events[1].stage, Stage::Running(0));
    }

    #[test]
    fn parallel_matches_sequential() {
        let (seq, seq_events) = collect(&engine(ExecutionMode::Sequential), SHORT_CHAT);
        let (par, par_events) = collect(&engine(ExecutionMode::Parallel), SHORT_CHAT);
        assert_eq!(seq.unwrap(), par.unwrap());
        assert_eq!(seq_events, par_events);
    }

    #[test]
    fn single_message_closes_with_a_failed_event() {
        let (report, events) = collect(&engine(ExecutionMode::Sequential), "Me: hello?\n");
        let report = report.unwrap();
        assert!(!report.success);
        assert_eq!(report.error_kind, Some(ErrorKind::InsufficientData));
        assert_eq!(report.stats.as_ref().map(|s| s.total_messages), Some(1));
        assert_eq!(report.analyses.defined(), 0);
        assert!(events.iter().all(|e| e.classifier != "Complete"));
        assert_eq!(events.len(), 2);
        let last = events.last().unwrap();
        assert_eq!(last.stage, Stage::Failed);
        assert_eq!(last.classifier, "insufficient_data");
        assert_eq!(last.fraction, 0.0);
    }

    #[test]
    fn cancelled_run_returns_no_report() {
        let engine = engine(ExecutionMode::Sequential);
        let cancel = CancelToken::new();
        let mut seen = 0;
        let token = cancel.clone();
        let result = engine.analyze(
            SHORT_CHAT,
            InputFormat::Paste,
            &Personalization::default(),
            &mut |_p: &Progress| {
                seen += 1;
                if seen == 3 {
                    token.cancel();
                }
            },
            &cancel,
        );
        assert!(matches!(result, Err(EngineError::Cancelled)));
        // two analyzer steps, then the failure
        assert_eq!(seen, 4);
    }

    #[test]
    fn empty_input_is_a_format_error() {
        let (result, events) = collect(&engine(ExecutionMode::Sequential), "   \n\n");
        assert!(matches!(result, Err(EngineError::Format { .. })));
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].stage, Stage::Failed);
        assert_eq!(events[1].classifier, "format");
    }
}
