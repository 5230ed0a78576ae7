use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::EngineError;

/// How the orchestrator evaluates the analyzer registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// One analyzer at a time, progress emitted live
    #[default]
    Sequential,
    /// Rayon parallel map, progress buffered and emitted in registry order
    Parallel,
}

impl std::str::FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sequential" => Ok(ExecutionMode::Sequential),
            "parallel" => Ok(ExecutionMode::Parallel),
            _ => Err(format!(
                "invalid execution mode '{}': expected sequential or parallel",
                s
            )),
        }
    }
}

/// Engine-level knobs. Analyzer weights and cut points are named constants inside each
/// analyzer; this only holds what a deployment may reasonably tune.
/// Load from YAML via `--config <path>`, print the template with `--print-defaults`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct EngineConfig {
    /// Fewer parsed messages than this yields a failed report
    pub min_messages: usize,
    /// Silence (minutes) after which the next message counts as starting a new conversation
    pub initiation_gap_minutes: i64,
    pub execution: ExecutionMode,
    /// Replace the built-in lexicon with this YAML file
    pub lexicon_path: Option<PathBuf>,
    /// Sender labels that always mean the analysis subject
    pub self_aliases: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_messages: 2,
            initiation_gap_minutes: 120,
            execution: ExecutionMode::Sequential,
            lexicon_path: None,
            self_aliases: vec!["me".into(), "you".into(), "i".into()],
        }
    }
}

impl EngineConfig {
    /// Load from a YAML file, falling back to defaults for any missing field.
    pub fn load_from_file(path: &Path) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EngineError::Config(format!("failed to read config '{}': {}", path.display(), e))
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| {
            EngineError::Config(format!("invalid config YAML '{}': {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Default config as YAML (for --print-defaults).
    pub fn defaults_yaml() -> Result<String, EngineError> {
        serde_yaml::to_string(&Self::default())
            .map_err(|e| EngineError::Config(format!("failed to serialize defaults: {}", e)))
    }

    /// Apply individual CLI overrides on top of the current config.
    pub fn apply_overrides(
        &mut self,
        min_messages: Option<usize>,
        initiation_gap_minutes: Option<i64>,
        execution: Option<ExecutionMode>,
        lexicon_path: Option<PathBuf>,
    ) {
        if let Some(v) = min_messages {
            self.min_messages = v;
        }
        if let Some(v) = initiation_gap_minutes {
            self.initiation_gap_minutes = v;
        }
        if let Some(v) = execution {
            self.execution = v;
        }
        if let Some(v) = lexicon_path {
            self.lexicon_path = Some(v);
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.min_messages < 2 {
            return Err(EngineError::Config(format!(
                "min_messages must be at least 2, got {}",
                self.min_messages
            )));
        }
        if self.initiation_gap_minutes <= 0 {
            return Err(EngineError::Config(format!(
                "initiation_gap_minutes must be positive, got {}",
                self.initiation_gap_minutes
            )));
        }
        Ok(())
    }

    pub fn is_self_alias(&self, sender: &str) -> bool {
        let sender = sender.trim().to_lowercase();
        self.self_aliases.iter().any(|a| a.to_lowercase() == sender)
    }
}
