//! Deterministic relationship communication analysis for two-party chat transcripts.
//!
//! Raw text goes through [`parsers`], every analyzer in [`analyzers::Registry`] scores the
//! parsed conversation, and [`report`] ranks the findings. [`engine::Engine`] runs the
//! whole pipeline with progress callbacks and cooperative cancellation.

pub mod analyzers;
pub mod config;
pub mod engine;
pub mod error;
pub mod lexicon;
pub mod parsers;
pub mod report;
pub mod types;

pub use config::{EngineConfig, ExecutionMode};
pub use engine::{CancelToken, Engine, Progress, Stage};
pub use error::EngineError;
pub use types::{InputFormat, Personalization, Report};
