#![allow(dead_code)]

use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

use chat_dynamics::{
    CancelToken, Engine, EngineConfig, InputFormat, Personalization, Progress, Report,
};

/// Build a freeform transcript, one `Name: text` line per message.
pub fn transcript(lines: &[(&str, &str)]) -> String {
    lines
        .iter()
        .map(|(sender, text)| format!("{}: {}\n", sender, text))
        .collect()
}

/// Build a transcript with `[YYYY-MM-DD HH:MM]` stamps at minute offsets from 2024-03-01 08:00.
pub fn timed_transcript(lines: &[(&str, &str, i64)]) -> String {
    let base = chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap();
    lines
        .iter()
        .map(|(sender, text, minutes)| {
            let ts = base + chrono::Duration::minutes(*minutes);
            format!("[{}] {}: {}\n", ts.format("%Y-%m-%d %H:%M"), sender, text)
        })
        .collect()
}

pub fn engine() -> Engine {
    Engine::new(EngineConfig::default()).unwrap()
}

/// Run the default engine over a pasted transcript, discarding progress.
pub fn analyze(raw: &str, personalization: &Personalization) -> Report {
    engine()
        .analyze(
            raw,
            InputFormat::Paste,
            personalization,
            &mut |_p: &Progress| {},
            &CancelToken::new(),
        )
        .unwrap()
}

pub fn as_you(name: &str) -> Personalization {
    Personalization {
        your_name: Some(name.to_string()),
        ..Personalization::default()
    }
}

/// Write `content` into a fresh temp dir and return (dir, path).
pub fn write_temp(name: &str, content: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join(name);
    std::fs::write(&path, content).unwrap();
    (tmp, path)
}

#[allow(deprecated)]
pub fn cli() -> Command {
    let mut cmd = Command::cargo_bin("chat-dynamics").unwrap();
    cmd.env("RUST_LOG", "off");
    cmd
}
