/// End-to-end runs of the engine over small transcripts.
mod helpers;

use chat_dynamics::analyzers::attachment::AttachmentStyle;
use chat_dynamics::analyzers::sentiment::Polarity;
use chat_dynamics::analyzers::Analyses;
use chat_dynamics::types::{ErrorKind, Importance};
use chat_dynamics::{CancelToken, EngineError, InputFormat, Personalization, Progress, Stage};

use helpers::{analyze, as_you, engine, timed_transcript, transcript};

fn one_sided() -> String {
    transcript(&[
        ("Me", "i love you"),
        ("Sam", "stop texting so much"),
        ("Me", "thank you"),
        ("Sam", "whatever"),
        ("Me", "i love you"),
        ("Sam", "stop texting so much"),
        ("Me", "thank you"),
        ("Sam", "whatever"),
        ("Me", "i love you"),
        ("Sam", "stop texting so much"),
    ])
}

// ============================================================
// Scenario: warm sender, dismissive counterpart
// ============================================================

#[test]
fn one_sided_warmth_reads_positive_versus_negative() {
    let report = analyze(&one_sided(), &Personalization::default());
    assert!(report.success);

    let sentiment = report.analyses.sentiment.as_ref().unwrap();
    assert_eq!(sentiment.polarity.you, Polarity::Positive);
    assert_eq!(sentiment.polarity.them, Polarity::Negative);
}

#[test]
fn one_sided_warmth_tags_attachment_styles() {
    let report = analyze(&one_sided(), &Personalization::default());
    let attachment = report.analyses.attachment.as_ref().unwrap();
    assert_eq!(attachment.profiles.you.primary, AttachmentStyle::Secure);
    assert_eq!(attachment.profiles.them.primary, AttachmentStyle::Avoidant);
    assert!(attachment.profiles.them.avoidant >= 5);
    assert!(attachment.summary.contains("avoidant"));
}

#[test]
fn one_sided_warmth_keeps_health_below_sixty() {
    let report = analyze(&one_sided(), &Personalization::default());
    let health = report.health_score.unwrap();
    assert!(health < 60.0, "health {} should be below 60", health);
}

// ============================================================
// Scenario: four in a row, one reply
// ============================================================

#[test]
fn four_unanswered_messages_form_one_streak() {
    let raw = transcript(&[
        ("Me", "hey"),
        ("Me", "you there?"),
        ("Me", "hello"),
        ("Me", "ok call me later"),
        ("Sam", "sorry, was asleep"),
    ]);
    let report = analyze(&raw, &Personalization::default());
    let double = report.analyses.double_text.as_ref().unwrap();
    assert_eq!(double.streaks.you.total, 1);
    assert_eq!(double.streaks.you.quad_plus, 1);
    assert_eq!(double.streaks.them.total, 0);
    assert_eq!(double.longest_streak, 4);

    let investment = report
        .insights
        .iter()
        .find(|i| i.category == "Investment Level")
        .expect("investment insight");
    assert_eq!(investment.importance, Importance::High);
    assert_eq!(report.insights[0].importance, Importance::High);
}

// ============================================================
// Boundary: 1 vs 2 messages
// ============================================================

#[test]
fn one_message_is_insufficient_data() {
    let mut events = Vec::new();
    let report = engine()
        .analyze(
            &transcript(&[("Me", "hi")]),
            InputFormat::Paste,
            &Personalization::default(),
            &mut |p: &Progress| events.push(p.clone()),
            &CancelToken::new(),
        )
        .unwrap();
    let last = events.last().expect("progress events");
    assert_eq!(last.stage, Stage::Failed);
    assert_eq!(last.classifier, "insufficient_data");
    assert!(!report.success);
    assert_eq!(report.error_kind, Some(ErrorKind::InsufficientData));
    assert!(report.error.as_deref().unwrap().contains("found 1"));
    assert_eq!(report.analyses, Analyses::default());
    assert!(report.health_score.is_none());
    assert!(report.insights.is_empty());
}

#[test]
fn two_messages_define_every_analyzer() {
    let report = analyze(
        &transcript(&[("Me", "hi"), ("Sam", "hey")]),
        &Personalization::default(),
    );
    assert!(report.success);
    assert_eq!(report.analyses.defined(), Analyses::FIELD_COUNT);
    assert!(!report.summary.is_empty());
}

// ============================================================
// Errors
// ============================================================

#[test]
fn group_chat_is_rejected() {
    let raw = transcript(&[("Ann", "hi"), ("Bo", "hey"), ("Cy", "yo")]);
    let err = engine()
        .analyze(
            &raw,
            InputFormat::Paste,
            &Personalization::default(),
            &mut |_p: &Progress| {},
            &CancelToken::new(),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::UnsupportedParticipantCount { count: 3, .. }
    ));
}

#[test]
fn prose_without_speakers_is_a_format_error() {
    let err = engine()
        .analyze(
            "just some notes\nwithout any names",
            InputFormat::Paste,
            &Personalization::default(),
            &mut |_p: &Progress| {},
            &CancelToken::new(),
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::Format { .. }));
}

// ============================================================
// Determinism and personalization
// ============================================================

#[test]
fn identical_input_gives_identical_json() {
    let raw = timed_transcript(&[
        ("Alex", "morning! how did you sleep?", 0),
        ("Sam", "ok. busy day", 12),
        ("Alex", "good luck with the meeting", 14),
        ("Sam", "thanks, you're the best", 240),
        ("Alex", "dinner tonight?", 600),
    ]);
    let p = as_you("Alex");
    let a = serde_json::to_string(&analyze(&raw, &p)).unwrap();
    let b = serde_json::to_string(&analyze(&raw, &p)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn declared_name_decides_direction_and_is_echoed() {
    let raw = timed_transcript(&[
        ("Alex", "hey", 0),
        ("Sam", "hi", 5),
        ("Alex", "how are you", 6),
    ]);
    let personalization = Personalization {
        your_name: Some("Sam".into()),
        counterpart_name: Some("Alex".into()),
        stated_goal: Some("understand the silence".into()),
    };
    let report = analyze(&raw, &personalization);
    let stats = report.stats.as_ref().unwrap();
    assert_eq!(stats.sent_messages, 1);
    assert_eq!(stats.received_messages, 2);
    assert_eq!(report.personalization, personalization);
    assert!(report.summary.starts_with("Sam and Alex exchanged 3 messages"));
    assert!(report
        .recommendations
        .iter()
        .any(|r| r.details.contains("understand the silence")));
}

#[test]
fn missing_timestamps_mark_timing_low_confidence() {
    let raw = transcript(&[("Me", "hey"), ("Sam", "hi"), ("Me", "what's up")]);
    let report = analyze(&raw, &Personalization::default());
    assert!(report.stats.as_ref().unwrap().timestamps_inferred);
    let response = report.analyses.response_time.as_ref().unwrap();
    assert!(response.low_confidence);
    assert_eq!(response.score, 50.0);
}
