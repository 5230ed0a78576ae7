/// Properties that must hold for any two-party transcript: score bounds, symmetry under a
/// direction swap, neutrality when both sides write the same thing, and determinism.
mod helpers;

use proptest::prelude::*;
use serde_json::Value;

use chat_dynamics::analyzers::scoring::{compare, Balance, Pair};
use helpers::{analyze, as_you, timed_transcript};

const PHRASES: &[&str] = &[
    "i love you",
    "thank you so much!",
    "whatever",
    "stop texting so much",
    "haha you're funny 😂",
    "how was work?",
    "i'm sorry, that's on me",
    "sorry but you started it",
    "we should plan a trip next month",
    "busy, ttyl",
    "i trust you",
    "are you lying?",
    "you never listen",
    "i hear you, that makes sense",
    "k",
    "you're mine",
    "i'll work on it",
    "how did the dentist go? you mentioned you were nervous",
    "you're stupid",
    "dinner tonight?",
];

fn conversation() -> impl Strategy<Value = Vec<(bool, usize, i64)>> {
    prop::collection::vec((any::<bool>(), 0..PHRASES.len(), 1i64..400), 2..14)
}

fn build(lines: &[(bool, usize, i64)]) -> String {
    let mut minute = 0;
    let timed: Vec<(&str, &str, i64)> = lines
        .iter()
        .map(|(alex, phrase, gap)| {
            minute += gap;
            (if *alex { "Alex" } else { "Sam" }, PHRASES[*phrase], minute)
        })
        .collect();
    timed_transcript(&timed)
}

/// Every number under a `score`, `scores` or `*Score` key lies in [0, 100].
fn check_bounds(value: &Value, in_score: bool, path: &str) {
    match value {
        Value::Number(n) if in_score => {
            let x = n.as_f64().unwrap();
            assert!((0.0..=100.0).contains(&x), "{} = {} out of bounds", path, x);
        }
        Value::Object(map) => {
            for (k, v) in map {
                let scored = in_score || k == "score" || k == "scores" || k.ends_with("Score");
                check_bounds(v, scored, &format!("{}.{}", path, k));
            }
        }
        Value::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                check_bounds(v, in_score, &format!("{}[{}]", path, i));
            }
        }
        _ => {}
    }
}

/// Mirror a report fragment: swap every you/them pair and every "you"/"them" balance
/// value. Free-text summaries are dropped since they name sides in prose.
fn mirror(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = serde_json::Map::new();
            for (k, v) in map {
                if k == "summary" {
                    continue;
                }
                let key = match k.as_str() {
                    "you" => "them",
                    "them" => "you",
                    other => other,
                };
                out.insert(key.to_string(), mirror(v));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(mirror).collect()),
        Value::String(s) if s == "you" => Value::String("them".into()),
        Value::String(s) if s == "them" => Value::String("you".into()),
        other => other.clone(),
    }
}

fn strip_summaries(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(k, _)| k.as_str() != "summary")
                .map(|(k, v)| (k.clone(), strip_summaries(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(strip_summaries).collect()),
        other => other.clone(),
    }
}

/// Both senders repeat one line in strict alternation. Sam's first reply lands after a
/// long pause so each side opens one conversation; every later reply is five minutes on.
fn mirrored(phrase: usize, rounds: usize) -> String {
    let mut minute = 0;
    let mut timed = Vec::new();
    for i in 0..rounds * 2 {
        minute += match i {
            0 => 0,
            1 => 180,
            _ => 5,
        };
        let sender = if i % 2 == 0 { "Alex" } else { "Sam" };
        timed.push((sender, PHRASES[phrase], minute));
    }
    timed_transcript(&timed)
}

/// Collect every string value outside summaries, with its path.
fn labels(value: &Value, path: &str, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                if k != "summary" {
                    labels(v, &format!("{}.{}", path, k), out);
                }
            }
        }
        Value::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                labels(v, &format!("{}[{}]", path, i), out);
            }
        }
        Value::String(s) => out.push((path.to_string(), s.clone())),
        _ => {}
    }
}

fn summaries(value: &Value, path: &str, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                let here = format!("{}.{}", path, k);
                match v {
                    Value::String(s) if k == "summary" => out.push((here, s.clone())),
                    _ => summaries(v, &here, out),
                }
            }
        }
        Value::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                summaries(v, &format!("{}[{}]", path, i), out);
            }
        }
        _ => {}
    }
}

/// True when a sentence talks about exactly one of the two people. Phrases that address
/// both at once do not count toward either side.
fn names_one_side(summary: &str) -> bool {
    let mut text = summary.to_lowercase();
    for both in ["both of you", "you both", "neither of you", "either of you", "each of you"] {
        text = text.replace(both, " ");
    }
    let words: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|w| !w.is_empty())
        .collect();
    let subject = words.iter().any(|w| matches!(*w, "you" | "your" | "yours"));
    let counterpart = words.iter().any(|w| matches!(*w, "they" | "them" | "their" | "theirs"));
    subject != counterpart
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn scores_stay_within_bounds(lines in conversation()) {
        let report = analyze(&build(&lines), &as_you("Alex"));
        let json = serde_json::to_value(&report).unwrap();
        check_bounds(&json, false, "report");
    }

    #[test]
    fn swapping_sides_mirrors_the_analyses(lines in conversation()) {
        let raw = build(&lines);
        let alex = analyze(&raw, &as_you("Alex"));
        let sam = analyze(&raw, &as_you("Sam"));
        prop_assert_eq!(alex.success, sam.success);
        prop_assert_eq!(alex.health_score, sam.health_score);

        let a = serde_json::to_value(&alex.analyses).unwrap();
        let b = serde_json::to_value(&sam.analyses).unwrap();
        prop_assert_eq!(mirror(&a), strip_summaries(&b));
    }

    #[test]
    fn identical_sides_single_out_no_one(phrase in 0..PHRASES.len(), rounds in 3usize..8) {
        let report = analyze(&mirrored(phrase, rounds), &as_you("Alex"));
        let analyses = serde_json::to_value(&report.analyses).unwrap();

        let mut fields = Vec::new();
        labels(&analyses, "analyses", &mut fields);
        for (path, value) in &fields {
            prop_assert!(value != "you" && value != "them", "{} = {}", path, value);
        }

        let mut texts = Vec::new();
        summaries(&analyses, "analyses", &mut texts);
        prop_assert!(!texts.is_empty());
        for (path, text) in &texts {
            prop_assert!(!names_one_side(text), "{}: {}", path, text);
        }
    }

    #[test]
    fn reruns_are_byte_identical(lines in conversation()) {
        let raw = build(&lines);
        let first = serde_json::to_string(&analyze(&raw, &as_you("Alex"))).unwrap();
        let second = serde_json::to_string(&analyze(&raw, &as_you("Alex"))).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn near_ties_are_balanced(base in 0.0f64..100.0, delta in 0.0f64..14.9, threshold in 15.0f64..30.0) {
        let up = Pair::new(base, base + delta);
        let down = Pair::new(base + delta, base);
        prop_assert_eq!(compare(&up, threshold), Balance::Balanced);
        prop_assert_eq!(compare(&down, threshold), Balance::Balanced);
    }
}

#[test]
fn one_sided_wording_is_recognised() {
    assert!(names_one_side("You carry most of the emotional work (70% of check-ins)."));
    assert!(names_one_side("They appear more invested."));
    assert!(!names_one_side("Ghosting risk is moderate: both of you show similar signs of pulling away."));
    assert!(!names_one_side("Your outlook reads as growth and theirs as fixed."));
    assert!(!names_one_side("You both engage with what the other says."));
}
