//! Scoring primitives every analyzer shares: bounded scores, you/them pairs, the
//! "balanced" tie-break, level cut points, and small statistics.

use serde::{Deserialize, Serialize};

use crate::types::Direction;

/// Lowest and highest score any analyzer may report.
pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 100.0;

/// Clamp to [0, 100] and round to one decimal. Non-finite input maps to 0.
pub fn clamp_score(value: f64) -> f64 {
    if !value.is_finite() {
        return SCORE_MIN;
    }
    round1(value.clamp(SCORE_MIN, SCORE_MAX))
}

/// `clamp(base + Σ coefficient·rate)`: the one formula every lexicon score goes through.
/// Negative coefficients subtract.
pub fn linear(base: f64, terms: &[(f64, f64)]) -> f64 {
    clamp_score(base + terms.iter().map(|(coef, rate)| coef * rate).sum::<f64>())
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A value computed once for the analysis subject and once for the counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pair<T> {
    pub you: T,
    pub them: T,
}

impl<T> Pair<T> {
    pub fn new(you: T, them: T) -> Self {
        Self { you, them }
    }

    /// Evaluate `f` for Sent then Received.
    pub fn from_fn(mut f: impl FnMut(Direction) -> T) -> Self {
        let you = f(Direction::Sent);
        let them = f(Direction::Received);
        Self { you, them }
    }

    pub fn get(&self, direction: Direction) -> &T {
        match direction {
            Direction::Sent => &self.you,
            Direction::Received => &self.them,
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> Pair<U> {
        Pair {
            you: f(&self.you),
            them: f(&self.them),
        }
    }
}

impl Pair<f64> {
    /// Mean of both sides. Symmetric, so it survives a direction swap unchanged.
    pub fn mean(&self) -> f64 {
        clamp_score((self.you + self.them) / 2.0)
    }

    pub fn max(&self) -> f64 {
        clamp_score(self.you.max(self.them))
    }

    pub fn gap(&self) -> f64 {
        round1((self.you - self.them).abs())
    }

    /// 100 when both sides match, falling one point per point of difference.
    pub fn balance(&self) -> f64 {
        clamp_score(SCORE_MAX - (self.you - self.them).abs())
    }
}

/// Which side a comparison favors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Balance {
    You,
    Them,
    Balanced,
}

impl Balance {
    /// Subject of a summary sentence: "you", "they", or "both of you".
    pub fn who(self) -> &'static str {
        match self {
            Balance::You => "you",
            Balance::Them => "they",
            Balance::Balanced => "both of you",
        }
    }

    pub fn side(self) -> Option<Direction> {
        match self {
            Balance::You => Some(Direction::Sent),
            Balance::Them => Some(Direction::Received),
            Balance::Balanced => None,
        }
    }
}

/// Differences strictly below `threshold` are `Balanced`; otherwise the higher side wins.
pub fn compare(values: &Pair<f64>, threshold: f64) -> Balance {
    let diff = values.you - values.them;
    if !diff.is_finite() || diff.abs() < threshold {
        Balance::Balanced
    } else if diff > 0.0 {
        Balance::You
    } else {
        Balance::Them
    }
}

/// Three-step severity used by most analyzers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Moderate,
    High,
}

impl Level {
    /// `score < moderate_at` is Low, `score < high_at` is Moderate, otherwise High.
    pub fn from_score(score: f64, moderate_at: f64, high_at: f64) -> Self {
        if score < moderate_at {
            Level::Low
        } else if score < high_at {
            Level::Moderate
        } else {
            Level::High
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Low => write!(f, "low"),
            Level::Moderate => write!(f, "moderate"),
            Level::High => write!(f, "high"),
        }
    }
}

/// Score for an unordered pair of classifications. `(a, b)` and `(b, a)` read the same row.
pub fn pairing<K: Copy + PartialEq>(table: &[((K, K), f64)], a: K, b: K) -> Option<f64> {
    table
        .iter()
        .find(|((x, y), _)| (*x == a && *y == b) || (*x == b && *y == a))
        .map(|(_, score)| *score)
}

/// Primary and secondary of a classification: the two largest positive weights.
/// Ties keep the order of `weights`.
pub fn top_two<K: Copy>(weights: &[(K, f64)]) -> (Option<K>, Option<K>) {
    let mut ranked: Vec<&(K, f64)> = weights.iter().filter(|(_, w)| *w > 0.0).collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    (ranked.first().map(|(k, _)| *k), ranked.get(1).map(|(k, _)| *k))
}

/// `part / whole * 100`, or 0 when `whole` is 0.
pub fn percent(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 {
        0.0
    } else {
        round1(part / whole * 100.0)
    }
}

/// Share of `a` in `a + b` as a percentage; an even split when both are zero.
pub fn share(a: f64, b: f64) -> Pair<f64> {
    let total = a + b;
    if total <= 0.0 {
        Pair::new(50.0, 50.0)
    } else {
        Pair::new(round1(a / total * 100.0), round1(b / total * 100.0))
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    Some(if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    })
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let variance = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Rough emoji test covering the pictograph, symbol and dingbat blocks.
pub fn is_emoji(c: char) -> bool {
    matches!(
        c as u32,
        0x1F300..=0x1FAFF | 0x2600..=0x27BF | 0x1F000..=0x1F2FF | 0x2B50 | 0x2B55 | 0x203C | 0x2049
    )
}

pub fn contains_emoji(text: &str) -> bool {
    text.chars().any(is_emoji)
}
