//! Scoreboard heuristic.
//!
//! Replies from the court are scanned for a handful of fixed phrases and the three
//! metrics are nudged accordingly. The rules live in a single table so the scoring
//! can be read (and tested) without a model in the loop.

use crate::persona::RoleKind;
use serde::{Deserialize, Serialize};

pub const METRIC_MIN: u8 = 0;
pub const METRIC_MAX: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    pub case_strength: u8,
    pub jury_sentiment: u8,
    pub evidence_score: u8,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new(50, 50, 50)
    }
}

impl Metrics {
    pub fn new(case_strength: u8, jury_sentiment: u8, evidence_score: u8) -> Self {
        Self {
            case_strength: case_strength.min(METRIC_MAX),
            jury_sentiment: jury_sentiment.min(METRIC_MAX),
            evidence_score: evidence_score.min(METRIC_MAX),
        }
    }

    pub fn shifted(self, delta: Delta) -> Self {
        Self {
            case_strength: clamp_add(self.case_strength, delta.case_strength),
            jury_sentiment: clamp_add(self.jury_sentiment, delta.jury_sentiment),
            evidence_score: clamp_add(self.evidence_score, delta.evidence_score),
        }
    }
}

fn clamp_add(value: u8, delta: i32) -> u8 {
    (i32::from(value) + delta).clamp(i32::from(METRIC_MIN), i32::from(METRIC_MAX)) as u8
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delta {
    pub case_strength: i32,
    pub jury_sentiment: i32,
    pub evidence_score: i32,
}

impl Delta {
    pub const fn new(case_strength: i32, jury_sentiment: i32, evidence_score: i32) -> Self {
        Self {
            case_strength,
            jury_sentiment,
            evidence_score,
        }
    }
}

impl std::ops::Add for Delta {
    type Output = Delta;

    fn add(self, other: Delta) -> Delta {
        Delta::new(
            self.case_strength + other.case_strength,
            self.jury_sentiment + other.jury_sentiment,
            self.evidence_score + other.evidence_score,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    // At most one exclusive rule fires per role; table order is priority order.
    Exclusive,
    Independent,
}

#[derive(Debug)]
struct Rule {
    role: RoleKind,
    gate: Gate,
    any_of: &'static [&'static str],
    // Utterance must be shorter than this many characters.
    shorter_than: Option<usize>,
    delta: Delta,
}

impl Rule {
    fn matches(&self, lowered: &str) -> bool {
        self.any_of.iter().any(|phrase| lowered.contains(phrase))
            && self
                .shorter_than
                .is_none_or(|limit| lowered.chars().count() < limit)
    }
}

const RULES: &[Rule] = &[
    Rule {
        role: RoleKind::Judge,
        gate: Gate::Exclusive,
        any_of: &["sustained"],
        shorter_than: None,
        delta: Delta::new(5, 3, 0),
    },
    Rule {
        role: RoleKind::Judge,
        gate: Gate::Exclusive,
        any_of: &["overruled"],
        shorter_than: None,
        delta: Delta::new(-3, -2, 0),
    },
    Rule {
        role: RoleKind::Judge,
        gate: Gate::Exclusive,
        any_of: &["approach the bench"],
        shorter_than: None,
        delta: Delta::new(-1, 0, 0),
    },
    Rule {
        role: RoleKind::Opposing,
        gate: Gate::Independent,
        any_of: &["objection"],
        shorter_than: None,
        delta: Delta::new(-2, 0, 0),
    },
    Rule {
        role: RoleKind::Witness,
        gate: Gate::Independent,
        any_of: &["don't recall", "not sure"],
        shorter_than: None,
        delta: Delta::new(2, 0, -2),
    },
    Rule {
        role: RoleKind::Witness,
        gate: Gate::Independent,
        any_of: &["yes"],
        shorter_than: Some(10),
        delta: Delta::new(0, 0, 1),
    },
];

/// Sum of the deltas every applicable rule contributes for `utterance` spoken by `role`.
pub fn assess(utterance: &str, role: RoleKind) -> Delta {
    let lowered = utterance.to_lowercase();
    let mut total = Delta::default();
    let mut exclusive_fired = false;

    for rule in RULES.iter().filter(|rule| rule.role == role) {
        if rule.gate == Gate::Exclusive && exclusive_fired {
            continue;
        }
        if rule.matches(&lowered) {
            total = total + rule.delta;
            if rule.gate == Gate::Exclusive {
                exclusive_fired = true;
            }
        }
    }

    total
}

/// Applies the heuristic for one reply. Pure: the result depends only on the arguments.
pub fn apply(metrics: Metrics, utterance: &str, role: RoleKind) -> Metrics {
    metrics.shifted(assess(utterance, role))
}
