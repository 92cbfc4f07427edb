//! Tunable constants for the answer model.

use crate::model::answer::Answer;
use std::env;

pub const DEFAULT_ELIMINATION_THRESHOLD: f64 = 0.1;

/// Confidence factors applied to matching and mismatching candidates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Multiplier {
    pub on_match: f64,
    pub on_mismatch: f64,
}

impl Multiplier {
    pub const fn new(on_match: f64, on_mismatch: f64) -> Self {
        Self {
            on_match,
            on_mismatch,
        }
    }

    pub fn pick(self, matches: bool) -> f64 {
        if matches { self.on_match } else { self.on_mismatch }
    }
}

/// Per-answer multiplier table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnswerWeights {
    pub yes: Multiplier,
    pub probably: Multiplier,
    pub dont_know: Multiplier,
    pub probably_not: Multiplier,
    pub no: Multiplier,
}

impl Default for AnswerWeights {
    fn default() -> Self {
        Self {
            yes: Multiplier::new(1.0, 0.0),
            probably: Multiplier::new(0.8, 0.2),
            dont_know: Multiplier::new(0.5, 0.5),
            probably_not: Multiplier::new(0.2, 0.8),
            no: Multiplier::new(0.0, 1.0),
        }
    }
}

impl AnswerWeights {
    pub fn multiplier(&self, answer: Answer) -> Multiplier {
        match answer {
            Answer::Yes => self.yes,
            Answer::Probably => self.probably,
            Answer::DontKnow => self.dont_know,
            Answer::ProbablyNot => self.probably_not,
            Answer::No => self.no,
        }
    }

    /// Replaces the hedged rows with `weight` / `1 - weight`, mirrored for `probably_not`.
    pub fn with_probable_weight(mut self, weight: f64) -> Self {
        let weight = weight.clamp(0.5, 1.0);
        self.probably = Multiplier::new(weight, 1.0 - weight);
        self.probably_not = Multiplier::new(1.0 - weight, weight);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeliefConfig {
    /// Candidates at or below this confidence leave the live set.
    pub elimination_threshold: f64,
    pub weights: AnswerWeights,
}

impl Default for BeliefConfig {
    fn default() -> Self {
        Self {
            elimination_threshold: DEFAULT_ELIMINATION_THRESHOLD,
            weights: AnswerWeights::default(),
        }
    }
}

impl BeliefConfig {
    pub fn from_env() -> Self {
        Self::from_reader(|key| env::var(key).ok())
    }

    fn from_reader<F>(mut read: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let base = Self::default();
        let threshold = parse_f64(read("GENIE_ELIMINATION_THRESHOLD"))
            .map(|value| value.clamp(0.0, 0.9))
            .unwrap_or(base.elimination_threshold);
        let weights = match parse_f64(read("GENIE_PROBABLY_WEIGHT")) {
            Some(weight) => base.weights.with_probable_weight(weight),
            None => base.weights,
        };

        Self {
            elimination_threshold: threshold,
            weights,
        }
    }
}

fn parse_f64(raw: Option<String>) -> Option<f64> {
    raw.and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_matches_literal_values() {
        let weights = AnswerWeights::default();
        assert_eq!(weights.multiplier(Answer::Yes), Multiplier::new(1.0, 0.0));
        assert_eq!(weights.multiplier(Answer::Probably), Multiplier::new(0.8, 0.2));
        assert_eq!(weights.multiplier(Answer::DontKnow), Multiplier::new(0.5, 0.5));
        assert_eq!(weights.multiplier(Answer::ProbablyNot), Multiplier::new(0.2, 0.8));
        assert_eq!(weights.multiplier(Answer::No), Multiplier::new(0.0, 1.0));
        assert_eq!(BeliefConfig::default().elimination_threshold, 0.1);
    }

    #[test]
    fn env_overrides_are_clamped_and_validated() {
        let cfg = BeliefConfig::from_reader(|key| match key {
            "GENIE_ELIMINATION_THRESHOLD" => Some("5".into()),
            "GENIE_PROBABLY_WEIGHT" => Some("0.7".into()),
            _ => None,
        });
        assert_eq!(cfg.elimination_threshold, 0.9);
        assert_eq!(cfg.weights.probably.on_match, 0.7);
        assert_eq!(cfg.weights.probably_not.on_mismatch, 0.7);

        let fallback = BeliefConfig::from_reader(|key| match key {
            "GENIE_ELIMINATION_THRESHOLD" => Some("NaN".into()),
            _ => Some("not-a-number".into()),
        });
        assert_eq!(fallback, BeliefConfig::default());
    }
}
