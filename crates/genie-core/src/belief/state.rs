//! Per-game belief store.

use crate::model::candidate::Candidate;
use crate::model::roster::Roster;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;

pub const INITIAL_CONFIDENCE: f64 = 1.0;

/// A roster candidate that is still in play, referenced by roster index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveCandidate {
    pub index: usize,
    pub confidence: f64,
}

/// Ranked live candidates plus the questions already asked this game.
///
/// `live` is kept in descending confidence order by the answer model. The
/// roster is never touched; a fresh state is built for every game.
#[derive(Debug, Clone, PartialEq)]
pub struct BeliefState {
    live: Vec<LiveCandidate>,
    asked: HashSet<String>,
    questions_asked: u32,
}

impl BeliefState {
    /// Every roster candidate at full confidence, in roster order.
    pub fn new(roster: &Roster) -> Self {
        let live = (0..roster.candidates().len())
            .map(|index| LiveCandidate {
                index,
                confidence: INITIAL_CONFIDENCE,
            })
            .collect();
        Self {
            live,
            asked: HashSet::new(),
            questions_asked: 0,
        }
    }

    /// Like `new`, with the initial (all-equal) ranking shuffled by `rng`.
    pub fn shuffled<R: Rng + ?Sized>(roster: &Roster, rng: &mut R) -> Self {
        let mut state = Self::new(roster);
        state.live.shuffle(rng);
        state
    }

    pub fn live(&self) -> &[LiveCandidate] {
        &self.live
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.live.is_empty()
    }

    pub fn top(&self) -> Option<LiveCandidate> {
        self.live.first().copied()
    }

    pub fn runner_up(&self) -> Option<LiveCandidate> {
        self.live.get(1).copied()
    }

    pub fn top_confidence(&self) -> Option<f64> {
        self.top().map(|entry| entry.confidence)
    }

    pub fn top_candidate<'r>(&self, roster: &'r Roster) -> Option<&'r Candidate> {
        self.top().map(|entry| roster.candidate(entry.index))
    }

    pub fn confidence_of(&self, index: usize) -> Option<f64> {
        self.live
            .iter()
            .find(|entry| entry.index == index)
            .map(|entry| entry.confidence)
    }

    pub fn is_live(&self, index: usize) -> bool {
        self.live.iter().any(|entry| entry.index == index)
    }

    pub fn asked(&self) -> &HashSet<String> {
        &self.asked
    }

    pub fn has_asked(&self, question_id: &str) -> bool {
        self.asked.contains(question_id)
    }

    pub fn questions_asked(&self) -> u32 {
        self.questions_asked
    }

    pub(crate) fn live_mut(&mut self) -> &mut Vec<LiveCandidate> {
        &mut self.live
    }

    pub(crate) fn record_asked(&mut self, question_id: &str) {
        self.asked.insert(question_id.to_string());
        self.questions_asked = self.questions_asked.saturating_add(1);
    }
}
