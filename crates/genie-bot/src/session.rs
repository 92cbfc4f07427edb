use crate::selector::{BalancedSelector, Decision, QuestionSelector};
use core::fmt;
use genie_core::belief::telemetry::BeliefMetrics;
use genie_core::belief::{AnswerModel, BeliefState, UpdateOutcome};
use genie_core::game::phase::GamePhase;
use genie_core::game::transcript::Transcript;
use genie_core::model::answer::Answer;
use genie_core::model::candidate::Candidate;
use genie_core::model::question::Question;
use genie_core::model::roster::Roster;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::sync::Arc;
use tracing::{Level, event};

/// Informational counters shown beside the current question.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub live_count: usize,
    pub top_candidate: Option<usize>,
    pub top_confidence: Option<f64>,
    pub questions_asked: u32,
    pub question_cap: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    WrongPhase {
        action: &'static str,
        phase: GamePhase,
    },
    TranscriptMismatch {
        turn: usize,
        expected: Option<String>,
        found: String,
    },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::WrongPhase { action, phase } => {
                write!(f, "cannot {action} while the game is {phase}")
            }
            SessionError::TranscriptMismatch {
                turn,
                expected,
                found,
            } => match expected {
                Some(expected) => write!(
                    f,
                    "transcript turn {turn} answers '{found}' but the game asked '{expected}'"
                ),
                None => write!(
                    f,
                    "transcript turn {turn} answers '{found}' after the game stopped asking"
                ),
            },
        }
    }
}

impl std::error::Error for SessionError {}

/// One game of twenty-questions against a fixed roster.
///
/// The session owns the belief state and the RNG. It runs the selector on
/// entry to `Playing` and after every answer, moving to `Guessing` or `Lost`
/// when the selector stops asking. `Won` and `Lost` only accept `restart`.
pub struct GameSession {
    roster: Arc<Roster>,
    selector: Box<dyn QuestionSelector>,
    model: AnswerModel,
    belief: BeliefState,
    phase: GamePhase,
    pending: Option<usize>,
    rng: StdRng,
    seed: u64,
    transcript: Transcript,
}

impl GameSession {
    pub fn new(roster: Arc<Roster>) -> Self {
        let seed: u64 = rand::random();
        Self::with_seed(roster, seed)
    }

    pub fn with_seed(roster: Arc<Roster>, seed: u64) -> Self {
        Self::with_components(
            roster,
            seed,
            Box::new(BalancedSelector::default()),
            AnswerModel::default(),
        )
    }

    pub fn with_components(
        roster: Arc<Roster>,
        seed: u64,
        selector: Box<dyn QuestionSelector>,
        model: AnswerModel,
    ) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let belief = BeliefState::shuffled(&roster, &mut rng);
        let mut session = Self {
            roster,
            selector,
            model,
            belief,
            phase: GamePhase::Playing,
            pending: None,
            rng,
            seed,
            transcript: Transcript::new(seed),
        };
        session.advance();
        session
    }

    /// Rebuilds a default-tuned game by re-applying `transcript` under its recorded seed.
    pub fn replay(roster: Arc<Roster>, transcript: &Transcript) -> Result<Self, SessionError> {
        Self::replay_with(
            roster,
            transcript,
            Box::new(BalancedSelector::default()),
            AnswerModel::default(),
        )
    }

    /// Like [`GameSession::replay`], for games built with [`GameSession::with_components`].
    ///
    /// The transcript only records the seed and the answers, so the selector
    /// and answer model must match the ones the game was played with.
    pub fn replay_with(
        roster: Arc<Roster>,
        transcript: &Transcript,
        selector: Box<dyn QuestionSelector>,
        model: AnswerModel,
    ) -> Result<Self, SessionError> {
        let mut session = Self::with_components(roster, transcript.seed, selector, model);
        for (turn, step) in transcript.turns.iter().enumerate() {
            let expected = session.current_question().map(|q| q.id.clone());
            if expected.as_deref() != Some(step.question_id.as_str()) {
                return Err(SessionError::TranscriptMismatch {
                    turn,
                    expected,
                    found: step.question_id.clone(),
                });
            }
            session.answer(step.answer)?;
        }
        Ok(session)
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn belief(&self) -> &BeliefState {
        &self.belief
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Seed of the current game; restarts draw a fresh one.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            GamePhase::Playing => self.pending.map(|index| self.roster.question(index)),
            _ => None,
        }
    }

    pub fn guessed_candidate(&self) -> Option<&Candidate> {
        self.phase.guess().map(|index| self.roster.candidate(index))
    }

    pub fn progress(&self) -> Progress {
        Progress {
            live_count: self.belief.live_count(),
            top_candidate: self.belief.top().map(|entry| entry.index),
            top_confidence: self.belief.top_confidence(),
            questions_asked: self.belief.questions_asked(),
            question_cap: self.selector.question_cap(),
        }
    }

    pub fn metrics(&self) -> BeliefMetrics {
        BeliefMetrics::from_belief(&self.belief)
    }

    /// Applies the player's answer to the pending question and picks the next step.
    pub fn answer(&mut self, answer: Answer) -> Result<UpdateOutcome, SessionError> {
        let question = match (self.phase, self.pending) {
            (GamePhase::Playing, Some(index)) => index,
            _ => {
                return Err(SessionError::WrongPhase {
                    action: "answer",
                    phase: self.phase,
                });
            }
        };

        let outcome = self
            .model
            .apply(&mut self.belief, &self.roster, question, answer);
        let question_id = &self.roster.question(question).id;
        self.transcript.record(question_id.as_str(), answer);
        log_answer(question_id, answer, &outcome);

        self.pending = None;
        self.advance();
        Ok(outcome)
    }

    /// Resolves a pending guess: `Won` when confirmed, `Lost` otherwise.
    pub fn confirm_guess(&mut self, correct: bool) -> Result<GamePhase, SessionError> {
        let GamePhase::Guessing(index) = self.phase else {
            return Err(SessionError::WrongPhase {
                action: "confirm a guess",
                phase: self.phase,
            });
        };

        let next = if correct {
            GamePhase::Won(index)
        } else {
            GamePhase::Lost
        };
        self.transition(next);
        Ok(next)
    }

    /// Throws the current game away and starts a new one from a fresh belief.
    pub fn restart(&mut self) {
        self.seed = self.rng.next_u64();
        self.rng = StdRng::seed_from_u64(self.seed);
        self.belief = BeliefState::shuffled(&self.roster, &mut self.rng);
        self.transcript = Transcript::new(self.seed);
        self.pending = None;
        self.transition(GamePhase::Playing);
        self.advance();
    }

    fn advance(&mut self) {
        if self.phase != GamePhase::Playing {
            return;
        }

        match self
            .selector
            .select(&self.roster, &self.belief, &mut self.rng)
        {
            Decision::Ask(index) => self.pending = Some(index),
            Decision::Guess(index) => self.transition(GamePhase::Guessing(index)),
            Decision::Fail => self.transition(GamePhase::Lost),
        }
    }

    fn transition(&mut self, next: GamePhase) {
        if tracing::enabled!(Level::DEBUG) {
            let candidate = next
                .guess()
                .map(|index| self.roster.candidate(index).id.as_str())
                .unwrap_or("-");
            event!(
                target: "genie_bot::session",
                Level::DEBUG,
                from = self.phase.as_str(),
                to = next.as_str(),
                candidate,
                asked = self.belief.questions_asked(),
                live = self.belief.live_count(),
            );
        }
        self.phase = next;
    }
}

fn log_answer(question_id: &str, answer: Answer, outcome: &UpdateOutcome) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }

    event!(
        target: "genie_bot::session",
        Level::DEBUG,
        question = question_id,
        answer = answer.as_str(),
        eliminated = outcome.eliminated.len(),
        live = outcome.live_count,
        top_confidence = outcome.top_confidence.unwrap_or(0.0),
    );
}
