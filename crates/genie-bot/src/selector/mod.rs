mod balanced;
mod params;
mod termination;

pub use balanced::{BalancedSelector, split_balance};
pub use params::{DEFAULT_QUESTION_CAP, MAX_QUESTION_CAP, SelectorParams};
pub use termination::{StopReason, check_termination};

use genie_core::belief::BeliefState;
use genie_core::model::roster::Roster;
use rand::RngCore;

/// Next step proposed by a selector. Payloads are roster indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Ask(usize),
    Guess(usize),
    Fail,
}

/// Chooses what the genie does next from the current belief.
///
/// Selection is a pure read: it never marks questions as asked. All
/// randomness comes from `rng` so callers can pin outcomes with a seed.
pub trait QuestionSelector: Send {
    fn select(&self, roster: &Roster, belief: &BeliefState, rng: &mut dyn RngCore) -> Decision;

    /// Questions after which this selector forces a guess.
    fn question_cap(&self) -> u32;
}
