use super::{Decision, SelectorParams};
use genie_core::belief::BeliefState;

// In f64, 0.6 - 0.4 is 0.19999999999999996; this lets that lead meet a 0.2 margin.
const MARGIN_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Exhausted,
    SingleSurvivor,
    ClearLeader,
    QuestionCap,
}

impl StopReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            StopReason::Exhausted => "exhausted",
            StopReason::SingleSurvivor => "single_survivor",
            StopReason::ClearLeader => "clear_leader",
            StopReason::QuestionCap => "question_cap",
        }
    }
}

/// Immediate guess/fail conditions, checked before any question is scored.
pub fn check_termination(
    belief: &BeliefState,
    params: &SelectorParams,
) -> Option<(Decision, StopReason)> {
    let Some(top) = belief.top() else {
        return Some((Decision::Fail, StopReason::Exhausted));
    };

    if belief.live_count() == 1 {
        return Some((Decision::Guess(top.index), StopReason::SingleSurvivor));
    }

    let clear_lead = belief
        .runner_up()
        .is_none_or(|second| top.confidence - second.confidence + MARGIN_EPSILON >= params.guess_margin);
    if top.confidence > params.guess_confidence && clear_lead {
        return Some((Decision::Guess(top.index), StopReason::ClearLeader));
    }

    if belief.questions_asked() >= params.question_cap {
        return Some((Decision::Guess(top.index), StopReason::QuestionCap));
    }

    None
}
