pub mod selector;
pub mod session;

pub use selector::{
    BalancedSelector, Decision, QuestionSelector, SelectorParams, StopReason, split_balance,
};
pub use session::{GameSession, Progress, SessionError};
