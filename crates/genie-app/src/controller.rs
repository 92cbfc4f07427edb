use genie_bot::selector::{BalancedSelector, SelectorParams};
use genie_bot::session::{GameSession, SessionError};
use genie_core::belief::AnswerModel;
use genie_core::game::phase::GamePhase;
use genie_core::model::answer::Answer;
use genie_core::model::candidate::Candidate;
use genie_core::model::roster::Roster;
use std::sync::Arc;

/// Presentation-side wrapper around a [`GameSession`].
pub struct GameController {
    session: GameSession,
}

impl GameController {
    /// Tuning comes from the `GENIE_*` environment; `cap` overrides the question cap.
    pub fn new(roster: Arc<Roster>, seed: Option<u64>, cap: Option<u32>) -> Self {
        let mut params = SelectorParams::from_env();
        if let Some(cap) = cap {
            params = params.with_question_cap(cap);
        }
        let seed = seed.unwrap_or_else(rand::random);
        let session = GameSession::with_components(
            roster,
            seed,
            Box::new(BalancedSelector::new(params)),
            AnswerModel::from_env(),
        );
        Self { session }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn phase(&self) -> GamePhase {
        self.session.phase()
    }

    /// "Question N/cap: ..." for the pending question.
    pub fn question_text(&self) -> Option<String> {
        let question = self.session.current_question()?;
        let progress = self.session.progress();
        Some(format!(
            "Question {}/{}: {}",
            progress.questions_asked + 1,
            progress.question_cap,
            question.text
        ))
    }

    /// Remaining possibilities and the leader's confidence, while more than one is live.
    pub fn status_text(&self) -> Option<String> {
        let progress = self.session.progress();
        if self.phase() != GamePhase::Playing || progress.live_count <= 1 {
            return None;
        }

        let mut text = format!("{} possibilities remaining", progress.live_count);
        if let Some(percent) = self.session.metrics().confidence_percent() {
            text.push_str(&format!(" • Confidence: {percent}%"));
        }
        Some(text)
    }

    pub fn guess(&self) -> Option<&Candidate> {
        self.session.guessed_candidate()
    }

    pub fn guess_text(&self) -> Option<String> {
        let candidate = self.guess()?;
        let label = match candidate.emoji.as_deref() {
            Some(emoji) => format!("{emoji} {}", candidate.name),
            None => candidate.name.clone(),
        };
        Some(format!(
            "I think you're thinking of... {label} ({})",
            candidate.category
        ))
    }

    pub fn answer(&mut self, answer: Answer) -> Result<GamePhase, SessionError> {
        self.session.answer(answer)?;
        Ok(self.session.phase())
    }

    pub fn confirm_guess(&mut self, correct: bool) -> Result<GamePhase, SessionError> {
        self.session.confirm_guess(correct)
    }

    pub fn restart(&mut self) {
        self.session.restart();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genie_core::model::question::Question;

    fn pair() -> Arc<Roster> {
        Arc::new(
            Roster::new(
                vec![
                    Candidate::new("ada", "Ada Lovelace", "Mathematician")
                        .with_attribute("isMale", false),
                    Candidate::new("alan", "Alan Turing", "Mathematician")
                        .with_attribute("isMale", true)
                        .with_emoji("🧮"),
                ],
                vec![Question::new("is_male", "Is this person male?", "isMale", true)],
            )
            .unwrap(),
        )
    }

    #[test]
    fn shows_question_and_status_while_playing() {
        let controller = GameController::new(pair(), Some(4), None);
        assert_eq!(
            controller.question_text().as_deref(),
            Some("Question 1/15: Is this person male?")
        );
        assert_eq!(
            controller.status_text().as_deref(),
            Some("2 possibilities remaining • Confidence: 100%")
        );
        assert!(controller.guess_text().is_none());
    }

    #[test]
    fn guess_replaces_question_and_status() {
        let mut controller = GameController::new(pair(), Some(4), None);
        let phase = controller.answer(Answer::Yes).unwrap();
        assert!(matches!(phase, GamePhase::Guessing(_)));
        assert!(controller.question_text().is_none());
        assert!(controller.status_text().is_none());
        assert_eq!(
            controller.guess_text().as_deref(),
            Some("I think you're thinking of... 🧮 Alan Turing (Mathematician)")
        );

        assert!(matches!(controller.confirm_guess(true), Ok(GamePhase::Won(_))));
        controller.restart();
        assert_eq!(controller.phase(), GamePhase::Playing);
    }

    #[test]
    fn cap_override_is_applied() {
        let controller = GameController::new(Arc::new(Roster::builtin()), Some(1), Some(2));
        assert_eq!(controller.session().progress().question_cap, 2);
        assert!(
            controller
                .question_text()
                .is_some_and(|text| text.starts_with("Question 1/2: "))
        );
    }
}
