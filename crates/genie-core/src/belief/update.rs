//! Graded answer model: multiplicative confidence update followed by pruning.

use super::{BeliefConfig, BeliefState};
use crate::model::answer::Answer;
use crate::model::roster::Roster;

/// Result of applying one answer, for informational display.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    /// Roster indices dropped by this answer, in their prior ranking order.
    pub eliminated: Vec<usize>,
    pub live_count: usize,
    pub top_confidence: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct AnswerModel {
    config: BeliefConfig,
}

impl AnswerModel {
    pub fn new(config: BeliefConfig) -> Self {
        Self { config }
    }

    pub fn from_env() -> Self {
        Self::new(BeliefConfig::from_env())
    }

    /// Scales every live confidence by the answer's multiplier, drops
    /// candidates at or below the elimination threshold and re-ranks the rest.
    ///
    /// Confidences are a running product and are never renormalised. The
    /// question is recorded as asked whatever the answer was.
    pub fn apply(
        &self,
        belief: &mut BeliefState,
        roster: &Roster,
        question_index: usize,
        answer: Answer,
    ) -> UpdateOutcome {
        let question = roster.question(question_index);
        let multiplier = self.config.weights.multiplier(answer);
        let threshold = self.config.elimination_threshold;

        let live = belief.live_mut();
        for entry in live.iter_mut() {
            let matches = roster.candidate(entry.index).matches(question);
            entry.confidence *= multiplier.pick(matches);
        }

        let mut eliminated = Vec::new();
        live.retain(|entry| {
            let keep = entry.confidence > threshold;
            if !keep {
                eliminated.push(entry.index);
            }
            keep
        });
        // Stable: equal confidences keep their previous relative order.
        live.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        belief.record_asked(&question.id);

        UpdateOutcome {
            eliminated,
            live_count: belief.live_count(),
            top_confidence: belief.top_confidence(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::candidate::Candidate;
    use crate::model::question::Question;

    fn gender_roster() -> Roster {
        Roster::new(
            vec![
                Candidate::new("ada", "Ada", "Scientist").with_attribute("isMale", false),
                Candidate::new("alan", "Alan", "Scientist").with_attribute("isMale", true),
            ],
            vec![Question::new("is_male", "Is this person male?", "isMale", true)],
        )
        .unwrap()
    }

    #[test]
    fn yes_zeroes_mismatches_and_keeps_matches() {
        let roster = gender_roster();
        let mut belief = BeliefState::new(&roster);
        let outcome = AnswerModel::default().apply(&mut belief, &roster, 0, Answer::Yes);

        assert_eq!(outcome.eliminated, vec![0]);
        assert_eq!(outcome.live_count, 1);
        assert_eq!(outcome.top_confidence, Some(1.0));
        assert_eq!(belief.live()[0].index, 1);
        assert!(belief.has_asked("is_male"));
        assert_eq!(belief.questions_asked(), 1);
    }

    #[test]
    fn hedged_answers_reorder_without_eliminating() {
        let roster = gender_roster();
        let mut belief = BeliefState::new(&roster);
        AnswerModel::default().apply(&mut belief, &roster, 0, Answer::Probably);

        assert_eq!(belief.live_count(), 2);
        assert_eq!(belief.live()[0].index, 1);
        assert_eq!(belief.live()[0].confidence, 0.8);
        assert_eq!(belief.live()[1].confidence, 0.2);
    }

    #[test]
    fn confidence_is_a_running_product() {
        let roster = gender_roster();
        let mut belief = BeliefState::new(&roster);
        let model = AnswerModel::default();
        model.apply(&mut belief, &roster, 0, Answer::Probably);
        model.apply(&mut belief, &roster, 0, Answer::ProbablyNot);

        // alan: 0.8 * 0.2, ada: 0.2 * 0.8, both above the 0.1 cut.
        assert_eq!(belief.confidence_of(1), Some(0.8 * 0.2));
        assert_eq!(belief.confidence_of(0), Some(0.2 * 0.8));
        assert_eq!(belief.questions_asked(), 2);
        assert_eq!(belief.asked().len(), 1);
    }

    #[test]
    fn ties_keep_prior_relative_order() {
        let roster = gender_roster();
        let mut belief = BeliefState::new(&roster);
        AnswerModel::default().apply(&mut belief, &roster, 0, Answer::DontKnow);

        let order: Vec<usize> = belief.live().iter().map(|entry| entry.index).collect();
        assert_eq!(order, vec![0, 1]);
    }

    #[test]
    fn threshold_is_inclusive() {
        let roster = gender_roster();
        let mut belief = BeliefState::new(&roster);
        let model = AnswerModel::new(BeliefConfig {
            elimination_threshold: 0.5,
            ..BeliefConfig::default()
        });
        let outcome = model.apply(&mut belief, &roster, 0, Answer::DontKnow);

        assert_eq!(outcome.live_count, 0);
        assert_eq!(outcome.eliminated, vec![0, 1]);
        assert!(belief.is_exhausted());
        assert_eq!(outcome.top_confidence, None);
    }
}
