use super::BeliefState;
use serde::Serialize;

/// Snapshot of belief spread: the app shows the confidence, bench rows carry the rest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeliefMetrics {
    pub questions_asked: u32,
    pub live_count: usize,
    pub top_confidence: Option<f64>,
    /// Gap between the two best confidences; `None` with fewer than two live.
    pub margin: Option<f64>,
    /// Shannon entropy (nats) of the live confidences normalised to sum to one.
    pub entropy: f64,
}

impl BeliefMetrics {
    pub fn from_belief(belief: &BeliefState) -> Self {
        let total: f64 = belief.live().iter().map(|entry| entry.confidence).sum();
        let mut entropy = 0.0;
        if total > 0.0 {
            for entry in belief.live() {
                let p = entry.confidence / total;
                if p > 0.0 {
                    entropy -= p * p.ln();
                }
            }
        }

        let margin = match (belief.top(), belief.runner_up()) {
            (Some(top), Some(second)) => Some(top.confidence - second.confidence),
            _ => None,
        };

        Self {
            questions_asked: belief.questions_asked(),
            live_count: belief.live_count(),
            top_confidence: belief.top_confidence(),
            margin,
            entropy,
        }
    }

    /// Top confidence as a whole percentage for display.
    pub fn confidence_percent(&self) -> Option<u32> {
        self.top_confidence
            .map(|value| (value * 100.0).round().clamp(0.0, 100.0) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::belief::AnswerModel;
    use crate::model::answer::Answer;
    use crate::model::roster::Roster;

    #[test]
    fn uniform_belief_has_log_n_entropy() {
        let roster = Roster::builtin();
        let belief = BeliefState::new(&roster);
        let metrics = BeliefMetrics::from_belief(&belief);

        let expected = (roster.candidates().len() as f64).ln();
        assert!((metrics.entropy - expected).abs() < 1e-9);
        assert_eq!(metrics.margin, Some(0.0));
        assert_eq!(metrics.confidence_percent(), Some(100));
    }

    #[test]
    fn informative_answer_lowers_entropy() {
        let roster = Roster::builtin();
        let mut belief = BeliefState::new(&roster);
        let before = BeliefMetrics::from_belief(&belief).entropy;
        let question = roster.question_index("is_anime_character").unwrap();
        AnswerModel::default().apply(&mut belief, &roster, question, Answer::Yes);

        let after = BeliefMetrics::from_belief(&belief);
        assert_eq!(after.live_count, 2);
        assert_eq!(after.questions_asked, 1);
        assert!(after.entropy < before);
    }

    #[test]
    fn exhausted_belief_reports_nothing_live() {
        let roster = Roster::builtin();
        let mut belief = BeliefState::new(&roster);
        let model = AnswerModel::default();
        let question = roster.question_index("is_male").unwrap();
        model.apply(&mut belief, &roster, question, Answer::No);

        let metrics = BeliefMetrics::from_belief(&belief);
        assert_eq!(metrics.live_count, 0);
        assert_eq!(metrics.entropy, 0.0);
        assert_eq!(metrics.top_confidence, None);
        assert_eq!(metrics.confidence_percent(), None);
    }
}
