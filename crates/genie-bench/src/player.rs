use crate::config::{PlayerConfig, PlayerKind, ValidationError};
use genie_core::model::answer::Answer;
use genie_core::model::candidate::Candidate;
use genie_core::model::question::Question;
use rand::{Rng, RngCore};

/// A scripted stand-in for the human who thought of `secret`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimulatedPlayer {
    /// `yes` on a match, `no` otherwise.
    Truthful,
    /// `probably` on a match, `probably_not` otherwise.
    Hedging,
    /// Truthful, but answers the opposite with probability `flip_rate`.
    Noisy { flip_rate: f64 },
    /// Always `dont_know`.
    Indifferent,
}

impl SimulatedPlayer {
    pub fn from_config(config: &PlayerConfig) -> Result<Self, ValidationError> {
        Ok(match config.kind {
            PlayerKind::Truthful => SimulatedPlayer::Truthful,
            PlayerKind::Hedging => SimulatedPlayer::Hedging,
            PlayerKind::Noisy => SimulatedPlayer::Noisy {
                flip_rate: config.float_param("flip_rate")?.unwrap_or(0.0),
            },
            PlayerKind::Indifferent => SimulatedPlayer::Indifferent,
        })
    }

    pub fn answer(&self, secret: &Candidate, question: &Question, rng: &mut dyn RngCore) -> Answer {
        let matches = secret.matches(question);
        match *self {
            SimulatedPlayer::Truthful => truthful(matches),
            SimulatedPlayer::Hedging => {
                if matches {
                    Answer::Probably
                } else {
                    Answer::ProbablyNot
                }
            }
            SimulatedPlayer::Noisy { flip_rate } => {
                let answer = truthful(matches);
                if flip_rate > 0.0 && rng.gen_bool(flip_rate.min(1.0)) {
                    answer.opposite()
                } else {
                    answer
                }
            }
            SimulatedPlayer::Indifferent => Answer::DontKnow,
        }
    }

    /// Players confirm a guess exactly when it names their secret.
    pub fn confirms(&self, secret: &Candidate, guessed: &Candidate) -> bool {
        secret.id == guessed.id
    }
}

fn truthful(matches: bool) -> Answer {
    if matches { Answer::Yes } else { Answer::No }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn alan() -> Candidate {
        Candidate::new("alan", "Alan", "Scientist").with_attribute("isMale", true)
    }

    fn is_male() -> Question {
        Question::new("is_male", "Is this person male?", "isMale", true)
    }

    fn is_female() -> Question {
        Question::new("is_female", "Is this person female?", "isMale", false)
    }

    #[test]
    fn profiles_answer_from_the_secret() {
        let mut rng = StdRng::seed_from_u64(0);
        let secret = alan();
        let cases = [
            (SimulatedPlayer::Truthful, Answer::Yes, Answer::No),
            (SimulatedPlayer::Hedging, Answer::Probably, Answer::ProbablyNot),
            (SimulatedPlayer::Indifferent, Answer::DontKnow, Answer::DontKnow),
            (
                SimulatedPlayer::Noisy { flip_rate: 0.0 },
                Answer::Yes,
                Answer::No,
            ),
        ];
        for (player, on_match, on_miss) in cases {
            assert_eq!(player.answer(&secret, &is_male(), &mut rng), on_match);
            assert_eq!(player.answer(&secret, &is_female(), &mut rng), on_miss);
        }
    }

    #[test]
    fn certain_flip_always_lies() {
        let player = SimulatedPlayer::Noisy { flip_rate: 1.0 };
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..16 {
            assert_eq!(player.answer(&alan(), &is_male(), &mut rng), Answer::No);
        }
    }

    #[test]
    fn noisy_flip_rate_is_roughly_respected() {
        let player = SimulatedPlayer::Noisy { flip_rate: 0.25 };
        let mut rng = StdRng::seed_from_u64(42);
        let flips = (0..4000)
            .filter(|_| player.answer(&alan(), &is_male(), &mut rng) == Answer::No)
            .count();
        assert!((800..1200).contains(&flips), "flips = {flips}");
    }

    #[test]
    fn confirms_only_the_secret() {
        let secret = alan();
        let other = Candidate::new("ada", "Ada", "Scientist");
        assert!(SimulatedPlayer::Truthful.confirms(&secret, &secret));
        assert!(!SimulatedPlayer::Truthful.confirms(&secret, &other));
    }
}
