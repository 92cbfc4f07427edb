use crate::model::answer::Answer;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub question_id: String,
    pub answer: Answer,
}

/// Ordered record of the answers given in one game, plus the RNG seed the
/// game ran under. Replaying the turns under the same seed reproduces the game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub seed: u64,
    #[serde(default)]
    pub turns: Vec<Turn>,
}

impl Transcript {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            turns: Vec::new(),
        }
    }

    pub fn record(&mut self, question_id: impl Into<String>, answer: Answer) {
        self.turns.push(Turn {
            question_id: question_id.into(),
            answer,
        });
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
