use core::fmt;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Graded reply to a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    Yes,
    Probably,
    DontKnow,
    ProbablyNot,
    No,
}

impl Answer {
    pub const ALL: [Answer; 5] = [
        Answer::Yes,
        Answer::Probably,
        Answer::DontKnow,
        Answer::ProbablyNot,
        Answer::No,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Answer::Yes => "yes",
            Answer::Probably => "probably",
            Answer::DontKnow => "dont_know",
            Answer::ProbablyNot => "probably_not",
            Answer::No => "no",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Answer::Yes => "Yes",
            Answer::Probably => "Probably",
            Answer::DontKnow => "Don't know",
            Answer::ProbablyNot => "Probably not",
            Answer::No => "No",
        }
    }

    /// The answer pointing the other way; `DontKnow` is its own opposite.
    pub const fn opposite(self) -> Answer {
        match self {
            Answer::Yes => Answer::No,
            Answer::Probably => Answer::ProbablyNot,
            Answer::DontKnow => Answer::DontKnow,
            Answer::ProbablyNot => Answer::Probably,
            Answer::No => Answer::Yes,
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAnswerError(pub String);

impl fmt::Display for ParseAnswerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unrecognised answer '{}' (expected yes, probably, dont_know, probably_not or no)",
            self.0
        )
    }
}

impl std::error::Error for ParseAnswerError {}

impl FromStr for Answer {
    type Err = ParseAnswerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace([' ', '-', '\''], "_");
        match normalized.as_str() {
            "yes" | "y" => Ok(Answer::Yes),
            "probably" | "p" => Ok(Answer::Probably),
            "dont_know" | "don_t_know" | "d" | "?" => Ok(Answer::DontKnow),
            "probably_not" | "pn" => Ok(Answer::ProbablyNot),
            "no" | "n" => Ok(Answer::No),
            _ => Err(ParseAnswerError(value.trim().to_string())),
        }
    }
}
