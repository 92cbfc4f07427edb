use crate::model::candidate::Candidate;
use crate::model::question::Question;
use core::fmt;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

const BUILTIN_ROSTER: &str = include_str!("../../data/famous.json");

/// Immutable table of candidates and the questions that probe them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Roster {
    #[serde(rename = "people")]
    candidates: Vec<Candidate>,
    questions: Vec<Question>,
}

#[derive(Deserialize)]
struct RawRoster {
    #[serde(alias = "people")]
    candidates: Vec<Candidate>,
    #[serde(default)]
    questions: Vec<Question>,
}

impl Roster {
    pub fn new(candidates: Vec<Candidate>, questions: Vec<Question>) -> Result<Self, RosterError> {
        let roster = Self {
            candidates,
            questions,
        };
        roster.validate()?;
        Ok(roster)
    }

    /// The bundled famous-people table.
    pub fn builtin() -> Self {
        Self::from_json(BUILTIN_ROSTER).unwrap_or_else(|err| panic!("bundled roster: {err}"))
    }

    pub fn from_json(json: &str) -> Result<Self, RosterError> {
        let raw: RawRoster = serde_json::from_str(json)?;
        Self::new(raw.candidates, raw.questions)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RosterError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn candidate(&self, index: usize) -> &Candidate {
        &self.candidates[index]
    }

    pub fn question(&self, index: usize) -> &Question {
        &self.questions[index]
    }

    pub fn candidate_index(&self, id: &str) -> Option<usize> {
        self.candidates.iter().position(|candidate| candidate.id == id)
    }

    pub fn question_index(&self, id: &str) -> Option<usize> {
        self.questions.iter().position(|question| question.id == id)
    }

    fn validate(&self) -> Result<(), RosterError> {
        if self.candidates.is_empty() {
            return Err(RosterError::invalid(
                "candidates",
                "roster must contain at least one candidate",
            ));
        }

        let mut seen = HashSet::new();
        for candidate in &self.candidates {
            if candidate.id.trim().is_empty() {
                return Err(RosterError::invalid(
                    "candidates.id",
                    "candidate id must not be empty",
                ));
            }
            if !seen.insert(candidate.id.as_str()) {
                return Err(RosterError::invalid(
                    "candidates",
                    format!("candidate id '{}' defined more than once", candidate.id),
                ));
            }
        }

        let mut seen = HashSet::new();
        for question in &self.questions {
            if question.attribute.trim().is_empty() {
                return Err(RosterError::invalid(
                    format!("questions[{}].attribute", question.id),
                    "question must probe a named attribute",
                ));
            }
            if !seen.insert(question.id.as_str()) {
                return Err(RosterError::invalid(
                    "questions",
                    format!("question id '{}' defined more than once", question.id),
                ));
            }
        }

        Ok(())
    }
}

#[derive(Debug)]
pub enum RosterError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Invalid { field: String, message: String },
}

impl RosterError {
    fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        RosterError::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for RosterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RosterError::Io(err) => write!(f, "failed to read roster: {err}"),
            RosterError::Json(err) => write!(f, "failed to parse roster: {err}"),
            RosterError::Invalid { field, message } => write!(f, "{field}: {message}"),
        }
    }
}

impl std::error::Error for RosterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RosterError::Io(err) => Some(err),
            RosterError::Json(err) => Some(err),
            RosterError::Invalid { .. } => None,
        }
    }
}

impl From<std::io::Error> for RosterError {
    fn from(value: std::io::Error) -> Self {
        RosterError::Io(value)
    }
}

impl From<serde_json::Error> for RosterError {
    fn from(value: serde_json::Error) -> Self {
        RosterError::Json(value)
    }
}
