use crate::model::attribute::AttributeValue;
use crate::model::question::Question;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A person or character the player might be thinking of.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl Candidate {
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            emoji: None,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = Some(emoji.into());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// True when the probed attribute is present and equals the expected value.
    /// A candidate without the attribute never matches.
    pub fn matches(&self, question: &Question) -> bool {
        self.attribute(&question.attribute)
            .is_some_and(|value| *value == question.expected)
    }
}
