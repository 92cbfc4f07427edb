use crate::model::attribute::AttributeValue;
use serde::{Deserialize, Serialize};

/// An attribute probe. Questions are fixed for the lifetime of a roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub attribute: String,
    #[serde(rename = "expectedValue", alias = "expected")]
    pub expected: AttributeValue,
}

impl Question {
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        attribute: impl Into<String>,
        expected: impl Into<AttributeValue>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            attribute: attribute.into(),
            expected: expected.into(),
        }
    }
}
