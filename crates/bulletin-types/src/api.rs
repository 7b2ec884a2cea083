use serde::{Deserialize, Serialize};

use crate::validation::{Validate, ValidationProblem};

// -- Public messages --

/// Wire shape exchanged with HTTP clients.
///
/// Single-item reads fill in the client fields; list reads leave them `None`
/// and they are dropped from the JSON entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicMessageDto {
    #[serde(default)]
    pub message_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message_content: String,
    #[serde(default)]
    pub addressed_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_email_id: Option<String>,
    #[serde(default)]
    pub valid_until: Option<String>,
}

impl Validate for PublicMessageDto {
    fn validate(&self) -> Result<(), ValidationProblem> {
        let mut problem = ValidationProblem::new();
        problem.require("title", Some(self.title.as_str()));
        problem.require("messageContent", Some(self.message_content.as_str()));
        problem.require("clientName", self.client_name.as_deref());
        problem.require("clientEmailId", self.client_email_id.as_deref());
        problem.into_result()
    }
}

// -- Errors --

/// Body returned alongside a 404/500 when a handler reports a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageError {
    pub message: String,
    pub stack: String,
}

impl MessageError {
    pub fn new(message: impl Into<String>, stack: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack: stack.into(),
        }
    }
}
