use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::validation::{Validate, ValidationProblem};

/// The sender of a public message. Created together with its message and
/// never managed on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Assigned by the store; 0 until the row is inserted.
    #[serde(default)]
    pub client_id: i64,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email_id: Option<String>,
}

/// A persisted public message. This is also the body accepted by
/// `PUT /api/v1/messages/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicMessage {
    /// Assigned by the store; 0 until the row is inserted.
    #[serde(default)]
    pub message_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message_content: String,
    #[serde(default)]
    pub addressed_to: Option<String>,
    #[serde(default)]
    pub client: Option<Client>,
    /// Long date string stamped at creation, e.g. "Sunday, October 18, 2026".
    #[serde(default)]
    pub posted_on: Option<String>,
    #[serde(default)]
    pub valid_until: Option<String>,
}

/// Formats a timestamp the way `postedOn` is stored: "Sunday, October 18, 2026".
pub fn long_date<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    at.format("%A, %B %-d, %Y").to_string()
}

impl Validate for PublicMessage {
    fn validate(&self) -> Result<(), ValidationProblem> {
        let mut problem = ValidationProblem::new();
        problem.require("title", Some(self.title.as_str()));
        problem.require("messageContent", Some(self.message_content.as_str()));
        problem.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_round_trips_with_client() {
        let json = r#"{
            "messageId": 3,
            "title": "Sample message title 2",
            "messageContent": "Some message content",
            "addressedTo": "DEF",
            "client": { "clientId": 3, "fullName": "Fun test", "emailId": "test2@gmail.com" }
        }"#;
        let message: PublicMessage = serde_json::from_str(json).unwrap();
        assert_eq!(message.message_id, 3);
        assert_eq!(message.client.as_ref().map(|c| c.client_id), Some(3));
        assert_eq!(message.posted_on, None);
        assert!(message.validate().is_ok());
    }

    #[test]
    fn test_long_date_format() {
        let at = chrono::Utc.with_ymd_and_hms(2021, 2, 6, 9, 30, 0).unwrap();
        assert_eq!(long_date(&at), "Saturday, February 6, 2021");
    }

    #[test]
    fn test_entity_requires_title_and_content() {
        let message: PublicMessage = serde_json::from_str(r#"{"messageId": 1}"#).unwrap();
        let problem = message.validate().unwrap_err();
        assert!(problem.errors.contains_key("title"));
        assert!(problem.errors.contains_key("messageContent"));
    }
}
