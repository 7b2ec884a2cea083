//! Database row types. These map directly to SQLite rows.
//! Converted into the bulletin-types entities before leaving this crate.

use bulletin_types::models::{Client, PublicMessage};

pub struct ClientRow {
    pub client_id: i64,
    pub full_name: Option<String>,
    pub email_id: Option<String>,
}

pub struct MessageRow {
    pub message_id: i64,
    pub title: String,
    pub message_content: String,
    pub addressed_to: Option<String>,
    pub client_id: Option<i64>,
    pub posted_on: Option<String>,
    pub valid_until: Option<String>,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Self {
            client_id: row.client_id,
            full_name: row.full_name,
            email_id: row.email_id,
        }
    }
}

impl MessageRow {
    pub fn into_message(self, client: Option<Client>) -> PublicMessage {
        PublicMessage {
            message_id: self.message_id,
            title: self.title,
            message_content: self.message_content,
            addressed_to: self.addressed_to,
            client,
            posted_on: self.posted_on,
            valid_until: self.valid_until,
        }
    }
}
