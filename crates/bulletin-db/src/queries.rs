use crate::models::{ClientRow, MessageRow};
use crate::{ConcurrencyConflict, Database};
use anyhow::Result;
use bulletin_types::models::{Client, PublicMessage};
use rusqlite::{Connection, OptionalExtension, Row};

impl Database {
    // -- Public messages --

    /// Every message, in store order, without its client.
    pub fn list_messages(&self) -> Result<Vec<PublicMessage>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT message_id, title, message_content, addressed_to, client_id, posted_on, valid_until
                 FROM public_messages",
            )?;

            let rows = stmt
                .query_map([], message_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows.into_iter().map(|row| row.into_message(None)).collect())
        })
    }

    /// Looks a message up by id, with its own client attached when it still has one.
    pub fn find_message(&self, id: i64) -> Result<Option<PublicMessage>> {
        self.with_conn(|conn| query_message_with_client(conn, id))
    }

    pub fn message_exists(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let exists = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM public_messages WHERE message_id = ?1)",
                [id],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
    }

    pub fn count_messages(&self) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row("SELECT COUNT(*) FROM public_messages", [], |row| row.get(0))?;
            Ok(count)
        })
    }

    /// Adds the message and its client in one commit. Ids left at 0 are
    /// assigned by the store; the stored copy is returned with them filled in.
    pub fn insert_message(&self, message: &PublicMessage) -> Result<PublicMessage> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let stored = insert_message_tx(&tx, message)?;
            tx.commit()?;
            Ok(stored)
        })
    }

    /// Inserts several messages under a single commit.
    pub fn insert_messages(&self, messages: &[PublicMessage]) -> Result<Vec<PublicMessage>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let stored = messages
                .iter()
                .map(|m| insert_message_tx(&tx, m))
                .collect::<Result<Vec<_>>>()?;
            tx.commit()?;
            Ok(stored)
        })
    }

    /// Overwrites every column of an existing message.
    ///
    /// The client reference follows the entity: a client with id 0 is added
    /// as a new row, any other client is referenced as-is, and no client
    /// clears the reference. Fails with [`ConcurrencyConflict`] when no row
    /// was updated.
    pub fn update_message(&self, message: &PublicMessage) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let client_id = match &message.client {
                Some(client) if client.client_id == 0 => Some(insert_client(&tx, client)?),
                Some(client) => Some(client.client_id),
                None => None,
            };

            let affected = tx.execute(
                "UPDATE public_messages
                 SET title = ?2, message_content = ?3, addressed_to = ?4, client_id = ?5,
                     posted_on = ?6, valid_until = ?7
                 WHERE message_id = ?1",
                rusqlite::params![
                    message.message_id,
                    message.title,
                    message.message_content,
                    message.addressed_to,
                    client_id,
                    message.posted_on,
                    message.valid_until,
                ],
            )?;

            if affected == 0 {
                return Err(ConcurrencyConflict {
                    message_id: message.message_id,
                }
                .into());
            }

            tx.commit()?;
            Ok(())
        })
    }

    /// Removes a message. Its client row is left in place.
    pub fn delete_message(&self, id: i64) -> Result<()> {
        self.with_conn_mut(|conn| {
            let affected = conn.execute("DELETE FROM public_messages WHERE message_id = ?1", [id])?;
            if affected == 0 {
                return Err(ConcurrencyConflict { message_id: id }.into());
            }
            Ok(())
        })
    }

    // -- Clients --

    /// Whichever client row the store yields first.
    pub fn first_client(&self) -> Result<Option<Client>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT client_id, full_name, email_id FROM clients LIMIT 1",
                    [],
                    |row| {
                        Ok(ClientRow {
                            client_id: row.get(0)?,
                            full_name: row.get(1)?,
                            email_id: row.get(2)?,
                        })
                    },
                )
                .optional()?;

            Ok(row.map(Client::from))
        })
    }
}

fn message_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        message_id: row.get(0)?,
        title: row.get(1)?,
        message_content: row.get(2)?,
        addressed_to: row.get(3)?,
        client_id: row.get(4)?,
        posted_on: row.get(5)?,
        valid_until: row.get(6)?,
    })
}

fn query_message_with_client(conn: &Connection, id: i64) -> Result<Option<PublicMessage>> {
    // LEFT JOIN so a message whose client reference was cleared still loads
    let mut stmt = conn.prepare(
        "SELECT m.message_id, m.title, m.message_content, m.addressed_to, m.client_id,
                m.posted_on, m.valid_until, c.client_id, c.full_name, c.email_id
         FROM public_messages m
         LEFT JOIN clients c ON c.client_id = m.client_id
         WHERE m.message_id = ?1",
    )?;

    let found = stmt
        .query_row([id], |row| {
            let message = message_row(row)?;
            let client = match row.get::<_, Option<i64>>(7)? {
                Some(client_id) => Some(Client::from(ClientRow {
                    client_id,
                    full_name: row.get(8)?,
                    email_id: row.get(9)?,
                })),
                None => None,
            };
            Ok((message, client))
        })
        .optional()?;

    Ok(found.map(|(message, client)| message.into_message(client)))
}

fn insert_client(conn: &Connection, client: &Client) -> Result<i64> {
    conn.execute(
        "INSERT INTO clients (client_id, full_name, email_id) VALUES (?1, ?2, ?3)",
        rusqlite::params![non_zero(client.client_id), client.full_name, client.email_id],
    )?;
    Ok(conn.last_insert_rowid())
}

fn insert_message_tx(conn: &Connection, message: &PublicMessage) -> Result<PublicMessage> {
    let client = match &message.client {
        Some(client) => {
            let client_id = insert_client(conn, client)?;
            Some(Client {
                client_id,
                ..client.clone()
            })
        }
        None => None,
    };

    conn.execute(
        "INSERT INTO public_messages
            (message_id, title, message_content, addressed_to, client_id, posted_on, valid_until)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            non_zero(message.message_id),
            message.title,
            message.message_content,
            message.addressed_to,
            client.as_ref().map(|c| c.client_id),
            message.posted_on,
            message.valid_until,
        ],
    )?;

    Ok(PublicMessage {
        message_id: conn.last_insert_rowid(),
        client,
        ..message.clone()
    })
}

/// 0 means "not assigned yet"; NULL lets SQLite pick the rowid.
fn non_zero(id: i64) -> Option<i64> {
    (id != 0).then_some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(title: &str, client_name: &str) -> PublicMessage {
        PublicMessage {
            title: title.into(),
            message_content: "Some message content".into(),
            addressed_to: Some("Everyone".into()),
            client: Some(Client {
                client_id: 0,
                full_name: Some(client_name.into()),
                email_id: Some(format!("{}@example.com", client_name.to_lowercase())),
            }),
            posted_on: Some("Monday, March 1, 2021".into()),
            valid_until: Some("Until further notice".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_insert_assigns_ids_and_find_loads_own_client() {
        let db = Database::open_in_memory().unwrap();
        let first = db.insert_message(&message("First", "Alice")).unwrap();
        let second = db.insert_message(&message("Second", "Bob")).unwrap();

        assert!(first.message_id > 0);
        assert_ne!(first.message_id, second.message_id);

        let found = db.find_message(second.message_id).unwrap().unwrap();
        assert_eq!(found.title, "Second");
        assert_eq!(found.client, second.client);
        assert_eq!(
            found.client.and_then(|c| c.full_name).as_deref(),
            Some("Bob")
        );
    }

    #[test]
    fn test_find_missing_returns_none() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.find_message(42).unwrap().is_none());
        assert!(!db.message_exists(42).unwrap());
    }

    #[test]
    fn test_list_is_in_id_order_without_clients() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.list_messages().unwrap().is_empty());

        db.insert_messages(&[message("One", "A"), message("Two", "B"), message("Three", "C")])
            .unwrap();

        let titles: Vec<String> = db
            .list_messages()
            .unwrap()
            .into_iter()
            .map(|m| {
                assert!(m.client.is_none());
                m.title
            })
            .collect();
        assert_eq!(titles, vec!["One", "Two", "Three"]);
    }

    #[test]
    fn test_update_overwrites_columns() {
        let db = Database::open_in_memory().unwrap();
        let mut stored = db.insert_message(&message("Before", "Alice")).unwrap();

        stored.title = "After".into();
        stored.valid_until = None;
        db.update_message(&stored).unwrap();

        let found = db.find_message(stored.message_id).unwrap().unwrap();
        assert_eq!(found.title, "After");
        assert_eq!(found.valid_until, None);
        assert_eq!(found.client, stored.client);
    }

    #[test]
    fn test_update_without_client_clears_reference() {
        let db = Database::open_in_memory().unwrap();
        let mut stored = db.insert_message(&message("Orphan", "Alice")).unwrap();

        stored.client = None;
        db.update_message(&stored).unwrap();

        let found = db.find_message(stored.message_id).unwrap().unwrap();
        assert!(found.client.is_none());
        // The client row itself survives
        assert!(db.first_client().unwrap().is_some());
    }

    #[test]
    fn test_update_with_new_client_inserts_it() {
        let db = Database::open_in_memory().unwrap();
        let mut stored = db.insert_message(&message("Moved", "Alice")).unwrap();
        let old_client_id = stored.client.as_ref().unwrap().client_id;

        stored.client = Some(Client {
            client_id: 0,
            full_name: Some("Carol".into()),
            email_id: Some("carol@example.com".into()),
        });
        db.update_message(&stored).unwrap();

        let client = db.find_message(stored.message_id).unwrap().unwrap().client.unwrap();
        assert_ne!(client.client_id, old_client_id);
        assert_eq!(client.full_name.as_deref(), Some("Carol"));
    }

    #[test]
    fn test_update_missing_row_is_conflict() {
        let db = Database::open_in_memory().unwrap();
        let ghost = PublicMessage {
            message_id: 99,
            client: None,
            ..message("Ghost", "Nobody")
        };

        let err = db.update_message(&ghost).unwrap_err();
        assert!(err.is::<ConcurrencyConflict>());
    }

    #[test]
    fn test_delete_removes_row_and_keeps_client() {
        let db = Database::open_in_memory().unwrap();
        let stored = db.insert_message(&message("Doomed", "Alice")).unwrap();

        db.delete_message(stored.message_id).unwrap();

        assert!(db.find_message(stored.message_id).unwrap().is_none());
        assert_eq!(db.count_messages().unwrap(), 0);
        assert!(db.first_client().unwrap().is_some());

        let err = db.delete_message(stored.message_id).unwrap_err();
        assert!(err.is::<ConcurrencyConflict>());
    }
}
